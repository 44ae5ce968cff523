//! Collaborators the engine consumes but does not own: the tag/layout
//! policy, the renderer and the focus policy.
use crate::models::{ClientId, Output, OutputId, Tag, TagRef};
use std::collections::BTreeSet;

/// Tag and layout policy. The engine never decides which tags are shown, it
/// only asks.
pub trait LayoutSubsystem {
    fn outputs(&self) -> Vec<Output>;

    /// Tags currently shown on `output`.
    fn active_tags(&self, output: OutputId) -> BTreeSet<TagRef>;

    /// Every configured tag in desktop order.
    fn tag_ordering(&self) -> Vec<Tag>;

    /// Show the tag at `index` of [`LayoutSubsystem::tag_ordering`].
    /// Returns `false` when the request was refused.
    fn activate_tag(&mut self, index: usize) -> bool;

    /// A client asked to move to the desktop at `index`; `None` for all
    /// desktops. Returns the tag the client should now carry.
    fn request_client_tag(&mut self, client: ClientId, index: Option<usize>) -> Option<TagRef>;
}

/// Fire and forget requests to the renderer.
pub trait SceneSink {
    fn set_scene_visibility(&mut self, client: ClientId, visible: bool);
}

pub trait FocusSink {
    fn request_activate(&mut self, client: ClientId);
}

/// Whether a message was consumed. Not an error: unsupported or stale
/// messages are simply left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Handled,
    Unhandled,
}

impl Dispatch {
    #[must_use]
    pub const fn is_handled(self) -> bool {
        matches!(self, Self::Handled)
    }
}

impl From<bool> for Dispatch {
    fn from(handled: bool) -> Self {
        if handled {
            Self::Handled
        } else {
            Self::Unhandled
        }
    }
}
