//! Client Information
#![allow(clippy::module_name_repetitions)]

use super::{ClientState, OutputId, Strut, TagRef, WindowType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Identifies a mapped window for the lifetime of the process. Ids are never reused.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ClientId(pub u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client#{}", self.0)
    }
}

/// Which protocol a client speaks. Fixed at creation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolOrigin {
    Native,
    Bridged,
}

/// The protocol agnostic view of a mapped window.
///
/// Fields are only writable from inside the crate: every mutation has to go
/// through [`crate::ClientRegistry`] so the refresh scheduler hears about it.
/// `visible` is written by the refresh pass and nothing else.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Client {
    pub(crate) id: ClientId,
    pub(crate) origin: ProtocolOrigin,
    pub(crate) title: String,
    pub(crate) app_id: String,
    pub(crate) instance: String,
    pub(crate) pid: Option<u32>,
    pub(crate) window_type: WindowType,
    pub(crate) tags: BTreeSet<TagRef>,
    pub(crate) output: Option<OutputId>,
    pub(crate) strut: Option<Strut>,
    pub(crate) states: Vec<ClientState>,
    pub(crate) stacking_position: usize,
    pub(crate) visible: bool,
}

impl Client {
    pub(crate) fn new(id: ClientId, origin: ProtocolOrigin) -> Self {
        Self {
            id,
            origin,
            title: String::new(),
            app_id: String::new(),
            instance: String::new(),
            pid: None,
            window_type: WindowType::Normal,
            tags: BTreeSet::new(),
            output: None,
            strut: None,
            states: vec![],
            stacking_position: 0,
            visible: false,
        }
    }

    #[must_use]
    pub const fn id(&self) -> ClientId {
        self.id
    }

    #[must_use]
    pub const fn origin(&self) -> ProtocolOrigin {
        self.origin
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    #[must_use]
    pub fn instance(&self) -> &str {
        &self.instance
    }

    #[must_use]
    pub const fn pid(&self) -> Option<u32> {
        self.pid
    }

    #[must_use]
    pub const fn window_type(&self) -> WindowType {
        self.window_type
    }

    #[must_use]
    pub const fn tags(&self) -> &BTreeSet<TagRef> {
        &self.tags
    }

    #[must_use]
    pub fn has_tag(&self, tag: TagRef) -> bool {
        self.tags.contains(&tag)
    }

    #[must_use]
    pub const fn output(&self) -> Option<OutputId> {
        self.output
    }

    #[must_use]
    pub const fn strut(&self) -> Option<Strut> {
        self.strut
    }

    #[must_use]
    pub fn states(&self) -> &[ClientState] {
        &self.states
    }

    #[must_use]
    pub fn has_state(&self, state: ClientState) -> bool {
        self.states.contains(&state)
    }

    #[must_use]
    pub const fn stacking_position(&self) -> usize {
        self.stacking_position
    }

    /// Visibility as of the last refresh pass.
    #[must_use]
    pub const fn visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn is_minimized(&self) -> bool {
        self.has_state(ClientState::Minimized)
    }

    #[must_use]
    pub fn is_withdrawn(&self) -> bool {
        self.has_state(ClientState::Withdrawn)
    }

    #[must_use]
    pub fn is_fullscreen(&self) -> bool {
        self.has_state(ClientState::Fullscreen)
    }

    #[must_use]
    pub fn is_maximized(&self) -> bool {
        self.has_state(ClientState::Maximized)
    }

    #[must_use]
    pub fn is_urgent(&self) -> bool {
        self.has_state(ClientState::DemandsAttention)
    }

    /// Sticky clients ignore tags: explicit sticky state, a reserved edge, or a
    /// dock/desktop window type.
    #[must_use]
    pub fn is_sticky(&self) -> bool {
        self.has_state(ClientState::Sticky)
            || self.strut.is_some_and(|s| !s.is_empty())
            || self.window_type.is_sticky()
    }

    /// The visibility a refresh pass assigns, given the tags active on each output.
    #[must_use]
    pub fn wants_visible(&self, active: &BTreeMap<OutputId, BTreeSet<TagRef>>) -> bool {
        if self.is_withdrawn() || self.is_minimized() {
            return false;
        }
        if self.is_sticky() {
            return true;
        }
        match self.output {
            Some(output) => active
                .get(&output)
                .is_some_and(|tags| !tags.is_disjoint(&self.tags)),
            None => active.values().any(|tags| !tags.is_disjoint(&self.tags)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StrutEdge;

    fn active_on(output: u32, tags: &[TagRef]) -> BTreeMap<OutputId, BTreeSet<TagRef>> {
        let mut active = BTreeMap::new();
        active.insert(OutputId(output), tags.iter().copied().collect());
        active
    }

    #[test]
    fn client_on_an_active_tag_wants_to_be_visible() {
        let mut subject = Client::new(ClientId(1), ProtocolOrigin::Native);
        subject.tags.insert(2);
        assert!(subject.wants_visible(&active_on(0, &[2])));
        assert!(!subject.wants_visible(&active_on(0, &[1])));
    }

    #[test]
    fn client_pinned_to_an_output_ignores_tags_of_other_outputs() {
        let mut subject = Client::new(ClientId(1), ProtocolOrigin::Native);
        subject.tags.insert(2);
        subject.output = Some(OutputId(1));
        assert!(!subject.wants_visible(&active_on(0, &[2])));
        assert!(subject.wants_visible(&active_on(1, &[2])));
    }

    #[test]
    fn minimized_and_withdrawn_clients_are_never_visible() {
        let mut subject = Client::new(ClientId(1), ProtocolOrigin::Bridged);
        subject.tags.insert(1);
        subject.states.push(ClientState::Minimized);
        assert!(!subject.wants_visible(&active_on(0, &[1])));
        subject.states = vec![ClientState::Withdrawn];
        assert!(!subject.wants_visible(&active_on(0, &[1])));
    }

    #[test]
    fn docks_and_strut_holders_are_sticky() {
        let mut dock = Client::new(ClientId(1), ProtocolOrigin::Bridged);
        dock.window_type = WindowType::Dock;
        assert!(dock.wants_visible(&active_on(0, &[4])));

        let mut bar = Client::new(ClientId(2), ProtocolOrigin::Native);
        bar.strut = Some(Strut::default().with_top(StrutEdge::new(20)));
        assert!(bar.wants_visible(&active_on(0, &[4])));
    }
}
