//! Backend operations whose availability depends on the compositor library
//! version the crate is built against. Exactly one implementation is compiled
//! in, chosen with the `backend-0-17` or `backend-0-18` feature, and the rest
//! of the engine only ever talks to [`Active`].
#[cfg(feature = "backend-0-17")]
pub mod v0_17;
#[cfg(feature = "backend-0-18")]
pub mod v0_18;

#[cfg(not(any(feature = "backend-0-17", feature = "backend-0-18")))]
compile_error!("Enable exactly one backend version: `backend-0-17` or `backend-0-18`");

#[cfg(all(feature = "backend-0-17", feature = "backend-0-18"))]
compile_error!(
    "`backend-0-17` and `backend-0-18` are mutually exclusive, build with `--no-default-features`"
);

#[cfg(feature = "backend-0-17")]
pub type Active = v0_17::Adapter;
#[cfg(all(feature = "backend-0-18", not(feature = "backend-0-17")))]
pub type Active = v0_18::Adapter;

use crate::bridge::{BridgeSurface, XAtom};
use crate::errors::Result;
use crate::models::{ClientId, ProtocolOrigin, WindowType, Xyhw};
use serde::{Deserialize, Serialize};

/// ICCCM input model of a surface, see section 4.1.7 of the ICCCM.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputModel {
    None,
    Passive,
    LocallyActive,
    GloballyActive,
}

impl InputModel {
    /// Resolve the model from the `WM_HINTS` input field and `WM_TAKE_FOCUS`.
    /// A missing hint counts as accepting input.
    #[must_use]
    pub const fn from_hints(input_hint: Option<bool>, take_focus: bool) -> Self {
        let accepts_input = !matches!(input_hint, Some(false));
        match (accepts_input, take_focus) {
            (true, false) => Self::Passive,
            (true, true) => Self::LocallyActive,
            (false, true) => Self::GloballyActive,
            (false, false) => Self::None,
        }
    }

    #[must_use]
    pub const fn accepts_focus(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Handle of the presentation object created for a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneNode {
    pub client: ClientId,
    pub origin: ProtocolOrigin,
    pub backend: &'static str,
}

pub trait Backend: Sized {
    /// # Errors
    ///
    /// Fails when the backend cannot be brought up. Only ever called once at
    /// startup.
    fn new(atoms: &XAtom) -> Result<Self>;

    fn version(&self) -> &'static str;

    fn create_scene_node(&self, client: ClientId, origin: ProtocolOrigin) -> SceneNode;

    /// Push a maximize request down to a bridged surface.
    fn set_maximized(&self, surface: &mut BridgeSurface, horizontal: bool, vertical: bool);

    /// Whether an override-redirect surface expects keyboard focus.
    fn override_redirect_wants_focus(&self, surface: &BridgeSurface) -> bool;

    fn input_model(&self, surface: &BridgeSurface) -> InputModel;

    fn window_type(&self, surface: &BridgeSurface) -> WindowType;

    fn toplevel_geometry(&self, surface: &BridgeSurface) -> Option<Xyhw>;
}
