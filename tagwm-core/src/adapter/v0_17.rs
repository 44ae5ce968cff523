//! Adapter for the 0.17 backend. The bridge of this release has no window
//! type, input model or geometry queries and a single maximize toggle.
use super::{Backend, InputModel, SceneNode};
use crate::bridge::{BridgeSurface, XAtom};
use crate::errors::Result;
use crate::models::{ClientId, ProtocolOrigin, WindowType, Xyhw};

#[derive(Debug, Clone, Default)]
pub struct Adapter;

impl Backend for Adapter {
    fn new(_atoms: &XAtom) -> Result<Self> {
        tracing::debug!("Using backend adapter 0.17");
        Ok(Self)
    }

    fn version(&self) -> &'static str {
        "0.17"
    }

    fn create_scene_node(&self, client: ClientId, origin: ProtocolOrigin) -> SceneNode {
        SceneNode {
            client,
            origin,
            backend: self.version(),
        }
    }

    // One toggle for both axes.
    fn set_maximized(&self, surface: &mut BridgeSurface, horizontal: bool, vertical: bool) {
        let maximized = horizontal || vertical;
        surface.maximized_horz = maximized;
        surface.maximized_vert = maximized;
    }

    fn override_redirect_wants_focus(&self, _surface: &BridgeSurface) -> bool {
        false
    }

    fn input_model(&self, _surface: &BridgeSurface) -> InputModel {
        InputModel::Passive
    }

    fn window_type(&self, _surface: &BridgeSurface) -> WindowType {
        WindowType::Unknown
    }

    fn toplevel_geometry(&self, _surface: &BridgeSurface) -> Option<Xyhw> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_capabilities_fall_back_to_defaults() {
        let adapter = Adapter::new(&XAtom::new()).unwrap();
        let mut surface = BridgeSurface::new(3);
        surface.override_redirect = true;
        surface.input_hint = Some(false);
        assert_eq!(adapter.window_type(&surface), WindowType::Unknown);
        assert_eq!(adapter.input_model(&surface), InputModel::Passive);
        assert!(!adapter.override_redirect_wants_focus(&surface));
        assert!(adapter.toplevel_geometry(&surface).is_none());
    }

    #[test]
    fn maximizing_one_axis_maximizes_both() {
        let adapter = Adapter;
        let mut surface = BridgeSurface::new(3);
        adapter.set_maximized(&mut surface, false, true);
        assert!(surface.maximized_horz && surface.maximized_vert);
    }
}
