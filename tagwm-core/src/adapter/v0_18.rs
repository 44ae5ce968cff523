//! Adapter for the 0.18 backend.
use super::{Backend, InputModel, SceneNode};
use crate::bridge::{AtomId, BridgeSurface, RawProperty, XAtom};
use crate::errors::{CoreError, Result};
use crate::models::{ClientId, ProtocolOrigin, WindowType, Xyhw};

#[derive(Debug, Clone)]
struct TypeAtoms {
    window_type: AtomId,
    desktop: AtomId,
    dock: AtomId,
    toolbar: AtomId,
    menu: AtomId,
    utility: AtomId,
    splash: AtomId,
    dialog: AtomId,
    normal: AtomId,
}

#[derive(Debug, Clone)]
pub struct Adapter {
    atoms: TypeAtoms,
}

impl Adapter {
    fn window_types<'a>(&self, surface: &'a BridgeSurface) -> &'a [AtomId] {
        surface
            .property(self.atoms.window_type)
            .and_then(RawProperty::as_atoms)
            .unwrap_or_default()
    }
}

impl Backend for Adapter {
    fn new(atoms: &XAtom) -> Result<Self> {
        let lookup = |name: &str| {
            atoms
                .lookup(name)
                .ok_or_else(|| CoreError::Backend(format!("atom {name} is not interned")))
        };
        let atoms = TypeAtoms {
            window_type: lookup("_NET_WM_WINDOW_TYPE")?,
            desktop: lookup("_NET_WM_WINDOW_TYPE_DESKTOP")?,
            dock: lookup("_NET_WM_WINDOW_TYPE_DOCK")?,
            toolbar: lookup("_NET_WM_WINDOW_TYPE_TOOLBAR")?,
            menu: lookup("_NET_WM_WINDOW_TYPE_MENU")?,
            utility: lookup("_NET_WM_WINDOW_TYPE_UTILITY")?,
            splash: lookup("_NET_WM_WINDOW_TYPE_SPLASH")?,
            dialog: lookup("_NET_WM_WINDOW_TYPE_DIALOG")?,
            normal: lookup("_NET_WM_WINDOW_TYPE_NORMAL")?,
        };
        tracing::debug!("Using backend adapter 0.18");
        Ok(Self { atoms })
    }

    fn version(&self) -> &'static str {
        "0.18"
    }

    fn create_scene_node(&self, client: ClientId, origin: ProtocolOrigin) -> SceneNode {
        SceneNode {
            client,
            origin,
            backend: self.version(),
        }
    }

    fn set_maximized(&self, surface: &mut BridgeSurface, horizontal: bool, vertical: bool) {
        surface.maximized_horz = horizontal;
        surface.maximized_vert = vertical;
    }

    fn override_redirect_wants_focus(&self, surface: &BridgeSurface) -> bool {
        if !surface.override_redirect {
            return false;
        }
        let transient = [
            self.atoms.dock,
            self.atoms.toolbar,
            self.atoms.menu,
            self.atoms.utility,
            self.atoms.splash,
        ];
        !self
            .window_types(surface)
            .iter()
            .any(|atom| transient.contains(atom))
    }

    fn input_model(&self, surface: &BridgeSurface) -> InputModel {
        InputModel::from_hints(surface.input_hint, surface.take_focus)
    }

    // The first type we recognise wins, as the hint lists them by preference.
    fn window_type(&self, surface: &BridgeSurface) -> WindowType {
        let types = self.window_types(surface);
        if types.is_empty() {
            return WindowType::Normal;
        }
        let atoms = &self.atoms;
        types
            .iter()
            .find_map(|&atom| match atom {
                a if a == atoms.desktop => Some(WindowType::Desktop),
                a if a == atoms.dock => Some(WindowType::Dock),
                a if a == atoms.toolbar || a == atoms.utility => Some(WindowType::Utility),
                a if a == atoms.splash => Some(WindowType::Splash),
                a if a == atoms.dialog => Some(WindowType::Dialog),
                a if a == atoms.normal => Some(WindowType::Normal),
                _ => None,
            })
            .unwrap_or(WindowType::Unknown)
    }

    fn toplevel_geometry(&self, surface: &BridgeSurface) -> Option<Xyhw> {
        let geometry = surface.geometry;
        (!surface.override_redirect && geometry.w() > 0 && geometry.h() > 0).then_some(geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(atoms: &XAtom, types: Vec<AtomId>) -> BridgeSurface {
        BridgeSurface::new(9).with_property(atoms.NetWMWindowType, RawProperty::Atoms(types))
    }

    #[test]
    fn window_type_uses_the_first_known_atom() {
        let mut atoms = XAtom::new();
        let adapter = Adapter::new(&atoms).unwrap();
        let custom = atoms.intern("_KDE_NET_WM_WINDOW_TYPE_OVERRIDE");
        let surface = typed(&atoms, vec![custom, atoms.NetWMWindowTypeDialog]);
        assert_eq!(adapter.window_type(&surface), WindowType::Dialog);
    }

    #[test]
    fn window_type_without_hint_is_normal() {
        let atoms = XAtom::new();
        let adapter = Adapter::new(&atoms).unwrap();
        assert_eq!(adapter.window_type(&BridgeSurface::new(9)), WindowType::Normal);
        let menu = typed(&atoms, vec![atoms.NetWMWindowTypeMenu]);
        assert_eq!(adapter.window_type(&menu), WindowType::Unknown);
    }

    #[test]
    fn override_redirect_menus_do_not_want_focus() {
        let atoms = XAtom::new();
        let adapter = Adapter::new(&atoms).unwrap();
        let mut menu = typed(&atoms, vec![atoms.NetWMWindowTypeMenu]);
        menu.override_redirect = true;
        assert!(!adapter.override_redirect_wants_focus(&menu));
        let mut launcher = BridgeSurface::new(10);
        launcher.override_redirect = true;
        assert!(adapter.override_redirect_wants_focus(&launcher));
    }

    #[test]
    fn geometry_is_only_reported_for_sized_toplevels() {
        let adapter = Adapter::new(&XAtom::new()).unwrap();
        let mut surface = BridgeSurface::new(4);
        assert!(adapter.toplevel_geometry(&surface).is_none());
        surface.geometry = Xyhw::new(10, 10, 300, 200);
        assert_eq!(adapter.toplevel_geometry(&surface), Some(Xyhw::new(10, 10, 300, 200)));
    }
}
