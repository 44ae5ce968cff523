use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Specifications can be found here:
// https://specifications.freedesktop.org/wm-spec/1.3/ar01s03.html

/// Backend handle of an interned name. Built-in hints and custom properties
/// share this space.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct AtomId(pub u32);

macro_rules! atom_collection {
    ($($field:ident: $name:literal,)*) => {
        /// Interned atoms. The well known ones are fields, custom ones live in the table.
        #[derive(Clone, Debug)]
        #[allow(non_snake_case)]
        pub struct XAtom {
            $(pub $field: AtomId,)*
            names: Vec<String>,
            ids: HashMap<String, AtomId>,
        }

        impl XAtom {
            #[must_use]
            #[allow(non_snake_case)]
            pub fn new() -> Self {
                let mut names = vec![];
                let mut ids = HashMap::new();
                $(
                    let $field = intern_into(&mut names, &mut ids, $name);
                )*
                Self {
                    $($field,)*
                    names,
                    ids,
                }
            }
        }
    };
}

atom_collection! {
    WMState: "WM_STATE",
    WMChangeState: "WM_CHANGE_STATE",
    WMClass: "WM_CLASS",
    WMName: "WM_NAME",
    NetActiveWindow: "_NET_ACTIVE_WINDOW",
    NetSupported: "_NET_SUPPORTED",
    NetWMName: "_NET_WM_NAME",
    NetWMPid: "_NET_WM_PID",

    NetWMState: "_NET_WM_STATE",
    NetWMStateModal: "_NET_WM_STATE_MODAL",
    NetWMStateSticky: "_NET_WM_STATE_STICKY",
    NetWMStateMaximizedVert: "_NET_WM_STATE_MAXIMIZED_VERT",
    NetWMStateMaximizedHorz: "_NET_WM_STATE_MAXIMIZED_HORZ",
    NetWMStateHidden: "_NET_WM_STATE_HIDDEN",
    NetWMStateFullscreen: "_NET_WM_STATE_FULLSCREEN",
    NetWMStateAbove: "_NET_WM_STATE_ABOVE",
    NetWMStateBelow: "_NET_WM_STATE_BELOW",
    NetWMStateDemandsAttention: "_NET_WM_STATE_DEMANDS_ATTENTION",

    NetWMWindowType: "_NET_WM_WINDOW_TYPE",
    NetWMWindowTypeDesktop: "_NET_WM_WINDOW_TYPE_DESKTOP",
    NetWMWindowTypeDock: "_NET_WM_WINDOW_TYPE_DOCK",
    NetWMWindowTypeToolbar: "_NET_WM_WINDOW_TYPE_TOOLBAR",
    NetWMWindowTypeMenu: "_NET_WM_WINDOW_TYPE_MENU",
    NetWMWindowTypeUtility: "_NET_WM_WINDOW_TYPE_UTILITY",
    NetWMWindowTypeSplash: "_NET_WM_WINDOW_TYPE_SPLASH",
    NetWMWindowTypeDialog: "_NET_WM_WINDOW_TYPE_DIALOG",
    NetWMWindowTypeNormal: "_NET_WM_WINDOW_TYPE_NORMAL",

    NetClientList: "_NET_CLIENT_LIST",
    NetClientListStacking: "_NET_CLIENT_LIST_STACKING",
    NetNumberOfDesktops: "_NET_NUMBER_OF_DESKTOPS",
    NetCurrentDesktop: "_NET_CURRENT_DESKTOP",
    NetDesktopNames: "_NET_DESKTOP_NAMES",
    NetWMDesktop: "_NET_WM_DESKTOP",
    NetWMStrutPartial: "_NET_WM_STRUT_PARTIAL",
    NetWMStrut: "_NET_WM_STRUT",
}

fn intern_into(names: &mut Vec<String>, ids: &mut HashMap<String, AtomId>, name: &str) -> AtomId {
    if let Some(id) = ids.get(name) {
        return *id;
    }
    // Atom 0 is `None` in X11, ids start at 1.
    let id = AtomId(names.len() as u32 + 1);
    names.push(name.to_owned());
    ids.insert(name.to_owned(), id);
    id
}

impl Default for XAtom {
    fn default() -> Self {
        Self::new()
    }
}

impl XAtom {
    /// Atoms the bridge advertises through `_NET_SUPPORTED`: the hints the
    /// importer reads and the root properties the publisher writes.
    #[must_use]
    pub fn net_supported(&self) -> Vec<AtomId> {
        vec![
            self.NetSupported,
            self.NetActiveWindow,
            self.NetWMName,
            self.NetWMPid,
            self.NetWMState,
            self.NetWMStateSticky,
            self.NetWMStateMaximizedVert,
            self.NetWMStateMaximizedHorz,
            self.NetWMStateHidden,
            self.NetWMStateFullscreen,
            self.NetWMStateAbove,
            self.NetWMStateBelow,
            self.NetWMStateDemandsAttention,
            self.NetWMWindowType,
            self.NetWMWindowTypeDesktop,
            self.NetWMWindowTypeDock,
            self.NetWMWindowTypeToolbar,
            self.NetWMWindowTypeMenu,
            self.NetWMWindowTypeUtility,
            self.NetWMWindowTypeSplash,
            self.NetWMWindowTypeDialog,
            self.NetWMWindowTypeNormal,
            self.NetClientList,
            self.NetClientListStacking,
            self.NetNumberOfDesktops,
            self.NetCurrentDesktop,
            self.NetDesktopNames,
            self.NetWMDesktop,
            self.NetWMStrutPartial,
            self.NetWMStrut,
        ]
    }

    /// Returns the atom for `name`, allocating a new one if needed.
    pub fn intern(&mut self, name: &str) -> AtomId {
        intern_into(&mut self.names, &mut self.ids, name)
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<AtomId> {
        self.ids.get(name).copied()
    }

    #[must_use]
    pub fn get_name(&self, atom: AtomId) -> &str {
        (atom.0 as usize)
            .checked_sub(1)
            .and_then(|index| self.names.get(index))
            .map_or("(unknown atom)", String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_atoms_round_trip_through_their_names() {
        let atoms = XAtom::new();
        assert_eq!(atoms.get_name(atoms.NetWMState), "_NET_WM_STATE");
        assert_eq!(atoms.lookup("_NET_WM_STRUT_PARTIAL"), Some(atoms.NetWMStrutPartial));
    }

    #[test]
    fn interning_twice_returns_the_same_atom() {
        let mut atoms = XAtom::new();
        let first = atoms.intern("_TAGWM_LAYOUT");
        let second = atoms.intern("_TAGWM_LAYOUT");
        assert_eq!(first, second);
        assert_eq!(atoms.intern("WM_CLASS"), atoms.WMClass);
    }

    #[test]
    fn unknown_atoms_have_a_placeholder_name() {
        let atoms = XAtom::new();
        assert_eq!(atoms.get_name(AtomId(0)), "(unknown atom)");
        assert_eq!(atoms.get_name(AtomId(9_999)), "(unknown atom)");
    }

    #[test]
    fn net_supported_only_lists_serviced_ewmh_atoms() {
        let atoms = XAtom::new();
        let supported = atoms.net_supported();
        assert!(supported.contains(&atoms.NetWMState));
        assert!(supported.contains(&atoms.NetClientListStacking));
        assert!(!supported.contains(&atoms.WMClass));
        assert!(!supported.contains(&atoms.NetWMStateModal));
        assert!(supported
            .iter()
            .all(|&atom| atoms.get_name(atom).starts_with("_NET")));
    }
}
