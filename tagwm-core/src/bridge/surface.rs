use super::{AtomId, RawProperty, XWindow};
use crate::models::{ClientId, Xyhw};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// What the bridge transport knows about one legacy surface: its cached
/// properties plus the few fields that do not travel as properties.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct BridgeSurface {
    pub window: XWindow,
    pub override_redirect: bool,
    pub geometry: Xyhw,
    /// `input` field of `WM_HINTS`; `None` when the hint was never set.
    pub input_hint: Option<bool>,
    /// Whether `WM_PROTOCOLS` lists `WM_TAKE_FOCUS`.
    pub take_focus: bool,
    pub maximized_horz: bool,
    pub maximized_vert: bool,
    pub properties: BTreeMap<AtomId, RawProperty>,
}

impl BridgeSurface {
    #[must_use]
    pub fn new(window: XWindow) -> Self {
        Self {
            window,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_property(mut self, atom: AtomId, value: RawProperty) -> Self {
        self.set_property(atom, value);
        self
    }

    #[must_use]
    pub fn property(&self, atom: AtomId) -> Option<&RawProperty> {
        self.properties.get(&atom)
    }

    /// Stores a new value; `RawProperty::Deleted` drops the cached one.
    pub fn set_property(&mut self, atom: AtomId, value: RawProperty) {
        if value == RawProperty::Deleted {
            self.properties.remove(&atom);
        } else {
            self.properties.insert(atom, value);
        }
    }
}

/// Two way mapping between bridge windows and clients.
#[derive(Debug, Default, Clone)]
pub struct WindowMap {
    by_window: HashMap<XWindow, ClientId>,
    by_client: HashMap<ClientId, XWindow>,
}

impl WindowMap {
    /// Maps `window` to `client`, replacing whatever either was mapped to
    /// before. Returns the client that previously owned `window`.
    pub fn insert(&mut self, window: XWindow, client: ClientId) -> Option<ClientId> {
        let previous = self.by_window.insert(window, client).filter(|&p| p != client);
        if let Some(previous) = previous {
            self.by_client.remove(&previous);
        }
        if let Some(old) = self.by_client.insert(client, window).filter(|&w| w != window) {
            self.by_window.remove(&old);
        }
        previous
    }

    pub fn remove_client(&mut self, client: ClientId) -> Option<XWindow> {
        let window = self.by_client.remove(&client)?;
        self.by_window.remove(&window);
        Some(window)
    }

    #[must_use]
    pub fn client(&self, window: XWindow) -> Option<ClientId> {
        self.by_window.get(&window).copied()
    }

    #[must_use]
    pub fn window(&self, client: ClientId) -> Option<XWindow> {
        self.by_client.get(&client).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_window.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_window.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deleting_a_property_drops_it_from_the_cache() {
        let mut surface = BridgeSurface::new(7).with_property(AtomId(3), RawProperty::Text("x".into()));
        assert!(surface.property(AtomId(3)).is_some());
        surface.set_property(AtomId(3), RawProperty::Deleted);
        assert!(surface.property(AtomId(3)).is_none());
    }

    #[test]
    fn window_map_forgets_both_directions() {
        let mut map = WindowMap::default();
        map.insert(0x40_0001, ClientId(4));
        assert_eq!(map.client(0x40_0001), Some(ClientId(4)));
        assert_eq!(map.remove_client(ClientId(4)), Some(0x40_0001));
        assert!(map.client(0x40_0001).is_none());
        assert!(map.is_empty());
    }

    #[test]
    fn remapping_a_window_drops_the_stale_client() {
        let mut map = WindowMap::default();
        map.insert(0x77, ClientId(1));
        assert_eq!(map.insert(0x77, ClientId(2)), Some(ClientId(1)));
        assert!(map.window(ClientId(1)).is_none());
        assert_eq!(map.remove_client(ClientId(1)), None);
        assert_eq!(map.client(0x77), Some(ClientId(2)));

        map.insert(0x78, ClientId(2));
        assert!(map.client(0x77).is_none());
        assert_eq!(map.len(), 1);
    }
}
