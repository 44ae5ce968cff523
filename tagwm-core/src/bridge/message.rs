use super::AtomId;
use serde::{Deserialize, Serialize};

/// An X11 window id as seen through the bridge.
pub type XWindow = u32;

/// The bridge's root window. Root targeted messages address desktop state.
pub const ROOT_WINDOW: XWindow = 1;

/// A property value as cached by the bridge transport.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum RawProperty {
    Text(String),
    /// `STRING` lists, e.g. the instance and class halves of `WM_CLASS`.
    Strings(Vec<String>),
    Cardinals(Vec<u32>),
    Atoms(Vec<AtomId>),
    Windows(Vec<XWindow>),
    Deleted,
}

impl RawProperty {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Strings(list) => list.first().map(String::as_str),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_cardinals(&self) -> Option<&[u32]> {
        match self {
            Self::Cardinals(values) => Some(values),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_atoms(&self) -> Option<&[AtomId]> {
        match self {
            Self::Atoms(atoms) => Some(atoms),
            _ => None,
        }
    }
}

/// A message delivered by the bridge transport.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum RawMessage {
    /// A `ClientMessage` event, data in 32 bit format.
    ClientMessage {
        window: XWindow,
        message_type: AtomId,
        data: [i64; 5],
    },
    /// A `PropertyNotify` together with the property's new value.
    PropertyNotify {
        window: XWindow,
        atom: AtomId,
        value: RawProperty,
    },
}

impl RawMessage {
    #[must_use]
    pub const fn window(&self) -> XWindow {
        match self {
            Self::ClientMessage { window, .. } | Self::PropertyNotify { window, .. } => *window,
        }
    }

    #[must_use]
    pub const fn targets_root(&self) -> bool {
        self.window() == ROOT_WINDOW
    }
}
