use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowType {
    #[default]
    Normal,
    Dialog,
    Dock,
    Desktop,
    Splash,
    Utility,
    Unknown,
}

impl WindowType {
    /// Docks and desktops are shown on every tag.
    #[must_use]
    pub const fn is_sticky(self) -> bool {
        matches!(self, Self::Dock | Self::Desktop)
    }
}
