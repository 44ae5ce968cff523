//! Externally visible window manager state.
use super::ClientId;
use serde::{Deserialize, Serialize};

/// Desktop and stacking state as published to the outside world.
///
/// Always regenerated as a whole. `desktop_names[i]` names the i-th tag of the
/// layout's tag ordering; `stacking_list` runs back to front.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DesktopState {
    pub desktop_count: usize,
    pub desktop_names: Vec<String>,
    pub current_desktop: Option<usize>,
    pub stacking_list: Vec<ClientId>,
}

impl DesktopState {
    #[must_use]
    pub fn references(&self, id: ClientId) -> bool {
        self.stacking_list.contains(&id)
    }
}
