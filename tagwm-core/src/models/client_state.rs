use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ClientState {
    Minimized,
    Withdrawn,
    Fullscreen,
    Maximized,
    DemandsAttention,
    Sticky,
    Above,
    Below,
}
