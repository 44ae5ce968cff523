//! Plumbing shared with the legacy X11 compatibility bridge: atoms, raw
//! messages and the per-surface hint cache.
mod message;
mod surface;
mod xatom;

pub use message::{RawMessage, RawProperty, XWindow, ROOT_WINDOW};
pub use surface::{BridgeSurface, WindowMap};
pub use xatom::{AtomId, XAtom};

/// `WM_STATE` / `WM_CHANGE_STATE` values from ICCCM.
pub const NORMAL_STATE: i64 = 1;
pub const ICONIC_STATE: i64 = 3;

/// `_NET_WM_DESKTOP` value meaning "all desktops".
pub const ALL_DESKTOPS: i64 = 0xFFFF_FFFF;
