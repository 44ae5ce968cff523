//! Turn protocol level notifications from either transport into client
//! model updates.
pub mod bridge;
pub mod native;

pub use bridge::{BridgeImporter, BridgeUpdate};
pub use native::{ListenerToken, NativeEvent, NativeEventKind, NativeImporter};
