//! Objects (such as clients and struts) shared by every part of the engine.
mod client;
mod client_change;
mod client_state;
mod output;
mod property;
mod strut;
mod tag;
mod window_type;
mod xyhw;

pub mod dto;

pub use client::{Client, ClientId, ProtocolOrigin};
pub use client_change::ClientChange;
pub use client_state::ClientState;
pub use output::{Output, OutputId};
pub use property::{PropertyValue, ValueKind};
pub use strut::{Margins, Strut, StrutEdge};
pub use tag::{Tag, TagRef};
pub use window_type::WindowType;
pub use xyhw::Xyhw;
