mod config;
pub mod layout;
pub mod utils;

pub use config::*;
pub use layout::{LogFocus, LogScene, StaticLayout};
