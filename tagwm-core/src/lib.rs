//! Client property and visibility synchronization for tagwm.
// We deny clippy pedantic lints, primarily to keep code as correct as possible
#![warn(clippy::pedantic)]
// Each of these lints are globally allowed because they otherwise make a lot
// of noise.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]
pub mod adapter;
mod banning;
pub mod bridge;
pub mod clients;
mod command;
pub mod config;
pub mod engine;
pub mod errors;
pub mod external;
pub mod importers;
pub mod models;
pub mod properties;
pub mod publisher;
pub mod scheduler;
pub mod struts;
pub mod utils;

#[cfg(test)]
mod test_utils;

pub use command::{EngineEvent, Outcome};
pub use config::{Config, PropertyDecl, PublishMode};
pub use engine::{Collaborators, Engine};
pub use errors::{CoreError, Result};
pub use external::{Dispatch, FocusSink, LayoutSubsystem, SceneSink};
pub use models::dto::DesktopState;
pub use models::{Client, ClientId};
pub use scheduler::Scheduler;
pub use utils::command_pipe::CommandPipe;
pub use utils::state_socket::StateSocket;
