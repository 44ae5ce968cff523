//! Plumbing between the engine and the processes around it.
pub mod command_pipe;
pub mod state_socket;
