use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tagwm::layout::{LogFocus, LogScene, StaticLayout};
use tagwm_core::{Collaborators, CommandPipe, Config as _, Engine, StateSocket};
use xdg::BaseDirectories;

/// Runs the tagwm engine, reading events from the command pipe and
/// broadcasting desktop state on the state socket.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Check the configuration and exit
    #[arg(short, long)]
    check: bool,

    /// Print what the check does
    #[arg(short, long, requires = "check")]
    verbose: bool,

    /// Use this configuration file instead of the one in the xdg config dir
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = tagwm::load_from_file(args.config.as_deref())?;

    if args.check {
        if config.check_all(args.verbose) {
            println!("Configuration is ok.");
            return Ok(());
        }
        anyhow::bail!("Configuration has errors");
    }

    let _log_guard = tagwm::utils::log::setup_logging(&config.log_level());
    tracing::info!("tagwm booting...");

    let collaborators = Collaborators {
        layout: Box::new(StaticLayout::from_config(&config)),
        scene: Box::new(LogScene),
        focus: Box::new(LogFocus),
    };
    let mut engine = Engine::new(&config, collaborators)?;

    let base_dirs = BaseDirectories::with_prefix("tagwm")?;
    let socket_file = base_dirs
        .place_runtime_file("current_state.sock")
        .context("Couldn't place the state socket")?;
    let mut state_socket = StateSocket::default();
    state_socket.listen(socket_file).await?;

    let pipe_file = base_dirs
        .place_runtime_file(CommandPipe::pipe_name())
        .context("Couldn't place the command pipe")?;
    let mut command_pipe = CommandPipe::new(pipe_file).await?;

    let state = engine.publish();
    state_socket.write_desktop_state(&state).await?;

    let result = event_loop(&mut engine, &mut state_socket, &mut command_pipe).await;
    state_socket.shutdown().await;
    tracing::info!("tagwm exiting");
    result
}

async fn event_loop(
    engine: &mut Engine,
    state_socket: &mut StateSocket,
    command_pipe: &mut CommandPipe,
) -> Result<()> {
    loop {
        if engine.refresh() {
            if let Some(state) = engine.last_published() {
                state_socket.write_desktop_state(state).await?;
            }
        }

        tokio::select! {
            Some(event) = command_pipe.read_event() => {
                match engine.execute(event) {
                    Ok(outcome) => tracing::debug!("Event applied: {:?}", outcome),
                    Err(err) => tracing::warn!("Event failed: {}", err),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, shutting down");
                return Ok(());
            }
        }
    }
}
