use anyhow::{Context, Result};
use clap::{arg, command};
use tagwm_core::DesktopState;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::net::UnixStream;
use xdg::BaseDirectories;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = command!("tagwm State")
        .about("Prints out the current desktop state of tagwm")
        .help_template(tagwm::utils::get_help_template())
        .args(&[
            arg!(-d --desktop "Print only the name of the current desktop"),
            arg!(-q --quit "Prints the state once and quits"),
        ])
        .get_matches();

    let once = matches.get_flag("quit");
    let desktop_only = matches.get_flag("desktop");

    let mut stream_reader = stream_reader().await?;
    while let Some(line) = stream_reader.next_line().await? {
        if desktop_only {
            let state: DesktopState = serde_json::from_str(&line)?;
            println!("{}", current_desktop_name(&state).unwrap_or_default());
        } else {
            println!("{line}");
        }
        if once {
            break;
        }
    }
    Ok(())
}

fn current_desktop_name(state: &DesktopState) -> Option<&str> {
    let index = state.current_desktop?;
    state.desktop_names.get(index).map(String::as_str)
}

async fn stream_reader() -> Result<Lines<BufReader<UnixStream>>> {
    let socket_file = BaseDirectories::with_prefix("tagwm")?
        .find_runtime_file("current_state.sock")
        .context("ERROR: Couldn't find current_state.sock, is tagwm running?")?;
    let stream = UnixStream::connect(socket_file).await?;
    Ok(BufReader::new(stream).lines())
}
