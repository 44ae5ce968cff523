use anyhow::{Context, Result};
use clap::{arg, command};
use std::fs::OpenOptions;
use std::io::prelude::*;
use tagwm_core::{CommandPipe, EngineEvent};
use xdg::BaseDirectories;

fn main() -> Result<()> {
    let matches = get_command().get_matches();

    if matches.get_flag("list") {
        print_commandlist();
        return Ok(());
    }

    let file_name = CommandPipe::pipe_name();
    let file_path = BaseDirectories::with_prefix("tagwm")?
        .find_runtime_file(&file_name)
        .with_context(|| format!("ERROR: Couldn't find {}", file_name.display()))?;
    let mut file = OpenOptions::new()
        .append(true)
        .open(file_path)
        .with_context(|| format!("ERROR: Couldn't open {}", file_name.display()))?;
    if let Some(commands) = matches.get_many::<String>("COMMAND") {
        for command in commands {
            if let Err(e) = serde_json::from_str::<EngineEvent>(command) {
                eprintln!(" ERROR: `{command}` is not a valid event: {e}");
                continue;
            }
            if let Err(e) = writeln!(file, "{command}") {
                eprintln!(" ERROR: Couldn't write to {}: {e}", file_name.display());
            }
        }
    }
    Ok(())
}

fn get_command() -> clap::Command {
    command!("tagwm Command")
        .about("Sends events to tagwm")
        .help_template(tagwm::utils::get_help_template())
        .args(&[
            arg!(-l --list "Print a list of example events."),
            arg!([COMMAND] ... "The JSON encoded event to be sent. See 'list' flag."),
        ])
}

fn print_commandlist() {
    println!(
        r#"
        Events are JSON documents, quote each one as a single argument:
            tagwm-command '<event>'

        Examples:

        "MapNative"
        "TagsChanged"
        "Publish"
        {{"ActivateTag": 2}}
        {{"Unmap": {{"client": 3}}}}
        {{"Raise": {{"client": 3}}}}
        {{"Lower": {{"client": 3}}}}
        {{"Restack": {{"order": [3, 1, 2]}}}}
        {{"SetTags": {{"client": 3, "tags": [0, 1]}}}}
        {{"SetState": {{"client": 3, "state": "Sticky", "on": true}}}}
        {{"SetStrut": {{"client": 3, "strut": null}}}}
        {{"InternAtom": {{"name": "_TAGWM_GAPS"}}}}
        {{"RegisterProperty": {{"name": "_TAGWM_GAPS", "kind": "number"}}}}
        {{"SetProperty": {{"name": "_TAGWM_GAPS", "value": 8}}}}
        {{"Native": {{"TitleChanged": {{"client": 3, "title": "hello"}}}}}}
        "#
    );
}
