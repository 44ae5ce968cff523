//! `tagwm` general configuration

mod checks;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tagwm_core::config::{PropertyDecl, PublishMode};
use tagwm_core::models::{Output, OutputId, Xyhw};
use xdg::BaseDirectories;

/// A physical output as declared in `config.toml`.
///
/// ```toml
/// [[outputs]]
/// name = "DP-1"
/// x = 0
/// y = 0
/// width = 2560
/// height = 1440
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// General configuration
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub publish_mode: PublishMode,
    pub tags: Vec<String>,
    pub outputs: Vec<OutputConfig>,
    pub properties: Vec<PropertyDecl>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            publish_mode: PublishMode::Bridge,
            tags: (1..=9).map(|i| i.to_string()).collect(),
            outputs: vec![OutputConfig {
                name: "default".to_owned(),
                x: 0,
                y: 0,
                width: 1920,
                height: 1080,
            }],
            properties: vec![],
        }
    }
}

/// Reads `path`, or `$XDG_CONFIG_HOME/tagwm/config.toml` when `None`. A
/// missing default file is created with the default configuration.
///
/// # Errors
///
/// Fails when the XDG directories cannot be resolved, or the file cannot be
/// read, parsed or (on first run) written.
pub fn load_from_file(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Couldn't read {}", path.display()))?;
        return parse(&contents);
    }
    let base = BaseDirectories::with_prefix("tagwm")?;
    let config_filename = base.place_config_file("config.toml")?;
    if config_filename.exists() {
        let contents = fs::read_to_string(&config_filename)?;
        parse(&contents)
    } else {
        let config = Config::default();
        let toml = toml::to_string(&config)?;
        fs::write(&config_filename, toml)
            .with_context(|| format!("Couldn't write {}", config_filename.display()))?;
        tracing::info!("Wrote default config to {}", config_filename.display());
        Ok(config)
    }
}

fn parse(contents: &str) -> Result<Config> {
    toml::from_str(contents).context("Invalid config.toml")
}

impl tagwm_core::Config for Config {
    fn create_list_of_tag_labels(&self) -> Vec<String> {
        self.tags.clone()
    }

    fn outputs(&self) -> Vec<Output> {
        self.outputs
            .iter()
            .zip(0..)
            .map(|(output, index)| {
                let bbox = Xyhw::new(output.x, output.y, output.width, output.height);
                Output::new(OutputId(index), &output.name, bbox)
            })
            .collect()
    }

    fn publish_mode(&self) -> PublishMode {
        self.publish_mode
    }

    fn custom_properties(&self) -> Vec<PropertyDecl> {
        self.properties.clone()
    }

    fn log_level(&self) -> String {
        self.log_level.clone()
    }
}
