use super::Config;
use std::collections::HashSet;
use tracing_subscriber::EnvFilter;

impl Config {
    /// Runs every check, printing what is wrong. Returns whether all passed.
    pub fn check_all(&self, verbose: bool) -> bool {
        let checks = [
            self.check_log_level(verbose),
            self.check_tags(verbose),
            self.check_outputs(verbose),
            self.check_properties(verbose),
        ];
        checks.iter().all(|ok| *ok)
    }

    pub fn check_log_level(&self, verbose: bool) -> bool {
        if verbose {
            println!("Trying to parse log_level.");
        }
        match EnvFilter::builder().parse(&self.log_level) {
            Ok(_) => {
                if verbose {
                    println!("Log level is ok.");
                }
                true
            }
            Err(err) => {
                println!("Log level is invalid: {err}");
                false
            }
        }
    }

    pub fn check_tags(&self, verbose: bool) -> bool {
        if verbose {
            println!("Checking tags: {:?}", self.tags);
        }
        if self.tags.is_empty() {
            println!("No tags configured, every client would stay hidden.");
            return false;
        }
        let mut seen = HashSet::new();
        let duplicates: Vec<&String> = self.tags.iter().filter(|tag| !seen.insert(*tag)).collect();
        if !duplicates.is_empty() {
            println!("Tags must be unique, found duplicates: {duplicates:?}");
            return false;
        }
        true
    }

    pub fn check_outputs(&self, verbose: bool) -> bool {
        if verbose {
            println!("Checking {} output(s).", self.outputs.len());
        }
        let mut ok = true;
        let mut names = HashSet::new();
        for output in &self.outputs {
            if output.width <= 0 || output.height <= 0 {
                println!("Output `{}` has an empty size.", output.name);
                ok = false;
            }
            if !names.insert(&output.name) {
                println!("Output `{}` is declared twice.", output.name);
                ok = false;
            }
        }
        ok
    }

    pub fn check_properties(&self, verbose: bool) -> bool {
        let mut ok = true;
        let mut names = HashSet::new();
        for property in &self.properties {
            if verbose {
                println!("Checking property `{}` ({}).", property.name, property.kind);
            }
            if !names.insert(&property.name) {
                println!("Property `{}` is declared twice.", property.name);
                ok = false;
            }
            if let Some(default) = &property.default {
                if default.kind() != property.kind {
                    println!(
                        "Property `{}` is a {} but its default is a {}.",
                        property.name,
                        property.kind,
                        default.kind()
                    );
                    ok = false;
                }
            }
        }
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputConfig;
    use tagwm_core::config::PropertyDecl;
    use tagwm_core::models::{PropertyValue, ValueKind};

    #[test]
    fn default_config_passes() {
        assert!(Config::default().check_all(false));
    }

    #[test]
    fn invalid_log_level_is_reported() {
        let config = Config {
            log_level: "tagwm=notalevel".to_owned(),
            ..Config::default()
        };
        assert!(!config.check_log_level(false));
    }

    #[test]
    fn duplicate_tags_fail() {
        let config = Config {
            tags: vec!["1".into(), "2".into(), "1".into()],
            ..Config::default()
        };
        assert!(!config.check_tags(false));
        let empty = Config {
            tags: vec![],
            ..Config::default()
        };
        assert!(!empty.check_tags(false));
    }

    #[test]
    fn empty_outputs_fail() {
        let config = Config {
            outputs: vec![OutputConfig {
                name: "broken".into(),
                x: 0,
                y: 0,
                width: 0,
                height: 1080,
            }],
            ..Config::default()
        };
        assert!(!config.check_outputs(false));
    }

    #[test]
    fn property_defaults_must_match_their_kind() {
        let config = Config {
            properties: vec![PropertyDecl {
                name: "_TAGWM_GAPS".into(),
                kind: ValueKind::Number,
                default: Some(PropertyValue::String("eight".into())),
            }],
            ..Config::default()
        };
        assert!(!config.check_properties(false));
    }
}
