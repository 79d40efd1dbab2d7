use serde::Deserialize;

use crate::document::{FontChoice, DEFAULT_TITLE, TRUNCATION_PLACEHOLDER};
use crate::parser::Strategy;

/// Defaults for the command line, read from `curator.toml` and `CURATOR_*` variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub font: FontChoice,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_placeholder() -> String {
    TRUNCATION_PLACEHOLDER.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            font: FontChoice::default(),
            title: default_title(),
            strategy: Strategy::default(),
            placeholder: default_placeholder(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("curator").required(false))
            .add_source(config::Environment::with_prefix("CURATOR"))
            .build()?
            .try_deserialize()
    }
}
