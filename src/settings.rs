use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Base name of the configuration file, looked up in the working directory.
/// Any extension `config` understands works (`conf.json`, `conf.toml`, ...).
pub const DEFAULT_CONFIG_PATH: &str = "conf";

// The struct that will hold our application's configuration.
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// Interface to listen on.
    pub nic: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub buttons: Vec<ButtonSettings>,
}

/// One button as written in the configuration file. The MAC is kept as text
/// here and only validated when the device table is built.
#[derive(Debug, Clone, Deserialize)]
pub struct ButtonSettings {
    pub name: String,
    pub mac: String,
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub header: BTreeMap<String, String>,
    #[serde(default)]
    pub data: Option<BTreeMap<String, String>>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_method() -> String {
    "POST".to_string()
}

impl Settings {
    /// Loads `$DASH_CONFIG`, or `conf.*` when that is unset.
    pub fn new() -> Result<Self, ConfigError> {
        let path = std::env::var("DASH_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::from_path(&path)
    }

    pub fn from_path(path: &str) -> Result<Self, ConfigError> {
        Self::build(Config::builder().add_source(File::with_name(path)))
    }

    /// Parses settings from an in-memory document.
    pub fn from_document(contents: &str, format: FileFormat) -> Result<Self, ConfigError> {
        Self::build(Config::builder().add_source(File::from_str(contents, format)))
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        builder
            // DASH_NIC=eth1 overrides the file
            .add_source(Environment::with_prefix("DASH"))
            .build()?
            .try_deserialize()
    }
}
