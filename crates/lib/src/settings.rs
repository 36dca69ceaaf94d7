//! # Client Settings
//!
//! Where the service lives and how the client behaves, resolved in layers:
//!
//! 1. Programmatic defaults.
//! 2. An optional YAML file (`ragfile.yml`, or an explicit path which must exist).
//! 3. `RAGFILE_`-prefixed environment variables (e.g. `RAGFILE_SERVER_URL`).
//!
//! These are not session state; the user's retrieval parameters live in
//! [`crate::config::ConfigStore`].

use crate::errors::SettingsError;
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";
pub const DEFAULT_SETTINGS_FILE: &str = "ragfile.yml";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_LOG_FILE: &str = "ragfile.log";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Base URL of the document-QA service.
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Per-request timeout. Generation on a local model can be slow.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Where the binary writes its trace output.
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_log_file() -> String {
    DEFAULT_LOG_FILE.to_string()
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            request_timeout_secs: default_timeout_secs(),
            log_file: default_log_file(),
        }
    }
}

impl ClientSettings {
    /// Loads settings from the file layer and the process environment.
    pub fn load(path_override: Option<&Path>) -> Result<Self, SettingsError> {
        Self::build(path_override, None)
    }

    /// Like [`ClientSettings::load`], but reads variables from `env` instead of the process.
    pub fn load_with_env(
        path_override: Option<&Path>,
        env: HashMap<String, String>,
    ) -> Result<Self, SettingsError> {
        Self::build(path_override, Some(env))
    }

    fn build(
        path_override: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, SettingsError> {
        let mut builder = ConfigBuilder::builder()
            .set_default("server_url", DEFAULT_SERVER_URL)?
            .set_default("request_timeout_secs", DEFAULT_TIMEOUT_SECS)?
            .set_default("log_file", DEFAULT_LOG_FILE)?;

        match path_override {
            Some(path) => {
                if !path.exists() {
                    return Err(SettingsError::NotFound(path.display().to_string()));
                }
                info!("Loading settings from '{}'.", path.display());
                builder = builder.add_source(File::from(path).format(FileFormat::Yaml));
            }
            None => {
                builder = builder.add_source(
                    File::with_name(DEFAULT_SETTINGS_FILE)
                        .format(FileFormat::Yaml)
                        .required(false),
                );
            }
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("RAGFILE")
                    .prefix_separator("_")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
