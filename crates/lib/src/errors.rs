use thiserror::Error;

/// Errors produced while talking to the remote document-QA service.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Failed to build Reqwest client: {0}")]
    ClientBuild(reqwest::Error),
    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),
    #[error("Could not reach the service: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Service responded with {status}: {body}")]
    Server { status: u16, body: String },
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("The question is empty")]
    EmptyQuestion,
    #[error("Could not load file content: {0}")]
    ContentLoad(String),
    #[error("Failed to decode service response: {0}")]
    Decode(String),
}

/// Validation failures raised by the configuration store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: u32,
        max: u32,
    },
    #[error("{field} expects a whole number, got '{input}'")]
    InvalidNumber { field: &'static str, input: String },
    #[error("Unknown model '{0}'")]
    UnknownModel(String),
}

/// Failures while loading the client settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Configuration error: {0}")]
    General(#[from] config::ConfigError),
    #[error("Settings file not found: {0}")]
    NotFound(String),
}
