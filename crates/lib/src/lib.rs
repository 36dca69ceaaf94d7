//! # ragfile: Client Core for a Document Question-Answering Service
//!
//! This crate holds everything a front end needs to drive a remote RAG
//! service: the user's retrieval parameters, the HTTP transport, and the
//! state machines for uploading, re-chunking, listing, viewing, deleting,
//! and asking. It contains no terminal or rendering-toolkit code; the
//! `ragfile-cli` crate draws these models.

pub mod config;
pub mod documents;
pub mod errors;
pub mod ingest;
pub mod navigation;
pub mod query;
pub mod render;
pub mod screens;
pub mod settings;
pub mod status;
pub mod transport;
pub mod types;

pub use config::{ConfigField, ConfigStore, Configuration, LlmModel};
pub use errors::{ClientError, ConfigError, SettingsError};
pub use settings::ClientSettings;
pub use transport::{HttpRagClient, RagService};
pub use types::{IngestedFile, QueryRequest, QueryResult, SourceChunk, UploadFile};
