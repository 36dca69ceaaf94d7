//! # Shared Data Types
//!
//! Wire and domain types exchanged between the client components and the
//! remote document-QA service.

use serde::{Deserialize, Serialize};

/// A file the service has ingested, together with its current chunk count.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct IngestedFile {
    pub filename: String,
    #[serde(rename = "chunks")]
    pub chunk_count: u32,
}

/// A chunk returned alongside an answer, attributed to its originating file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceChunk {
    pub file: String,
    pub index: u64,
    pub chunk: String,
}

/// The answer to a question plus the evidence retrieved for it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QueryResult {
    pub answer: String,
    /// Absent or `null` in the response means no chunks were retrieved.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sources: Vec<SourceChunk>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<SourceChunk>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<SourceChunk>>::deserialize(deserializer)?.unwrap_or_default())
}

/// The payload of a `POST /chat` request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryRequest {
    pub prompt: String,
    pub llm_model: String,
    pub num_chunks: u32,
}

/// A document selected for upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// The service's acknowledgement of an upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadReceipt {
    pub uploaded_count: usize,
    pub total_chunks: Option<u64>,
}

/// The service's acknowledgement of a re-chunk request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RechunkReceipt {
    pub chunk_size: u32,
    pub status: Option<String>,
}
