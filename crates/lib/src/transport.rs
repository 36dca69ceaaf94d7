//! # Transport Client
//!
//! The request/response contract with the remote document-QA service. Each
//! call is independent: no retries, no caching, no batching. Failures are
//! returned to the caller as they happened.

use crate::errors::ClientError;
use crate::settings::ClientSettings;
use crate::types::{
    IngestedFile, QueryRequest, QueryResult, RechunkReceipt, UploadFile, UploadReceipt,
};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

/// The operations the client needs from the remote service.
#[async_trait]
pub trait RagService: Send + Sync {
    /// `POST /upload` with the files and the chunk size to segment them with.
    async fn upload(&self, files: &[UploadFile], chunk_size: u32)
        -> Result<UploadReceipt, ClientError>;

    /// `POST /rechunk`: re-segments every stored document. Chunk counts change.
    async fn rechunk(&self, chunk_size: u32) -> Result<RechunkReceipt, ClientError>;

    /// `POST /chat`. A blank prompt fails with [`ClientError::EmptyQuestion`] before dispatch.
    async fn chat(&self, request: &QueryRequest) -> Result<QueryResult, ClientError>;

    /// `GET /files`.
    async fn list_files(&self) -> Result<Vec<IngestedFile>, ClientError>;

    /// `GET /files/{filename}`: the stored document as text.
    async fn read_file(&self, filename: &str) -> Result<String, ClientError>;

    /// `DELETE /files/{filename}`: removes the file and all of its chunks.
    async fn delete_file(&self, filename: &str) -> Result<(), ClientError>;
}

/// Acknowledgement bodies are informational; the service may omit them.
#[derive(Deserialize, Debug, Default)]
struct Ack {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    files: Option<usize>,
    #[serde(default)]
    total_chunks: Option<u64>,
}

fn parse_ack(body: &str) -> Ack {
    serde_json::from_str::<Option<Ack>>(body)
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// [`RagService`] over HTTP.
#[derive(Clone, Debug)]
pub struct HttpRagClient {
    client: Client,
    base_url: Url,
}

impl HttpRagClient {
    /// Creates a client with reqwest's default timeouts.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let client = Client::builder().build().map_err(ClientError::ClientBuild)?;
        Self::with_client(client, base_url)
    }

    /// Creates a client honouring the configured server URL and timeout.
    pub fn from_settings(settings: &ClientSettings) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(ClientError::ClientBuild)?;
        Self::with_client(client, &settings.server_url)
    }

    fn with_client(client: Client, base_url: &str) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `segments` to the base URL, escaping each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Passes successful responses through and converts the rest into errors.
///
/// A 404 is reported as [`ClientError::NotFound`] when `target` names the
/// resource the request addressed.
async fn ensure_success(response: Response, target: Option<&str>) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        if let Some(name) = target {
            return Err(ClientError::NotFound(name.to_string()));
        }
    }
    let body = response.text().await.unwrap_or_default();
    warn!("Service responded with {status}: {body}");
    Err(ClientError::Server {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl RagService for HttpRagClient {
    async fn upload(
        &self,
        files: &[UploadFile],
        chunk_size: u32,
    ) -> Result<UploadReceipt, ClientError> {
        let url = self.endpoint(&["upload"])?;
        info!("Uploading {} file(s) to {url} with chunk size {chunk_size}", files.len());

        let mut form = Form::new();
        for file in files {
            form = form.part(
                "files",
                Part::bytes(file.bytes.clone()).file_name(file.name.clone()),
            );
        }
        form = form.text("chunk_size", chunk_size.to_string());

        let response = self.client.post(url).multipart(form).send().await?;
        let body = ensure_success(response, None).await?.text().await?;
        let ack = parse_ack(&body);

        Ok(UploadReceipt {
            uploaded_count: ack.files.unwrap_or(files.len()),
            total_chunks: ack.total_chunks,
        })
    }

    async fn rechunk(&self, chunk_size: u32) -> Result<RechunkReceipt, ClientError> {
        let url = self.endpoint(&["rechunk"])?;
        info!("Requesting re-chunk at {url} with chunk size {chunk_size}");

        let form = Form::new().text("chunk_size", chunk_size.to_string());
        let response = self.client.post(url).multipart(form).send().await?;
        let body = ensure_success(response, None).await?.text().await?;

        Ok(RechunkReceipt {
            chunk_size,
            status: parse_ack(&body).status,
        })
    }

    async fn chat(&self, request: &QueryRequest) -> Result<QueryResult, ClientError> {
        if request.prompt.trim().is_empty() {
            return Err(ClientError::EmptyQuestion);
        }
        let url = self.endpoint(&["chat"])?;
        info!(
            "Asking {url} with model '{}' and {} chunk(s)",
            request.llm_model, request.num_chunks
        );

        let form = Form::new()
            .text("prompt", request.prompt.clone())
            .text("llm_model", request.llm_model.clone())
            .text("num_chunks", request.num_chunks.to_string());
        let response = self.client.post(url).multipart(form).send().await?;
        let response = ensure_success(response, None).await?;

        response
            .json::<QueryResult>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn list_files(&self) -> Result<Vec<IngestedFile>, ClientError> {
        let url = self.endpoint(&["files"])?;
        info!("Listing files from {url}");

        let response = self.client.get(url).send().await?;
        let response = ensure_success(response, None).await?;

        response
            .json::<Vec<IngestedFile>>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn read_file(&self, filename: &str) -> Result<String, ClientError> {
        let url = self.endpoint(&["files", filename])?;
        info!("Reading file content from {url}");

        let response = self.client.get(url).send().await?;
        let response = ensure_success(response, Some(filename)).await?;

        response
            .text()
            .await
            .map_err(|e| ClientError::ContentLoad(e.to_string()))
    }

    async fn delete_file(&self, filename: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&["files", filename])?;
        info!("Deleting {url}");

        let response = self.client.delete(url).send().await?;
        ensure_success(response, Some(filename)).await?;
        Ok(())
    }
}
