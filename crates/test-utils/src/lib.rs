use async_trait::async_trait;
use ragfile::types::{RechunkReceipt, UploadReceipt};
use ragfile::{ClientError, IngestedFile, QueryRequest, QueryResult, RagService, UploadFile};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

static INIT: Once = Once::new();

/// Initializes tracing for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

// --- Mock RAG Service ---

/// The operations a [`MockRagService`] can be told to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    Upload,
    Rechunk,
    Chat,
    ListFiles,
    ReadFile,
    DeleteFile,
}

/// A failure to inject. `ClientError` is not `Clone`, so failures are scripted by shape.
#[derive(Clone, Debug)]
pub enum MockFailure {
    Server(u16, String),
    NotFound(String),
}

impl MockFailure {
    fn into_error(self) -> ClientError {
        match self {
            MockFailure::Server(status, body) => ClientError::Server { status, body },
            MockFailure::NotFound(name) => ClientError::NotFound(name),
        }
    }
}

/// A recorded call, for assertions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Upload { names: Vec<String>, chunk_size: u32 },
    Rechunk { chunk_size: u32 },
    Chat(QueryRequest),
    ListFiles,
    ReadFile(String),
    DeleteFile(String),
}

#[derive(Default, Debug)]
struct StoredFile {
    name: String,
    content: String,
    chunk_size: u32,
}

impl StoredFile {
    fn chunks(&self) -> u32 {
        let len = self.content.chars().count() as u32;
        len.div_ceil(self.chunk_size.max(1))
    }
}

#[derive(Default, Debug)]
struct MockState {
    files: Vec<StoredFile>,
    responses: HashMap<String, QueryResult>,
    failures: HashMap<Op, MockFailure>,
    delays: HashMap<Op, Duration>,
    calls: Vec<Call>,
}

/// An in-memory stand-in for the remote service.
///
/// It stores uploaded files, computes chunk counts by fixed-size splitting,
/// answers questions from pre-programmed responses, and records every call.
#[derive(Clone, Debug, Default)]
pub struct MockRagService {
    state: Arc<Mutex<MockState>>,
}

impl MockRagService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-programs an answer. The key should be a unique substring of the question.
    pub fn add_response(&self, key: &str, result: QueryResult) {
        let mut state = self.state.lock().unwrap();
        state.responses.insert(key.to_string(), result);
    }

    /// Stores a file as if it had been uploaded earlier.
    pub fn seed_file(&self, name: &str, content: &str, chunk_size: u32) {
        let mut state = self.state.lock().unwrap();
        state.files.push(StoredFile {
            name: name.to_string(),
            content: content.to_string(),
            chunk_size,
        });
    }

    /// Makes the next call of `op` fail with `failure`.
    pub fn fail_next(&self, op: Op, failure: MockFailure) {
        let mut state = self.state.lock().unwrap();
        state.failures.insert(op, failure);
    }

    /// Makes the next call of `op` wait for `by` before answering.
    pub fn delay_next(&self, op: Op, by: Duration) {
        let mut state = self.state.lock().unwrap();
        state.delays.insert(op, by);
    }

    /// Retrieves the recorded calls for assertion.
    pub fn get_calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    async fn pause(&self, op: Op) {
        let delay = self.state.lock().unwrap().delays.remove(&op);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn enter(&self, op: Op, call: Call) -> Result<std::sync::MutexGuard<'_, MockState>, ClientError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if let Some(failure) = state.failures.remove(&op) {
            return Err(failure.into_error());
        }
        Ok(state)
    }
}

#[async_trait]
impl RagService for MockRagService {
    async fn upload(
        &self,
        files: &[UploadFile],
        chunk_size: u32,
    ) -> Result<UploadReceipt, ClientError> {
        let call = Call::Upload {
            names: files.iter().map(|f| f.name.clone()).collect(),
            chunk_size,
        };
        self.pause(Op::Upload).await;
        let mut state = self.enter(Op::Upload, call)?;
        for file in files {
            state.files.retain(|f| f.name != file.name);
            state.files.push(StoredFile {
                name: file.name.clone(),
                content: String::from_utf8_lossy(&file.bytes).into_owned(),
                chunk_size,
            });
        }
        let total = state.files.iter().map(|f| u64::from(f.chunks())).sum();
        Ok(UploadReceipt {
            uploaded_count: files.len(),
            total_chunks: Some(total),
        })
    }

    async fn rechunk(&self, chunk_size: u32) -> Result<RechunkReceipt, ClientError> {
        self.pause(Op::Rechunk).await;
        let mut state = self.enter(Op::Rechunk, Call::Rechunk { chunk_size })?;
        for file in state.files.iter_mut() {
            file.chunk_size = chunk_size;
        }
        Ok(RechunkReceipt {
            chunk_size,
            status: None,
        })
    }

    async fn chat(&self, request: &QueryRequest) -> Result<QueryResult, ClientError> {
        if request.prompt.trim().is_empty() {
            return Err(ClientError::EmptyQuestion);
        }
        self.pause(Op::Chat).await;
        let state = self.enter(Op::Chat, Call::Chat(request.clone()))?;
        for (key, result) in state.responses.iter() {
            if request.prompt.contains(key.as_str()) {
                return Ok(result.clone());
            }
        }
        Ok(QueryResult {
            answer: "No answer".to_string(),
            sources: vec![],
        })
    }

    async fn list_files(&self) -> Result<Vec<IngestedFile>, ClientError> {
        self.pause(Op::ListFiles).await;
        let state = self.enter(Op::ListFiles, Call::ListFiles)?;
        Ok(state
            .files
            .iter()
            .map(|f| IngestedFile {
                filename: f.name.clone(),
                chunk_count: f.chunks(),
            })
            .collect())
    }

    async fn read_file(&self, filename: &str) -> Result<String, ClientError> {
        self.pause(Op::ReadFile).await;
        let state = self.enter(Op::ReadFile, Call::ReadFile(filename.to_string()))?;
        state
            .files
            .iter()
            .find(|f| f.name == filename)
            .map(|f| f.content.clone())
            .ok_or_else(|| ClientError::NotFound(filename.to_string()))
    }

    async fn delete_file(&self, filename: &str) -> Result<(), ClientError> {
        self.pause(Op::DeleteFile).await;
        let mut state = self.enter(Op::DeleteFile, Call::DeleteFile(filename.to_string()))?;
        let before = state.files.len();
        state.files.retain(|f| f.name != filename);
        if state.files.len() == before {
            return Err(ClientError::NotFound(filename.to_string()));
        }
        Ok(())
    }
}
