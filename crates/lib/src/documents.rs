//! # Document Manager
//!
//! Owns the list of ingested files shown to the user. The list is only ever
//! replaced wholesale by a successful `GET /files` response: deletions are
//! followed by a fresh listing rather than local removal, so displayed chunk
//! counts are always the ones the service reported.

use crate::errors::ClientError;
use crate::status::{OpSlot, OpStatus, Seq};
use crate::transport::RagService;
use crate::types::IngestedFile;
use tracing::{debug, info, warn};

/// What asked for a refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshTrigger {
    /// The refresh button. Ignored while a refresh is already running.
    User,
    /// A mutation (delete, upload, re-chunk) succeeded. Supersedes any running refresh.
    AfterMutation,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefreshTicket {
    seq: Seq,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteTicket {
    seq: Seq,
    pub filename: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewTicket {
    seq: Seq,
    pub filename: String,
}

/// The read-only file viewer popup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Viewer {
    #[default]
    Closed,
    Loading {
        filename: String,
    },
    Loaded {
        filename: String,
        content: String,
    },
    Failed {
        filename: String,
        message: String,
    },
}

#[derive(Debug)]
pub struct DocumentManager {
    files: Vec<IngestedFile>,
    refresh: OpSlot<usize>,
    delete: OpSlot<String>,
    pending_confirmation: Option<String>,
    viewer: Viewer,
    view_seq: Seq,
}

impl Default for DocumentManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentManager {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            refresh: OpSlot::new("refresh"),
            delete: OpSlot::new("delete"),
            pending_confirmation: None,
            viewer: Viewer::Closed,
            view_seq: 0,
        }
    }

    /// The snapshot from the last successful listing.
    pub fn files(&self) -> &[IngestedFile] {
        &self.files
    }

    pub fn refresh_status(&self) -> &OpStatus<usize> {
        self.refresh.status()
    }

    pub fn delete_status(&self) -> &OpStatus<String> {
        self.delete.status()
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    /// `"No files stored."` or `"3 file(s) stored"`.
    pub fn summary(&self) -> String {
        if self.files.is_empty() {
            "No files stored.".to_string()
        } else {
            format!("{} file(s) stored", self.files.len())
        }
    }

    pub fn pending_confirmation(&self) -> Option<&str> {
        self.pending_confirmation.as_deref()
    }

    // --- Refresh ---

    pub fn begin_refresh(&mut self, trigger: RefreshTrigger) -> Option<RefreshTicket> {
        if trigger == RefreshTrigger::User && self.refresh.is_in_flight() {
            debug!("[documents] refresh already running, ignoring request");
            return None;
        }
        Some(RefreshTicket {
            seq: self.refresh.begin(),
        })
    }

    /// Applies a listing. On failure the previous list stays visible.
    pub fn complete_refresh(
        &mut self,
        ticket: &RefreshTicket,
        outcome: Result<Vec<IngestedFile>, ClientError>,
    ) -> bool {
        if !self.refresh.is_current(ticket.seq) {
            debug!("[documents] dropping stale listing #{}", ticket.seq);
            return false;
        }
        match outcome {
            Ok(files) => {
                info!("[documents] listing returned {} file(s)", files.len());
                let count = files.len();
                self.files = files;
                self.refresh.finish(ticket.seq, Ok(count))
            }
            Err(e) => {
                warn!("[documents] listing failed: {e}");
                self.refresh
                    .finish(ticket.seq, Err(format!("Could not load files: {e}")))
            }
        }
    }

    // --- Delete ---

    /// Asks for confirmation before deleting `filename`. Nothing is sent yet.
    pub fn request_delete(&mut self, filename: &str) -> bool {
        if self.delete.is_in_flight() {
            return false;
        }
        self.pending_confirmation = Some(filename.to_string());
        true
    }

    pub fn cancel_delete(&mut self) {
        self.pending_confirmation = None;
    }

    /// Dispatches the delete the user just confirmed.
    pub fn confirm_delete(&mut self) -> Option<DeleteTicket> {
        let filename = self.pending_confirmation.take()?;
        if self.delete.is_in_flight() {
            return None;
        }
        Some(DeleteTicket {
            seq: self.delete.begin(),
            filename,
        })
    }

    /// Records the delete outcome.
    ///
    /// On success the list is not touched; instead a refresh ticket is
    /// returned which the caller must run to pick up the service's state.
    pub fn complete_delete(
        &mut self,
        ticket: &DeleteTicket,
        outcome: Result<(), ClientError>,
    ) -> Option<RefreshTicket> {
        match outcome {
            Ok(()) => {
                info!("[documents] deleted '{}'", ticket.filename);
                let applied = self
                    .delete
                    .finish(ticket.seq, Ok(format!("Deleted {}", ticket.filename)));
                if applied {
                    self.begin_refresh(RefreshTrigger::AfterMutation)
                } else {
                    None
                }
            }
            Err(e) => {
                warn!("[documents] deleting '{}' failed: {e}", ticket.filename);
                self.delete.finish(ticket.seq, Err(e.to_string()));
                None
            }
        }
    }

    // --- View ---

    /// Opens the viewer for `filename`, superseding any view still loading.
    pub fn begin_view(&mut self, filename: &str) -> ViewTicket {
        self.view_seq += 1;
        self.viewer = Viewer::Loading {
            filename: filename.to_string(),
        };
        ViewTicket {
            seq: self.view_seq,
            filename: filename.to_string(),
        }
    }

    pub fn complete_view(
        &mut self,
        ticket: &ViewTicket,
        outcome: Result<String, ClientError>,
    ) -> bool {
        if ticket.seq != self.view_seq || !matches!(self.viewer, Viewer::Loading { .. }) {
            return false;
        }
        let filename = ticket.filename.clone();
        self.viewer = match outcome {
            Ok(content) => Viewer::Loaded { filename, content },
            Err(e) => {
                let e = match e {
                    e @ (ClientError::ContentLoad(_) | ClientError::NotFound(_)) => e,
                    other => ClientError::ContentLoad(other.to_string()),
                };
                Viewer::Failed {
                    filename,
                    message: format!("Could not load file content. ({e})"),
                }
            }
        };
        true
    }

    pub fn close_view(&mut self) {
        self.view_seq += 1;
        self.viewer = Viewer::Closed;
    }

    // --- Conveniences for callers that simply await each step ---

    pub async fn refresh(&mut self, service: &dyn RagService) {
        if let Some(ticket) = self.begin_refresh(RefreshTrigger::User) {
            let outcome = service.list_files().await;
            self.complete_refresh(&ticket, outcome);
        }
    }

    /// Deletes the confirmed file and then reloads the list.
    pub async fn delete_confirmed(&mut self, service: &dyn RagService) {
        let Some(ticket) = self.confirm_delete() else {
            return;
        };
        let outcome = service.delete_file(&ticket.filename).await;
        if let Some(refresh) = self.complete_delete(&ticket, outcome) {
            let listing = service.list_files().await;
            self.complete_refresh(&refresh, listing);
        }
    }

    pub async fn view(&mut self, service: &dyn RagService, filename: &str) {
        let ticket = self.begin_view(filename);
        let outcome = service.read_file(filename).await;
        self.complete_view(&ticket, outcome);
    }
}
