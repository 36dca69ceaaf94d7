//! # Ingestion
//!
//! The upload and re-chunk slots. Each has its own status so an upload
//! failure is never confused with a query or listing failure.
//!
//! A successful upload clears the selection; a failed one keeps it so the
//! same files can be sent again.

use crate::config::Configuration;
use crate::errors::ClientError;
use crate::status::{OpSlot, OpStatus, Seq};
use crate::transport::RagService;
use crate::types::{RechunkReceipt, UploadFile, UploadReceipt};
use tracing::{info, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadTicket {
    seq: Seq,
    pub files: Vec<UploadFile>,
    pub chunk_size: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RechunkTicket {
    seq: Seq,
    pub chunk_size: u32,
}

#[derive(Debug)]
pub struct Uploader {
    selection: Vec<UploadFile>,
    slot: OpSlot<String>,
}

impl Default for Uploader {
    fn default() -> Self {
        Self::new()
    }
}

impl Uploader {
    pub fn new() -> Self {
        Self {
            selection: Vec::new(),
            slot: OpSlot::new("upload"),
        }
    }

    pub fn selection(&self) -> &[UploadFile] {
        &self.selection
    }

    /// Replaces the selection, mirroring a file picker.
    pub fn select(&mut self, files: Vec<UploadFile>) {
        self.selection = files;
    }

    /// Adds one file, replacing an earlier pick with the same name.
    pub fn add(&mut self, file: UploadFile) {
        self.selection.retain(|f| f.name != file.name);
        self.selection.push(file);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// `"2 file(s) selected"` or `"No files selected"`.
    pub fn selection_summary(&self) -> String {
        if self.selection.is_empty() {
            "No files selected".to_string()
        } else {
            format!("{} file(s) selected", self.selection.len())
        }
    }

    pub fn status(&self) -> &OpStatus<String> {
        self.slot.status()
    }

    pub fn can_upload(&self) -> bool {
        !self.selection.is_empty() && !self.slot.is_in_flight()
    }

    pub fn begin_upload(&mut self, chunk_size: u32) -> Option<UploadTicket> {
        if !self.can_upload() {
            return None;
        }
        Some(UploadTicket {
            seq: self.slot.begin(),
            files: self.selection.clone(),
            chunk_size,
        })
    }

    /// Records the outcome. Returns `true` when the upload succeeded and was applied.
    pub fn complete_upload(
        &mut self,
        ticket: &UploadTicket,
        outcome: Result<UploadReceipt, ClientError>,
    ) -> bool {
        match outcome {
            Ok(receipt) => {
                info!("[upload] {} file(s) accepted", receipt.uploaded_count);
                let message = format!("Uploaded {} files successfully", receipt.uploaded_count);
                let applied = self.slot.finish(ticket.seq, Ok(message));
                if applied {
                    self.selection.clear();
                }
                applied
            }
            Err(e) => {
                warn!("[upload] failed: {e}");
                self.slot.finish(ticket.seq, Err(format!("Upload failed: {e}")));
                false
            }
        }
    }

    pub async fn upload(&mut self, service: &dyn RagService, chunk_size: u32) -> bool {
        let Some(ticket) = self.begin_upload(chunk_size) else {
            return false;
        };
        let outcome = service.upload(&ticket.files, ticket.chunk_size).await;
        self.complete_upload(&ticket, outcome)
    }
}

#[derive(Debug)]
pub struct Rechunker {
    slot: OpSlot<String>,
}

impl Default for Rechunker {
    fn default() -> Self {
        Self::new()
    }
}

impl Rechunker {
    pub fn new() -> Self {
        Self {
            slot: OpSlot::new("rechunk"),
        }
    }

    pub fn status(&self) -> &OpStatus<String> {
        self.slot.status()
    }

    pub fn begin_rechunk(&mut self, config: &Configuration) -> Option<RechunkTicket> {
        if self.slot.is_in_flight() {
            return None;
        }
        Some(RechunkTicket {
            seq: self.slot.begin(),
            chunk_size: config.chunk_size,
        })
    }

    /// Records the outcome. Chunk counts have changed when this returns `true`.
    pub fn complete_rechunk(
        &mut self,
        ticket: &RechunkTicket,
        outcome: Result<RechunkReceipt, ClientError>,
    ) -> bool {
        match outcome {
            Ok(receipt) => {
                let message = format!(
                    "Re-chunked all files with chunk size {}",
                    receipt.chunk_size
                );
                self.slot.finish(ticket.seq, Ok(message))
            }
            Err(e) => {
                warn!("[rechunk] failed: {e}");
                self.slot.finish(ticket.seq, Err(format!("Re-chunk failed: {e}")));
                false
            }
        }
    }

    pub async fn rechunk(&mut self, service: &dyn RagService, config: &Configuration) -> bool {
        let Some(ticket) = self.begin_rechunk(config) else {
            return false;
        };
        let outcome = service.rechunk(ticket.chunk_size).await;
        self.complete_rechunk(&ticket, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(n: usize) -> UploadReceipt {
        UploadReceipt {
            uploaded_count: n,
            total_chunks: None,
        }
    }

    #[test]
    fn test_upload_needs_selection() {
        let mut up = Uploader::new();
        assert_eq!(up.selection_summary(), "No files selected");
        assert!(up.begin_upload(500).is_none());
    }

    #[test]
    fn test_success_clears_selection() {
        let mut up = Uploader::new();
        up.select(vec![UploadFile::new("a.txt", "a"), UploadFile::new("b.txt", "b")]);
        assert_eq!(up.selection_summary(), "2 file(s) selected");

        let ticket = up.begin_upload(250).unwrap();
        assert_eq!(ticket.chunk_size, 250);
        assert!(up.begin_upload(250).is_none());

        assert!(up.complete_upload(&ticket, Ok(receipt(2))));
        assert_eq!(up.status().value().map(String::as_str), Some("Uploaded 2 files successfully"));
        assert!(up.selection().is_empty());
    }

    #[test]
    fn test_failure_keeps_selection() {
        let mut up = Uploader::new();
        up.add(UploadFile::new("a.txt", "a"));
        let ticket = up.begin_upload(500).unwrap();
        let applied = up.complete_upload(
            &ticket,
            Err(ClientError::Server {
                status: 422,
                body: "unsupported".to_string(),
            }),
        );
        assert!(!applied);
        assert_eq!(up.selection().len(), 1);
        assert!(up.status().error().unwrap().starts_with("Upload failed"));
        assert!(up.can_upload());
    }

    #[test]
    fn test_add_replaces_same_name() {
        let mut up = Uploader::new();
        up.add(UploadFile::new("a.txt", "old"));
        up.add(UploadFile::new("a.txt", "new"));
        assert_eq!(up.selection(), &[UploadFile::new("a.txt", "new")]);
    }

    #[test]
    fn test_rechunk_uses_configured_size() {
        let mut rc = Rechunker::new();
        let config = Configuration {
            chunk_size: 800,
            ..Configuration::default()
        };
        let ticket = rc.begin_rechunk(&config).unwrap();
        assert_eq!(ticket.chunk_size, 800);
        assert!(rc.begin_rechunk(&config).is_none());
        assert!(rc.complete_rechunk(
            &ticket,
            Ok(RechunkReceipt {
                chunk_size: 800,
                status: None
            })
        ));
        assert_eq!(
            rc.status().value().map(String::as_str),
            Some("Re-chunked all files with chunk size 800")
        );
    }
}
