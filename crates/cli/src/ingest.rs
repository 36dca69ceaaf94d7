use anyhow::{bail, Context, Result};
use clap::Parser;
use ragfile::ingest::{Rechunker, Uploader};
use ragfile::status::OpStatus;
use ragfile::{ConfigStore, RagService, UploadFile};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
pub struct UploadArgs {
    /// Files to upload (.txt, .md, .pdf)
    #[arg(required = true)]
    paths: Vec<PathBuf>,
    /// How many characters a chunk contains
    #[arg(long)]
    chunk_size: Option<u32>,
}

#[derive(Parser, Debug)]
pub struct RechunkArgs {
    /// The new chunk size applied to every stored file
    #[arg(long, required = true)]
    chunk_size: u32,
}

/// Reads a local file into an upload payload, named after its last path component.
pub fn read_upload_file(path: &Path) -> Result<UploadFile> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("'{}' does not name a file", path.display()))?;
    let bytes =
        std::fs::read(path).with_context(|| format!("Could not read '{}'", path.display()))?;
    Ok(UploadFile::new(name, bytes))
}

pub async fn handle_upload(service: &dyn RagService, args: &UploadArgs) -> Result<()> {
    let mut store = ConfigStore::new();
    if let Some(chunk_size) = args.chunk_size {
        store.set_chunk_size(chunk_size)?;
    }
    let config = store.to_payload();

    let mut uploader = Uploader::new();
    for path in &args.paths {
        uploader.add(read_upload_file(path)?);
    }
    info!(
        "Uploading {} with chunk size {}",
        uploader.selection_summary(),
        config.chunk_size
    );
    println!("📄 Uploading {}...", uploader.selection_summary());

    uploader.upload(service, config.chunk_size).await;
    report(uploader.status())
}

pub async fn handle_rechunk(service: &dyn RagService, args: &RechunkArgs) -> Result<()> {
    let mut store = ConfigStore::new();
    store.set_chunk_size(args.chunk_size)?;

    let mut rechunker = Rechunker::new();
    rechunker.rechunk(service, &store.to_payload()).await;
    report(rechunker.status())
}

fn report(status: &OpStatus<String>) -> Result<()> {
    match status {
        OpStatus::Succeeded(message) => {
            println!("✅ {message}");
            Ok(())
        }
        OpStatus::Failed(message) => bail!("{message}"),
        other => bail!("Operation did not finish: {other:?}"),
    }
}
