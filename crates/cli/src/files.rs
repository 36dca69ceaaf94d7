use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use ragfile::documents::{DocumentManager, Viewer};
use ragfile::status::OpStatus;
use ragfile::RagService;
use std::io::{BufRead, Write};
use tracing::info;

#[derive(Parser, Debug)]
pub struct FilesArgs {
    #[command(subcommand)]
    command: FilesCommands,
}

#[derive(Subcommand, Debug)]
enum FilesCommands {
    /// List the stored files and their chunk counts
    List,
    /// Print the stored content of a file
    Show(NameArgs),
    /// Delete a file and all its chunks
    Delete(DeleteArgs),
}

#[derive(Parser, Debug)]
struct NameArgs {
    name: String,
}

#[derive(Parser, Debug)]
struct DeleteArgs {
    name: String,
    /// Skip the confirmation prompt
    #[arg(long, short)]
    yes: bool,
}

pub async fn handle_files(service: &dyn RagService, args: &FilesArgs) -> Result<()> {
    let mut documents = DocumentManager::new();
    match &args.command {
        FilesCommands::List => {
            documents.refresh(service).await;
            if let Some(message) = documents.refresh_status().error() {
                bail!("{message}");
            }
            print_files(&documents);
        }
        FilesCommands::Show(args) => {
            documents.view(service, &args.name).await;
            match documents.viewer() {
                Viewer::Loaded { content, .. } => println!("{content}"),
                Viewer::Failed { message, .. } => bail!("{message}"),
                other => bail!("Viewer did not load: {other:?}"),
            }
        }
        FilesCommands::Delete(args) => {
            if !args.yes && !confirm(&args.name)? {
                println!("Cancelled.");
                return Ok(());
            }
            documents.request_delete(&args.name);
            documents.delete_confirmed(service).await;
            match documents.delete_status() {
                OpStatus::Succeeded(message) => {
                    info!("{message}");
                    println!("✅ {message}");
                    print_files(&documents);
                }
                OpStatus::Failed(message) => bail!("{message}"),
                other => bail!("Delete did not finish: {other:?}"),
            }
        }
    }
    Ok(())
}

fn print_files(documents: &DocumentManager) {
    println!("{}", documents.summary());
    for file in documents.files() {
        println!("{}  Chunks: {}", file.filename, file.chunk_count);
    }
}

fn confirm(name: &str) -> Result<bool> {
    print!("Delete file \"{name}\" and all its chunks? [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
