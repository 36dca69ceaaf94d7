//! # ragfile: A terminal client for a document-QA service
//!
//! This is the main entry point for the `ragfile` command-line interface.
//! Without a subcommand it opens the interactive TUI.

mod app;
mod ask;
mod files;
mod ingest;
mod tui;
mod ui;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ragfile::{ClientSettings, HttpRagClient, RagService};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Base URL of the document-QA service
    #[arg(long, global = true, env = "RAGFILE_SERVER_URL")]
    server_url: Option<String>,
    /// Settings file (defaults to ./ragfile.yml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the interactive terminal UI
    Tui(TuiArgs),
    /// Upload files to the service
    Upload(ingest::UploadArgs),
    /// Re-split every stored file with a new chunk size
    Rechunk(ingest::RechunkArgs),
    /// Ask a question about the stored files
    Ask(ask::AskArgs),
    /// List, show or delete stored files
    Files(files::FilesArgs),
}

#[derive(Parser, Debug)]
struct TuiArgs {
    /// The screen to open (`/` or `/chat`)
    #[arg(long, default_value = "/")]
    route: String,
}

impl Commands {
    fn label(&self) -> &'static str {
        match self {
            Commands::Tui(_) => "TUI",
            Commands::Upload(_) => "Upload",
            Commands::Rechunk(_) => "Rechunk",
            Commands::Ask(_) => "Ask",
            Commands::Files(_) => "Files",
        }
    }
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut settings = ClientSettings::load(cli.config.as_deref())?;
    if let Some(url) = &cli.server_url {
        settings.server_url = url.clone();
    }

    // Setup logging to a file; the terminal belongs to the UI.
    let log_file = File::create(&settings.log_file)?;
    let subscriber = fmt::Subscriber::builder()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let command = cli.command.unwrap_or(Commands::Tui(TuiArgs {
        route: "/".to_string(),
    }));
    info!(
        "Running {} against {}",
        command.label(),
        settings.server_url
    );

    if let Err(e) = run(&command, &settings).await {
        eprintln!("{} failed: {:#}", command.label(), e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run(command: &Commands, settings: &ClientSettings) -> Result<()> {
    let client = HttpRagClient::from_settings(settings)?;
    match command {
        Commands::Tui(args) => {
            let service: Arc<dyn RagService> = Arc::new(client);
            tui::run(service, &settings.server_url, &args.route).await
        }
        Commands::Upload(args) => ingest::handle_upload(&client, args).await,
        Commands::Rechunk(args) => ingest::handle_rechunk(&client, args).await,
        Commands::Ask(args) => ask::handle_ask(&client, args).await,
        Commands::Files(args) => files::handle_files(&client, args).await,
    }
}
