use anyhow::{bail, Result};
use clap::Parser;
use ragfile::navigation::{Navigator, Route};
use ragfile::query::QueryStatus;
use ragfile::render::{render_response, to_text};
use ragfile::screens::{ChatScreen, HomeScreen};
use ragfile::{ConfigField, RagService};
use tracing::info;

#[derive(Parser, Debug)]
pub struct AskArgs {
    /// The question to answer from the stored documents
    question: String,
    /// The language model (tinyllama, llama2, mistral)
    #[arg(long)]
    model: Option<String>,
    /// How many nearest chunks are included as context
    #[arg(long)]
    num_chunks: Option<u32>,
}

/// Configures a home screen, hands it to a chat screen and asks there.
pub async fn handle_ask(service: &dyn RagService, args: &AskArgs) -> Result<()> {
    let mut home = HomeScreen::new();
    if let Some(model) = &args.model {
        home.store.set_field(ConfigField::Model, model)?;
    }
    if let Some(num_chunks) = args.num_chunks {
        home.store.set_retrieval_depth(num_chunks)?;
    }

    let mut navigator = Navigator::new(Route::Home);
    home.go_to_chat(&mut navigator);
    let mut chat = ChatScreen::mount(&mut navigator);

    chat.query.set_question(&args.question);
    info!(
        "Asking with model {} and {} chunk(s)",
        chat.config().model,
        chat.config().retrieval_depth
    );
    chat.query.ask(service).await?;

    let status = chat.query.status();
    let text = to_text(&render_response(status));
    if let QueryStatus::Failed(_) = status {
        bail!("{text}");
    }
    println!("{text}");
    Ok(())
}
