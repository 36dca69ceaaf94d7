//! # Response Rendering
//!
//! Turns the query workflow's state into what the user sees: a loading
//! indicator, an answer followed by its evidence blocks, or an error.

use crate::query::QueryStatus;
use crate::types::SourceChunk;

/// One retrieved chunk, attributed to its file and position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvidenceBlock {
    pub caption: String,
    pub body: String,
}

impl From<&SourceChunk> for EvidenceBlock {
    fn from(source: &SourceChunk) -> Self {
        Self {
            caption: format!("File: {} | Chunk #{}", source.file, source.index),
            body: source.chunk.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResponseView {
    /// Nothing asked yet.
    Hidden,
    Loading,
    Answer {
        text: String,
        evidence: Vec<EvidenceBlock>,
    },
    Error(String),
}

pub fn render_response(status: &QueryStatus) -> ResponseView {
    match status {
        QueryStatus::Idle => ResponseView::Hidden,
        QueryStatus::Submitting => ResponseView::Loading,
        QueryStatus::Answered(result) => ResponseView::Answer {
            text: result.answer.clone(),
            evidence: result.sources.iter().map(EvidenceBlock::from).collect(),
        },
        QueryStatus::Failed(message) => ResponseView::Error(message.clone()),
    }
}

/// Plain-text rendering, as printed by the one-shot `ask` command.
pub fn to_text(view: &ResponseView) -> String {
    match view {
        ResponseView::Hidden => String::new(),
        ResponseView::Loading => "Thinking...".to_string(),
        ResponseView::Error(message) => message.clone(),
        ResponseView::Answer { text, evidence } => {
            let mut out = format!("Response:\n{text}\n");
            if !evidence.is_empty() {
                out.push_str("\nRetrieved Chunks:\n");
                for block in evidence {
                    out.push_str(&format!("\n{}\n{}\n", block.caption, block.body));
                }
            }
            out
        }
    }
}
