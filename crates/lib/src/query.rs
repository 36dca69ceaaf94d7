//! # Query Workflow
//!
//! The ask state machine of the chat screen:
//!
//! ```text
//! Idle -> Submitting -> Answered | Failed -> (next ask) Submitting
//! ```
//!
//! Starting a submission hands back a [`QueryTicket`]. Only the ticket of the
//! most recently initiated submission may write a result, so a response that
//! arrives after its submission was abandoned is never shown.

use crate::config::Configuration;
use crate::errors::ClientError;
use crate::status::Seq;
use crate::transport::RagService;
use crate::types::{QueryRequest, QueryResult};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Where the workflow currently stands. The latest answer lives inside `Answered`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum QueryStatus {
    #[default]
    Idle,
    Submitting,
    Answered(QueryResult),
    Failed(String),
}

/// Why an ask was not dispatched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AskRejected {
    #[error("Type a question first")]
    EmptyQuestion,
    #[error("A question is already being answered")]
    InFlight,
}

/// Proof that a submission was started; required to complete it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryTicket {
    seq: Seq,
    pub request: QueryRequest,
}

impl QueryTicket {
    pub fn seq(&self) -> Seq {
        self.seq
    }
}

#[derive(Debug)]
pub struct QueryWorkflow {
    config: Configuration,
    question: String,
    status: QueryStatus,
    latest: Seq,
}

impl QueryWorkflow {
    /// The configuration is fixed for the lifetime of the workflow.
    pub fn new(config: Configuration) -> Self {
        Self {
            config,
            question: String::new(),
            status: QueryStatus::Idle,
            latest: 0,
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn set_question(&mut self, question: &str) {
        self.question = question.to_string();
    }

    pub fn question_mut(&mut self) -> &mut String {
        &mut self.question
    }

    pub fn status(&self) -> &QueryStatus {
        &self.status
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.status, QueryStatus::Submitting)
    }

    /// Whether the ask trigger should be enabled.
    pub fn can_ask(&self) -> bool {
        !self.question.trim().is_empty() && !self.is_submitting()
    }

    /// The answer currently on display, if any.
    pub fn result(&self) -> Option<&QueryResult> {
        match &self.status {
            QueryStatus::Answered(result) => Some(result),
            _ => None,
        }
    }

    /// Starts a submission for the current question.
    ///
    /// Clears whatever answer was on display so it cannot be mistaken for the
    /// answer to the new question.
    pub fn begin_ask(&mut self) -> Result<QueryTicket, AskRejected> {
        if self.is_submitting() {
            return Err(AskRejected::InFlight);
        }
        if self.question.trim().is_empty() {
            return Err(AskRejected::EmptyQuestion);
        }

        self.latest += 1;
        self.status = QueryStatus::Submitting;
        info!("[query] submission #{} started", self.latest);

        Ok(QueryTicket {
            seq: self.latest,
            request: QueryRequest {
                prompt: self.question.clone(),
                llm_model: self.config.model.as_str().to_string(),
                num_chunks: self.config.retrieval_depth,
            },
        })
    }

    /// Applies the outcome of `ticket`'s submission.
    ///
    /// Returns `false` and leaves the state alone when a newer submission has
    /// been started or the submission was abandoned.
    pub fn complete(
        &mut self,
        ticket: &QueryTicket,
        outcome: Result<QueryResult, ClientError>,
    ) -> bool {
        if ticket.seq != self.latest || !self.is_submitting() {
            debug!(
                "[query] dropping stale response #{} (latest is #{})",
                ticket.seq, self.latest
            );
            return false;
        }

        self.status = match outcome {
            Ok(result) => {
                info!(
                    "[query] submission #{} answered with {} source(s)",
                    ticket.seq,
                    result.sources.len()
                );
                QueryStatus::Answered(result)
            }
            Err(e) => {
                warn!("[query] submission #{} failed: {e}", ticket.seq);
                QueryStatus::Failed(format!("Error: Could not get answer. ({e})"))
            }
        };
        true
    }

    /// Stops waiting for the current submission. Its response will be dropped.
    pub fn abandon(&mut self) {
        if self.is_submitting() {
            self.latest += 1;
            self.status = QueryStatus::Idle;
        }
    }

    /// Clears a displayed answer or error.
    pub fn dismiss(&mut self) {
        if !self.is_submitting() {
            self.status = QueryStatus::Idle;
        }
    }

    /// Runs a full ask against `service`.
    pub async fn ask(&mut self, service: &dyn RagService) -> Result<(), AskRejected> {
        let ticket = self.begin_ask()?;
        let outcome = service.chat(&ticket.request).await;
        self.complete(&ticket, outcome);
        Ok(())
    }
}
