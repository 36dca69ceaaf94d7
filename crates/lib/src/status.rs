//! # Operation Status
//!
//! Every remote operation the client issues (upload, re-chunk, query,
//! refresh, delete, view) owns one [`OpSlot`]. The slot tracks the
//! operation's lifecycle as an explicit [`OpStatus`] and numbers each
//! submission so that a response belonging to an abandoned or superseded
//! submission can be recognised and dropped.

use tracing::debug;

/// The lifecycle of a single logical operation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OpStatus<T> {
    #[default]
    Idle,
    InFlight,
    Succeeded(T),
    Failed(String),
}

impl<T> OpStatus<T> {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, OpStatus::InFlight)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            OpStatus::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            OpStatus::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Sequence number identifying one submission within a slot.
pub type Seq = u64;

/// A status plus the sequence number of the most recently initiated submission.
#[derive(Clone, Debug)]
pub struct OpSlot<T> {
    name: &'static str,
    status: OpStatus<T>,
    latest: Seq,
}

impl<T> OpSlot<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            status: OpStatus::Idle,
            latest: 0,
        }
    }

    pub fn status(&self) -> &OpStatus<T> {
        &self.status
    }

    pub fn is_in_flight(&self) -> bool {
        self.status.is_in_flight()
    }

    /// Starts a new submission and returns its sequence number.
    ///
    /// Any submission started earlier becomes stale.
    pub fn begin(&mut self) -> Seq {
        self.latest += 1;
        self.status = OpStatus::InFlight;
        self.latest
    }

    pub fn is_current(&self, seq: Seq) -> bool {
        seq == self.latest && self.status.is_in_flight()
    }

    /// Records the outcome of submission `seq`.
    ///
    /// Returns `false` without touching the status when `seq` is stale.
    pub fn finish(&mut self, seq: Seq, outcome: Result<T, String>) -> bool {
        if !self.is_current(seq) {
            debug!(
                "[{}] dropping stale response #{seq} (latest is #{})",
                self.name, self.latest
            );
            return false;
        }
        self.status = match outcome {
            Ok(value) => OpStatus::Succeeded(value),
            Err(message) => OpStatus::Failed(message),
        };
        true
    }

    /// Returns to `Idle`. A submission still in flight becomes stale.
    pub fn reset(&mut self) {
        if self.status.is_in_flight() {
            self.latest += 1;
        }
        self.status = OpStatus::Idle;
    }
}
