use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

/// Everything the reservation workflow can reject with.
///
/// None of these end the session: the selection errors surface as inline
/// notices, a failed gate simply refuses to advance, and a submission
/// failure lands the wizard in its `Failed` step with a retry path.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkflowError {
    /// A slot covering the same start/end pair is already in the selection.
    #[error("a slot from {} to {} is already selected", .start.format("%H:%M"), .end.format("%H:%M"))]
    SelectionConflict {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// The clicked calendar day has no selectable slots.
    #[error("{date} has no available time slots")]
    UnavailableDate { date: NaiveDate },

    /// The slot id is not part of the chosen day's availability.
    #[error("time slot {id} is not offered on the chosen date")]
    UnknownSlot { id: String },

    /// A forward transition was attempted with required fields absent.
    #[error("missing required fields: {missing:?}")]
    ValidationGate { missing: Vec<String> },

    /// The collaborator rejected or failed the terminal request.
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// No authenticated customer identity; fatal until re-authentication.
    #[error("no authenticated customer identity")]
    MissingIdentity,
}

/// A rejected or failed submission. `message` is the server-provided text
/// (or the transport error rendered as text) and is shown verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct SubmissionError {
    pub message: String,
}

impl SubmissionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
