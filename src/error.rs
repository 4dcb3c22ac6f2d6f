//! Error types shared by both analysis clients.

use thiserror::Error;

/// Errors returned by a [`TextAnalyzer`](crate::TextAnalyzer) operation.
///
/// Every variant is recoverable from the input loop's point of view: the
/// failure is reported and the next capability runs.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The request never produced an HTTP response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("service returned {status}: {code}: {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },
    /// The service rejected the submitted document.
    #[error("document {id} rejected: {code}: {message}")]
    Document {
        id: String,
        code: String,
        message: String,
    },
    /// The response body was not the expected JSON.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    /// The response body lacked a field the capability needs.
    #[error("response is missing `{field}`")]
    MissingField { field: &'static str },
    /// The response contained neither a document result nor a document error.
    #[error("response contained no document results")]
    EmptyResponse,
    /// A long-running job was accepted without a location to poll.
    #[error("service accepted the job but sent no Operation-Location header")]
    MissingOperationLocation,
    /// A long-running job reached a terminal state other than success.
    #[error("summary job ended with status `{status}`")]
    OperationFailed { status: String },
    /// A long-running job was still in progress after the poll cap.
    #[error("summary job did not complete after {polls} polls")]
    OperationIncomplete { polls: u32 },
    /// Request options were rejected before anything was sent.
    #[error("invalid options: {0}")]
    InvalidOptions(&'static str),
}

impl AnalysisError {
    /// Whether the failure happened before any response was received.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
