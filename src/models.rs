//! Wire models for the text analytics REST contract.
//!
//! Only the fields the clients read are modelled; everything else in a
//! response is ignored.

use serde::{Deserialize, Serialize};

use crate::api::{CategorizedEntity, DetectedLanguage, PiiEntity, SummarySentence};
use crate::error::AnalysisError;

/// ID of the single document sent with every request.
pub const DOCUMENT_ID: &str = "1";

/// A document submitted for analysis.
///
/// The `language` tag is omitted from the JSON unless set.
///
/// # Examples
///
/// ```
/// use text_analytics::models::TextDocumentInput;
///
/// let doc = TextDocumentInput::new("1", "Hello");
/// assert_eq!(
///     serde_json::to_string(&doc).unwrap(),
///     r#"{"id":"1","text":"Hello"}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextDocumentInput {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl TextDocumentInput {
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            language: None,
        }
    }

    /// Tag the document with an ISO 639-1 language code.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// Request body of the synchronous operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiLanguageBatchInput {
    pub documents: Vec<TextDocumentInput>,
}

impl MultiLanguageBatchInput {
    /// Batch holding `text` as document [`DOCUMENT_ID`].
    #[must_use]
    pub fn single(text: &str) -> Self {
        Self {
            documents: vec![TextDocumentInput::new(DOCUMENT_ID, text)],
        }
    }
}

/// Error object used both in envelopes and per-document errors.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceError {
    pub code: String,
    pub message: String,
    #[serde(default, rename = "innererror")]
    pub inner_error: Option<Box<ServiceError>>,
}

impl ServiceError {
    /// Message of the innermost error, which is the most specific one.
    #[must_use]
    pub fn detail(&self) -> &str {
        self.inner_error
            .as_deref()
            .map_or(self.message.as_str(), ServiceError::detail)
    }
}

/// Body returned with a non-success status.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorResponse {
    pub error: ServiceError,
}

/// Error reported for a single document inside a successful response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentError {
    pub id: String,
    pub error: ServiceError,
}

impl From<DocumentError> for AnalysisError {
    fn from(err: DocumentError) -> Self {
        AnalysisError::Document {
            message: err.error.detail().to_owned(),
            code: err.error.code,
            id: err.id,
        }
    }
}

/// Document results and errors of a response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DocumentBatch<T> {
    #[serde(default = "Vec::new")]
    pub documents: Vec<T>,
    #[serde(default)]
    pub errors: Vec<DocumentError>,
}

impl<T> DocumentBatch<T> {
    /// The only document result, or the only document error.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Document`] if the document was rejected and
    /// [`AnalysisError::EmptyResponse`] if the batch holds neither.
    pub fn into_single(self) -> Result<T, AnalysisError> {
        if let Some(doc) = self.documents.into_iter().next() {
            return Ok(doc);
        }
        match self.errors.into_iter().next() {
            Some(err) => Err(err.into()),
            None => Err(AnalysisError::EmptyResponse),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageDocument {
    pub id: String,
    pub detected_language: DetectedLanguage,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentDocument {
    pub id: String,
    #[serde(flatten)]
    pub sentiment: crate::api::DocumentSentiment,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPhraseDocument {
    pub id: String,
    pub key_phrases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EntitiesDocument {
    pub id: String,
    pub entities: Vec<CategorizedEntity>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PiiDocument {
    pub id: String,
    #[serde(default)]
    pub redacted_text: String,
    pub entities: Vec<PiiEntity>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SummaryDocument {
    pub id: String,
    pub sentences: Vec<SummarySentence>,
}

/// Request body submitting a long-running analysis job.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeTextJobInput {
    pub display_name: String,
    pub analysis_input: MultiLanguageBatchInput,
    pub tasks: Vec<ExtractiveSummarizationTask>,
}

/// The extractive summarisation task of a job.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractiveSummarizationTask {
    pub kind: &'static str,
    pub task_name: String,
    pub parameters: ExtractiveSummarizationParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractiveSummarizationParameters {
    pub sentence_count: u32,
}

/// Lifecycle state of a long-running job or one of its tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobStatus {
    NotStarted,
    Running,
    Succeeded,
    Failed,
    Cancelling,
    Cancelled,
    PartiallyCompleted,
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Whether the job may still change state.
    #[must_use]
    pub fn is_pending(self) -> bool {
        matches!(self, Self::NotStarted | Self::Running | Self::Cancelling)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "notStarted",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelling => "cancelling",
            Self::Cancelled => "cancelled",
            Self::PartiallyCompleted => "partiallyCompleted",
            Self::Unknown => "unknown",
        }
    }
}

/// Polled state of a summarisation job.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobState {
    pub status: JobStatus,
    #[serde(default)]
    pub tasks: Option<JobTasks>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobTasks {
    #[serde(default)]
    pub items: Vec<SummaryTaskResult>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SummaryTaskResult {
    pub kind: String,
    pub status: JobStatus,
    #[serde(default)]
    pub results: Option<DocumentBatch<SummaryDocument>>,
}
