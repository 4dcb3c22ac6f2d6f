//! Typed client for the text analytics service.
//!
//! [`TextAnalyticsClient`] mirrors the shape of a vendor SDK: requests and
//! responses go through the serde models in [`crate::models`], and the
//! long-running summarisation job is awaited until it completes.

use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::api::{
    CategorizedEntity, DetectedLanguage, DocumentSentiment, ExtractiveSummary, PiiEntities,
    TextAnalyzer,
};
use crate::config::ServiceConfig;
use crate::error::AnalysisError;
use crate::models::{
    AnalyzeTextJobInput, DOCUMENT_ID, DocumentBatch, EntitiesDocument,
    ExtractiveSummarizationParameters, ExtractiveSummarizationTask, JobState, JobStatus,
    KeyPhraseDocument, LanguageDocument, MultiLanguageBatchInput, PiiDocument, SentimentDocument,
    SummaryDocument, TextDocumentInput,
};
use crate::transport::{
    ClientOptions, DEFAULT_MAX_SENTENCES, ENTITIES_ROUTE, EXTRACTIVE_SUMMARIZATION, JOBS_ROUTE,
    KEY_PHRASES_ROUTE, LANGUAGES_ROUTE, PII_ROUTE, Poll, SENTIMENT_ROUTE, Transport,
};

/// Largest sentence count the service accepts for a summary.
pub const MAX_SENTENCE_LIMIT: u32 = 20;

/// Options of an extractive summarisation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractiveSummarizeOptions {
    /// Upper bound on the number of sentences returned.
    pub max_sentence_count: u32,
    /// Name attached to the job on the service side.
    pub display_name: String,
}

impl Default for ExtractiveSummarizeOptions {
    fn default() -> Self {
        Self {
            max_sentence_count: DEFAULT_MAX_SENTENCES,
            display_name: "Extractive summary".to_owned(),
        }
    }
}

impl ExtractiveSummarizeOptions {
    fn validate(&self) -> Result<(), AnalysisError> {
        if (1..=MAX_SENTENCE_LIMIT).contains(&self.max_sentence_count) {
            Ok(())
        } else {
            Err(AnalysisError::InvalidOptions(
                "max_sentence_count must be between 1 and 20",
            ))
        }
    }
}

/// Client bound to one service resource.
///
/// Built once from the loaded [`ServiceConfig`] and reused for every call.
///
/// # Examples
///
/// ```no_run
/// use text_analytics::{ClientOptions, ServiceConfig, TextAnalyticsClient, TextAnalyzer};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ServiceConfig::load("appsettings.json")?;
/// let client = TextAnalyticsClient::new(config, ClientOptions::default())?;
/// let language = client.detect_language("Hello world")?;
/// println!("Language: {language}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TextAnalyticsClient {
    transport: Transport,
    summary_options: ExtractiveSummarizeOptions,
}

impl TextAnalyticsClient {
    /// Create a client for the configured resource.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Transport`] if the HTTP client cannot be
    /// built.
    pub fn new(config: ServiceConfig, options: ClientOptions) -> Result<Self, AnalysisError> {
        Ok(Self {
            transport: Transport::new(config, options)?,
            summary_options: ExtractiveSummarizeOptions::default(),
        })
    }

    /// Replace the options used by [`TextAnalyzer::extractive_summarize`].
    #[must_use]
    pub fn with_summary_options(mut self, options: ExtractiveSummarizeOptions) -> Self {
        self.summary_options = options;
        self
    }

    /// Submit `documents` for extractive summarisation and wait until the
    /// job completes.
    ///
    /// Results are returned only for a job that succeeded; no partial
    /// summary is ever surfaced.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidOptions`] before sending anything if
    /// the options are out of range, and an [`AnalysisError`] describing the
    /// failure if the job cannot be submitted or does not succeed.
    #[instrument(skip_all, fields(documents = documents.len()))]
    pub fn extractive_summarize_documents(
        &self,
        documents: Vec<TextDocumentInput>,
        options: &ExtractiveSummarizeOptions,
    ) -> Result<Vec<SummaryDocument>, AnalysisError> {
        options.validate()?;
        let job = AnalyzeTextJobInput {
            display_name: options.display_name.clone(),
            analysis_input: MultiLanguageBatchInput { documents },
            tasks: vec![ExtractiveSummarizationTask {
                kind: EXTRACTIVE_SUMMARIZATION,
                task_name: "extractive-summary".to_owned(),
                parameters: ExtractiveSummarizationParameters {
                    sentence_count: options.max_sentence_count,
                },
            }],
        };
        let location = self.transport.submit(JOBS_ROUTE, &job)?;
        self.transport.wait_for(&location, |body| {
            let state: JobState = serde_json::from_str(body)?;
            match state.status {
                JobStatus::Succeeded => summary_documents(state).map(Poll::Ready),
                status if status.is_pending() => Ok(Poll::Pending),
                status => Err(AnalysisError::OperationFailed {
                    status: status.as_str().to_owned(),
                }),
            }
        })
    }

    fn analyze<T: DeserializeOwned>(&self, route: &str, text: &str) -> Result<T, AnalysisError> {
        let body = self
            .transport
            .post(route, &MultiLanguageBatchInput::single(text))?;
        let batch: DocumentBatch<T> = serde_json::from_str(&body)?;
        batch.into_single()
    }
}

fn summary_documents(state: JobState) -> Result<Vec<SummaryDocument>, AnalysisError> {
    let task = state
        .tasks
        .and_then(|tasks| tasks.items.into_iter().next())
        .ok_or(AnalysisError::MissingField {
            field: "tasks.items",
        })?;
    if task.status != JobStatus::Succeeded {
        return Err(AnalysisError::OperationFailed {
            status: task.status.as_str().to_owned(),
        });
    }
    let batch = task.results.ok_or(AnalysisError::MissingField {
        field: "tasks.items.results",
    })?;
    if batch.documents.is_empty() {
        return batch.into_single().map(|doc| vec![doc]);
    }
    Ok(batch.documents)
}

impl TextAnalyzer for TextAnalyticsClient {
    type Error = AnalysisError;

    fn detect_language(&self, text: &str) -> Result<DetectedLanguage, Self::Error> {
        let doc: LanguageDocument = self.analyze(LANGUAGES_ROUTE, text)?;
        debug!(iso = %doc.detected_language.iso6391_name, "language detected");
        Ok(doc.detected_language)
    }

    fn analyze_sentiment(&self, text: &str) -> Result<DocumentSentiment, Self::Error> {
        let doc: SentimentDocument = self.analyze(SENTIMENT_ROUTE, text)?;
        Ok(doc.sentiment)
    }

    fn extract_key_phrases(&self, text: &str) -> Result<Vec<String>, Self::Error> {
        let doc: KeyPhraseDocument = self.analyze(KEY_PHRASES_ROUTE, text)?;
        Ok(doc.key_phrases)
    }

    fn recognize_entities(&self, text: &str) -> Result<Vec<CategorizedEntity>, Self::Error> {
        let doc: EntitiesDocument = self.analyze(ENTITIES_ROUTE, text)?;
        Ok(doc.entities)
    }

    fn recognize_pii_entities(&self, text: &str) -> Result<PiiEntities, Self::Error> {
        let doc: PiiDocument = self.analyze(PII_ROUTE, text)?;
        Ok(PiiEntities {
            redacted_text: doc.redacted_text,
            entities: doc.entities,
        })
    }

    fn extractive_summarize(
        &self,
        text: &str,
        language: &str,
    ) -> Result<ExtractiveSummary, Self::Error> {
        let documents = vec![TextDocumentInput::new(DOCUMENT_ID, text).with_language(language)];
        let results = self.extractive_summarize_documents(documents, &self.summary_options)?;
        let sentences = results
            .into_iter()
            .find(|doc| doc.id == DOCUMENT_ID)
            .map(|doc| doc.sentences)
            .ok_or(AnalysisError::EmptyResponse)?;
        Ok(ExtractiveSummary { sentences })
    }
}
