//! Raw REST client.
//!
//! Request bodies are assembled as untyped JSON and results are picked out of
//! the response by JSON pointer. With echoing enabled, every outbound body
//! and every inbound body is written to the echo sink as pretty JSON.

use serde_json::{Value, json};
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::api::{
    CategorizedEntity, DetectedLanguage, DocumentSentiment, ExtractiveSummary, PiiEntities,
    Sentiment, SentimentConfidenceScores, TextAnalyzer,
};
use crate::config::ServiceConfig;
use crate::error::AnalysisError;
use crate::models::{DOCUMENT_ID, DocumentError, JobStatus};
use crate::transport::{
    ClientOptions, DEFAULT_MAX_SENTENCES, ENTITIES_ROUTE, EXTRACTIVE_SUMMARIZATION, JOBS_ROUTE,
    KEY_PHRASES_ROUTE, LANGUAGES_ROUTE, PII_ROUTE, Poll, SENTIMENT_ROUTE, Transport,
};

/// Destination of echoed request and response bodies.
type EchoSink = Arc<Mutex<dyn Write + Send>>;

/// Client that speaks to the service with hand-built JSON.
#[derive(Clone)]
pub struct RestClient {
    transport: Transport,
    echo: Option<EchoSink>,
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("transport", &self.transport)
            .field("echo", &self.echo.is_some())
            .finish()
    }
}

impl RestClient {
    /// Create a client for the configured resource.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Transport`] if the HTTP client cannot be
    /// built.
    pub fn new(config: ServiceConfig, options: ClientOptions) -> Result<Self, AnalysisError> {
        Ok(Self {
            transport: Transport::new(config, options)?,
            echo: None,
        })
    }

    /// Echo request and response JSON to standard output.
    #[must_use]
    pub fn with_echo(self, echo: bool) -> Self {
        if echo {
            self.with_echo_to(io::stdout())
        } else {
            Self { echo: None, ..self }
        }
    }

    /// Echo request and response JSON to `sink`.
    #[must_use]
    pub fn with_echo_to(mut self, sink: impl Write + Send + 'static) -> Self {
        let sink: EchoSink = Arc::new(Mutex::new(sink));
        self.echo = Some(sink);
        self
    }

    fn echo(&self, value: &Value) {
        let Some(sink) = &self.echo else {
            return;
        };
        let written = match (serde_json::to_string_pretty(value), sink.lock()) {
            (Ok(pretty), Ok(mut sink)) => writeln!(sink, "{pretty}").and_then(|()| sink.flush()),
            (Err(err), _) => Err(io::Error::other(err)),
            (_, Err(_)) => Err(io::Error::other("echo sink poisoned")),
        };
        if let Err(err) = written {
            warn!(error = %err, "failed to echo JSON");
        }
    }

    /// POST a single-document body and return that document's result object.
    fn call(&self, route: &str, text: &str) -> Result<Value, AnalysisError> {
        let body = document_body(text, None);
        self.echo(&body);
        let response = self.transport.post(route, &body)?;
        let results: Value = serde_json::from_str(&response)?;
        self.echo(&results);
        first_document(&results)
    }
}

/// `{"documents":[{"id":"1","text":…}]}`, with `language` when given.
#[must_use]
pub fn document_body(text: &str, language: Option<&str>) -> Value {
    let mut document = json!({ "id": DOCUMENT_ID, "text": text });
    if let (Some(language), Some(fields)) = (language, document.as_object_mut()) {
        fields.insert("language".to_owned(), Value::from(language));
    }
    json!({ "documents": [document] })
}

/// The first document result of `results`, or its first document error.
///
/// # Errors
///
/// Returns [`AnalysisError::Document`] for a rejected document and
/// [`AnalysisError::EmptyResponse`] when neither is present.
pub fn first_document(results: &Value) -> Result<Value, AnalysisError> {
    if let Some(document) = results.pointer("/documents/0") {
        return Ok(document.clone());
    }
    match results.pointer("/errors/0") {
        Some(error) => {
            let error: DocumentError = serde_json::from_value(error.clone())?;
            Err(error.into())
        }
        None => Err(AnalysisError::EmptyResponse),
    }
}

fn string_at(value: &Value, pointer: &'static str) -> Result<String, AnalysisError> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(AnalysisError::MissingField { field: pointer })
}

fn f64_at(value: &Value, pointer: &str) -> f64 {
    value.pointer(pointer).and_then(Value::as_f64).unwrap_or_default()
}

fn value_at<T: serde::de::DeserializeOwned>(
    value: &Value,
    pointer: &'static str,
) -> Result<T, AnalysisError> {
    let found = value
        .pointer(pointer)
        .cloned()
        .ok_or(AnalysisError::MissingField { field: pointer })?;
    Ok(serde_json::from_value(found)?)
}

impl TextAnalyzer for RestClient {
    type Error = AnalysisError;

    fn detect_language(&self, text: &str) -> Result<DetectedLanguage, Self::Error> {
        let document = self.call(LANGUAGES_ROUTE, text)?;
        Ok(DetectedLanguage {
            name: string_at(&document, "/detectedLanguage/name")?,
            iso6391_name: string_at(&document, "/detectedLanguage/iso6391Name")?,
            confidence_score: f64_at(&document, "/detectedLanguage/confidenceScore"),
        })
    }

    fn analyze_sentiment(&self, text: &str) -> Result<DocumentSentiment, Self::Error> {
        let document = self.call(SENTIMENT_ROUTE, text)?;
        let label = string_at(&document, "/sentiment")?;
        let sentiment = Sentiment::from_label(&label).ok_or(AnalysisError::MissingField {
            field: "/sentiment",
        })?;
        Ok(DocumentSentiment {
            sentiment,
            confidence_scores: SentimentConfidenceScores {
                positive: f64_at(&document, "/confidenceScores/positive"),
                neutral: f64_at(&document, "/confidenceScores/neutral"),
                negative: f64_at(&document, "/confidenceScores/negative"),
            },
        })
    }

    fn extract_key_phrases(&self, text: &str) -> Result<Vec<String>, Self::Error> {
        let document = self.call(KEY_PHRASES_ROUTE, text)?;
        value_at(&document, "/keyPhrases")
    }

    fn recognize_entities(&self, text: &str) -> Result<Vec<CategorizedEntity>, Self::Error> {
        let document = self.call(ENTITIES_ROUTE, text)?;
        value_at(&document, "/entities")
    }

    fn recognize_pii_entities(&self, text: &str) -> Result<PiiEntities, Self::Error> {
        let document = self.call(PII_ROUTE, text)?;
        Ok(PiiEntities {
            redacted_text: string_at(&document, "/redactedText").unwrap_or_default(),
            entities: value_at(&document, "/entities")?,
        })
    }

    fn extractive_summarize(
        &self,
        text: &str,
        language: &str,
    ) -> Result<ExtractiveSummary, Self::Error> {
        let body = json!({
            "displayName": "Extractive summary",
            "analysisInput": document_body(text, Some(language)),
            "tasks": [{
                "kind": EXTRACTIVE_SUMMARIZATION,
                "taskName": "extractive-summary",
                "parameters": { "sentenceCount": DEFAULT_MAX_SENTENCES }
            }]
        });
        self.echo(&body);
        let location = self.transport.submit(JOBS_ROUTE, &body)?;
        self.transport.wait_for(&location, |response| {
            let state: Value = serde_json::from_str(response)?;
            let status: JobStatus = value_at(&state, "/status")?;
            debug!(status = status.as_str(), "summary job polled");
            if status.is_pending() {
                return Ok(Poll::Pending);
            }
            self.echo(&state);
            let task_status: JobStatus = value_at(&state, "/tasks/items/0/status")
                .unwrap_or(status);
            if status != JobStatus::Succeeded || task_status != JobStatus::Succeeded {
                let failed = if status == JobStatus::Succeeded { task_status } else { status };
                return Err(AnalysisError::OperationFailed {
                    status: failed.as_str().to_owned(),
                });
            }
            let results = state
                .pointer("/tasks/items/0/results")
                .ok_or(AnalysisError::MissingField {
                    field: "/tasks/items/0/results",
                })?;
            let document = first_document(results)?;
            let sentences = value_at(&document, "/sentences")?;
            Ok(Poll::Ready(ExtractiveSummary { sentences }))
        })
    }
}
