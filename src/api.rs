//! Analysis results and the [`TextAnalyzer`] trait implemented by both
//! clients.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Language detected for a document.
///
/// Displays as the language's name.
///
/// # Examples
///
/// ```
/// use text_analytics::api::DetectedLanguage;
///
/// let lang = DetectedLanguage {
///     name: "English".into(),
///     iso6391_name: "en".into(),
///     confidence_score: 1.0,
/// };
/// assert_eq!(lang.to_string(), "English");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedLanguage {
    pub name: String,
    pub iso6391_name: String,
    #[serde(default)]
    pub confidence_score: f64,
}

impl fmt::Display for DetectedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Overall polarity label assigned to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    Mixed,
}

impl Sentiment {
    /// Label as sent by the service.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
            Self::Mixed => "mixed",
        }
    }

    /// Parse a service label, ignoring case.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        [Self::Positive, Self::Neutral, Self::Negative, Self::Mixed]
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-class confidence of a sentiment prediction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentConfidenceScores {
    #[serde(default)]
    pub positive: f64,
    #[serde(default)]
    pub neutral: f64,
    #[serde(default)]
    pub negative: f64,
}

/// Sentiment of a whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSentiment {
    pub sentiment: Sentiment,
    #[serde(default)]
    pub confidence_scores: SentimentConfidenceScores,
}

/// A named entity mention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizedEntity {
    pub text: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub confidence_score: f64,
}

/// A personally identifiable information mention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PiiEntity {
    pub text: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub confidence_score: f64,
}

/// PII mentions found in a document together with the redacted text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PiiEntities {
    #[serde(default)]
    pub redacted_text: String,
    #[serde(default)]
    pub entities: Vec<PiiEntity>,
}

/// One sentence selected for an extractive summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarySentence {
    pub text: String,
    #[serde(default)]
    pub rank_score: f64,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub length: usize,
}

/// Sentences the service extracted, in the order it returned them.
///
/// # Examples
///
/// ```
/// use text_analytics::api::{ExtractiveSummary, SummarySentence};
///
/// let summary = ExtractiveSummary {
///     sentences: vec![
///         SummarySentence { text: "One.".into(), rank_score: 1.0, offset: 0, length: 4 },
///         SummarySentence { text: "Two.".into(), rank_score: 0.5, offset: 5, length: 4 },
///     ],
/// };
/// assert_eq!(summary.text(), "One. Two.");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractiveSummary {
    pub sentences: Vec<SummarySentence>,
}

impl ExtractiveSummary {
    /// Sentence texts joined with single spaces.
    #[must_use]
    pub fn text(&self) -> String {
        self.sentences
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Operations offered by the remote text analytics service.
///
/// Each call submits exactly one document and blocks until the service
/// answers. Implementations never retry.
pub trait TextAnalyzer {
    /// Error type returned when a call fails.
    type Error: std::error::Error;

    /// Detect the language of `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or response handling fails.
    fn detect_language(&self, text: &str) -> Result<DetectedLanguage, Self::Error>;

    /// Classify the overall sentiment of `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or response handling fails.
    fn analyze_sentiment(&self, text: &str) -> Result<DocumentSentiment, Self::Error>;

    /// Extract salient key phrases from `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or response handling fails.
    fn extract_key_phrases(&self, text: &str) -> Result<Vec<String>, Self::Error>;

    /// Recognise named entities in `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or response handling fails.
    fn recognize_entities(&self, text: &str) -> Result<Vec<CategorizedEntity>, Self::Error>;

    /// Recognise personally identifiable information in `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or response handling fails.
    fn recognize_pii_entities(&self, text: &str) -> Result<PiiEntities, Self::Error>;

    /// Summarise `text`, written in the language with ISO 639-1 code
    /// `language`, waiting until the service job completes.
    ///
    /// # Errors
    ///
    /// Returns an error if the job cannot be submitted, fails, or never
    /// completes.
    fn extractive_summarize(
        &self,
        text: &str,
        language: &str,
    ) -> Result<ExtractiveSummary, Self::Error>;

    /// Detect the language of `text`, then summarise it in that language.
    ///
    /// # Errors
    ///
    /// Returns an error if either step fails.
    fn summarize(&self, text: &str) -> Result<ExtractiveSummary, Self::Error> {
        let language = self.detect_language(text)?;
        self.extractive_summarize(text, &language.iso6391_name)
    }
}

/// Joins entity mention texts for display.
pub(crate) fn join_mentions<'a>(mentions: impl Iterator<Item = &'a str>) -> String {
    mentions.collect::<Vec<_>>().join(", ")
}
