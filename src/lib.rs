//! Terminal clients for a hosted text analytics service.
//!
//! Text read from the terminal is sent to the service for language
//! detection, sentiment analysis, key phrase extraction, entity and PII
//! recognition, and extractive summarisation. Two clients implement
//! [`TextAnalyzer`]: [`RestClient`] builds raw JSON requests, while
//! [`TextAnalyticsClient`] goes through typed models.

pub mod api;
#[cfg(feature = "cli")]
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod repl;
pub mod rest;
mod transport;

pub use api::{
    CategorizedEntity, DetectedLanguage, DocumentSentiment, ExtractiveSummary, PiiEntities,
    PiiEntity, Sentiment, SummarySentence, TextAnalyzer,
};
#[cfg(feature = "cli")]
pub use cli::ClientArgs;
pub use client::{ExtractiveSummarizeOptions, TextAnalyticsClient};
pub use config::{ConfigError, ServiceConfig};
pub use error::AnalysisError;
pub use repl::Capability;
pub use rest::RestClient;
pub use transport::{ClientOptions, DEFAULT_MAX_SENTENCES, SUBSCRIPTION_KEY_HEADER};
