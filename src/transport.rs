//! Blocking HTTP plumbing shared by both clients: authentication header,
//! status checks, error envelopes, and polling of long-running jobs.

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder};
use serde::Serialize;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ServiceConfig;
use crate::error::AnalysisError;
use crate::models::ErrorResponse;

/// Header carrying the subscription key.
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

pub(crate) const LANGUAGES_ROUTE: &str = "text/analytics/v3.1/languages";
pub(crate) const SENTIMENT_ROUTE: &str = "text/analytics/v3.1/sentiment";
pub(crate) const KEY_PHRASES_ROUTE: &str = "text/analytics/v3.1/keyPhrases";
pub(crate) const ENTITIES_ROUTE: &str = "text/analytics/v3.1/entities/recognition/general";
pub(crate) const PII_ROUTE: &str = "text/analytics/v3.1/entities/recognition/pii";
pub(crate) const JOBS_ROUTE: &str = "language/analyze-text/jobs?api-version=2023-04-01";

/// Task kind of an extractive summarisation job.
pub(crate) const EXTRACTIVE_SUMMARIZATION: &str = "ExtractiveSummarization";

/// Default number of sentences requested for a summary.
pub const DEFAULT_MAX_SENTENCES: u32 = 10;

/// Tunables of the HTTP client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    /// Timeout applied to each individual HTTP request.
    pub timeout: Duration,
    /// Delay between two polls of a summarisation job.
    pub poll_interval: Duration,
    /// Polls after which an unfinished job is reported as incomplete.
    pub max_polls: u32,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(1),
            max_polls: 300,
        }
    }
}

/// Outcome of inspecting one poll of a job.
pub(crate) enum Poll<T> {
    Pending,
    Ready(T),
}

/// Authenticated access to the service built once from [`ServiceConfig`].
#[derive(Debug, Clone)]
pub(crate) struct Transport {
    client: Client,
    config: ServiceConfig,
    options: ClientOptions,
}

impl Transport {
    pub(crate) fn new(config: ServiceConfig, options: ClientOptions) -> Result<Self, AnalysisError> {
        let client = Client::builder().timeout(options.timeout).build()?;
        Ok(Self {
            client,
            config,
            options,
        })
    }

    /// POST `body` to `route` and return the response body of a success
    /// status.
    pub(crate) fn post<B: Serialize + ?Sized>(
        &self,
        route: &str,
        body: &B,
    ) -> Result<String, AnalysisError> {
        let url = self.config.route(route);
        debug!(%url, "posting document");
        let response = self.authorized(self.client.post(&url)).json(body).send()?;
        Self::read_success(response)
    }

    /// Submit a long-running job and return the URL to poll.
    pub(crate) fn submit<B: Serialize + ?Sized>(
        &self,
        route: &str,
        body: &B,
    ) -> Result<String, AnalysisError> {
        let url = self.config.route(route);
        debug!(%url, "submitting job");
        let response = self.authorized(self.client.post(&url)).json(body).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text()?;
            return Err(service_error(status, &body));
        }
        let location = response
            .headers()
            .get("operation-location")
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .ok_or(AnalysisError::MissingOperationLocation)?;
        debug!(%location, "job accepted");
        Ok(location)
    }

    /// Poll `location` until `inspect` reports the job ready.
    ///
    /// `inspect` receives every polled body; it returns [`Poll::Pending`] to
    /// keep waiting and an error for a job that ended unsuccessfully.
    pub(crate) fn wait_for<T>(
        &self,
        location: &str,
        mut inspect: impl FnMut(&str) -> Result<Poll<T>, AnalysisError>,
    ) -> Result<T, AnalysisError> {
        for attempt in 1..=self.options.max_polls {
            if attempt > 1 {
                thread::sleep(self.options.poll_interval);
            }
            let response = self.authorized(self.client.get(location)).send()?;
            let body = Self::read_success(response)?;
            match inspect(&body)? {
                Poll::Ready(value) => {
                    debug!(attempt, "job completed");
                    return Ok(value);
                }
                Poll::Pending => debug!(attempt, "job still running"),
            }
        }
        warn!(polls = self.options.max_polls, "job did not complete");
        Err(AnalysisError::OperationIncomplete {
            polls: self.options.max_polls,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(SUBSCRIPTION_KEY_HEADER, self.config.key())
    }

    fn read_success(response: reqwest::blocking::Response) -> Result<String, AnalysisError> {
        let status = response.status();
        let body = response.text()?;
        debug!(status = status.as_u16(), bytes = body.len(), "response received");
        if status.is_success() {
            Ok(body)
        } else {
            Err(service_error(status, &body))
        }
    }
}

/// Build an [`AnalysisError::Service`] from a non-success response body.
pub(crate) fn service_error(status: StatusCode, body: &str) -> AnalysisError {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(envelope) => AnalysisError::Service {
            status: status.as_u16(),
            message: envelope.error.detail().to_owned(),
            code: envelope.error.code,
        },
        Err(_) => AnalysisError::Service {
            status: status.as_u16(),
            code: status.canonical_reason().unwrap_or("error").to_owned(),
            message: if body.trim().is_empty() {
                "no response body".to_owned()
            } else {
                body.trim().to_owned()
            },
        },
    }
}
