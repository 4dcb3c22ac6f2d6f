//! Tests for the raw `RestClient` against a mock service.

use httpmock::{
    Method::{GET, POST},
    MockServer,
};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use text_analytics::{AnalysisError, RestClient, Sentiment, TextAnalyzer, repl};

mod support;
use support::{KEY, config_for, fast_options, single_document};

#[fixture]
fn mock_server() -> MockServer {
    MockServer::start()
}

#[fixture]
fn rest_client(mock_server: MockServer) -> (RestClient, MockServer) {
    let client = RestClient::new(config_for(&mock_server), fast_options())
        .unwrap_or_else(|e| panic!("build client: {e}"));
    (client, mock_server)
}

fn mock_document(server: &MockServer, route: &str, document: serde_json::Value) {
    server.mock(|when, then| {
        when.method(POST).path(route);
        then.status(200)
            .json_body(json!({ "documents": [document], "errors": [] }));
    });
}

#[rstest]
#[case("Hello world", "English", "en")]
#[case("Bonjour tout le monde", "French", "fr")]
fn detects_language(
    #[case] text: &str,
    #[case] name: &str,
    #[case] iso: &str,
    rest_client: (RestClient, MockServer),
) {
    let (client, server) = rest_client;
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/text/analytics/v3.1/languages")
            .header("ocp-apim-subscription-key", KEY)
            .json_body(single_document(text));
        then.status(200).json_body(json!({
            "documents": [{ "id": "1", "detectedLanguage": { "name": name, "iso6391Name": iso, "confidenceScore": 0.99 } }],
            "errors": []
        }));
    });
    let language = client
        .detect_language(text)
        .unwrap_or_else(|e| panic!("detect language: {e}"));
    mock.assert();
    assert_eq!(language.name, name);
    assert_eq!(language.iso6391_name, iso);
}

#[rstest]
#[case("positive", Sentiment::Positive)]
#[case("mixed", Sentiment::Mixed)]
fn reads_sentiment_label(
    #[case] label: &str,
    #[case] expected: Sentiment,
    rest_client: (RestClient, MockServer),
) {
    let (client, server) = rest_client;
    mock_document(
        &server,
        "/text/analytics/v3.1/sentiment",
        json!({ "id": "1", "sentiment": label, "confidenceScores": { "positive": 0.5, "neutral": 0.2, "negative": 0.3 } }),
    );
    let doc = client
        .analyze_sentiment("text")
        .unwrap_or_else(|e| panic!("sentiment: {e}"));
    assert_eq!(doc.sentiment, expected);
    assert!((doc.confidence_scores.negative - 0.3).abs() < f64::EPSILON);
}

/// Echo sink that can be inspected after the client wrote to it.
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(|e| panic!("buffer lock: {e}"));
        String::from_utf8(bytes.clone()).unwrap_or_else(|e| panic!("utf8 echo: {e}"))
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| io::Error::other("buffer lock poisoned"))?
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn echoed_values(echo: &str) -> Vec<Value> {
    serde_json::Deserializer::from_str(echo)
        .into_iter::<Value>()
        .collect::<Result<_, _>>()
        .unwrap_or_else(|e| panic!("echo is not a JSON stream: {e}"))
}

#[rstest]
fn echo_writes_request_and_response(rest_client: (RestClient, MockServer)) {
    let (client, server) = rest_client;
    let response = json!({ "documents": [{ "id": "1", "keyPhrases": ["weather"] }], "errors": [] });
    server.mock(|when, then| {
        when.method(POST).path("/text/analytics/v3.1/keyPhrases");
        then.status(200).json_body(response.clone());
    });
    let sink = SharedBuffer::default();
    let client = client.with_echo_to(sink.clone());
    client
        .extract_key_phrases("The weather")
        .unwrap_or_else(|e| panic!("key phrases: {e}"));
    assert_eq!(
        echoed_values(&sink.contents()),
        [single_document("The weather"), response]
    );
}

#[rstest]
fn echo_is_off_by_default(rest_client: (RestClient, MockServer)) {
    let (client, server) = rest_client;
    mock_document(
        &server,
        "/text/analytics/v3.1/keyPhrases",
        json!({ "id": "1", "keyPhrases": [] }),
    );
    let sink = SharedBuffer::default();
    let client = client.with_echo_to(sink.clone()).with_echo(false);
    client
        .extract_key_phrases("text")
        .unwrap_or_else(|e| panic!("key phrases: {e}"));
    assert!(sink.contents().is_empty());
}

#[rstest]
fn unknown_sentiment_label_is_rejected(rest_client: (RestClient, MockServer)) {
    let (client, server) = rest_client;
    mock_document(
        &server,
        "/text/analytics/v3.1/sentiment",
        json!({ "id": "1", "sentiment": "ecstatic" }),
    );
    assert!(matches!(
        client.analyze_sentiment("text"),
        Err(AnalysisError::MissingField { field: "/sentiment" })
    ));
}

#[rstest]
fn extracts_key_phrases(rest_client: (RestClient, MockServer)) {
    let (client, server) = rest_client;
    mock_document(
        &server,
        "/text/analytics/v3.1/keyPhrases",
        json!({ "id": "1", "keyPhrases": ["weather", "Seattle"] }),
    );
    let phrases = client
        .extract_key_phrases("The weather in Seattle")
        .unwrap_or_else(|e| panic!("key phrases: {e}"));
    assert_eq!(phrases, ["weather", "Seattle"]);
}

#[rstest]
fn missing_result_field_is_reported(rest_client: (RestClient, MockServer)) {
    let (client, server) = rest_client;
    mock_document(&server, "/text/analytics/v3.1/entities/recognition/general", json!({ "id": "1" }));
    assert!(matches!(
        client.recognize_entities("text"),
        Err(AnalysisError::MissingField { field: "/entities" })
    ));
}

#[rstest]
fn malformed_body_is_a_decode_error(rest_client: (RestClient, MockServer)) {
    let (client, server) = rest_client;
    server.mock(|when, then| {
        when.method(POST).path("/text/analytics/v3.1/languages");
        then.status(200)
            .header("content-type", "application/json")
            .body("{not json");
    });
    assert!(matches!(
        client.detect_language("text"),
        Err(AnalysisError::Decode(_))
    ));
}

#[rstest]
fn summarises_with_language_tag(rest_client: (RestClient, MockServer)) {
    let (client, server) = rest_client;
    let location = format!(
        "{}/language/analyze-text/jobs/rest-job?api-version=2023-04-01",
        server.base_url()
    );
    let submit = server.mock(|when, then| {
        when.method(POST)
            .path("/language/analyze-text/jobs")
            .json_body_partial(
                r#"{"analysisInput":{"documents":[{"id":"1","text":"One. Two.","language":"en"}]},
                    "tasks":[{"kind":"ExtractiveSummarization","parameters":{"sentenceCount":10}}]}"#,
            );
        then.status(202).header("operation-location", location.as_str());
    });
    server.mock(|when, then| {
        when.method(GET).path("/language/analyze-text/jobs/rest-job");
        then.status(200).json_body(json!({
            "status": "succeeded",
            "tasks": { "items": [{
                "kind": "ExtractiveSummarizationLROResults",
                "status": "succeeded",
                "results": { "documents": [{ "id": "1", "sentences": [
                    { "text": "One.", "rankScore": 1.0, "offset": 0, "length": 4 },
                    { "text": "Two.", "rankScore": 0.9, "offset": 5, "length": 4 }
                ] }], "errors": [] }
            }] }
        }));
    });
    let summary = client
        .extractive_summarize("One. Two.", "en")
        .unwrap_or_else(|e| panic!("summary: {e}"));
    submit.assert();
    assert_eq!(summary.text(), "One. Two.");
}

#[rstest]
fn failed_summary_job_returns_error(rest_client: (RestClient, MockServer)) {
    let (client, server) = rest_client;
    let location = format!("{}/language/analyze-text/jobs/rest-job", server.base_url());
    server.mock(|when, then| {
        when.method(POST).path("/language/analyze-text/jobs");
        then.status(202).header("operation-location", location.as_str());
    });
    server.mock(|when, then| {
        when.method(GET).path("/language/analyze-text/jobs/rest-job");
        then.status(200).json_body(json!({
            "status": "succeeded",
            "tasks": { "items": [{ "kind": "ExtractiveSummarizationLROResults", "status": "failed" }] }
        }));
    });
    match client.extractive_summarize("One. Two.", "en") {
        Err(AnalysisError::OperationFailed { status }) => assert_eq!(status, "failed"),
        other => panic!("expected failed job, got {other:?}"),
    }
}

#[rstest]
fn failing_capability_does_not_stop_the_others(rest_client: (RestClient, MockServer)) {
    let (client, server) = rest_client;
    mock_document(
        &server,
        "/text/analytics/v3.1/languages",
        json!({ "id": "1", "detectedLanguage": { "name": "English", "iso6391Name": "en", "confidenceScore": 1.0 } }),
    );
    server.mock(|when, then| {
        when.method(POST).path("/text/analytics/v3.1/sentiment");
        then.status(500)
            .json_body(json!({ "error": { "code": "InternalServerError", "message": "Boom" } }));
    });
    mock_document(
        &server,
        "/text/analytics/v3.1/keyPhrases",
        json!({ "id": "1", "keyPhrases": ["weather", "Seattle"] }),
    );
    mock_document(
        &server,
        "/text/analytics/v3.1/entities/recognition/general",
        json!({ "id": "1", "entities": [{ "text": "Seattle", "category": "Location", "confidenceScore": 0.9 }] }),
    );
    mock_document(
        &server,
        "/text/analytics/v3.1/entities/recognition/pii",
        json!({ "id": "1", "redactedText": "The weather in Seattle", "entities": [] }),
    );
    server.mock(|when, then| {
        when.method(POST).path("/language/analyze-text/jobs");
        then.status(400).json_body(
            json!({ "error": { "code": "InvalidRequest", "message": "Summarization unavailable" } }),
        );
    });

    let mut out = Vec::new();
    repl::analyze_line(&client, "The weather in Seattle", &mut out)
        .unwrap_or_else(|e| panic!("write output: {e}"));
    let out = String::from_utf8(out).unwrap_or_else(|e| panic!("utf8 output: {e}"));

    assert!(out.contains("Language: English"));
    assert!(out.contains("Sentiment error: service returned 500: InternalServerError: Boom"));
    assert!(out.contains("Key Phrases: weather, Seattle"));
    assert!(out.contains("Named Entities: Seattle"));
    assert!(out.contains("PII Entities: \n"));
    assert!(out.contains("Extracted Summary error:"));
}
