//! Interactive input loop.
//!
//! Reads one line at a time, stops on `quit` (any case) or end of input, and
//! runs every capability on each other line in a fixed order. A failing
//! capability is reported and does not stop the ones after it. Input that is
//! not valid UTF-8 is decoded lossily.

use std::fmt::Display;
use std::io::{self, BufRead, Write};
use tracing::{info, warn};

use crate::api::{TextAnalyzer, join_mentions};

/// Input that ends the loop, compared without regard to case.
pub const SENTINEL: &str = "quit";

/// Prompt printed before each line is read.
pub const PROMPT: &str = "Enter some text ('quit' to stop)";

/// Analysis capabilities in the order they run for each line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Language,
    Sentiment,
    KeyPhrases,
    NamedEntities,
    PiiEntities,
    ExtractiveSummary,
}

impl Capability {
    /// Every capability, in execution order.
    pub const ALL: [Self; 6] = [
        Self::Language,
        Self::Sentiment,
        Self::KeyPhrases,
        Self::NamedEntities,
        Self::PiiEntities,
        Self::ExtractiveSummary,
    ];

    /// Label printed in front of the result.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Language => "Language",
            Self::Sentiment => "Sentiment",
            Self::KeyPhrases => "Key Phrases",
            Self::NamedEntities => "Named Entities",
            Self::PiiEntities => "PII Entities",
            Self::ExtractiveSummary => "Extracted Summary",
        }
    }
}

/// Whether `line` is the sentinel.
///
/// # Examples
///
/// ```
/// use text_analytics::repl::is_sentinel;
///
/// assert!(is_sentinel("QUIT"));
/// assert!(!is_sentinel("quit now"));
/// ```
#[must_use]
pub fn is_sentinel(line: &str) -> bool {
    line.eq_ignore_ascii_case(SENTINEL)
}

/// Run the loop until the sentinel or end of input.
///
/// Returns the number of lines that were analysed.
///
/// # Errors
///
/// Returns an error only if reading `input` or writing `output` fails;
/// analysis failures are printed and the loop carries on.
pub fn run<A, R, W>(analyzer: &A, mut input: R, output: &mut W) -> io::Result<usize>
where
    A: TextAnalyzer + ?Sized,
    R: BufRead,
    W: Write,
{
    let mut analysed = 0;
    loop {
        writeln!(output, "\n{PROMPT}")?;
        output.flush()?;
        let mut raw = Vec::new();
        if input.read_until(b'\n', &mut raw)? == 0 {
            info!(analysed, "end of input");
            return Ok(analysed);
        }
        let line = String::from_utf8_lossy(&raw);
        let text = line.trim_end_matches(['\n', '\r']);
        if is_sentinel(text) {
            info!(analysed, "quit requested");
            return Ok(analysed);
        }
        analyze_line(analyzer, text, output)?;
        analysed += 1;
    }
}

/// Run every capability on `text`, printing one labelled line per result.
///
/// The language detected first is reused to tag the summary request and
/// printed as its ISO code just before the summary; if detection failed, the
/// summary detects the language itself.
///
/// # Errors
///
/// Returns an error only if writing to `output` fails.
pub fn analyze_line<A, W>(analyzer: &A, text: &str, output: &mut W) -> io::Result<()>
where
    A: TextAnalyzer + ?Sized,
    W: Write,
{
    let language = report(output, Capability::Language, analyzer.detect_language(text))?;
    report(
        output,
        Capability::Sentiment,
        analyzer.analyze_sentiment(text).map(|doc| doc.sentiment),
    )?;
    report(
        output,
        Capability::KeyPhrases,
        analyzer.extract_key_phrases(text).map(|phrases| phrases.join(", ")),
    )?;
    report(
        output,
        Capability::NamedEntities,
        analyzer
            .recognize_entities(text)
            .map(|entities| join_mentions(entities.iter().map(|e| e.text.as_str()))),
    )?;
    report(
        output,
        Capability::PiiEntities,
        analyzer
            .recognize_pii_entities(text)
            .map(|pii| join_mentions(pii.entities.iter().map(|e| e.text.as_str()))),
    )?;
    let summary = match &language {
        Some(language) => {
            writeln!(output, "Detected language: {}", language.iso6391_name)?;
            analyzer.extractive_summarize(text, &language.iso6391_name)
        }
        None => analyzer.summarize(text),
    };
    report(
        output,
        Capability::ExtractiveSummary,
        summary.map(|summary| summary.text()),
    )?;
    Ok(())
}

fn report<T: Display, E: Display, W: Write>(
    output: &mut W,
    capability: Capability,
    result: Result<T, E>,
) -> io::Result<Option<T>> {
    match result {
        Ok(value) => {
            writeln!(output, "{}: {value}", capability.label())?;
            Ok(Some(value))
        }
        Err(err) => {
            warn!(capability = capability.label(), error = %err, "analysis failed");
            writeln!(output, "{} error: {err}", capability.label())?;
            Ok(None)
        }
    }
}
