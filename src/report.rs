//! Result records returned by the formatter façade.

use crate::model::ContentAnalysis;
use crate::parser::MarkdownParser;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;
use unicode_normalization::UnicodeNormalization;

/// Length-change ratio above which validation warns.
const LENGTH_DRIFT_THRESHOLD: f64 = 0.5;

/// Words shorter than this are ignored by the content-loss check.
const MIN_WORD_CHARS: usize = 4;

/// Missing words listed in a validation warning.
const MAX_REPORTED_WORDS: usize = 5;

static RE_HEADING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,6}\s+.+$").unwrap());

static RE_LIST_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*[-*+]\s+.+$").unwrap());

static RE_CODE_FENCE_PAIR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)```.*?```").unwrap());

static RE_BLANK_GROUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());

static RE_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
}

/// Output of a full formatting run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatResult {
    pub formatted: String,
    pub analysis: ContentAnalysis,
    /// Input length in characters.
    pub original_length: usize,
    /// Output length in characters.
    pub formatted_length: usize,
    #[serde(rename = "processingTimeMs", serialize_with = "serialize_millis")]
    pub processing_time: Duration,
}

impl FormatResult {
    /// True if formatting changed the text.
    pub fn changed(&self, original: &str) -> bool {
        self.formatted != original
    }
}

/// Formatting result together with a summary of what changed.
#[derive(Debug, Clone, Serialize)]
pub struct FormatPreview {
    pub original: String,
    pub formatted: String,
    pub changes: Vec<String>,
    pub analysis: ContentAnalysis,
}

/// Verdict on whether formatting preserved the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    /// Hard failures: the output does not parse or is empty.
    pub errors: Vec<String>,
    /// Soft signals: large length drift, possibly dropped words.
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Compares a formatted document against its original.
    pub fn check(parser: &MarkdownParser, original: &str, formatted: &str) -> Self {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        match parser.parse(formatted) {
            Ok(ast) if ast.is_empty() => {
                errors.push("formatted document contains no content".to_string());
            }
            Ok(_) => {}
            Err(err) => errors.push(format!("formatted document failed to parse: {err}")),
        }

        let original_len = original.chars().count();
        let formatted_len = formatted.chars().count();
        if original_len > 0 {
            let ratio = original_len.abs_diff(formatted_len) as f64 / original_len as f64;
            if ratio > LENGTH_DRIFT_THRESHOLD {
                warnings.push(format!("content length changed by {:.1}%", ratio * 100.0));
            }
        }

        let kept: HashSet<String> = extract_words(formatted).into_iter().collect();
        let missing: Vec<String> = extract_words(original)
            .into_iter()
            .filter(|word| word.chars().count() >= MIN_WORD_CHARS && !kept.contains(word))
            .collect();
        if !missing.is_empty() {
            let shown = missing.iter().take(MAX_REPORTED_WORDS).cloned().collect::<Vec<_>>();
            warnings.push(format!(
                "possible content loss, missing words: {}",
                shown.join(", ")
            ));
        }

        for warning in &warnings {
            log::warn!("validation: {warning}");
        }

        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Distinct case-folded words in order of first appearance.
pub fn extract_words(text: &str) -> Vec<String> {
    let normalized: String = text.nfc().collect::<String>().to_lowercase();
    let mut seen = HashSet::new();
    RE_WORD
        .find_iter(&normalized)
        .map(|m| m.as_str().to_string())
        .filter(|word| seen.insert(word.clone()))
        .collect()
}

/// Plain-language summary of cosmetic differences between two texts.
pub fn detect_changes(original: &str, formatted: &str) -> Vec<String> {
    let dimensions: [(&str, fn(&str) -> usize); 5] = [
        ("content length", |text: &str| text.chars().count()),
        ("headings", |text: &str| RE_HEADING_LINE.find_iter(text).count()),
        ("list items", |text: &str| RE_LIST_LINE.find_iter(text).count()),
        ("code blocks", |text: &str| RE_CODE_FENCE_PAIR.find_iter(text).count()),
        ("blank line groups", |text: &str| RE_BLANK_GROUP.find_iter(text).count()),
    ];

    let changes: Vec<String> = dimensions
        .iter()
        .filter_map(|(name, count)| {
            let before = count(original);
            let after = count(formatted);
            (before != after).then(|| format!("{name}: {before} → {after}"))
        })
        .collect();

    if changes.is_empty() {
        vec!["no significant change".to_string()]
    } else {
        changes
    }
}
