//! Wire schema for the automation webhook's reply, and the normalization
//! step that turns it into one canonical report.
//!
//! The workflow has returned several shapes over time: `suggestions` as an
//! aspect-to-advice object or as a single text block, an optional `length`
//! display string, and scores that arrive as numbers or numeric strings.
//! Everything is accepted here and nowhere else.

use std::collections::BTreeMap;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

const FALLBACK_AUDIO_FILENAME: &str = "audio.dat";
const MAX_FILENAME_LEN: usize = 120;

/// Raw webhook reply body.
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationResponse {
    #[serde(default)]
    pub transcription: String,
    #[serde(default)]
    pub evaluation: BTreeMap<String, Value>,
    #[serde(default)]
    pub suggestions: Option<Suggestions>,
    #[serde(default)]
    pub length: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Suggestions {
    Sections(BTreeMap<String, String>),
    Text(String),
}

/// Normalized evaluation, the only shape the rest of the app sees.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub transcription: String,
    pub scores: Vec<MetricScore>,
    pub suggestions: Vec<SuggestionBlock>,
    pub length: Option<String>,
}

/// One named metric with its raw score, exactly as returned.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricScore {
    pub key: String,
    pub value: f64,
}

/// One piece of advice; `aspect` is absent when the workflow returned a
/// single text block instead of per-aspect sections.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionBlock {
    pub aspect: Option<String>,
    pub advice: String,
}

impl EvaluationResponse {
    pub fn normalize(self) -> EvaluationReport {
        let scores = self
            .evaluation
            .into_iter()
            .filter_map(|(key, value)| {
                score_value(&value).map(|value| MetricScore { key, value })
            })
            .collect();

        let suggestions = match self.suggestions {
            None => Vec::new(),
            Some(Suggestions::Text(text)) => {
                let advice = text.trim().to_string();
                if advice.is_empty() {
                    Vec::new()
                } else {
                    vec![SuggestionBlock {
                        aspect: None,
                        advice,
                    }]
                }
            }
            Some(Suggestions::Sections(sections)) => sections
                .into_iter()
                .map(|(aspect, advice)| SuggestionBlock {
                    aspect: Some(aspect),
                    advice,
                })
                .collect(),
        };

        EvaluationReport {
            transcription: self.transcription,
            scores,
            suggestions,
            length: self.length,
        }
    }
}

/// Scores arrive as JSON numbers or as numeric strings depending on the
/// workflow version; anything else is dropped at this boundary.
fn score_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Strips path components and unsafe characters from a client-supplied
/// filename before it is forwarded to the webhook.
pub fn sanitize_filename(filename: &str) -> String {
    let name = std::path::Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    let pattern = Regex::new(r"[^\w\-. ]").unwrap();
    let cleaned: String = pattern
        .replace_all(name, "_")
        .trim()
        .chars()
        .take(MAX_FILENAME_LEN)
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.' || c == '_') {
        FALLBACK_AUDIO_FILENAME.to_string()
    } else {
        cleaned
    }
}
