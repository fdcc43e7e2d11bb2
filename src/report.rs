//! Display model for an evaluation. Clamping, labels, and the feedback
//! verdict all live here; the stored report is never mutated.

use serde::Serialize;

use crate::evaluation::{EvaluationReport, MetricScore, SuggestionBlock};

/// Clamps a score for presentation. Display-only: the raw value stays in
/// the report untouched.
pub fn clamp_score(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Arithmetic mean of the raw scores. `None` when the workflow returned no
/// usable metrics.
pub fn mean_score(scores: &[MetricScore]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let sum: f64 = scores.iter().map(|s| s.value).sum();
    Some(sum / scores.len() as f64)
}

/// Qualitative verdict shown next to the scores.
///
/// Thresholds on the mean: above 75 is positive, 50 to 75 inclusive is
/// neutral, below 50 needs improvement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackVerdict {
    Positive,
    Neutral,
    NeedsImprovement,
}

impl FeedbackVerdict {
    pub fn from_mean(mean: f64) -> Self {
        if mean > 75.0 {
            FeedbackVerdict::Positive
        } else if mean >= 50.0 {
            FeedbackVerdict::Neutral
        } else {
            FeedbackVerdict::NeedsImprovement
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FeedbackVerdict::Positive => "Great job!",
            FeedbackVerdict::Neutral => "Good effort",
            FeedbackVerdict::NeedsImprovement => "Keep practicing",
        }
    }
}

/// Turns a metric key (`vocabularyRichness`, `audio_quality`) into a
/// title-case label for display.
pub fn metric_label(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for ch in key.chars() {
        if ch == '_' || ch == '-' || ch == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else if ch.is_uppercase() && !current.is_empty() {
            words.push(std::mem::take(&mut current));
            current.push(ch);
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Everything the page needs to render one evaluation, pre-computed.
#[derive(Debug, Clone, Serialize)]
pub struct ReportView {
    pub transcription: String,
    pub scores: Vec<ScoreView>,
    pub suggestions: Vec<SuggestionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<FeedbackView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreView {
    pub key: String,
    pub label: String,
    /// Raw score as returned by the workflow.
    pub value: f64,
    /// Score clamped into [0,100] for display.
    pub display: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestionView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub advice: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackView {
    pub verdict: FeedbackVerdict,
    pub label: &'static str,
}

impl ReportView {
    pub fn from_report(report: &EvaluationReport) -> Self {
        let scores = report
            .scores
            .iter()
            .map(|MetricScore { key, value }| ScoreView {
                key: key.clone(),
                label: metric_label(key),
                value: *value,
                display: clamp_score(*value),
            })
            .collect();

        let suggestions = report
            .suggestions
            .iter()
            .map(|SuggestionBlock { aspect, advice }| SuggestionView {
                label: aspect.as_deref().map(metric_label),
                advice: advice.clone(),
            })
            .collect();

        let mean = mean_score(&report.scores);
        let feedback = mean.map(|mean| {
            let verdict = FeedbackVerdict::from_mean(mean);
            FeedbackView { verdict, label: verdict.label() }
        });

        ReportView {
            transcription: report.transcription.clone(),
            scores,
            suggestions,
            length: report.length.clone(),
            mean_score: mean,
            feedback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn metric(key: &str, value: f64) -> MetricScore {
        MetricScore { key: key.into(), value }
    }

    #[test]
    fn clamps_for_display_only() {
        assert_eq!(clamp_score(64.0), 64.0);
        assert_eq!(clamp_score(130.0), 100.0);
        assert_eq!(clamp_score(-10.0), 0.0);
        assert_eq!(clamp_score(0.0), 0.0);
        assert_eq!(clamp_score(100.0), 100.0);
    }

    #[test]
    fn verdict_thresholds() {
        assert_eq!(FeedbackVerdict::from_mean(80.0), FeedbackVerdict::Positive);
        assert_eq!(FeedbackVerdict::from_mean(60.0), FeedbackVerdict::Neutral);
        assert_eq!(FeedbackVerdict::from_mean(30.0), FeedbackVerdict::NeedsImprovement);
        // boundaries: 75 stays neutral, 50 goes up to neutral
        assert_eq!(FeedbackVerdict::from_mean(75.0), FeedbackVerdict::Neutral);
        assert_eq!(FeedbackVerdict::from_mean(50.0), FeedbackVerdict::Neutral);
    }

    #[test]
    fn labels_camel_and_snake_case() {
        assert_eq!(metric_label("vocabularyRichness"), "Vocabulary Richness");
        assert_eq!(metric_label("audio_quality"), "Audio Quality");
        assert_eq!(
            metric_label("accentSimilarityToAmericanEnglish"),
            "Accent Similarity To American English"
        );
        assert_eq!(metric_label("fluency"), "Fluency");
    }

    #[test]
    fn view_keeps_raw_value_next_to_clamped_display() {
        let report = EvaluationReport {
            transcription: "ok".into(),
            scores: vec![metric("fluency", 130.0), metric("clarity", -10.0)],
            suggestions: vec![],
            length: None,
        };
        let view = ReportView::from_report(&report);

        assert_eq!(view.scores[0].value, 130.0);
        assert_eq!(view.scores[0].display, 100.0);
        assert_eq!(view.scores[1].value, -10.0);
        assert_eq!(view.scores[1].display, 0.0);
        // mean is over raw values
        assert_eq!(view.mean_score, Some(60.0));
        assert_eq!(
            view.feedback.map(|f| f.verdict),
            Some(FeedbackVerdict::Neutral)
        );
    }

    #[test]
    fn no_scores_means_no_verdict() {
        let report = EvaluationReport {
            transcription: String::new(),
            scores: vec![],
            suggestions: vec![],
            length: None,
        };
        let view = ReportView::from_report(&report);
        assert_eq!(view.mean_score, None);
        assert!(view.feedback.is_none());
    }
}
