//! Presentation model for a prediction result.

use crate::model::PredictionResult;
use serde::Serialize;

/// Display bucket for a confidence value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.8 {
            ConfidenceTier::High
        } else if confidence >= 0.6 {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConfidenceTier::High => "High Confidence",
            ConfidenceTier::Medium => "Medium Confidence",
            ConfidenceTier::Low => "Low Confidence",
        }
    }
}

/// `0.92` -> `"92.0%"`.
pub fn format_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// Class key as shown to the user: first underscore becomes a space and
/// every word starts with a capital (`no_tumor` -> `No Tumor`).
pub fn display_class_name(class: &str) -> String {
    let spaced = class.replacen('_', " ", 1);
    spaced
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbabilityRow {
    pub class: String,
    pub display_name: String,
    /// Bar width in [0,1].
    pub fraction: f32,
    pub percent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub label: String,
    pub confidence: f32,
    pub confidence_text: String,
    pub tier: ConfidenceTier,
    /// Highest probability first; ties keep the service's order.
    pub rows: Vec<ProbabilityRow>,
}

impl ResultView {
    pub fn from_result(result: &PredictionResult) -> Self {
        let mut ranked: Vec<_> = result.probabilities().iter().collect();
        ranked.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        let rows = ranked
            .into_iter()
            .map(|p| ProbabilityRow {
                class: p.class.clone(),
                display_name: display_class_name(&p.class),
                fraction: bar_fraction(p.probability),
                percent: format_percent(p.probability),
            })
            .collect();
        Self {
            label: result.prediction().to_string(),
            confidence: bar_fraction(result.confidence()),
            confidence_text: format_percent(result.confidence()),
            tier: ConfidenceTier::from_confidence(result.confidence()),
            rows,
        }
    }
}

fn bar_fraction(v: f64) -> f32 {
    v.clamp(0.0, 1.0) as f32
}
