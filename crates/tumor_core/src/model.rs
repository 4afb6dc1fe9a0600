use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Image chosen by the user, held until it is submitted.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a file from disk. No type or size checks are applied.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("cannot read image file: {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }
}

// Payloads can be several megabytes; keep them out of log lines.
impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Probability the service assigned to one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassProbability {
    pub class: String,
    /// Always in [0,1].
    pub probability: f64,
}

/// Successful classification returned by the prediction service.
///
/// Only constructed through [`PredictionResult::new`], which rejects
/// confidences or probabilities outside [0,1].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    prediction: String,
    confidence: f64,
    /// In the order the service listed them.
    probabilities: Vec<ClassProbability>,
}

impl PredictionResult {
    pub fn new(
        prediction: impl Into<String>,
        confidence: f64,
        probabilities: Vec<ClassProbability>,
    ) -> std::result::Result<Self, String> {
        if !is_unit_interval(confidence) {
            return Err(format!("confidence {confidence} is outside [0,1]"));
        }
        if let Some(bad) = probabilities
            .iter()
            .find(|p| !is_unit_interval(p.probability))
        {
            return Err(format!(
                "probability {} for class '{}' is outside [0,1]",
                bad.probability, bad.class
            ));
        }
        Ok(Self {
            prediction: prediction.into(),
            confidence,
            probabilities,
        })
    }

    pub fn prediction(&self) -> &str {
        &self.prediction
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn probabilities(&self) -> &[ClassProbability] {
        &self.probabilities
    }
}

fn is_unit_interval(v: f64) -> bool {
    v.is_finite() && (0.0..=1.0).contains(&v)
}

/// Human-readable error text shown in place of a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureMessage(String);

impl FailureMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FailureMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
