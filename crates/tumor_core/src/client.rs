use crate::config::ClientConfig;
use crate::encoding::DataUri;
use crate::error::PredictionError;
use crate::model::{ClassProbability, PredictionResult};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Anything that can turn an encoded image into a classification.
pub trait PredictionService {
    fn predict(&self, image: &DataUri) -> Result<PredictionResult, PredictionError>;
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    image: &'a str,
}

#[derive(Deserialize)]
struct PredictResponse {
    prediction: String,
    confidence: f64,
    probabilities: Map<String, Value>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
}

/// Blocking HTTP client for `POST /predict`.
#[derive(Debug, Clone)]
pub struct HttpPredictionClient {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpPredictionClient {
    pub fn new(cfg: &ClientConfig) -> Result<Self> {
        cfg.validate()?;
        let http = reqwest::blocking::Client::builder()
            .timeout(cfg.timeout())
            .connect_timeout(cfg.connect_timeout())
            .build()
            .context("cannot build HTTP client")?;
        Ok(Self {
            http,
            endpoint: cfg.endpoint.trim().to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl PredictionService for HttpPredictionClient {
    fn predict(&self, image: &DataUri) -> Result<PredictionResult, PredictionError> {
        debug!("POST {} ({} byte payload)", self.endpoint, image.len());
        let response = self
            .http
            .post(&self.endpoint)
            .json(&PredictRequest {
                image: image.as_str(),
            })
            .send()?;
        let status = response.status();
        let body = response.text()?;

        if status.is_success() {
            let result = parse_success(&body)?;
            info!(
                "prediction '{}' ({:.3})",
                result.prediction(),
                result.confidence()
            );
            Ok(result)
        } else {
            let message = parse_error_message(&body).map_err(|e| {
                PredictionError::Decode(format!("{status} response is not JSON: {e}"))
            })?;
            warn!("prediction service returned {status}: {message:?}");
            Err(PredictionError::Service {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Decode and validate the body of a successful response.
pub fn parse_success(body: &str) -> Result<PredictionResult, PredictionError> {
    let raw: PredictResponse =
        serde_json::from_str(body).map_err(|e| PredictionError::Decode(e.to_string()))?;
    let mut probabilities = Vec::with_capacity(raw.probabilities.len());
    for (class, value) in raw.probabilities {
        let probability = value.as_f64().ok_or_else(|| {
            PredictionError::Decode(format!("probability for '{class}' is not a number"))
        })?;
        probabilities.push(ClassProbability { class, probability });
    }
    PredictionResult::new(raw.prediction, raw.confidence, probabilities)
        .map_err(PredictionError::InvalidResult)
}

/// Extract `error` from a failure body. `Ok(None)` when the body is JSON
/// without a message; a body that is not JSON at all is an error.
pub fn parse_error_message(body: &str) -> Result<Option<String>, serde_json::Error> {
    serde_json::from_str::<ErrorResponse>(body).map(|r| r.error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn parses_success_body_in_service_order() {
        let body = r#"{"prediction":"glioma","confidence":0.92,
            "probabilities":{"notumor":0.01,"glioma":0.92,"meningioma":0.05,"pituitary":0.02}}"#;
        let r = parse_success(body).unwrap();
        assert_eq!(r.prediction(), "glioma");
        assert_relative_eq!(r.confidence(), 0.92);
        let classes: Vec<&str> = r.probabilities().iter().map(|p| p.class.as_str()).collect();
        assert_eq!(classes, vec!["notumor", "glioma", "meningioma", "pituitary"]);
    }

    #[test]
    fn integer_probabilities_are_accepted() {
        let body = r#"{"prediction":"notumor","confidence":1,"probabilities":{"notumor":1,"glioma":0}}"#;
        let r = parse_success(body).unwrap();
        assert_relative_eq!(r.probabilities()[0].probability, 1.0);
    }

    #[test]
    fn missing_fields_are_decode_errors() {
        let err = parse_success(r#"{"prediction":"glioma"}"#).unwrap_err();
        assert!(matches!(err, PredictionError::Decode(_)));
    }

    #[test]
    fn non_numeric_probability_is_a_decode_error() {
        let body = r#"{"prediction":"glioma","confidence":0.9,"probabilities":{"glioma":"high"}}"#;
        let err = parse_success(body).unwrap_err();
        assert!(matches!(err, PredictionError::Decode(msg) if msg.contains("glioma")));
    }

    #[test]
    fn out_of_range_confidence_is_invalid() {
        let body = r#"{"prediction":"glioma","confidence":92,"probabilities":{}}"#;
        assert!(matches!(
            parse_success(body).unwrap_err(),
            PredictionError::InvalidResult(_)
        ));
    }

    #[test]
    fn error_message_extraction() {
        assert_eq!(
            parse_error_message(r#"{"error":"unsupported file type"}"#)
                .unwrap()
                .as_deref(),
            Some("unsupported file type")
        );
        assert_eq!(parse_error_message(r#"{"detail":"nope"}"#).unwrap(), None);
        assert_eq!(parse_error_message(r#"{"error":null}"#).unwrap(), None);
    }

    #[test]
    fn non_json_error_body_is_unreadable() {
        assert!(parse_error_message("<html>502 Bad Gateway</html>").is_err());
        assert!(parse_error_message("").is_err());
    }

    #[test]
    fn client_rejects_invalid_config() {
        let cfg = ClientConfig {
            endpoint: String::new(),
            ..ClientConfig::default()
        };
        assert!(HttpPredictionClient::new(&cfg).is_err());
    }
}
