use thiserror::Error;

/// Shown when the service rejects a request without saying why.
pub const PREDICTION_FAILED: &str = "Prediction failed.";
/// Shown for network and decoding failures; the cause only goes to the log.
pub const GENERIC_FAILURE: &str = "An error occurred.";

/// Why a prediction round-trip did not produce a result.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("service returned {status}: {}", .message.as_deref().unwrap_or("<no message>"))]
    Service { status: u16, message: Option<String> },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("response contains invalid values: {0}")]
    InvalidResult(String),
    #[error("prediction worker stopped without reporting")]
    WorkerLost,
}

impl PredictionError {
    /// Text to show the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            PredictionError::Service {
                message: Some(msg), ..
            } => msg.clone(),
            PredictionError::Service { message: None, .. } => PREDICTION_FAILED.to_string(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }

    pub fn is_service_reported(&self) -> bool {
        matches!(self, PredictionError::Service { .. })
    }
}

/// Invalid configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("prediction endpoint is empty")]
    EmptyEndpoint,
    #[error("prediction endpoint must be an http(s) URL, got '{0}'")]
    UnsupportedScheme(String),
    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
    #[error("fixed MIME type must look like 'image/<subtype>', got '{0}'")]
    BadMime(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_message_is_shown_verbatim() {
        let err = PredictionError::Service {
            status: 400,
            message: Some("unsupported file type".into()),
        };
        assert_eq!(err.user_message(), "unsupported file type");
        assert!(err.is_service_reported());
    }

    #[test]
    fn service_without_message_uses_fallback() {
        let err = PredictionError::Service {
            status: 500,
            message: None,
        };
        assert_eq!(err.user_message(), PREDICTION_FAILED);
    }

    #[test]
    fn decode_and_worker_failures_hide_cause() {
        let decode = PredictionError::Decode("expected value at line 1".into());
        assert_eq!(decode.user_message(), GENERIC_FAILURE);
        assert!(!decode.is_service_reported());
        assert_eq!(PredictionError::WorkerLost.user_message(), GENERIC_FAILURE);
        assert_eq!(
            PredictionError::InvalidResult("confidence 3".into()).user_message(),
            GENERIC_FAILURE
        );
    }
}
