use base64::{Engine, prelude::BASE64_STANDARD};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_MIME: &str = "image/jpeg";

/// How the MIME type in the data URI is chosen.
///
/// The prediction service has always been sent `image/jpeg` whatever the
/// upload actually is, so that stays the default. `Detect` sniffs the bytes
/// instead and should only be enabled once the service is known to accept
/// other declared types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MimePolicy {
    Fixed(String),
    Detect,
}

impl Default for MimePolicy {
    fn default() -> Self {
        MimePolicy::Fixed(DEFAULT_MIME.to_string())
    }
}

impl MimePolicy {
    pub fn mime_for(&self, bytes: &[u8]) -> String {
        match self {
            MimePolicy::Fixed(mime) => mime.clone(),
            MimePolicy::Detect => match image::guess_format(bytes) {
                Ok(format) => format.to_mime_type().to_string(),
                Err(_) => {
                    tracing::debug!("unrecognised image format, declaring {DEFAULT_MIME}");
                    DEFAULT_MIME.to_string()
                }
            },
        }
    }
}

/// `data:<mime>;base64,<payload>` string carried in the request body.
#[derive(Clone, PartialEq, Eq)]
pub struct DataUri(String);

impl DataUri {
    pub fn encode(bytes: &[u8], policy: &MimePolicy) -> Self {
        let mime = policy.mime_for(bytes);
        let payload = BASE64_STANDARD.encode(bytes);
        Self(format!("data:{mime};base64,{payload}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn mime(&self) -> &str {
        self.0
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(';'))
            .map(|(mime, _)| mime)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataUri({}, {} bytes)", self.mime(), self.0.len())
    }
}
