//! Client side of the brain MRI classifier: image selection, the request to
//! the prediction service, and the view model for its answer.

pub mod client;
pub mod config;
pub mod encoding;
pub mod error;
pub mod model;
pub mod report;
pub mod session;
pub mod task;

pub use client::{HttpPredictionClient, PredictionService};
pub use config::{AppConfig, ClientConfig};
pub use encoding::{DataUri, MimePolicy};
pub use error::{ConfigError, PredictionError};
pub use model::{ClassProbability, FailureMessage, PredictionResult, SelectedFile};
pub use report::{ConfidenceTier, ProbabilityRow, ResultView};
pub use session::{Phase, Session, Submission, Ticket};
pub use task::{Outcome, PredictionTask};
