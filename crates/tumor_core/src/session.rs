//! Upload form state: the selected image, its preview, and the outcome of
//! the latest submission.
//!
//! Legal transitions:
//!
//! ```text
//! Idle --select--> Idle --submit--> InFlight --finish--> Succeeded | Failed
//! Succeeded | Failed --select--> Idle
//! Succeeded | Failed --submit--> InFlight
//! ```

use crate::encoding::{DataUri, MimePolicy};
use crate::model::{FailureMessage, PredictionResult, SelectedFile};
use crate::task::Outcome;
use tracing::{info, warn};

/// Identifies one submission so late completions can be recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(pub u64);

/// What the form is currently showing besides the selection.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Phase {
    #[default]
    Idle,
    InFlight { ticket: Ticket },
    Succeeded(PredictionResult),
    Failed(FailureMessage),
}

/// Everything a worker needs to send one request.
#[derive(Debug, Clone)]
pub struct Submission {
    pub ticket: Ticket,
    pub file_name: String,
    pub image: DataUri,
}

struct Selection<H> {
    file: SelectedFile,
    preview: H,
}

/// Single-image upload session.
///
/// `H` is whatever the front end uses to display the preview (a texture, a
/// temporary file, ...). It is owned here, so replacing the selection or
/// dropping the session releases it.
pub struct Session<H> {
    selection: Option<Selection<H>>,
    phase: Phase,
    next_ticket: u64,
}

impl<H> Default for Session<H> {
    fn default() -> Self {
        Self {
            selection: None,
            phase: Phase::Idle,
            next_ticket: 1,
        }
    }
}

impl<H> Session<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selected file. The previous preview and any shown result
    /// or error are dropped before `make_preview` runs.
    ///
    /// Refused (returns `false`) while a request is in flight.
    pub fn select_file<F>(&mut self, file: SelectedFile, make_preview: F) -> bool
    where
        F: FnOnce(&SelectedFile) -> H,
    {
        if self.is_in_flight() {
            warn!("ignoring selection of {} while analysing", file.name);
            return false;
        }
        self.selection = None;
        self.phase = Phase::Idle;
        let preview = make_preview(&file);
        info!("selected {} ({} bytes)", file.name, file.bytes.len());
        self.selection = Some(Selection { file, preview });
        true
    }

    pub fn can_submit(&self) -> bool {
        self.selection.is_some() && !self.is_in_flight()
    }

    /// Enter the in-flight state and hand back the encoded request.
    /// `None` when nothing is selected or a request is already running.
    pub fn begin_submission(&mut self, mime: &MimePolicy) -> Option<Submission> {
        if !self.can_submit() {
            return None;
        }
        let selection = self.selection.as_ref()?;
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        let image = DataUri::encode(&selection.file.bytes, mime);
        info!("submitting {} as {:?}", selection.file.name, image);
        self.phase = Phase::InFlight { ticket };
        Some(Submission {
            ticket,
            file_name: selection.file.name.clone(),
            image,
        })
    }

    /// Apply the outcome of the submission identified by `ticket`.
    /// Outcomes for any other ticket are ignored and `false` is returned.
    pub fn finish_submission(&mut self, ticket: Ticket, outcome: Outcome) -> bool {
        match self.phase {
            Phase::InFlight { ticket: current } if current == ticket => {}
            _ => {
                warn!("dropping stale outcome for {ticket:?}");
                return false;
            }
        }
        self.phase = match outcome {
            Ok(result) => Phase::Succeeded(result),
            Err(err) => {
                if err.is_service_reported() {
                    warn!("prediction rejected: {err}");
                } else {
                    warn!("prediction failed: {err}");
                }
                Phase::Failed(FailureMessage::new(err.user_message()))
            }
        };
        true
    }

    /// Drop the selection, its preview and any shown outcome.
    ///
    /// Refused (returns `false`) while a request is in flight, so an outcome
    /// never arrives without the file it belongs to.
    pub fn clear(&mut self) -> bool {
        if self.is_in_flight() {
            warn!("ignoring clear while analysing");
            return false;
        }
        self.selection = None;
        self.phase = Phase::Idle;
        true
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.phase, Phase::InFlight { .. })
    }

    pub fn selected_file_name(&self) -> Option<&str> {
        self.selection.as_ref().map(|s| s.file.name.as_str())
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selection.as_ref().map(|s| &s.file)
    }

    pub fn preview(&self) -> Option<&H> {
        self.selection.as_ref().map(|s| &s.preview)
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        match &self.phase {
            Phase::Succeeded(r) => Some(r),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureMessage> {
        match &self.phase {
            Phase::Failed(m) => Some(m),
            _ => None,
        }
    }
}
