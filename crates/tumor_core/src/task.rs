use crate::client::PredictionService;
use crate::error::PredictionError;
use crate::model::PredictionResult;
use crate::session::{Submission, Ticket};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

pub type Outcome = Result<PredictionResult, PredictionError>;

/// One prediction request running on a worker thread.
///
/// The request cannot be cancelled; the client's timeout bounds how long it
/// runs. Exactly one outcome is produced.
pub struct PredictionTask {
    ticket: Ticket,
    rx: Receiver<Outcome>,
    done: bool,
}

impl PredictionTask {
    pub fn spawn(service: Arc<dyn PredictionService + Send + Sync>, submission: Submission) -> Self {
        let (tx, rx) = mpsc::channel();
        let ticket = submission.ticket;
        let spawned = thread::Builder::new()
            .name(format!("predict-{}", ticket.0))
            .spawn(move || {
                let outcome = service.predict(&submission.image);
                // Receiver gone means the UI was torn down.
                let _ = tx.send(outcome);
            });
        if let Err(e) = spawned {
            tracing::warn!("could not start prediction worker: {e}");
        }
        Self {
            ticket,
            rx,
            done: false,
        }
    }

    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Non-blocking poll. Returns the outcome once; `None` while running and
    /// after the outcome was taken.
    pub fn try_finish(&mut self) -> Option<(Ticket, Outcome)> {
        if self.done {
            return None;
        }
        let outcome = match self.rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(PredictionError::WorkerLost),
        };
        self.done = true;
        Some((self.ticket, outcome))
    }

    /// Block until the worker reports.
    pub fn wait(self) -> (Ticket, Outcome) {
        let outcome = self.rx.recv().unwrap_or(Err(PredictionError::WorkerLost));
        (self.ticket, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{DataUri, MimePolicy};
    use crate::model::ClassProbability;
    use std::sync::Mutex;
    use std::sync::mpsc::Sender;
    use std::time::{Duration, Instant};

    fn submission(ticket: u64) -> Submission {
        Submission {
            ticket: Ticket(ticket),
            file_name: "scan.jpg".into(),
            image: DataUri::encode(b"bytes", &MimePolicy::default()),
        }
    }

    struct Fixed;

    impl PredictionService for Fixed {
        fn predict(&self, _image: &DataUri) -> Outcome {
            Ok(PredictionResult::new(
                "pituitary",
                0.7,
                vec![ClassProbability {
                    class: "pituitary".into(),
                    probability: 0.7,
                }],
            )
            .unwrap())
        }
    }

    struct Panics;

    impl PredictionService for Panics {
        fn predict(&self, _image: &DataUri) -> Outcome {
            panic!("worker blew up");
        }
    }

    /// Blocks until the test releases it.
    struct Gated(Mutex<Option<Receiver<()>>>);

    impl PredictionService for Gated {
        fn predict(&self, _image: &DataUri) -> Outcome {
            if let Some(rx) = self.0.lock().unwrap().take() {
                let _ = rx.recv();
            }
            Err(PredictionError::Service {
                status: 422,
                message: Some("late".into()),
            })
        }
    }

    fn poll_until_done(task: &mut PredictionTask) -> (Ticket, Outcome) {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(done) = task.try_finish() {
                return done;
            }
            assert!(Instant::now() < deadline, "task did not finish");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn wait_returns_service_outcome() {
        let task = PredictionTask::spawn(Arc::new(Fixed), submission(3));
        let (ticket, outcome) = task.wait();
        assert_eq!(ticket, Ticket(3));
        assert_eq!(outcome.unwrap().prediction(), "pituitary");
    }

    #[test]
    fn try_finish_yields_outcome_exactly_once() {
        let mut task = PredictionTask::spawn(Arc::new(Fixed), submission(1));
        let (_, outcome) = poll_until_done(&mut task);
        assert!(outcome.is_ok());
        assert!(task.try_finish().is_none());
    }

    #[test]
    fn pending_until_service_returns() {
        let (release, gate): (Sender<()>, Receiver<()>) = mpsc::channel();
        let service = Arc::new(Gated(Mutex::new(Some(gate))));
        let mut task = PredictionTask::spawn(service, submission(9));
        assert!(task.try_finish().is_none());
        release.send(()).unwrap();
        let (ticket, outcome) = poll_until_done(&mut task);
        assert_eq!(ticket, Ticket(9));
        assert_eq!(outcome.unwrap_err().user_message(), "late");
    }

    #[test]
    fn panicking_worker_reports_worker_lost() {
        let mut task = PredictionTask::spawn(Arc::new(Panics), submission(2));
        let (_, outcome) = poll_until_done(&mut task);
        assert!(matches!(outcome, Err(PredictionError::WorkerLost)));
    }
}
