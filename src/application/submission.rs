//! Submission of field sets to the prediction service.
//!
//! Validation runs on the caller's thread so problems are reported at
//! once; only the network call is handed to a worker. At most one request
//! is in flight at a time.

use crate::domain::{
    build_request, FieldSet, PredictionError, PredictionRequest, PredictionResult,
    ReferenceOptions, StrategyResponse, SubmitError, ValidationError,
};
use std::fmt;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
#[cfg(test)]
use std::sync::mpsc::RecvTimeoutError;
#[cfg(test)]
use std::time::Duration;

/// Result of one submission attempt.
pub type Outcome = Result<PredictionResult, SubmitError>;

/// Something that turns a request into a predicted strategy.
///
/// Implementations make exactly one attempt per call: no retry, no
/// timeout.
pub trait PredictionService: Send + Sync {
    fn predict(&self, request: &PredictionRequest) -> Result<StrategyResponse, PredictionError>;
}

/// Sends an already validated request and pairs the response with it.
pub fn request_prediction<S: PredictionService + ?Sized>(
    service: &S,
    request: PredictionRequest,
) -> Outcome {
    let strategy = service.predict(&request)?;
    Ok(PredictionResult { inputs: request, strategy })
}

/// What happened to a submit that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// The request is now in flight.
    Started(PredictionRequest),
    /// Another request is still pending; nothing was sent.
    Busy,
}

/// Runs prediction requests on a background thread, one at a time.
pub struct SubmissionController {
    service: Arc<dyn PredictionService>,
    pending: Option<Receiver<Outcome>>,
}

impl fmt::Debug for SubmissionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmissionController")
            .field("in_flight", &self.is_in_flight())
            .finish_non_exhaustive()
    }
}

impl SubmissionController {
    pub fn new(service: Arc<dyn PredictionService>) -> Self {
        Self { service, pending: None }
    }

    pub fn is_in_flight(&self) -> bool {
        self.pending.is_some()
    }

    /// Validates `fields` and, if they are complete, starts exactly one
    /// prediction request for them.
    ///
    /// While a request is pending nothing is validated or sent and
    /// [`Dispatch::Busy`] is returned.
    pub fn submit(
        &mut self,
        fields: &FieldSet,
        options: &ReferenceOptions,
    ) -> Result<Dispatch, ValidationError> {
        if self.is_in_flight() {
            return Ok(Dispatch::Busy);
        }

        let request = build_request(fields, options)?;
        self.dispatch(request.clone());
        Ok(Dispatch::Started(request))
    }

    fn dispatch(&mut self, request: PredictionRequest) -> bool {
        if self.is_in_flight() {
            return false;
        }

        let (sender, receiver) = mpsc::channel();
        let service = Arc::clone(&self.service);
        thread::spawn(move || {
            let outcome = request_prediction(service.as_ref(), request);
            // The receiver is gone only if the app already quit.
            let _ = sender.send(outcome);
        });

        self.pending = Some(receiver);
        true
    }

    /// Returns the outcome of the in-flight request if it has resolved.
    pub fn poll(&mut self) -> Option<Outcome> {
        let receiver = self.pending.as_ref()?;
        match receiver.try_recv() {
            Ok(outcome) => {
                self.pending = None;
                Some(outcome)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.pending = None;
                Some(Err(worker_stopped()))
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn wait(&mut self, timeout: Duration) -> Option<Outcome> {
        let receiver = self.pending.as_ref()?;
        match receiver.recv_timeout(timeout) {
            Ok(outcome) => {
                self.pending = None;
                Some(outcome)
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                self.pending = None;
                Some(Err(worker_stopped()))
            }
        }
    }
}

fn worker_stopped() -> SubmitError {
    SubmitError::Prediction(PredictionError::Connection(
        "request worker stopped before responding".to_string(),
    ))
}
