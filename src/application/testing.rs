//! Test doubles shared by the application and presentation tests.

use super::submission::PredictionService;
use crate::domain::{
    FieldName, FieldSet, PredictionError, PredictionRequest, ReferenceOptions, StrategyResponse,
};
use std::collections::VecDeque;
use std::sync::{Arc, Barrier, Mutex};

/// Replies from a script and records every request it receives.
pub struct ScriptedService {
    replies: Mutex<VecDeque<Result<StrategyResponse, PredictionError>>>,
    fallback: Result<StrategyResponse, PredictionError>,
    requests: Mutex<Vec<PredictionRequest>>,
    gate: Option<Arc<Barrier>>,
}

impl ScriptedService {
    pub fn succeeding(response: StrategyResponse) -> Self {
        Self::with_fallback(Ok(response))
    }

    pub fn failing(error: PredictionError) -> Self {
        Self::with_fallback(Err(error))
    }

    fn with_fallback(fallback: Result<StrategyResponse, PredictionError>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback,
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Queues replies that are used, in order, before the fallback.
    pub fn then(self, reply: Result<StrategyResponse, PredictionError>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    /// Makes every call wait on `gate` before replying.
    pub fn gated(mut self, gate: Arc<Barrier>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn requests(&self) -> Vec<PredictionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl PredictionService for ScriptedService {
    fn predict(&self, request: &PredictionRequest) -> Result<StrategyResponse, PredictionError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.wait();
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

pub fn sample_options() -> ReferenceOptions {
    ReferenceOptions {
        tracks: vec!["Bahrain".to_string(), "Monza".to_string(), "Imola".to_string()],
        teams: vec!["Ferrari".to_string(), "McLaren".to_string()],
        drivers: vec!["Leclerc".to_string(), "Norris".to_string(), "Sainz".to_string()],
    }
}

pub fn filled_fields() -> FieldSet {
    FieldSet::initialize()
        .on_field_change(FieldName::Track, "Monza")
        .on_field_change(FieldName::Year, "2021")
        .on_field_change(FieldName::Team, "Ferrari")
        .on_field_change(FieldName::Driver, "Leclerc")
        .on_field_change(FieldName::AirTemp, "25")
        .on_field_change(FieldName::TrackTemp, "40")
        .on_field_change(FieldName::Rainfall, "0")
}
