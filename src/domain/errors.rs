use thiserror::Error;
use super::models::FieldName;

/// A single problem found while checking a field set before submission.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldIssue {
    #[error("{0} is required")]
    Missing(FieldName),
    #[error("{field} is not a number: {raw:?}")]
    NotNumeric { field: FieldName, raw: String },
    #[error("{field} must be a whole number, got {value}")]
    NotWholeNumber { field: FieldName, value: f64 },
    #[error("{field} is out of range: {value}")]
    OutOfRange { field: FieldName, value: f64 },
    #[error("{field} is not a known option: {value:?}")]
    UnknownOption { field: FieldName, value: String },
}

impl FieldIssue {
    pub fn field(&self) -> FieldName {
        match self {
            FieldIssue::Missing(field) => *field,
            FieldIssue::NotNumeric { field, .. }
            | FieldIssue::NotWholeNumber { field, .. }
            | FieldIssue::OutOfRange { field, .. }
            | FieldIssue::UnknownOption { field, .. } => *field,
        }
    }
}

/// Every issue that prevents a field set from becoming a request.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", format_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

fn format_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("- {issue}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Failure reported by the prediction service or the transport to it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    #[error("could not reach prediction service: {0}")]
    Connection(String),
    #[error("prediction service returned {code}: {body}")]
    Status { code: u16, body: String },
    #[error("malformed prediction response: {0}")]
    MalformedBody(String),
}

/// Why a submission attempt did not produce a result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Prediction(#[from] PredictionError),
}
