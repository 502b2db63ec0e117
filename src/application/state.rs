//! Application state for the race strategy terminal client.
//!
//! This module contains the form state, the current prediction result and
//! the mode management that drives the terminal user interface.

use super::submission::{Dispatch, Outcome, PredictionService, SubmissionController};
use crate::domain::{
    strategy_summary, FieldKind, FieldName, FieldSet, PredictionResult,
    ReferenceOptions, SubmitError,
};
use std::sync::Arc;
#[cfg(test)]
use std::time::Duration;

/// Represents the current mode of the application.
///
/// The mode determines how key presses are interpreted and which popups
/// are drawn over the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Field navigation - arrow keys move between fields, shortcuts available
    Normal,
    /// Typing into a numeric field
    Editing,
    /// Picking a value for a categorical field from its reference list
    Choosing,
    /// Help screen is displayed
    Help,
    /// CSV export filename prompt is open
    ExportCsv,
    /// A blocking notification is displayed and must be dismissed
    Alert,
}

/// A blocking message shown after a failed submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

/// Main application state containing the form, the result and UI state.
///
/// The field set is the single source of truth for what gets submitted.
/// Each edit replaces it with a new value; the result section is redrawn
/// from it on every frame.
#[derive(Debug)]
pub struct App {
    /// Current form inputs
    pub fields: FieldSet,
    /// Valid values for track, team and driver
    pub options: ReferenceOptions,
    /// Last successful prediction, if any
    pub result: Option<PredictionResult>,
    /// Index into `FieldName::ALL` of the highlighted field
    pub selected_field: usize,
    /// Current application mode
    pub mode: AppMode,
    /// Mode to return to when the alert is dismissed
    pub alert_return_mode: AppMode,
    /// Current input buffer (for editing mode)
    pub input: String,
    /// Cursor position within the active input buffer
    pub cursor_position: usize,
    /// Highlighted entry while choosing a categorical value
    pub choice_index: usize,
    /// Scroll position in help text
    pub help_scroll: usize,
    /// Temporary status message to display
    pub status_message: Option<String>,
    /// Input buffer for filename entry
    pub filename_input: String,
    /// Blocking notification, shown while in alert mode
    pub notification: Option<Notification>,
    /// Number of submissions that ended in a notification
    pub failed_submissions: usize,
    /// Background request runner
    pub submissions: SubmissionController,
}

impl App {
    /// Creates the application with a default-seeded form.
    ///
    /// # Arguments
    ///
    /// * `options` - Reference lists for the categorical fields
    /// * `service` - Prediction service used for submissions
    pub fn new(options: ReferenceOptions, service: Arc<dyn PredictionService>) -> Self {
        Self {
            fields: FieldSet::initialize(),
            options,
            result: None,
            selected_field: 0,
            mode: AppMode::Normal,
            alert_return_mode: AppMode::Normal,
            input: String::new(),
            cursor_position: 0,
            choice_index: 0,
            help_scroll: 0,
            status_message: None,
            filename_input: String::new(),
            notification: None,
            failed_submissions: 0,
            submissions: SubmissionController::new(service),
        }
    }

    pub fn selected_field_name(&self) -> FieldName {
        FieldName::ALL[self.selected_field.min(FieldName::ALL.len() - 1)]
    }

    pub fn select_next_field(&mut self) {
        if self.selected_field < FieldName::ALL.len() - 1 {
            self.selected_field += 1;
        }
    }

    pub fn select_previous_field(&mut self) {
        self.selected_field = self.selected_field.saturating_sub(1);
    }

    /// Applies a field change and makes the result the current form state.
    ///
    /// # Arguments
    ///
    /// * `name` - Field being edited
    /// * `raw` - Raw text entered by the user, coerced by the field's kind
    pub fn on_field_change(&mut self, name: FieldName, raw: &str) {
        self.fields = self.fields.on_field_change(name, raw);
    }

    /// Starts editing the selected field.
    ///
    /// Numeric fields open the inline editor preloaded with the current
    /// text. Categorical fields open the option picker positioned on the
    /// current value.
    pub fn start_editing(&mut self) {
        let name = self.selected_field_name();
        let current = self.fields.get(name).display();

        match name.kind() {
            FieldKind::Numeric => {
                self.mode = AppMode::Editing;
                self.input = current;
                self.cursor_position = self.input.len();
            }
            FieldKind::Categorical => {
                let choices = self.options.for_field(name);
                if choices.is_empty() {
                    self.status_message = Some(format!("No {} options loaded", name.label().to_lowercase()));
                    return;
                }
                self.choice_index = choices.iter().position(|c| *c == current).unwrap_or(0);
                self.mode = AppMode::Choosing;
            }
        }
    }

    /// Commits the input buffer to the selected field and returns to
    /// normal mode, moving the selection down one field.
    pub fn finish_editing(&mut self) {
        let name = self.selected_field_name();
        let input = std::mem::take(&mut self.input);
        self.on_field_change(name, &input);
        self.select_next_field();

        self.mode = AppMode::Normal;
        self.cursor_position = 0;
    }

    /// Cancels editing and returns to normal mode without changing the field.
    pub fn cancel_editing(&mut self) {
        self.mode = AppMode::Normal;
        self.input.clear();
        self.cursor_position = 0;
    }

    pub fn next_choice(&mut self) {
        let count = self.options.for_field(self.selected_field_name()).len();
        if self.choice_index + 1 < count {
            self.choice_index += 1;
        }
    }

    pub fn previous_choice(&mut self) {
        self.choice_index = self.choice_index.saturating_sub(1);
    }

    /// Writes the highlighted option into the selected field.
    pub fn confirm_choice(&mut self) {
        let name = self.selected_field_name();
        if let Some(choice) = self.options.for_field(name).get(self.choice_index).cloned() {
            self.on_field_change(name, &choice);
            self.select_next_field();
        }
        self.mode = AppMode::Normal;
        self.choice_index = 0;
    }

    pub fn cancel_choice(&mut self) {
        self.mode = AppMode::Normal;
        self.choice_index = 0;
    }

    pub fn is_submitting(&self) -> bool {
        self.submissions.is_in_flight()
    }

    /// Validates the form and starts a prediction request.
    ///
    /// Validation failures raise a notification without sending anything.
    /// Only one request may be in flight; a submit while one is pending is
    /// refused with a status message.
    pub fn submit(&mut self) {
        match self.submissions.submit(&self.fields, &self.options) {
            Ok(Dispatch::Started(request)) => {
                tracing::info!(
                    track = %request.track,
                    year = request.year,
                    team = %request.team,
                    driver = %request.driver,
                    "submitting prediction request"
                );
                self.status_message = Some("Requesting prediction...".to_string());
            }
            Ok(Dispatch::Busy) => {
                tracing::debug!("submit ignored, request already in flight");
                self.status_message = Some("A prediction request is already in flight".to_string());
            }
            Err(err) => self.apply_outcome(Err(err.into())),
        }
    }

    /// Applies the outcome of the in-flight request if it has resolved.
    ///
    /// # Returns
    ///
    /// `true` if an outcome was applied
    pub fn poll_submission(&mut self) -> bool {
        match self.submissions.poll() {
            Some(outcome) => {
                self.apply_outcome(outcome);
                true
            }
            None => false,
        }
    }

    /// Waits up to `timeout` for the in-flight request and applies its outcome.
    #[cfg(test)]
    pub(crate) fn wait_for_submission(&mut self, timeout: Duration) -> bool {
        match self.submissions.wait(timeout) {
            Some(outcome) => {
                self.apply_outcome(outcome);
                true
            }
            None => false,
        }
    }

    /// Transitions the view for a finished submission.
    ///
    /// Success replaces the displayed result wholesale. Failure leaves the
    /// previous result untouched and raises exactly one notification.
    pub fn apply_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Ok(result) => {
                tracing::info!(
                    total_pitstops = result.strategy.total_pitstops,
                    stops = result.strategy.tire_strategy.len(),
                    "prediction received"
                );
                self.result = Some(result);
                self.status_message = Some("Prediction received".to_string());
            }
            Err(SubmitError::Validation(err)) => {
                tracing::warn!(issues = err.issues.len(), "submission blocked by validation");
                self.failed_submissions += 1;
                self.status_message = None;
                self.notify("Cannot submit", err.to_string());
            }
            Err(SubmitError::Prediction(err)) => {
                tracing::error!(error = %err, "submission failed");
                self.failed_submissions += 1;
                self.status_message = None;
                self.notify("Error submitting form", err.to_string());
            }
        }
    }

    /// Shows a blocking notification over whatever mode is active.
    pub fn notify(&mut self, title: impl Into<String>, body: impl Into<String>) {
        if self.mode != AppMode::Alert {
            self.alert_return_mode = self.mode;
        }
        self.notification = Some(Notification {
            title: title.into(),
            body: body.into(),
        });
        self.mode = AppMode::Alert;
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
        self.mode = self.alert_return_mode;
        self.alert_return_mode = AppMode::Normal;
    }

    /// Switches to CSV export mode to prompt for a filename.
    ///
    /// Refused with a status message when there is no result to export.
    pub fn start_csv_export(&mut self) {
        if self.result.is_none() {
            self.status_message = Some("Nothing to export yet".to_string());
            return;
        }
        self.mode = AppMode::ExportCsv;
        self.filename_input = self.default_export_filename();
        self.cursor_position = self.filename_input.len();
        self.status_message = None;
    }

    fn default_export_filename(&self) -> String {
        match &self.result {
            Some(result) => format!(
                "strategy_{}_{}.csv",
                result.inputs.track.to_lowercase().replace(' ', "_"),
                result.inputs.year
            ),
            None => "strategy.csv".to_string(),
        }
    }

    /// Gets the filename to use for CSV export.
    ///
    /// Returns the filename input if not empty, otherwise the default name.
    pub fn get_csv_export_filename(&self) -> String {
        if self.filename_input.is_empty() {
            self.default_export_filename()
        } else {
            self.filename_input.clone()
        }
    }

    /// Cancels filename input and returns to normal mode.
    pub fn cancel_filename_input(&mut self) {
        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = 0;
    }

    /// Processes the result of a CSV export operation.
    ///
    /// # Arguments
    ///
    /// * `result` - Result of the export (filename or error message)
    pub fn set_csv_export_result(&mut self, result: Result<String, String>) {
        match result {
            Ok(filename) => {
                self.status_message = Some(format!("Exported to {}", filename));
            }
            Err(error) => {
                self.status_message = Some(format!("Export failed: {}", error));
            }
        }

        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = 0;
    }

    /// Plain-text summary of the current result, if there is one.
    pub fn summary_text(&self) -> Option<String> {
        self.result.as_ref().map(strategy_summary)
    }

    /// Processes the result of copying the summary to the clipboard.
    pub fn set_clipboard_result(&mut self, result: Result<(), String>) {
        self.status_message = Some(match result {
            Ok(()) => "Strategy copied to clipboard".to_string(),
            Err(error) => format!("Copy failed: {}", error),
        });
    }
}
