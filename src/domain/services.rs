//! Request construction and result formatting for the strategy client.
//!
//! This module turns an edited [`FieldSet`] into a typed
//! [`PredictionRequest`], checking every precondition the service relies
//! on, and formats a [`PredictionResult`] as plain text.

use super::errors::{FieldIssue, ValidationError};
use super::models::{
    FieldKind, FieldName, FieldSet, FieldValue, PredictionRequest, PredictionResult,
    ReferenceOptions,
};

/// Validates a field set and builds the request payload from it.
///
/// All fields are checked before returning, so the error lists every
/// problem rather than only the first. Categorical values must appear in
/// the matching reference list when that list is non-empty. `year` is
/// truncated to an integer; the other integer-typed fields must already
/// be whole numbers. Integer fields that do not fit their wire type are
/// rejected rather than clamped.
///
/// # Examples
///
/// ```
/// use race_strategy::domain::{build_request, FieldName, FieldSet, ReferenceOptions};
///
/// let fields = FieldSet::initialize()
///     .on_field_change(FieldName::Track, "Monza")
///     .on_field_change(FieldName::Year, "2021")
///     .on_field_change(FieldName::Team, "Ferrari")
///     .on_field_change(FieldName::Driver, "Leclerc")
///     .on_field_change(FieldName::AirTemp, "25")
///     .on_field_change(FieldName::TrackTemp, "40")
///     .on_field_change(FieldName::Rainfall, "0");
///
/// let request = build_request(&fields, &ReferenceOptions::default()).unwrap();
/// assert_eq!(request.year, 2021);
/// assert_eq!(request.stint_len, 30);
/// ```
pub fn build_request(
    fields: &FieldSet,
    options: &ReferenceOptions,
) -> Result<PredictionRequest, ValidationError> {
    let mut issues = Vec::new();

    for (name, value) in fields.iter() {
        if let Some(issue) = check_field(name, value, options) {
            issues.push(issue);
        }
    }

    if !issues.is_empty() {
        return Err(ValidationError { issues });
    }

    let text = |name| fields.get(name).display();
    // Checked above: every numeric field holds a finite number.
    let number = |name| fields.get(name).as_number().unwrap_or_default();

    Ok(PredictionRequest {
        track: text(FieldName::Track),
        year: number(FieldName::Year).trunc() as i32,
        team: text(FieldName::Team),
        driver: text(FieldName::Driver),
        air_temp: number(FieldName::AirTemp),
        track_temp: number(FieldName::TrackTemp),
        rainfall: number(FieldName::Rainfall),
        lap_number_at_begining_of_stint: number(FieldName::LapNumberAtBeginingOfStint) as i64,
        mean_humid: number(FieldName::MeanHumid),
        fuel_consumption_per_stint: number(FieldName::FuelConsumptionPerStint),
        lag_slope_mean: number(FieldName::LagSlopeMean),
        best_pre_race_time: number(FieldName::BestPreRaceTime),
        circuit_length: number(FieldName::CircuitLength),
        stint_len: number(FieldName::StintLen) as i64,
        round_number: number(FieldName::RoundNumber) as i64,
        stint_performance: number(FieldName::StintPerformance),
        tyre_degradation_per_stint: number(FieldName::TyreDegradationPerStint),
    })
}

fn check_field(name: FieldName, value: &FieldValue, options: &ReferenceOptions) -> Option<FieldIssue> {
    match (name.kind(), value) {
        (_, FieldValue::Empty) => Some(FieldIssue::Missing(name)),
        (FieldKind::Numeric, FieldValue::Unparsed(raw)) | (FieldKind::Numeric, FieldValue::Text(raw)) => {
            Some(FieldIssue::NotNumeric { field: name, raw: raw.clone() })
        }
        (FieldKind::Numeric, FieldValue::Number(n)) if name.is_whole_number() && n.fract() != 0.0 => {
            Some(FieldIssue::NotWholeNumber { field: name, value: *n })
        }
        (FieldKind::Numeric, FieldValue::Number(n)) if !fits_wire_type(name, *n) => {
            Some(FieldIssue::OutOfRange { field: name, value: *n })
        }
        (FieldKind::Numeric, FieldValue::Number(_)) => None,
        (FieldKind::Categorical, value) => {
            let allowed = options.for_field(name);
            let text = value.display();
            if !allowed.is_empty() && !allowed.iter().any(|option| *option == text) {
                Some(FieldIssue::UnknownOption { field: name, value: text })
            } else {
                None
            }
        }
    }
}

// `i64::MAX as f64` rounds up to 2^63, which itself does not fit.
fn fits_wire_type(name: FieldName, n: f64) -> bool {
    if name == FieldName::Year {
        let year = n.trunc();
        year >= i32::MIN as f64 && year <= i32::MAX as f64
    } else if name.is_whole_number() {
        n >= i64::MIN as f64 && n < i64::MAX as f64
    } else {
        true
    }
}

/// Plain-text rendering of a prediction, used for the clipboard.
pub fn strategy_summary(result: &PredictionResult) -> String {
    let inputs = &result.inputs;
    let strategy = &result.strategy;
    let laps: Vec<String> = strategy.tire_strategy.iter().map(|stop| stop.lap.to_string()).collect();

    let mut summary = format!(
        "{} {} - {} ({})\nTotal Pit Stops: {}\nPit Stop Laps: [{}]\nTire Strategy:\n",
        inputs.track,
        inputs.year,
        inputs.driver,
        inputs.team,
        strategy.total_pitstops,
        laps.join(", ")
    );
    for stop in &strategy.tire_strategy {
        summary.push_str(&format!("  - Lap {}: Switch to {}\n", stop.lap, stop.tire));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{StopRecord, StrategyResponse};

    fn filled_fields() -> FieldSet {
        FieldSet::initialize()
            .on_field_change(FieldName::Track, "Monza")
            .on_field_change(FieldName::Year, "2021")
            .on_field_change(FieldName::Team, "Ferrari")
            .on_field_change(FieldName::Driver, "Leclerc")
            .on_field_change(FieldName::AirTemp, "25")
            .on_field_change(FieldName::TrackTemp, "40")
            .on_field_change(FieldName::Rainfall, "0")
    }

    fn options() -> ReferenceOptions {
        ReferenceOptions {
            tracks: vec!["Monza".to_string(), "Imola".to_string()],
            teams: vec!["Ferrari".to_string()],
            drivers: vec!["Leclerc".to_string(), "Sainz".to_string()],
        }
    }

    #[test]
    fn test_build_request_from_filled_fields() {
        let request = build_request(&filled_fields(), &options()).unwrap();
        assert_eq!(request.track, "Monza");
        assert_eq!(request.year, 2021);
        assert_eq!(request.team, "Ferrari");
        assert_eq!(request.driver, "Leclerc");
        assert_eq!(request.air_temp, 25.0);
        assert_eq!(request.lap_number_at_begining_of_stint, 2);
        assert_eq!(request.mean_humid, 75.0);
        assert_eq!(request.fuel_consumption_per_stint, 0.006);
        assert_eq!(request.round_number, 10);
    }

    #[test]
    fn test_year_is_sent_as_integer() {
        let request = build_request(&filled_fields(), &options()).unwrap();
        let json = serde_json::to_value(&request).unwrap();
        assert!(json["year"].is_i64());
        assert_eq!(json["year"], serde_json::json!(2021));
    }

    #[test]
    fn test_year_is_truncated() {
        let fields = filled_fields().on_field_change(FieldName::Year, "2021.9");
        assert_eq!(build_request(&fields, &options()).unwrap().year, 2021);
    }

    #[test]
    fn test_missing_required_fields_are_all_reported() {
        let err = build_request(&FieldSet::initialize(), &options()).unwrap_err();
        let fields: Vec<FieldName> = err.issues.iter().map(|i| i.field()).collect();
        assert_eq!(
            fields,
            vec![
                FieldName::Track,
                FieldName::Year,
                FieldName::Team,
                FieldName::Driver,
                FieldName::AirTemp,
                FieldName::TrackTemp,
                FieldName::Rainfall,
            ]
        );
        assert!(err.issues.iter().all(|i| matches!(i, FieldIssue::Missing(_))));
    }

    #[test]
    fn test_unparsed_optional_field_is_rejected() {
        let fields = filled_fields().on_field_change(FieldName::MeanHumid, "abc");
        let err = build_request(&fields, &options()).unwrap_err();
        assert_eq!(
            err.issues,
            vec![FieldIssue::NotNumeric { field: FieldName::MeanHumid, raw: "abc".to_string() }]
        );
    }

    #[test]
    fn test_cleared_optional_field_is_missing() {
        let fields = filled_fields().on_field_change(FieldName::CircuitLength, "");
        let err = build_request(&fields, &options()).unwrap_err();
        assert_eq!(err.issues, vec![FieldIssue::Missing(FieldName::CircuitLength)]);
    }

    #[test]
    fn test_fractional_stint_length_is_rejected() {
        let fields = filled_fields().on_field_change(FieldName::StintLen, "30.5");
        let err = build_request(&fields, &options()).unwrap_err();
        assert_eq!(
            err.issues,
            vec![FieldIssue::NotWholeNumber { field: FieldName::StintLen, value: 30.5 }]
        );
    }

    #[test]
    fn test_year_outside_integer_range_is_rejected() {
        let fields = filled_fields().on_field_change(FieldName::Year, "1e12");
        let err = build_request(&fields, &options()).unwrap_err();
        assert_eq!(
            err.issues,
            vec![FieldIssue::OutOfRange { field: FieldName::Year, value: 1e12 }]
        );
    }

    #[test]
    fn test_huge_stint_length_is_rejected() {
        let fields = filled_fields()
            .on_field_change(FieldName::StintLen, "1e300")
            .on_field_change(FieldName::RoundNumber, "-1e19");
        let err = build_request(&fields, &options()).unwrap_err();
        assert_eq!(
            err.issues,
            vec![
                FieldIssue::OutOfRange { field: FieldName::StintLen, value: 1e300 },
                FieldIssue::OutOfRange { field: FieldName::RoundNumber, value: -1e19 },
            ]
        );
    }

    #[test]
    fn test_integer_range_edges() {
        let fields = filled_fields()
            .on_field_change(FieldName::Year, "2147483647.5")
            .on_field_change(FieldName::StintLen, "9007199254740992");
        let request = build_request(&fields, &options()).unwrap();
        assert_eq!(request.year, i32::MAX);
        assert_eq!(request.stint_len, 9_007_199_254_740_992);

        let fields = filled_fields().on_field_change(FieldName::Year, "2147483648");
        assert!(build_request(&fields, &options()).is_err());
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        let fields = filled_fields().on_field_change(FieldName::Driver, "Senna");
        let err = build_request(&fields, &options()).unwrap_err();
        assert_eq!(
            err.issues,
            vec![FieldIssue::UnknownOption { field: FieldName::Driver, value: "Senna".to_string() }]
        );
    }

    #[test]
    fn test_empty_reference_list_accepts_any_value() {
        let fields = filled_fields().on_field_change(FieldName::Driver, "Senna");
        assert!(build_request(&fields, &ReferenceOptions::default()).is_ok());
    }

    #[test]
    fn test_identical_fields_build_identical_requests() {
        let fields = filled_fields();
        assert_eq!(
            build_request(&fields, &options()).unwrap(),
            build_request(&fields, &options()).unwrap()
        );
    }

    #[test]
    fn test_strategy_summary() {
        let result = PredictionResult {
            inputs: build_request(&filled_fields(), &options()).unwrap(),
            strategy: StrategyResponse {
                total_pitstops: 2,
                tire_strategy: vec![
                    StopRecord { lap: 15, tire: "Medium".to_string() },
                    StopRecord { lap: 32, tire: "Hard".to_string() },
                ],
            },
        };
        assert_eq!(
            strategy_summary(&result),
            "Monza 2021 - Leclerc (Ferrari)\n\
             Total Pit Stops: 2\n\
             Pit Stop Laps: [15, 32]\n\
             Tire Strategy:\n  \
             - Lap 15: Switch to Medium\n  \
             - Lap 32: Switch to Hard\n"
        );
    }
}
