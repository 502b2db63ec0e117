use std::collections::BTreeMap;
use std::fmt;
use serde::{Deserialize, Serialize};

/// How a field's raw text is coerced when the operator edits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Chosen from a closed list of reference values (track, team, driver).
    Categorical,
    /// Parsed as a floating point number.
    Numeric,
}

/// Every input the prediction service accepts, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldName {
    Track,
    Year,
    Team,
    Driver,
    AirTemp,
    TrackTemp,
    Rainfall,
    LapNumberAtBeginingOfStint,
    MeanHumid,
    FuelConsumptionPerStint,
    LagSlopeMean,
    BestPreRaceTime,
    CircuitLength,
    StintLen,
    RoundNumber,
    StintPerformance,
    TyreDegradationPerStint,
}

impl FieldName {
    pub const ALL: [FieldName; 17] = [
        FieldName::Track,
        FieldName::Year,
        FieldName::Team,
        FieldName::Driver,
        FieldName::AirTemp,
        FieldName::TrackTemp,
        FieldName::Rainfall,
        FieldName::LapNumberAtBeginingOfStint,
        FieldName::MeanHumid,
        FieldName::FuelConsumptionPerStint,
        FieldName::LagSlopeMean,
        FieldName::BestPreRaceTime,
        FieldName::CircuitLength,
        FieldName::StintLen,
        FieldName::RoundNumber,
        FieldName::StintPerformance,
        FieldName::TyreDegradationPerStint,
    ];

    /// Key used for this field in the service's JSON contract.
    pub fn wire_name(self) -> &'static str {
        match self {
            FieldName::Track => "track",
            FieldName::Year => "year",
            FieldName::Team => "team",
            FieldName::Driver => "driver",
            FieldName::AirTemp => "airTemp",
            FieldName::TrackTemp => "trackTemp",
            FieldName::Rainfall => "rainfall",
            FieldName::LapNumberAtBeginingOfStint => "lapNumberAtBeginingOfStint",
            FieldName::MeanHumid => "meanHumid",
            FieldName::FuelConsumptionPerStint => "fuelConsumptionPerStint",
            FieldName::LagSlopeMean => "lag_slope_mean",
            FieldName::BestPreRaceTime => "bestPreRaceTime",
            FieldName::CircuitLength => "CircuitLength",
            FieldName::StintLen => "StintLen",
            FieldName::RoundNumber => "RoundNumber",
            FieldName::StintPerformance => "stintPerformance",
            FieldName::TyreDegradationPerStint => "tyreDegradationPerStint",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldName::Track => "Track",
            FieldName::Year => "Year",
            FieldName::Team => "Team",
            FieldName::Driver => "Driver",
            FieldName::AirTemp => "Air Temperature (°C)",
            FieldName::TrackTemp => "Track Temperature (°C)",
            FieldName::Rainfall => "Rainfall (mm)",
            FieldName::LapNumberAtBeginingOfStint => "Lap Number At Beginning Of Stint",
            FieldName::MeanHumid => "Mean Humidity (%)",
            FieldName::FuelConsumptionPerStint => "Fuel Consumption Per Stint",
            FieldName::LagSlopeMean => "Lag Slope Mean",
            FieldName::BestPreRaceTime => "Best Pre-Race Time (sec)",
            FieldName::CircuitLength => "Circuit Length (km)",
            FieldName::StintLen => "Stint Length (laps)",
            FieldName::RoundNumber => "Round Number",
            FieldName::StintPerformance => "Stint Performance",
            FieldName::TyreDegradationPerStint => "Tyre Degradation Per Stint",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            FieldName::Track | FieldName::Team | FieldName::Driver => FieldKind::Categorical,
            _ => FieldKind::Numeric,
        }
    }

    /// Required fields have no default and must be filled before submitting.
    pub fn is_required(self) -> bool {
        self.default_value().is_none()
    }

    /// Fields the service declares as integers. Year is handled separately
    /// because it is truncated rather than checked.
    pub fn is_whole_number(self) -> bool {
        matches!(
            self,
            FieldName::LapNumberAtBeginingOfStint | FieldName::StintLen | FieldName::RoundNumber
        )
    }

    pub fn default_value(self) -> Option<f64> {
        OPTIONAL_DEFAULTS
            .iter()
            .find(|(name, _)| *name == self)
            .map(|(_, value)| *value)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Defaults for the tunable model parameters. Every other field starts empty.
pub const OPTIONAL_DEFAULTS: [(FieldName, f64); 10] = [
    (FieldName::LapNumberAtBeginingOfStint, 2.0),
    (FieldName::MeanHumid, 75.0),
    (FieldName::FuelConsumptionPerStint, 0.006),
    (FieldName::LagSlopeMean, 0.002),
    (FieldName::BestPreRaceTime, 82.0),
    (FieldName::CircuitLength, 5.8),
    (FieldName::StintLen, 30.0),
    (FieldName::RoundNumber, 10.0),
    (FieldName::StintPerformance, 5.0),
    (FieldName::TyreDegradationPerStint, 0.002),
];

/// Current value of a single form field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Empty,
    Text(String),
    Number(f64),
    /// Text typed into a numeric field that did not parse. Kept verbatim
    /// so the operator sees what they typed.
    Unparsed(String),
}

impl FieldValue {
    /// Coerces raw editor text according to the field kind.
    pub fn coerce(raw: &str, kind: FieldKind) -> Self {
        match kind {
            FieldKind::Categorical => {
                if raw.is_empty() {
                    FieldValue::Empty
                } else {
                    FieldValue::Text(raw.to_string())
                }
            }
            FieldKind::Numeric => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return FieldValue::Empty;
                }
                match trimmed.parse::<f64>() {
                    Ok(n) if n.is_finite() => FieldValue::Number(n),
                    _ => FieldValue::Unparsed(raw.to_string()),
                }
            }
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, FieldValue::Text(_) | FieldValue::Number(_))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text shown in the form and loaded into the editor.
    pub fn display(&self) -> String {
        match self {
            FieldValue::Empty => String::new(),
            FieldValue::Text(s) | FieldValue::Unparsed(s) => s.clone(),
            FieldValue::Number(n) => n.to_string(),
        }
    }
}

/// The complete set of form inputs for one request.
///
/// A `FieldSet` is a plain value: edits produce a new set rather than
/// mutating shared state.
///
/// # Examples
///
/// ```
/// use race_strategy::domain::{FieldName, FieldSet, FieldValue};
///
/// let fields = FieldSet::initialize();
/// let edited = fields.on_field_change(FieldName::Year, "2021");
/// assert_eq!(edited.get(FieldName::Year), &FieldValue::Number(2021.0));
/// assert_eq!(fields.get(FieldName::Year), &FieldValue::Empty);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSet {
    values: BTreeMap<FieldName, FieldValue>,
}

impl Default for FieldSet {
    fn default() -> Self {
        let values = FieldName::ALL
            .iter()
            .map(|&name| {
                let value = name
                    .default_value()
                    .map(FieldValue::Number)
                    .unwrap_or(FieldValue::Empty);
                (name, value)
            })
            .collect();
        Self { values }
    }
}

impl FieldSet {
    pub fn initialize() -> Self {
        Self::default()
    }

    pub fn get(&self, name: FieldName) -> &FieldValue {
        // Every name is inserted at construction and never removed.
        self.values.get(&name).unwrap_or(&FieldValue::Empty)
    }

    /// Returns a copy of this set with `name` replaced by `raw` coerced
    /// to the field's kind. No validation happens here.
    pub fn on_field_change(&self, name: FieldName, raw: &str) -> Self {
        let mut next = self.clone();
        next.values.insert(name, FieldValue::coerce(raw, name.kind()));
        next
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &FieldValue)> {
        self.values.iter().map(|(name, value)| (*name, value))
    }
}

/// Valid values for the categorical fields, loaded once at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceOptions {
    #[serde(default)]
    pub tracks: Vec<String>,
    #[serde(default)]
    pub teams: Vec<String>,
    #[serde(default)]
    pub drivers: Vec<String>,
}

impl ReferenceOptions {
    /// Options for a categorical field; numeric fields have none.
    pub fn for_field(&self, name: FieldName) -> &[String] {
        match name {
            FieldName::Track => &self.tracks,
            FieldName::Team => &self.teams,
            FieldName::Driver => &self.drivers,
            _ => &[],
        }
    }
}

/// Request body for `POST /predict_strategy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub track: String,
    pub year: i32,
    pub team: String,
    pub driver: String,
    #[serde(rename = "airTemp")]
    pub air_temp: f64,
    #[serde(rename = "trackTemp")]
    pub track_temp: f64,
    pub rainfall: f64,
    #[serde(rename = "lapNumberAtBeginingOfStint")]
    pub lap_number_at_begining_of_stint: i64,
    #[serde(rename = "meanHumid")]
    pub mean_humid: f64,
    #[serde(rename = "fuelConsumptionPerStint")]
    pub fuel_consumption_per_stint: f64,
    pub lag_slope_mean: f64,
    #[serde(rename = "bestPreRaceTime")]
    pub best_pre_race_time: f64,
    #[serde(rename = "CircuitLength")]
    pub circuit_length: f64,
    #[serde(rename = "StintLen")]
    pub stint_len: i64,
    #[serde(rename = "RoundNumber")]
    pub round_number: i64,
    #[serde(rename = "stintPerformance")]
    pub stint_performance: f64,
    #[serde(rename = "tyreDegradationPerStint")]
    pub tyre_degradation_per_stint: f64,
}

/// One predicted pit stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopRecord {
    pub lap: i64,
    pub tire: String,
}

/// The part of the service response this client uses. Other keys the
/// service echoes back are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyResponse {
    pub total_pitstops: i64,
    #[serde(default)]
    pub tire_strategy: Vec<StopRecord>,
}

/// A successful prediction paired with the inputs that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub inputs: PredictionRequest,
    pub strategy: StrategyResponse,
}
