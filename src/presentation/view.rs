use crate::domain::PredictionResult;

/// One row of the pit-stop table.
#[derive(Debug, Clone, PartialEq)]
pub struct StopRow {
    pub lap: String,
    pub tire: String,
}

/// Read-only summary of a prediction, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    /// Echoed identity inputs as (label, value) pairs
    pub info: Vec<(&'static str, String)>,
    pub total_pitstops: String,
    /// `None` when the service returned no stops, so no table is drawn
    pub stops: Option<Vec<StopRow>>,
}

impl ResultView {
    /// Builds the result section, or nothing when there is no result yet.
    pub fn build(result: Option<&PredictionResult>) -> Option<Self> {
        let result = result?;
        let inputs = &result.inputs;

        let info = vec![
            ("Track", inputs.track.clone()),
            ("Year", inputs.year.to_string()),
            ("Team", inputs.team.clone()),
            ("Driver", inputs.driver.clone()),
        ];

        let stops = if result.strategy.tire_strategy.is_empty() {
            None
        } else {
            Some(
                result
                    .strategy
                    .tire_strategy
                    .iter()
                    .map(|stop| StopRow {
                        lap: stop.lap.to_string(),
                        tire: stop.tire.clone(),
                    })
                    .collect(),
            )
        };

        Some(Self {
            info,
            total_pitstops: result.strategy.total_pitstops.to_string(),
            stops,
        })
    }
}
