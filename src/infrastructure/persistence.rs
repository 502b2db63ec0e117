use crate::domain::{PredictionResult, ReferenceOptions};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

const BUNDLED_LISTS: &str = include_str!("../../data/lists.json");

#[derive(Debug, Error)]
pub enum ReferenceDataError {
    #[error("could not read {path}: {source}")]
    Io { path: String, source: io::Error },
    #[error("invalid reference data in {path}: {source}")]
    Format { path: String, source: serde_json::Error },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub struct ReferenceRepository;

impl ReferenceRepository {
    /// Loads the reference lists, falling back to empty lists on failure.
    ///
    /// Uses the file at `path` when given, otherwise the lists bundled
    /// into the binary.
    pub fn load(path: Option<&Path>) -> ReferenceOptions {
        let loaded = match path {
            Some(path) => Self::load_from_file(path),
            None => Self::bundled(),
        };

        match loaded {
            Ok(options) => {
                tracing::info!(
                    tracks = options.tracks.len(),
                    teams = options.teams.len(),
                    drivers = options.drivers.len(),
                    "reference lists loaded"
                );
                options
            }
            Err(e) => {
                tracing::warn!(error = %e, "reference lists unavailable, selections will be empty");
                ReferenceOptions::default()
            }
        }
    }

    pub fn bundled() -> Result<ReferenceOptions, ReferenceDataError> {
        serde_json::from_str(BUNDLED_LISTS).map_err(|source| ReferenceDataError::Format {
            path: "bundled lists".to_string(),
            source,
        })
    }

    pub fn load_from_file(path: &Path) -> Result<ReferenceOptions, ReferenceDataError> {
        let display = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|source| ReferenceDataError::Io {
            path: display.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ReferenceDataError::Format {
            path: display,
            source,
        })
    }
}

pub struct StrategyExporter;

impl StrategyExporter {
    /// Writes the pit-stop table as CSV, one record per stop in service order.
    pub fn export_to_csv(result: &PredictionResult, filename: &str) -> Result<String, ExportError> {
        let mut writer = csv::Writer::from_path(filename)?;
        writer.write_record(["stop", "lap", "tire"])?;
        for (index, stop) in result.strategy.tire_strategy.iter().enumerate() {
            writer.write_record([
                (index + 1).to_string(),
                stop.lap.to_string(),
                stop.tire.clone(),
            ])?;
        }
        writer.flush()?;

        tracing::info!(file = filename, stops = result.strategy.tire_strategy.len(), "strategy exported");
        Ok(filename.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PredictionRequest, StopRecord, StrategyResponse};
    use tempfile::tempdir;

    fn sample_result(stops: Vec<StopRecord>) -> PredictionResult {
        PredictionResult {
            inputs: PredictionRequest {
                track: "Italian Grand Prix".to_string(),
                year: 2021,
                team: "Ferrari".to_string(),
                driver: "LEC".to_string(),
                air_temp: 25.0,
                track_temp: 40.0,
                rainfall: 0.0,
                lap_number_at_begining_of_stint: 2,
                mean_humid: 75.0,
                fuel_consumption_per_stint: 0.006,
                lag_slope_mean: 0.002,
                best_pre_race_time: 82.0,
                circuit_length: 5.8,
                stint_len: 30,
                round_number: 10,
                stint_performance: 5.0,
                tyre_degradation_per_stint: 0.002,
            },
            strategy: StrategyResponse {
                total_pitstops: stops.len() as i64,
                tire_strategy: stops,
            },
        }
    }

    #[test]
    fn test_bundled_lists_parse() {
        let options = ReferenceRepository::bundled().unwrap();
        assert!(!options.tracks.is_empty());
        assert!(!options.teams.is_empty());
        assert!(!options.drivers.is_empty());
        assert!(options.teams.contains(&"Ferrari".to_string()));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lists.json");
        fs::write(&path, r#"{"tracks": ["Monza"], "teams": ["Ferrari"], "drivers": ["Leclerc"]}"#).unwrap();

        let options = ReferenceRepository::load(Some(path.as_path()));
        assert_eq!(options.tracks, vec!["Monza".to_string()]);
        assert_eq!(options.drivers, vec!["Leclerc".to_string()]);
    }

    #[test]
    fn test_missing_file_yields_empty_lists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.json");

        assert!(matches!(
            ReferenceRepository::load_from_file(&path),
            Err(ReferenceDataError::Io { .. })
        ));
        assert_eq!(ReferenceRepository::load(Some(path.as_path())), ReferenceOptions::default());
    }

    #[test]
    fn test_malformed_file_yields_empty_lists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lists.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            ReferenceRepository::load_from_file(&path),
            Err(ReferenceDataError::Format { .. })
        ));
        assert_eq!(ReferenceRepository::load(Some(path.as_path())), ReferenceOptions::default());
    }

    #[test]
    fn test_export_to_csv_keeps_stop_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("strategy.csv");
        let filename = path.to_str().unwrap();
        let result = sample_result(vec![
            StopRecord { lap: 32, tire: "HARD".to_string() },
            StopRecord { lap: 15, tire: "MEDIUM".to_string() },
        ]);

        let written = StrategyExporter::export_to_csv(&result, filename).unwrap();
        assert_eq!(written, filename);

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "stop,lap,tire\n1,32,HARD\n2,15,MEDIUM\n");
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope").join("strategy.csv");
        let result = sample_result(vec![]);

        assert!(StrategyExporter::export_to_csv(&result, path.to_str().unwrap()).is_err());
    }
}
