use std::fs;
use std::path::Path;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::defects::DEFECT_PROBABILITY;
use crate::error::GeneratorError;
use crate::reference::{ReferenceData, SeasonalEventTable};

/// Rows written by the command-line generator when `--rows` is not given.
pub const DEFAULT_ROW_COUNT: usize = 10_000;

/// First day of the first reporting period.
pub fn reporting_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).expect("2020-01-01 is a valid date")
}

/// On-disk form of the reference tables (see the `reference_catalog` binary).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceFile {
    pub reference: ReferenceData,
    pub events: SeasonalEventTable,
}

impl ReferenceFile {
    pub fn canonical() -> Self {
        ReferenceFile {
            reference: ReferenceData::canonical(),
            events: SeasonalEventTable::canonical(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, GeneratorError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GeneratorError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// Everything one generation run depends on. Immutable once the run starts;
/// the generator only ever borrows it.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub seed: u64,
    pub rows: usize,
    /// First reporting-period boundary and lower bound of every risk window.
    pub epoch: NaiveDate,
    /// Upper bound for reporting periods and risk starts.
    pub today: NaiveDate,
    pub defect_probability: f64,
    pub reference: ReferenceData,
    pub events: SeasonalEventTable,
}

impl GeneratorConfig {
    pub fn canonical() -> Self {
        GeneratorConfig {
            seed: 42,
            rows: DEFAULT_ROW_COUNT,
            epoch: reporting_epoch(),
            today: Utc::now().date_naive(),
            defect_probability: DEFECT_PROBABILITY,
            reference: ReferenceData::canonical(),
            events: SeasonalEventTable::canonical(),
        }
    }

    /// Replace both reference tables with the contents of a JSON file.
    pub fn with_reference_file(mut self, path: impl AsRef<Path>) -> Result<Self, GeneratorError> {
        let ReferenceFile { reference, events } = ReferenceFile::from_path(path)?;
        self.reference = reference;
        self.events = events;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), GeneratorError> {
        if self.today < self.epoch {
            return Err(GeneratorError::invalid_config(format!(
                "today ({}) is before the reporting epoch ({})",
                self.today, self.epoch
            )));
        }
        if !(0.0..=1.0).contains(&self.defect_probability) {
            return Err(GeneratorError::invalid_config(format!(
                "defect probability {} outside [0, 1]",
                self.defect_probability
            )));
        }
        let empty = self.reference.empty_categories();
        if !empty.is_empty() {
            return Err(GeneratorError::invalid_config(format!(
                "empty reference lists: {}",
                empty.join(", ")
            )));
        }
        for state in self.events.states() {
            for (season, events) in self.events.seasons(state) {
                for event in events {
                    if !(0.0..=1.0).contains(&event.probability) {
                        return Err(GeneratorError::invalid_config(format!(
                            "{state} {season:?} event {} has probability {} outside [0, 1]",
                            event.cause, event.probability
                        )));
                    }
                    if let Some(month) = event.months.iter().find(|m| !(1..=12).contains(*m)) {
                        return Err(GeneratorError::invalid_config(format!(
                            "{state} {season:?} event {} lists month {month}",
                            event.cause
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{EventDefinition, Season, Severity};

    #[test]
    fn canonical_is_valid() {
        GeneratorConfig::canonical().validate().unwrap();
    }

    #[test]
    fn today_before_epoch_is_invalid() {
        let mut config = GeneratorConfig::canonical();
        config.today = NaiveDate::from_ymd_opt(2019, 6, 1).unwrap();
        assert!(matches!(config.validate(), Err(GeneratorError::InvalidConfig(_))));
    }

    #[test]
    fn defect_probability_must_be_a_probability() {
        let mut config = GeneratorConfig::canonical();
        config.defect_probability = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn event_month_out_of_range_is_invalid() {
        let mut config = GeneratorConfig::canonical();
        config.events.insert(
            "NY",
            Season::Winter,
            EventDefinition {
                cause: "SNOW".to_string(),
                description: "Snow load".to_string(),
                probability: 0.3,
                months: vec![13],
                severity: Severity::Low,
            },
        );
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("SNOW"), "{err}");
    }

    #[test]
    fn empty_reference_list_is_invalid() {
        let mut config = GeneratorConfig::canonical();
        config.reference.states.clear();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("states"), "{err}");
    }

    #[test]
    fn reference_file_round_trips_through_json() {
        let canonical = ReferenceFile::canonical();
        let json = serde_json::to_string_pretty(&canonical).unwrap();
        assert_eq!(ReferenceFile::from_json_str(&json).unwrap(), canonical);
    }

    #[test]
    fn malformed_reference_file_is_a_json_error() {
        let err = ReferenceFile::from_json_str(r#"{"reference": {}}"#).unwrap_err();
        assert!(matches!(err, GeneratorError::Json(_)));
    }

    #[test]
    fn missing_reference_file_is_an_io_error() {
        let err = GeneratorConfig::canonical()
            .with_reference_file("/nonexistent/claimgen-reference.json")
            .unwrap_err();
        assert!(matches!(err, GeneratorError::Io(_)));
    }
}
