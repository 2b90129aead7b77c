// src/config.rs
use std::env;
use std::fmt;
use std::path::PathBuf;
use chrono::{Months, NaiveDate};
use log::warn;

pub const DEFAULT_PROJECTION_QUARTERS: usize = 8;
pub const DEFAULT_SCENARIO_FILE: &str = "config/scenario.json";

#[derive(Debug, Clone)]
pub struct ConfigError {
    pub message: String,
}

impl ConfigError {
    pub fn new(message: impl Into<String>) -> Self {
        ConfigError {
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub projection_quarters: usize,
    pub scenario_file: PathBuf,
    /// `None` means one year before today.
    pub comparison_start: Option<NaiveDate>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            projection_quarters: DEFAULT_PROJECTION_QUARTERS,
            scenario_file: PathBuf::from(DEFAULT_SCENARIO_FILE),
            comparison_start: None,
        }
    }
}

impl Settings {
    /// Reads the `PE_ENGINE_*` variables. Call `dotenv().ok()` first if a
    /// `.env` file should be honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        match lookup("PE_ENGINE_PROJECTION_QUARTERS") {
            Some(raw) => {
                let quarters: usize = raw.trim().parse().map_err(|_| {
                    ConfigError::new(format!("PE_ENGINE_PROJECTION_QUARTERS must be a number, got '{}'", raw))
                })?;
                if quarters == 0 {
                    return Err(ConfigError::new("PE_ENGINE_PROJECTION_QUARTERS must be at least 1"));
                }
                settings.projection_quarters = quarters;
            }
            None => warn!(
                "PE_ENGINE_PROJECTION_QUARTERS not set, defaulting to {}",
                DEFAULT_PROJECTION_QUARTERS
            ),
        }

        match lookup("PE_ENGINE_SCENARIO_FILE") {
            Some(path) if !path.trim().is_empty() => settings.scenario_file = PathBuf::from(path.trim()),
            _ => warn!("PE_ENGINE_SCENARIO_FILE not set, defaulting to {}", DEFAULT_SCENARIO_FILE),
        }

        if let Some(raw) = lookup("PE_ENGINE_COMPARISON_START") {
            let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
                ConfigError::new(format!("PE_ENGINE_COMPARISON_START '{}' is not a date: {}", raw, e))
            })?;
            settings.comparison_start = Some(date);
        }

        Ok(settings)
    }

    pub fn comparison_start_or(&self, today: NaiveDate) -> NaiveDate {
        self.comparison_start
            .or_else(|| today.checked_sub_months(Months::new(12)))
            .unwrap_or(today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = Settings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_reads_all_values() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("PE_ENGINE_PROJECTION_QUARTERS", "12"),
            ("PE_ENGINE_SCENARIO_FILE", "/tmp/s.json"),
            ("PE_ENGINE_COMPARISON_START", "2023-06-30"),
        ]))
        .unwrap();
        assert_eq!(settings.projection_quarters, 12);
        assert_eq!(settings.scenario_file, PathBuf::from("/tmp/s.json"));
        assert_eq!(settings.comparison_start, NaiveDate::from_ymd_opt(2023, 6, 30));
    }

    #[test]
    fn test_rejects_bad_numbers() {
        let err = Settings::from_lookup(lookup_from(&[("PE_ENGINE_PROJECTION_QUARTERS", "eight")]))
            .unwrap_err();
        assert!(err.to_string().contains("eight"));
        assert!(Settings::from_lookup(lookup_from(&[("PE_ENGINE_PROJECTION_QUARTERS", "0")])).is_err());
        assert!(Settings::from_lookup(lookup_from(&[("PE_ENGINE_COMPARISON_START", "soon")])).is_err());
    }

    #[test]
    fn test_comparison_start_defaults_to_one_year_back() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let settings = Settings::default();
        assert_eq!(
            settings.comparison_start_or(today),
            NaiveDate::from_ymd_opt(2023, 3, 15).unwrap()
        );
    }
}
