//! Engine configuration
//!
//! All settings have defaults, so an absent or partial TOML file is valid:
//!
//! ```toml
//! reporting_currency = "EUR"
//!
//! [solver]
//! initial_guess = 0.1
//! tolerance = 1e-10
//! max_iterations = 200
//!
//! [periodicity]
//! aggregation = "median"
//! tolerance = 0.2
//! min_consistency = 0.5
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PerformanceError, Result};

const CONFIG_DIR: &str = "secperf";
const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub reporting_currency: String,
    pub solver: SolverConfig,
    pub periodicity: PeriodicityConfig,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            reporting_currency: "EUR".to_string(),
            solver: SolverConfig::default(),
            periodicity: PeriodicityConfig::default(),
        }
    }
}

/// IRR root-finder settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub initial_guess: f64,
    /// Absolute tolerance on the rate step and on NPV
    pub tolerance: f64,
    /// Iteration cap, applied to Newton and to the bisection fallback each
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            initial_guess: 0.1,
            tolerance: 1e-10,
            max_iterations: 200,
        }
    }
}

/// How the typical gap between dividend payments is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapAggregation {
    Median,
    Mean,
}

/// Dividend cadence classification thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodicityConfig {
    pub aggregation: GapAggregation,
    pub annual_days: f64,
    pub semiannual_days: f64,
    pub quarterly_days: f64,
    /// Relative half-width of each band (0.2 = ±20%)
    pub tolerance: f64,
    /// Share of gaps that must fall into the typical gap's band
    pub min_consistency: f64,
}

impl Default for PeriodicityConfig {
    fn default() -> Self {
        Self {
            aggregation: GapAggregation::Median,
            annual_days: 365.0,
            semiannual_days: 182.0,
            quarterly_days: 91.0,
            tolerance: 0.2,
            min_consistency: 0.5,
        }
    }
}

impl PerformanceConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PerformanceConfig = toml::from_str(content)
            .map_err(|e| PerformanceError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PerformanceError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load the file at `path`, or the default location when `path` is None.
    /// A missing default file yields the defaults; a missing explicit file
    /// is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => match default_config_path() {
                Some(p) if p.exists() => Self::load(&p),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.reporting_currency.trim().is_empty() {
            return Err(PerformanceError::InvalidConfig(
                "reporting_currency must not be empty".to_string(),
            ));
        }
        self.solver.validate()?;
        self.periodicity.validate()
    }
}

impl SolverConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance > 0.0) {
            return Err(PerformanceError::InvalidConfig(
                "solver.tolerance must be positive".to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(PerformanceError::InvalidConfig(
                "solver.max_iterations must be at least 1".to_string(),
            ));
        }
        if !(self.initial_guess > -1.0) {
            return Err(PerformanceError::InvalidConfig(
                "solver.initial_guess must be greater than -1".to_string(),
            ));
        }
        Ok(())
    }
}

impl PeriodicityConfig {
    /// Bands as (center, lower, upper) in days, quarterly first
    pub fn bands(&self) -> [(f64, f64, f64); 3] {
        let band = |center: f64| {
            (
                center,
                center * (1.0 - self.tolerance),
                center * (1.0 + self.tolerance),
            )
        };
        [
            band(self.quarterly_days),
            band(self.semiannual_days),
            band(self.annual_days),
        ]
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance > 0.0 && self.tolerance < 0.5) {
            return Err(PerformanceError::InvalidConfig(
                "periodicity.tolerance must be in (0, 0.5)".to_string(),
            ));
        }
        if !(self.min_consistency > 0.0 && self.min_consistency <= 1.0) {
            return Err(PerformanceError::InvalidConfig(
                "periodicity.min_consistency must be in (0, 1]".to_string(),
            ));
        }
        if !(self.quarterly_days > 0.0
            && self.quarterly_days < self.semiannual_days
            && self.semiannual_days < self.annual_days)
        {
            return Err(PerformanceError::InvalidConfig(
                "periodicity cadences must satisfy 0 < quarterly < semiannual < annual".to_string(),
            ));
        }
        let bands = self.bands();
        for pair in bands.windows(2) {
            if pair[0].2 >= pair[1].1 {
                return Err(PerformanceError::InvalidConfig(format!(
                    "periodicity bands around {} and {} days overlap",
                    pair[0].0, pair[1].0
                )));
            }
        }
        Ok(())
    }
}

/// `<config home>/secperf/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dir_spec::config_home().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILENAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        PerformanceConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PerformanceConfig::from_toml_str(
            r#"
            reporting_currency = "USD"

            [periodicity]
            aggregation = "mean"
            "#,
        )
        .unwrap();

        assert_eq!(config.reporting_currency, "USD");
        assert_eq!(config.periodicity.aggregation, GapAggregation::Mean);
        assert_eq!(config.periodicity.tolerance, 0.2);
        assert_eq!(config.solver, SolverConfig::default());
    }

    #[test]
    fn test_overlapping_bands_are_rejected() {
        let err = PerformanceConfig::from_toml_str(
            r#"
            [periodicity]
            tolerance = 0.45
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("overlap"));
    }

    #[test]
    fn test_invalid_solver_settings_are_rejected() {
        let err = PerformanceConfig::from_toml_str(
            r#"
            [solver]
            max_iterations = 0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, PerformanceError::InvalidConfig(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "reporting_currency = \"CHF\"").unwrap();

        let config = PerformanceConfig::load_or_default(Some(file.path())).unwrap();
        assert_eq!(config.reporting_currency, "CHF");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = PerformanceConfig::load_or_default(Some(Path::new("/nonexistent/secperf.toml")));
        assert!(result.is_err());
    }
}
