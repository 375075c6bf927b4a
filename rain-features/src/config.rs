//! Feature configuration shared by every channel of a run.
//!
//! All knobs are optional in JSON; absent keys take the defaults below.
//!
//! ```json
//! {"lag_hours": [1, 3], "dry_threshold": 0.1, "column_order": "alphabetical"}
//! ```

use crate::feature::Feature;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;
use thiserror::Error;

/// Rainfall (mm) at or below which an hour counts as dry.
pub const DEFAULT_DRY_THRESHOLD: f64 = 0.2;

/// Rainfall (mm) above which an hour counts as wet.
pub const DEFAULT_WET_THRESHOLD: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{knob}: values must be positive, found 0")]
    Zero { knob: &'static str },
    #[error("{knob}: duplicate value {value}")]
    Duplicate { knob: &'static str, value: String },
    #[error("{knob}: threshold must be finite and non-negative, found {value}")]
    Threshold { knob: &'static str, value: f64 },
    #[error("unknown column order {0:?} (expected \"grouped\" or \"alphabetical\")")]
    ColumnOrder(String),
    #[error("invalid config JSON: {0}")]
    Json(String),
}

/// Output column ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnOrder {
    /// Channel order, then feature family order within each channel.
    #[default]
    Grouped,
    /// All columns sorted by name.
    Alphabetical,
}

impl FromStr for ColumnOrder {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grouped" => Ok(ColumnOrder::Grouped),
            "alphabetical" => Ok(ColumnOrder::Alphabetical),
            _ => Err(ConfigError::ColumnOrder(s.to_string())),
        }
    }
}

impl fmt::Display for ColumnOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnOrder::Grouped => f.write_str("grouped"),
            ColumnOrder::Alphabetical => f.write_str("alphabetical"),
        }
    }
}

/// Immutable knobs for one run. Hours count rows of the time index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureConfig {
    pub lag_hours: Vec<usize>,
    pub sum_windows: Vec<usize>,
    pub max_windows: Vec<usize>,
    /// Half-lives (hours) of the antecedent precipitation index.
    pub api_halflives: Vec<u32>,
    pub dry_threshold: f64,
    pub wet_threshold: f64,
    pub future_sum_horizons: Vec<usize>,
    pub future_max_horizons: Vec<usize>,
    pub ttp_horizons: Vec<usize>,
    pub frontshare_horizon: usize,
    pub column_order: ColumnOrder,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            lag_hours: vec![1, 2, 3, 4, 5, 6, 12, 24],
            sum_windows: vec![3, 6, 12, 24],
            max_windows: vec![3, 6],
            api_halflives: vec![6, 24, 168],
            dry_threshold: DEFAULT_DRY_THRESHOLD,
            wet_threshold: DEFAULT_WET_THRESHOLD,
            future_sum_horizons: vec![1, 3, 6, 12],
            future_max_horizons: vec![3, 6, 12],
            ttp_horizons: vec![6, 12],
            frontshare_horizon: 12,
            column_order: ColumnOrder::Grouped,
        }
    }
}

fn check_list<T>(knob: &'static str, values: &[T]) -> Result<(), ConfigError>
where
    T: Copy + Default + PartialEq + Eq + Hash + fmt::Display,
{
    let mut seen = HashSet::new();
    for value in values {
        if *value == T::default() {
            return Err(ConfigError::Zero { knob });
        }
        if !seen.insert(*value) {
            return Err(ConfigError::Duplicate {
                knob,
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

fn check_threshold(knob: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Threshold { knob, value })
    }
}

impl FeatureConfig {
    /// Parse a JSON object; missing keys take defaults, unknown keys are rejected.
    pub fn from_json_str(data: &str) -> Result<Self, ConfigError> {
        let config: FeatureConfig =
            serde_json::from_str(data).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_list("lag_hours", &self.lag_hours)?;
        check_list("sum_windows", &self.sum_windows)?;
        check_list("max_windows", &self.max_windows)?;
        check_list("api_halflives", &self.api_halflives)?;
        check_list("future_sum_horizons", &self.future_sum_horizons)?;
        check_list("future_max_horizons", &self.future_max_horizons)?;
        check_list("ttp_horizons", &self.ttp_horizons)?;
        check_list("frontshare_horizon", &[self.frontshare_horizon])?;
        check_threshold("dry_threshold", self.dry_threshold)?;
        check_threshold("wet_threshold", self.wet_threshold)?;
        Ok(())
    }

    /// Every configured feature instance, in output family order.
    pub fn features(&self) -> Vec<Feature> {
        let mut features = Vec::with_capacity(self.instance_count());
        features.extend(self.lag_hours.iter().map(|&h| Feature::Lag(h)));
        features.extend(self.sum_windows.iter().map(|&w| Feature::RollingSum(w)));
        features.extend(self.max_windows.iter().map(|&w| Feature::RollingMax(w)));
        features.extend(self.api_halflives.iter().map(|&hl| Feature::Api(hl)));
        features.push(Feature::DrySpell);
        features.push(Feature::RainNow);
        features.push(Feature::Delta1h);
        features.extend(self.future_sum_horizons.iter().map(|&h| Feature::FutureSum(h)));
        features.extend(self.future_max_horizons.iter().map(|&h| Feature::FutureMax(h)));
        features.extend(self.ttp_horizons.iter().map(|&h| Feature::TimeToPeak(h)));
        features.push(Feature::FrontShare(self.frontshare_horizon));
        features
    }

    /// Per-channel feature names, without coordinate suffix.
    pub fn feature_names(&self) -> Vec<String> {
        self.features().iter().map(Feature::name).collect()
    }

    /// Number of output columns produced for each channel.
    pub fn instance_count(&self) -> usize {
        self.lag_hours.len()
            + self.sum_windows.len()
            + self.max_windows.len()
            + self.api_halflives.len()
            + 3
            + self.future_sum_horizons.len()
            + self.future_max_horizons.len()
            + self.ttp_horizons.len()
            + 1
    }
}
