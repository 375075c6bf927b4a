//! Per-channel engine: one channel's series in, every configured feature out.
//!
//! The engine knows nothing about coordinates; the assembler applies the
//! `_<lat>_<lon>` suffix when it widens results into the table.

use crate::config::FeatureConfig;
use crate::feature::Feature;
use crate::{future, past, Series};
use rain_grid::Column;
use rain_utils::cells::parse_cell;
use thiserror::Error;

/// Failure confined to a single channel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChannelError {
    #[error("row {row}: non-numeric value {value:?}")]
    NonNumeric { row: usize, value: String },
    #[error("column not found in the input matrix")]
    MissingColumn,
    #[error("feature names collide with an earlier channel ({0})")]
    DuplicateName(String),
}

/// Ordered feature series of one channel, keyed by family-qualified name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureSet {
    entries: Vec<(Feature, Series)>,
}

impl FeatureSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Series by name without coordinate suffix, e.g. `"api_hl24h"`.
    pub fn get(&self, name: &str) -> Option<&Series> {
        self.entries
            .iter()
            .find(|(feature, _)| feature.name() == name)
            .map(|(_, series)| series)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Feature, &Series)> {
        self.entries.iter().map(|(feature, series)| (feature, series))
    }

    pub fn into_entries(self) -> Vec<(Feature, Series)> {
        self.entries
    }
}

/// Parse one matrix column into a rainfall series.
///
/// Blank and NaN-like cells are missing; any other non-numeric cell fails
/// the whole channel.
pub fn channel_series(column: &Column) -> Result<Series, ChannelError> {
    column
        .cells
        .iter()
        .enumerate()
        .map(|(row, cell)| {
            parse_cell(cell).map_err(|_| ChannelError::NonNumeric {
                row,
                value: cell.clone(),
            })
        })
        .collect()
}

/// Compute a single feature instance over `s`.
pub fn compute(s: &[Option<f64>], feature: Feature, config: &FeatureConfig) -> Series {
    match feature {
        Feature::Lag(h) => past::lag(s, h),
        Feature::RollingSum(w) => past::rolling_sum(s, w),
        Feature::RollingMax(w) => past::rolling_max(s, w),
        Feature::Api(hl) => past::api(s, hl),
        Feature::DrySpell => past::dry_spell(s, config.dry_threshold),
        Feature::RainNow => past::rain_now(s, config.wet_threshold),
        Feature::Delta1h => past::delta_1h(s),
        Feature::FutureSum(h) => future::future_sum(s, h),
        Feature::FutureMax(h) => future::future_max(s, h),
        Feature::TimeToPeak(h) => future::time_to_peak(s, h),
        Feature::FrontShare(h) => future::front_share(s, h),
    }
}

/// Every configured feature of one channel, in family order.
pub fn engineer_channel(s: &[Option<f64>], config: &FeatureConfig) -> FeatureSet {
    let entries = config
        .features()
        .into_iter()
        .map(|feature| (feature, compute(s, feature, config)))
        .collect();
    FeatureSet { entries }
}
