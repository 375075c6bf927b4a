//! Temporal feature engine for hourly, multi-channel rainfall.
//!
//! Every rainfall channel (one `"lat,lon"` column) is turned into a fixed
//! catalogue of features, independently of every other channel:
//!
//! - past-only: lags, trailing rolling sums and maxima, antecedent
//!   precipitation index, dry-spell length, raining-now flag, 1h delta
//! - forward-looking: sums, maxima, time-to-peak and front share over the
//!   next `H` hours
//!
//! Forward-looking features read later rows of the same historical series.
//! They are a training-time proxy for a forecast and leak the future if
//! used as live model inputs.
//!
//! Output columns are named `<feature>_<lat>_<lon>`. Undefined positions
//! (not enough history or lookahead, zero denominators) are `None`.
//!
//! ```rust
//! use rain_features::{config::FeatureConfig, table::engineer_all_channels};
//! use rain_grid::RainfallMatrix;
//!
//! let csv = r#"timestamp,"1.2200,103.6000"
//! 2024-01-01 00:00,0
//! 2024-01-01 01:00,0
//! 2024-01-01 02:00,0
//! 2024-01-01 03:00,5
//! 2024-01-01 04:00,0
//! 2024-01-01 05:00,0
//! "#;
//! let matrix = RainfallMatrix::from_csv_str(csv).unwrap();
//! let config = FeatureConfig::default();
//! let assembly = engineer_all_channels(&matrix, &config).unwrap();
//! let table = assembly.table;
//! assert_eq!(table.row_count(), 6);
//! assert_eq!(table.column_count(), config.instance_count());
//! let dry = table.column("dryspell_1.2200_103.6000").unwrap();
//! assert_eq!(dry.values[3], Some(3.0));
//! ```

pub mod config;
pub mod engine;
pub mod feature;
pub mod future;
pub mod past;
pub mod table;
mod window;

/// A feature or channel series aligned with the time index; `None` is missing.
pub type Series = Vec<Option<f64>>;

pub use config::{ColumnOrder, ConfigError, FeatureConfig};
pub use engine::{engineer_channel, ChannelError, FeatureSet};
pub use feature::Feature;
pub use table::{assemble, engineer_all_channels, AssembleError, Assembly, FeatureTable};
