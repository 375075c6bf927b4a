//! Command implementations for the rainfall feature CLI.
//!
//! Provides subcommands to grid raw point payloads into the wide hourly
//! rainfall CSV and to engineer per-cell temporal features from it.

use clap::Subcommand;
use rain_features::ColumnOrder;

pub mod features;
pub mod process;

/// Processed wide rainfall CSV: `timestamp` plus one `"lat,lon"` column per cell.
pub const DEFAULT_PROCESSED_CSV: &str = "./data/processed/sg_rainfall_processed.csv";
pub const DEFAULT_FEATURES_CSV: &str = "./data/processed/rainfall_temporal_features.csv";
pub const DEFAULT_RAW_JSON: &str = "./data/raw/sg_rainfall_raw.json";

#[derive(Subcommand)]
pub enum Command {
    /// Engineer per-cell temporal rainfall features (no spatial aggregation)
    Features {
        /// Processed rainfall CSV with a timestamp column and "lat,lon" headers
        #[arg(short, long, default_value = DEFAULT_PROCESSED_CSV)]
        input: String,

        /// Output path for the engineered features CSV
        #[arg(short, long, default_value = DEFAULT_FEATURES_CSV)]
        output: String,

        /// JSON feature configuration; absent keys take defaults
        #[arg(short, long)]
        config: Option<String>,

        /// Rainfall (mm) at or below which an hour is dry
        #[arg(long)]
        dry_threshold: Option<f64>,

        /// Rainfall (mm) above which an hour is wet
        #[arg(long)]
        wet_threshold: Option<f64>,

        /// Output column order: grouped or alphabetical
        #[arg(long)]
        column_order: Option<ColumnOrder>,

        /// Name of the time index column
        #[arg(long, default_value = rain_grid::matrix::DEFAULT_TIME_COLUMN)]
        time_column: String,
    },

    /// Grid a raw point payload into the wide hourly rainfall CSV
    Process {
        /// Raw JSON payload of grid points
        #[arg(short, long, default_value = DEFAULT_RAW_JSON)]
        raw: String,

        /// Output path for the processed wide CSV
        #[arg(short, long, default_value = DEFAULT_PROCESSED_CSV)]
        output: String,

        /// UTC offset (hours) used to label timestamps
        #[arg(long, default_value_t = 8, allow_hyphen_values = true)]
        utc_offset_hours: i32,

        /// Also write per-timestep heatmap frames as JSON to this path
        #[arg(long)]
        frames: Option<String>,
    },

    /// Print the per-channel feature names for a configuration, each marked past or lookahead
    ListFeatures {
        /// JSON feature configuration; absent keys take defaults
        #[arg(short, long)]
        config: Option<String>,
    },
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Features {
            input,
            output,
            config,
            dry_threshold,
            wet_threshold,
            column_order,
            time_column,
        } => {
            let overrides = features::Overrides {
                dry_threshold,
                wet_threshold,
                column_order,
            };
            let config = features::load_config(config.as_deref(), &overrides)?;
            features::run_features(&input, &output, &time_column, &config)
        }
        Command::Process {
            raw,
            output,
            utc_offset_hours,
            frames,
        } => process::run_process(&raw, &output, utc_offset_hours, frames.as_deref()),
        Command::ListFeatures { config } => {
            let config = features::load_config(config.as_deref(), &features::Overrides::default())?;
            for line in features::feature_listing(&config) {
                println!("{line}");
            }
            Ok(())
        }
    }
}
