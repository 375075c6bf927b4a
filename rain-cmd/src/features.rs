//! Feature engineering command: processed rainfall CSV in, feature CSV out.

use anyhow::Context;
use log::{debug, info, warn};
use rain_features::table::SkippedChannel;
use rain_features::{engineer_all_channels, ColumnOrder, FeatureConfig};
use rain_grid::RainfallMatrix;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub dry_threshold: Option<f64>,
    pub wet_threshold: Option<f64>,
    pub column_order: Option<ColumnOrder>,
}

/// Shape of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub rows: usize,
    pub features: usize,
    pub skipped: Vec<SkippedChannel>,
}

/// Load the JSON config at `path` (or the defaults) and apply `overrides`.
pub fn load_config(path: Option<&str>, overrides: &Overrides) -> anyhow::Result<FeatureConfig> {
    let mut config = match path {
        Some(path) => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {path}"))?;
            FeatureConfig::from_json_str(&data).with_context(|| format!("parsing config {path}"))?
        }
        None => FeatureConfig::default(),
    };
    if let Some(dry) = overrides.dry_threshold {
        config.dry_threshold = dry;
    }
    if let Some(wet) = overrides.wet_threshold {
        config.wet_threshold = wet;
    }
    if let Some(order) = overrides.column_order {
        config.column_order = order;
    }
    config.validate()?;
    Ok(config)
}

/// One `name<TAB>past|lookahead` line per feature instance, in output order.
///
/// Lookahead features read `t+1 ..= t+H` of the same series and leak the
/// target if fed to a live model.
pub fn feature_listing(config: &FeatureConfig) -> Vec<String> {
    config
        .features()
        .into_iter()
        .map(|feature| {
            let kind = if feature.is_forward_looking() {
                "lookahead"
            } else {
                "past"
            };
            format!("{feature}\t{kind}")
        })
        .collect()
}

/// Read a processed rainfall CSV from `input`, write the feature table to `output`.
pub fn engineer<R: Read, W: Write>(
    input: R,
    output: W,
    time_column: &str,
    config: &FeatureConfig,
) -> anyhow::Result<Summary> {
    let matrix = RainfallMatrix::from_csv_reader(input, time_column)?;
    let assembly = engineer_all_channels(&matrix, config)?;
    assembly.table.write_csv(output)?;
    Ok(Summary {
        rows: assembly.table.row_count(),
        features: assembly.table.column_count(),
        skipped: assembly.skipped,
    })
}

pub fn run_features(
    input: &str,
    output: &str,
    time_column: &str,
    config: &FeatureConfig,
) -> anyhow::Result<()> {
    let reader = File::open(input).with_context(|| format!("opening {input}"))?;
    if let Some(parent) = Path::new(output).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let writer = File::create(output).with_context(|| format!("creating {output}"))?;

    info!("Engineering features from {}", input);
    debug!("Per-channel features: {}", config.feature_names().join(", "));
    let summary = engineer(
        BufReader::new(reader),
        BufWriter::new(writer),
        time_column,
        config,
    )?;

    for skipped in &summary.skipped {
        warn!("Channel {} skipped: {}", skipped.label, skipped.error);
    }
    info!("Saved features to: {}", output);
    info!(
        "Shape: {} rows x {} features",
        summary.rows, summary.features
    );
    Ok(())
}
