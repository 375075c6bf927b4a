//! Table assembly: run the engine on every channel and widen the results.
//!
//! Channels share only read-only inputs, so they fan out across a rayon
//! pool and are merged once, in channel order, at the end.

use crate::config::{ColumnOrder, ConfigError, FeatureConfig};
use crate::engine::{channel_series, engineer_channel, ChannelError, FeatureSet};
use crate::Series;
use log::{debug, info, warn};
use rain_grid::selector::select_channels;
use rain_grid::{Channel, RainfallMatrix, TimeIndex};
use rain_utils::cells::format_cell;
use rayon::prelude::*;
use std::collections::HashSet;
use std::io;
use thiserror::Error;

/// Hard failures of assembly. Anything narrower is isolated per channel.
#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("invalid feature configuration: {0}")]
    Config(#[from] ConfigError),
}

/// One output column, `<feature>_<lat>_<lon>`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureColumn {
    pub name: String,
    pub values: Series,
}

/// A channel left out of the table, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedChannel {
    pub label: String,
    pub error: ChannelError,
}

/// The wide feature table, aligned row-for-row with the input index.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    time_column: String,
    index: TimeIndex,
    columns: Vec<FeatureColumn>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub table: FeatureTable,
    pub skipped: Vec<SkippedChannel>,
}

impl FeatureTable {
    /// Header of the time index column, carried over from the input matrix.
    pub fn time_column(&self) -> &str {
        &self.time_column
    }

    pub fn index(&self) -> &TimeIndex {
        &self.index
    }

    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&FeatureColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.index.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Write the time column then every feature column; missing values are empty fields.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        let mut header = vec![self.time_column.as_str()];
        header.extend(self.columns.iter().map(|c| c.name.as_str()));
        wtr.write_record(&header)?;
        for (row, timestamp) in self.index.iter().enumerate() {
            let mut record = Vec::with_capacity(self.columns.len() + 1);
            record.push(timestamp.text().to_string());
            record.extend(self.columns.iter().map(|c| format_cell(c.values[row])));
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

fn run_channel(
    matrix: &RainfallMatrix,
    channel: &Channel,
    config: &FeatureConfig,
) -> Result<FeatureSet, ChannelError> {
    let column = matrix
        .column(&channel.label)
        .ok_or(ChannelError::MissingColumn)?;
    let series = channel_series(column)?;
    Ok(engineer_channel(&series, config))
}

/// Run the engine once per channel and concatenate the renamed results.
///
/// A channel that fails (non-numeric data, absent column, name collision)
/// is skipped and reported; the rest of the table is still built. Only an
/// invalid configuration aborts.
pub fn assemble(
    matrix: &RainfallMatrix,
    channels: &[Channel],
    config: &FeatureConfig,
) -> Result<Assembly, AssembleError> {
    config.validate()?;
    if !matrix.index().is_strictly_increasing() {
        warn!("assemble: time index is not strictly increasing; windows count rows as given");
    }

    let results: Vec<(&Channel, Result<FeatureSet, ChannelError>)> = channels
        .par_iter()
        .map(|channel| (channel, run_channel(matrix, channel, config)))
        .collect();

    let mut columns = Vec::with_capacity(channels.len() * config.instance_count());
    let mut skipped = Vec::new();
    let mut seen = HashSet::new();
    for (channel, result) in results {
        let outcome = result.and_then(|set| {
            let renamed: Vec<FeatureColumn> = set
                .into_entries()
                .into_iter()
                .map(|(feature, values)| FeatureColumn {
                    name: channel.feature_name(&feature.name()),
                    values,
                })
                .collect();
            match renamed.iter().find(|c| seen.contains(&c.name)) {
                Some(clash) => Err(ChannelError::DuplicateName(clash.name.clone())),
                None => Ok(renamed),
            }
        });
        match outcome {
            Ok(renamed) => {
                debug!("assemble: channel {:?} -> {} columns", channel.label, renamed.len());
                seen.extend(renamed.iter().map(|c| c.name.clone()));
                columns.extend(renamed);
            }
            Err(error) => {
                warn!("assemble: skipping channel {:?}: {}", channel.label, error);
                skipped.push(SkippedChannel {
                    label: channel.label.clone(),
                    error,
                });
            }
        }
    }

    if config.column_order == ColumnOrder::Alphabetical {
        columns.sort_by(|a, b| a.name.cmp(&b.name));
    }

    let table = FeatureTable {
        time_column: matrix.time_column().to_string(),
        index: matrix.index().clone(),
        columns,
    };
    info!(
        "assemble: {} rows x {} features from {} channels ({} skipped)",
        table.row_count(),
        table.column_count(),
        channels.len() - skipped.len(),
        skipped.len()
    );
    Ok(Assembly { table, skipped })
}

/// Select the rainfall channels of `matrix` and assemble their features.
pub fn engineer_all_channels(
    matrix: &RainfallMatrix,
    config: &FeatureConfig,
) -> Result<Assembly, AssembleError> {
    let channels = select_channels(&matrix.labels());
    assemble(matrix, &channels, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRID: &str = r#"timestamp,"1.2200,103.6000",station,"1.3000,103.7000"
2024-01-01 00:00:00+08:00,0,a,1
2024-01-01 01:00:00+08:00,0,a,2
2024-01-01 02:00:00+08:00,0,a,3
2024-01-01 03:00:00+08:00,5,a,4
2024-01-01 04:00:00+08:00,0,a,0
2024-01-01 05:00:00+08:00,0,a,0
"#;

    fn small_config() -> FeatureConfig {
        FeatureConfig {
            lag_hours: vec![1],
            sum_windows: vec![3],
            max_windows: vec![],
            api_halflives: vec![6],
            future_sum_horizons: vec![4],
            future_max_horizons: vec![],
            ttp_horizons: vec![4],
            frontshare_horizon: 4,
            ..FeatureConfig::default()
        }
    }

    #[test]
    fn test_shape_and_names() {
        let matrix = RainfallMatrix::from_csv_str(GRID).unwrap();
        let config = FeatureConfig::default();
        let assembly = engineer_all_channels(&matrix, &config).unwrap();
        let table = &assembly.table;
        assert!(assembly.skipped.is_empty());
        assert_eq!(table.row_count(), matrix.row_count());
        assert_eq!(table.column_count(), 2 * config.instance_count());
        assert_eq!(table.names()[0], "lag1h_1.2200_103.6000");
        assert_eq!(table.names()[30], "lag1h_1.3000_103.7000");
        assert!(table.columns().iter().all(|c| c.values.len() == 6));
    }

    #[test]
    fn test_grouped_order_follows_channels_then_families() {
        let matrix = RainfallMatrix::from_csv_str(GRID).unwrap();
        let table = engineer_all_channels(&matrix, &small_config()).unwrap().table;
        assert_eq!(
            table.names(),
            vec![
                "lag1h_1.2200_103.6000",
                "sum3h_1.2200_103.6000",
                "api_hl6h_1.2200_103.6000",
                "dryspell_1.2200_103.6000",
                "rainnow_1.2200_103.6000",
                "delta1h_1.2200_103.6000",
                "next4h_sum_1.2200_103.6000",
                "ttp_next4h_1.2200_103.6000",
                "frontshare_next4h_1.2200_103.6000",
                "lag1h_1.3000_103.7000",
                "sum3h_1.3000_103.7000",
                "api_hl6h_1.3000_103.7000",
                "dryspell_1.3000_103.7000",
                "rainnow_1.3000_103.7000",
                "delta1h_1.3000_103.7000",
                "next4h_sum_1.3000_103.7000",
                "ttp_next4h_1.3000_103.7000",
                "frontshare_next4h_1.3000_103.7000",
            ]
        );
    }

    #[test]
    fn test_alphabetical_order() {
        let matrix = RainfallMatrix::from_csv_str(GRID).unwrap();
        let config = FeatureConfig {
            column_order: ColumnOrder::Alphabetical,
            ..small_config()
        };
        let table = engineer_all_channels(&matrix, &config).unwrap().table;
        let names = table.names();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names[0], "api_hl6h_1.2200_103.6000");
    }

    #[test]
    fn test_values_per_channel() {
        let matrix = RainfallMatrix::from_csv_str(GRID).unwrap();
        let table = engineer_all_channels(&matrix, &small_config()).unwrap().table;
        let share = &table.column("frontshare_next4h_1.3000_103.7000").unwrap().values;
        // next four hours from t=0: 2,3,4,0
        assert!((share[0].unwrap() - 5.0 / 9.0).abs() < 1e-12);
        assert_eq!(share[2], None);
        let ttp = &table.column("ttp_next4h_1.3000_103.7000").unwrap().values;
        assert_eq!(ttp[0], Some(3.0));
        let sums = &table.column("sum3h_1.3000_103.7000").unwrap().values;
        assert_eq!(sums[..], [None, None, Some(6.0), Some(9.0), Some(7.0), Some(4.0)]);
        let dry = &table.column("dryspell_1.2200_103.6000").unwrap().values;
        assert_eq!(dry[3], Some(3.0));
    }

    #[test]
    fn test_bad_channel_is_isolated() {
        let csv = r#"timestamp,"1.0,2.0","3.0,4.0"
2024-01-01 00:00,0.5,x
2024-01-01 01:00,1.0,0
"#;
        let matrix = RainfallMatrix::from_csv_str(csv).unwrap();
        let config = small_config();
        let assembly = engineer_all_channels(&matrix, &config).unwrap();
        assert_eq!(assembly.table.column_count(), config.instance_count());
        assert_eq!(assembly.skipped.len(), 1);
        assert_eq!(assembly.skipped[0].label, "3.0,4.0");
        assert_eq!(
            assembly.skipped[0].error,
            ChannelError::NonNumeric {
                row: 0,
                value: "x".to_string()
            }
        );
    }

    #[test]
    fn test_colliding_labels_skip_later_channel() {
        let csv = "timestamp,\"1.0,2.0\",\"1.0, 2.0\"\n2024-01-01 00:00,0,0\n";
        let matrix = RainfallMatrix::from_csv_str(csv).unwrap();
        let assembly = engineer_all_channels(&matrix, &small_config()).unwrap();
        assert_eq!(assembly.skipped.len(), 1);
        assert_eq!(assembly.skipped[0].label, "1.0, 2.0");
        assert!(matches!(
            assembly.skipped[0].error,
            ChannelError::DuplicateName(_)
        ));
    }

    #[test]
    fn test_unknown_channel_is_skipped() {
        let matrix = RainfallMatrix::from_csv_str(GRID).unwrap();
        let ghost = Channel::parse("9.0,9.0").unwrap();
        let assembly = assemble(&matrix, &[ghost], &small_config()).unwrap();
        assert_eq!(assembly.table.column_count(), 0);
        assert_eq!(assembly.skipped[0].error, ChannelError::MissingColumn);
    }

    #[test]
    fn test_no_channels_keeps_index() {
        let csv = "timestamp,station\n2024-01-01 00:00,a\n2024-01-01 01:00,b\n";
        let matrix = RainfallMatrix::from_csv_str(csv).unwrap();
        let table = engineer_all_channels(&matrix, &FeatureConfig::default())
            .unwrap()
            .table;
        assert_eq!(table.column_count(), 0);
        assert_eq!(table.row_count(), 2);
        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().collect::<Vec<_>>(), vec!["timestamp", "2024-01-01 00:00", "2024-01-01 01:00"]);
    }

    #[test]
    fn test_time_column_name_carried_to_output() {
        let csv = "time,\"1.0,2.0\"\n2024-01-01 00:00,1\n2024-01-01 01:00,2\n";
        let matrix = RainfallMatrix::from_csv_reader(csv.as_bytes(), "time").unwrap();
        let table = engineer_all_channels(&matrix, &small_config()).unwrap().table;
        assert_eq!(table.time_column(), "time");
        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("time,lag1h_1.0_2.0,"));
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let matrix = RainfallMatrix::from_csv_str(GRID).unwrap();
        let config = FeatureConfig {
            lag_hours: vec![0],
            ..FeatureConfig::default()
        };
        assert!(matches!(
            engineer_all_channels(&matrix, &config),
            Err(AssembleError::Config(ConfigError::Zero { .. }))
        ));
    }

    #[test]
    fn test_huge_horizons_do_not_abort() {
        let csv = "timestamp,\"1.0,2.0\"\n2024-01-01 00:00,1\n2024-01-01 01:00,2\n2024-01-01 02:00,3\n";
        let matrix = RainfallMatrix::from_csv_str(csv).unwrap();
        let config = FeatureConfig::from_json_str(
            r#"{"future_sum_horizons": [18446744073709551615],
                "ttp_horizons": [18446744073709551615],
                "frontshare_horizon": 18446744073709551615,
                "lag_hours": [18446744073709551615],
                "sum_windows": [18446744073709551615]}"#,
        )
        .unwrap();
        let assembly = engineer_all_channels(&matrix, &config).unwrap();
        assert!(assembly.skipped.is_empty());
        let sums = &assembly.table.column(&format!("next{}h_sum_1.0_2.0", usize::MAX)).unwrap().values;
        assert_eq!(sums, &vec![None, None, None]);
    }

    #[test]
    fn test_deterministic() {
        let matrix = RainfallMatrix::from_csv_str(GRID).unwrap();
        let config = FeatureConfig::default();
        let a = engineer_all_channels(&matrix, &config).unwrap();
        let b = engineer_all_channels(&matrix, &config).unwrap();
        let mut first = Vec::new();
        let mut second = Vec::new();
        a.table.write_csv(&mut first).unwrap();
        b.table.write_csv(&mut second).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_write_csv_missing_as_empty() {
        let matrix = RainfallMatrix::from_csv_str(GRID).unwrap();
        let config = FeatureConfig {
            lag_hours: vec![1],
            sum_windows: vec![],
            api_halflives: vec![],
            future_sum_horizons: vec![],
            ttp_horizons: vec![],
            ..small_config()
        };
        let table = assemble(
            &matrix,
            &[Channel::parse("1.2200,103.6000").unwrap()],
            &config,
        )
        .unwrap()
        .table;
        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "timestamp,lag1h_1.2200_103.6000,dryspell_1.2200_103.6000,rainnow_1.2200_103.6000,\
             delta1h_1.2200_103.6000,frontshare_next4h_1.2200_103.6000"
        );
        // next four hours from t=0 are 0,0,5,0: all rain in the back half
        assert_eq!(lines[1], "2024-01-01 00:00:00+08:00,,0,0,,0");
        assert_eq!(lines[4], "2024-01-01 03:00:00+08:00,0,3,1,5,");
    }
}
