//! The wide input table: a time index plus labelled value columns.
//!
//! # CSV Format
//!
//! Headers are required. One column (default `timestamp`) holds the time
//! index; every other column is kept as raw text so that a bad cell only
//! affects its own channel later on.
//!
//! ```text
//! timestamp,"1.2200,103.6000","1.2200,103.6500"
//! 2024-01-01 00:00:00+08:00,0.0,0.4
//! 2024-01-01 01:00:00+08:00,1.2,
//! ```

use crate::timestamp::{TimeIndex, Timestamp};
use log::{info, warn};
use rain_utils::cells::format_cell;
use std::collections::HashSet;
use std::io;
use thiserror::Error;

/// Header of the time index column written by the processing step.
pub const DEFAULT_TIME_COLUMN: &str = "timestamp";

/// Input shape errors. These are the only failures that abort a run.
#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("no time index column {0:?} in header")]
    MissingTimeIndex(String),
    #[error("row {row}: unparseable timestamp {value:?}")]
    Timestamp { row: usize, value: String },
    #[error("row {row}: expected {expected} fields, found {found}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("column {label:?} has {found} rows, time index has {expected}")]
    LengthMismatch {
        label: String,
        expected: usize,
        found: usize,
    },
    #[error("duplicate column label {0:?}")]
    DuplicateLabel(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// One value column, cells kept as the text read from the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub label: String,
    pub cells: Vec<String>,
}

impl Column {
    pub fn new(label: impl Into<String>, cells: Vec<String>) -> Self {
        Column {
            label: label.into(),
            cells,
        }
    }

    /// Build a column from numeric values; `None` becomes an empty cell.
    pub fn from_values(label: impl Into<String>, values: &[Option<f64>]) -> Self {
        Column::new(label, values.iter().map(|v| format_cell(*v)).collect())
    }
}

/// Rainfall grid in wide form, aligned on one time index.
#[derive(Debug, Clone, PartialEq)]
pub struct RainfallMatrix {
    time_column: String,
    index: TimeIndex,
    columns: Vec<Column>,
}

impl RainfallMatrix {
    /// Build a matrix, checking that every column matches the index length
    /// and that labels are unique.
    pub fn new(index: TimeIndex, columns: Vec<Column>) -> Result<Self, MatrixError> {
        let mut seen = HashSet::new();
        for column in &columns {
            if column.cells.len() != index.len() {
                return Err(MatrixError::LengthMismatch {
                    label: column.label.clone(),
                    expected: index.len(),
                    found: column.cells.len(),
                });
            }
            if !seen.insert(column.label.as_str()) {
                return Err(MatrixError::DuplicateLabel(column.label.clone()));
            }
        }
        Ok(RainfallMatrix {
            time_column: DEFAULT_TIME_COLUMN.to_string(),
            index,
            columns,
        })
    }

    /// Rename the time index column written back out by [`write_csv`](Self::write_csv).
    pub fn with_time_column(mut self, name: impl Into<String>) -> Self {
        self.time_column = name.into();
        self
    }

    /// Read a headed CSV whose time index lives in `time_column`.
    ///
    /// Rows are stably sorted by timestamp; the index is not otherwise
    /// validated or gap-filled.
    pub fn from_csv_reader<R: io::Read>(reader: R, time_column: &str) -> Result<Self, MatrixError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let time_pos = headers
            .iter()
            .position(|h| h.trim() == time_column)
            .ok_or_else(|| MatrixError::MissingTimeIndex(time_column.to_string()))?;

        let mut rows: Vec<(Timestamp, csv::StringRecord)> = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let record = result?;
            // header is line 1, data rows start at 2
            let row = i + 2;
            if record.len() != headers.len() {
                return Err(MatrixError::Ragged {
                    row,
                    expected: headers.len(),
                    found: record.len(),
                });
            }
            let value = record.get(time_pos).unwrap_or("");
            let timestamp = Timestamp::parse(value).map_err(|_| MatrixError::Timestamp {
                row,
                value: value.to_string(),
            })?;
            rows.push((timestamp, record));
        }
        rows.sort_by_key(|(timestamp, _)| timestamp.instant());

        let mut columns: Vec<Column> = headers
            .iter()
            .enumerate()
            .filter(|(pos, _)| *pos != time_pos)
            .map(|(_, label)| Column::new(label, Vec::with_capacity(rows.len())))
            .collect();
        let mut timestamps = Vec::with_capacity(rows.len());
        for (timestamp, record) in rows {
            let values = record
                .iter()
                .enumerate()
                .filter(|(pos, _)| *pos != time_pos)
                .map(|(_, cell)| cell);
            for (column, cell) in columns.iter_mut().zip(values) {
                column.cells.push(cell.to_string());
            }
            timestamps.push(timestamp);
        }

        info!(
            "matrix: loaded {} rows x {} value columns",
            timestamps.len(),
            columns.len()
        );
        let index = TimeIndex::new(timestamps);
        if index.has_mixed_offsets() {
            warn!("matrix: time index mixes naive and offset timestamps; naive ones sort as UTC");
        }
        Ok(RainfallMatrix::new(index, columns)?.with_time_column(time_column))
    }

    /// Read CSV text with the default `timestamp` index column.
    pub fn from_csv_str(data: &str) -> Result<Self, MatrixError> {
        RainfallMatrix::from_csv_reader(data.as_bytes(), DEFAULT_TIME_COLUMN)
    }

    /// Write the matrix as CSV: the time column first, then every column in order.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), MatrixError> {
        let mut wtr = csv::Writer::from_writer(writer);
        let mut header = vec![self.time_column.as_str()];
        header.extend(self.columns.iter().map(|c| c.label.as_str()));
        wtr.write_record(&header)?;
        for (row, timestamp) in self.index.iter().enumerate() {
            let mut record = vec![timestamp.text()];
            record.extend(self.columns.iter().map(|c| c.cells[row].as_str()));
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Header of the time index column, as read or as set.
    pub fn time_column(&self) -> &str {
        &self.time_column
    }

    pub fn index(&self) -> &TimeIndex {
        &self.index
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, label: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.label == label)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.label.as_str()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.index.len()
    }
}
