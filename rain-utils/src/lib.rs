//! Shared utility functions for rainfall feature crates.

/// Timestamp utility functions
pub mod dates {
    use chrono::{DateTime, FixedOffset, NaiveDateTime};

    /// Output format for timestamps carrying a UTC offset, e.g.
    /// "2024-01-01 00:00:00+08:00".
    pub const OFFSET_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

    /// Naive formats accepted after the offset-bearing ones fail.
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];

    /// Parse a timestamp into its wall-clock time and, when present, its UTC offset.
    ///
    /// Accepts RFC 3339, "YYYY-MM-DD HH:MM:SS+HH:MM", and the naive forms
    /// "YYYY-MM-DD HH:MM:SS", "YYYY-MM-DDTHH:MM:SS" and "YYYY-MM-DD HH:MM".
    /// The offset is informational; nothing downstream converts zones.
    pub fn parse_timestamp(s: &str) -> anyhow::Result<(NaiveDateTime, Option<FixedOffset>)> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok((dt.naive_local(), Some(*dt.offset())));
        }
        if let Ok(dt) = DateTime::parse_from_str(s, OFFSET_FORMAT) {
            return Ok((dt.naive_local(), Some(*dt.offset())));
        }
        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                return Ok((naive, None));
            }
        }
        anyhow::bail!("unrecognised timestamp {s:?}")
    }

    /// Format a zoned timestamp as "YYYY-MM-DD HH:MM:SS+HH:MM".
    pub fn format_timestamp(dt: &DateTime<FixedOffset>) -> String {
        dt.format(OFFSET_FORMAT).to_string()
    }

    /// Build a fixed offset from whole hours east of UTC.
    pub fn offset_from_hours(hours: i32) -> anyhow::Result<FixedOffset> {
        FixedOffset::east_opt(hours * 3600)
            .ok_or_else(|| anyhow::anyhow!("UTC offset of {hours} hours is out of range"))
    }

}

/// Cell parsing and rendering for rainfall tables.
pub mod cells {
    use crate::error::CellError;

    /// Tokens read as a missing value.
    pub const MISSING_TOKENS: [&str; 5] = ["", "nan", "NaN", "NA", "null"];

    /// Parse a table cell as an optional rainfall amount.
    ///
    /// Missing tokens map to `Ok(None)`; anything else must be a finite number.
    pub fn parse_cell(raw: &str) -> Result<Option<f64>, CellError> {
        let trimmed = raw.trim();
        if MISSING_TOKENS.contains(&trimmed) {
            return Ok(None);
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(CellError::NonNumeric(trimmed.to_string())),
        }
    }

    /// Render an optional value as a CSV field; missing becomes an empty field.
    pub fn format_cell(value: Option<f64>) -> String {
        value.map_or(String::new(), |v| v.to_string())
    }

}

/// Error types
pub mod error {
    use thiserror::Error;

    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum CellError {
        #[error("non-numeric cell {0:?}")]
        NonNumeric(String),
    }
}
