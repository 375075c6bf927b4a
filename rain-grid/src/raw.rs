//! Raw grid-point payloads to the wide rainfall matrix.
//!
//! A raw payload is a list of points, each carrying its own coordinates,
//! time axis metadata and an hourly precipitation array:
//!
//! ```text
//! {"points": [{"lat": 1.22, "lon": 103.6, "t_start": 1704038400,
//!              "t_end": 1704045600, "dt": 3600, "precip": [0.0, 1.2]}]}
//! ```
//!
//! Every point is assumed to share the first point's time axis. Cells are
//! placed on a lat/lon grid rounded to four decimal places; there is no
//! interpolation, so absent cells stay missing.

use crate::channel::Channel;
use crate::matrix::{Column, MatrixError, RainfallMatrix};
use crate::timestamp::{TimeIndex, Timestamp};
use chrono::{DateTime, FixedOffset};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// Scale for rounding coordinates to four decimal places.
const GRID_SCALE: f64 = 10_000.0;

#[derive(Debug, Error)]
pub enum RawGridError {
    #[error("raw payload has no points")]
    NoPoints,
    #[error("time step must be positive, got {0} seconds")]
    NonPositiveStep(i64),
    #[error("time axis ends ({end}) before it starts ({start})")]
    EndBeforeStart { start: i64, end: i64 },
    #[error("unix time {0} is out of range")]
    OutOfRange(i64),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPayload {
    pub points: Vec<RawPoint>,
}

/// One grid point with its own hourly series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    pub lat: f64,
    pub lon: f64,
    /// Unix seconds, inclusive.
    pub t_start: i64,
    /// Unix seconds, exclusive.
    pub t_end: i64,
    /// Step in seconds.
    pub dt: i64,
    #[serde(default)]
    pub precip: Vec<Option<f64>>,
}

/// Sorted unique grid coordinates, in units of 1e-4 degrees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pub lats: Vec<i64>,
    pub lons: Vec<i64>,
}

impl Grid {
    pub fn cell_count(&self) -> usize {
        self.lats.len() * self.lons.len()
    }
}

fn grid_key(coordinate: f64) -> i64 {
    (coordinate * GRID_SCALE).round() as i64
}

fn from_key(key: i64) -> f64 {
    key as f64 / GRID_SCALE
}

impl RawPayload {
    pub fn from_json_str(data: &str) -> Result<Self, RawGridError> {
        Ok(serde_json::from_str(data)?)
    }
}

/// Unique latitudes and longitudes across all points, sorted ascending.
pub fn infer_grid(points: &[RawPoint]) -> Grid {
    let lats: BTreeSet<i64> = points.iter().map(|p| grid_key(p.lat)).collect();
    let lons: BTreeSet<i64> = points.iter().map(|p| grid_key(p.lon)).collect();
    Grid {
        lats: lats.into_iter().collect(),
        lons: lons.into_iter().collect(),
    }
}

/// Time axis `[t_start, t_end)` stepped by `dt`, rendered at `offset`.
pub fn build_time_index(point: &RawPoint, offset: FixedOffset) -> Result<TimeIndex, RawGridError> {
    if point.dt <= 0 {
        return Err(RawGridError::NonPositiveStep(point.dt));
    }
    if point.t_end < point.t_start {
        return Err(RawGridError::EndBeforeStart {
            start: point.t_start,
            end: point.t_end,
        });
    }
    let mut timestamps = Vec::new();
    let mut t = point.t_start;
    while t < point.t_end {
        let utc = DateTime::from_timestamp(t, 0).ok_or(RawGridError::OutOfRange(t))?;
        timestamps.push(Timestamp::from_datetime(utc.with_timezone(&offset)));
        t += point.dt;
    }
    Ok(TimeIndex::new(timestamps))
}

/// Flatten a raw payload into a matrix with one `"lat,lon"` column per grid
/// cell, ordered latitude-major.
///
/// Precipitation arrays shorter than the time axis leave trailing rows
/// missing; longer arrays are truncated.
pub fn to_matrix(payload: &RawPayload, offset: FixedOffset) -> Result<RainfallMatrix, RawGridError> {
    let reference = payload.points.first().ok_or(RawGridError::NoPoints)?;
    let index = build_time_index(reference, offset)?;
    let rows = index.len();
    let grid = infer_grid(&payload.points);

    let mut cells: HashMap<(i64, i64), Vec<Option<f64>>> = HashMap::new();
    for point in &payload.points {
        if point.precip.len() != rows {
            warn!(
                "raw: point ({}, {}) has {} values for {} timestamps",
                point.lat,
                point.lon,
                point.precip.len(),
                rows
            );
        }
        let mut values = vec![None; rows];
        for (slot, value) in values.iter_mut().zip(&point.precip) {
            *slot = *value;
        }
        cells.insert((grid_key(point.lat), grid_key(point.lon)), values);
    }

    let mut columns = Vec::with_capacity(grid.cell_count());
    for lat in &grid.lats {
        for lon in &grid.lons {
            let channel = Channel::from_coordinates(from_key(*lat), from_key(*lon));
            let column = match cells.get(&(*lat, *lon)) {
                Some(values) => Column::from_values(channel.label, values),
                None => Column::from_values(channel.label, &vec![None; rows]),
            };
            columns.push(column);
        }
    }

    info!(
        "raw: {} points on a {}x{} grid, {} timestamps",
        payload.points.len(),
        grid.lats.len(),
        grid.lons.len(),
        rows
    );
    Ok(RainfallMatrix::new(index, columns)?)
}
