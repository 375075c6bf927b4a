//! Core types for hourly, multi-channel rainfall grids.
//!
//! A rainfall grid is a wide table: one timestamp column used as the time
//! index, plus one column per spatial cell labelled `"<lat>,<lon>"`.
//!
//! ```rust
//! use rain_grid::{matrix::RainfallMatrix, selector::select_channels};
//!
//! let csv = r#"timestamp,"1.2200,103.6000",note
//! 2024-01-01 00:00:00+08:00,0.0,a
//! 2024-01-01 01:00:00+08:00,1.5,b
//! "#;
//! let matrix = RainfallMatrix::from_csv_str(csv).unwrap();
//! let channels = select_channels(&matrix.labels());
//! assert_eq!(channels.len(), 1);
//! assert_eq!(channels[0].suffix(), "1.2200_103.6000");
//! ```

pub mod channel;
pub mod frames;
pub mod matrix;
pub mod raw;
pub mod selector;
pub mod timestamp;

pub use channel::Channel;
pub use frames::HeatmapFrames;
pub use matrix::{Column, MatrixError, RainfallMatrix};
pub use timestamp::{TimeIndex, Timestamp};
