//! Per-timestep heatmap frames for map animation front ends.
//!
//! Frame `k` lists `[lat, lon, value]` for every channel with a finite
//! value at row `k`; `index[k]` labels it as `YYYY-MM-DD HH:MM` wall-clock
//! time. Rendering the frames is left to the consumer.
//!
//! ```json
//! {"frames": [[[1.22, 103.6, 0.4]], []], "index": ["2024-01-01 00:00", "2024-01-01 01:00"]}
//! ```

use crate::matrix::RainfallMatrix;
use crate::selector::select_channels;
use log::debug;
use rain_utils::cells::parse_cell;
use serde::{Deserialize, Serialize};
use std::io;

/// Label format for each frame.
pub const FRAME_LABEL_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapFrames {
    pub frames: Vec<Vec<[f64; 3]>>,
    pub index: Vec<String>,
}

impl HeatmapFrames {
    /// Build one frame per row of `matrix` from its rainfall channels.
    ///
    /// Missing, non-numeric and non-finite cells are left out of their frame.
    pub fn from_matrix(matrix: &RainfallMatrix) -> Self {
        let channels: Vec<(f64, f64, &[String])> = select_channels(&matrix.labels())
            .into_iter()
            .filter_map(|channel| {
                let lat = channel.lat.parse::<f64>().ok()?;
                let lon = channel.lon.parse::<f64>().ok()?;
                let column = matrix.column(&channel.label)?;
                Some((lat, lon, column.cells.as_slice()))
            })
            .collect();

        let frames: Vec<Vec<[f64; 3]>> = (0..matrix.row_count())
            .map(|row| {
                channels
                    .iter()
                    .filter_map(|(lat, lon, cells)| {
                        let value = parse_cell(&cells[row]).ok().flatten()?;
                        Some([*lat, *lon, value])
                    })
                    .collect()
            })
            .collect();
        let index = matrix
            .index()
            .iter()
            .map(|ts| ts.local().format(FRAME_LABEL_FORMAT).to_string())
            .collect();

        debug!(
            "frames: {} frames over {} channels",
            frames.len(),
            channels.len()
        );
        HeatmapFrames { frames, index }
    }

    pub fn write_json<W: io::Write>(&self, writer: W) -> Result<(), serde_json::Error> {
        serde_json::to_writer(writer, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRID: &str = r#"timestamp,"1.2200,103.6000",note,"1.3000,103.7000"
2024-01-01 00:00:00+08:00,0.4,a,
2024-01-01 01:00:00+08:00,nan,b,x
2024-01-01 02:00:00+08:00,inf,c,2.5
"#;

    #[test]
    fn test_frames_keep_finite_values_only() {
        let matrix = RainfallMatrix::from_csv_str(GRID).unwrap();
        let frames = HeatmapFrames::from_matrix(&matrix);
        assert_eq!(frames.frames.len(), 3);
        assert_eq!(frames.frames[0], vec![[1.22, 103.6, 0.4]]);
        assert!(frames.frames[1].is_empty());
        assert_eq!(frames.frames[2], vec![[1.3, 103.7, 2.5]]);
    }

    #[test]
    fn test_labels_use_wall_clock_minutes() {
        let matrix = RainfallMatrix::from_csv_str(GRID).unwrap();
        let frames = HeatmapFrames::from_matrix(&matrix);
        assert_eq!(
            frames.index,
            vec!["2024-01-01 00:00", "2024-01-01 01:00", "2024-01-01 02:00"]
        );
    }

    #[test]
    fn test_json_shape() {
        let matrix = RainfallMatrix::from_csv_str(GRID).unwrap();
        let mut out = Vec::new();
        HeatmapFrames::from_matrix(&matrix).write_json(&mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["frames"][0][0][2], 0.4);
        assert_eq!(value["index"][2], "2024-01-01 02:00");
    }
}
