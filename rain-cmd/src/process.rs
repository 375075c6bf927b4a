//! Raw grid processing command: point payload JSON in, wide rainfall CSV out.

use anyhow::Context;
use log::info;
use rain_grid::raw::{to_matrix, RawPayload};
use rain_grid::HeatmapFrames;
use rain_utils::dates::offset_from_hours;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

fn create_output(path: &str) -> anyhow::Result<BufWriter<File>> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let file = File::create(path).with_context(|| format!("creating {path}"))?;
    Ok(BufWriter::new(file))
}

pub fn run_process(
    raw_path: &str,
    output: &str,
    utc_offset_hours: i32,
    frames: Option<&str>,
) -> anyhow::Result<()> {
    let offset = offset_from_hours(utc_offset_hours)?;
    let data =
        std::fs::read_to_string(raw_path).with_context(|| format!("reading {raw_path}"))?;
    let payload = RawPayload::from_json_str(&data).with_context(|| format!("parsing {raw_path}"))?;
    let matrix = to_matrix(&payload, offset)?;

    matrix.write_csv(create_output(output)?)?;
    info!("Processed CSV saved to: {}", output);
    info!(
        "Shape: {} rows x {} cells",
        matrix.row_count(),
        matrix.columns().len()
    );

    if let Some(path) = frames {
        let heatmap = HeatmapFrames::from_matrix(&matrix);
        heatmap
            .write_json(create_output(path)?)
            .with_context(|| format!("writing frames {path}"))?;
        info!("Heatmap frames saved to: {} ({} frames)", path, heatmap.frames.len());
    }
    Ok(())
}
