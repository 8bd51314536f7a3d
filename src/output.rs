use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::record::{COLUMNS, DATE_FORMAT, EventBatch, EventRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Ndjson,
}

impl OutputFormat {
    /// `.json`/`.ndjson` paths are NDJSON, everything else CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("ndjson" | "json") => OutputFormat::Ndjson,
            _ => OutputFormat::Csv,
        }
    }
}

/// NaN prints as an empty field, matching a missing value.
fn float_field(x: f64) -> String {
    if x.is_nan() { String::new() } else { x.to_string() }
}

fn count_field(c: Option<u64>) -> String {
    c.map(|v| v.to_string()).unwrap_or_default()
}

fn csv_line(r: &EventRecord) -> String {
    [
        r.event_id.to_string(),
        float_field(r.latitude),
        float_field(r.longitude),
        float_field(r.depth),
        float_field(r.magnitude),
        r.date.format(DATE_FORMAT).to_string(),
        r.tectonic_plate.label().to_string(),
        r.alert_level.label().to_string(),
        float_field(r.intensity_level),
        float_field(r.estimated_cost),
        count_field(r.casualties),
        count_field(r.injuries),
        count_field(r.displaced),
        r.region.label().to_string(),
    ]
    .join(",")
}

/// Header plus one line per record. Labels never contain commas, so no quoting.
pub fn write_csv<W: Write>(batch: &EventBatch, mut w: W) -> Result<()> {
    writeln!(w, "{}", COLUMNS.join(","))?;
    for r in batch {
        writeln!(w, "{}", csv_line(r))?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_ndjson<W: Write>(batch: &EventBatch, mut w: W) -> Result<()> {
    for r in batch {
        serde_json::to_writer(&mut w, r)?;
        writeln!(w)?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_batch<W: Write>(batch: &EventBatch, format: OutputFormat, w: W) -> Result<()> {
    match format {
        OutputFormat::Csv => write_csv(batch, w),
        OutputFormat::Ndjson => write_ndjson(batch, w),
    }
}

/// Write to `path`, choosing the format from its extension.
pub fn write_batch_to_path(batch: &EventBatch, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_batch(batch, OutputFormat::from_path(path), BufWriter::new(file))?;
    info!(path = %path.display(), rows = batch.len(), "wrote batch");
    Ok(())
}
