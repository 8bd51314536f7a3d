//! Reading primary fields back out of catalog CSVs.
//!
//! Works on both the historical USGS export (training input) and the
//! synthetic output, since both name the columns `latitude`, `longitude`,
//! `depth` and `mag`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info};

use crate::config::{COORD_BANDWIDTH, MAG_BANDWIDTH};
use crate::density::GaussianKde;
use crate::error::{Error, Result};
use crate::generator::DensityModels;

/// Primary fields of one catalog row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimaryRow {
    pub latitude: f64,
    pub longitude: f64,
    pub depth: f64,
    pub magnitude: f64,
}

const REQUIRED: [&str; 4] = ["latitude", "longitude", "depth", "mag"];

/// Split one CSV line, honouring double-quoted fields with embedded commas
/// and `""` escapes.
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

fn parse_field(fields: &[String], idx: usize) -> Option<f64> {
    let v: f64 = fields.get(idx)?.trim().parse().ok()?;
    (!v.is_nan()).then_some(v)
}

fn parse_row(fields: &[String], idx: &[usize; 4]) -> Option<PrimaryRow> {
    Some(PrimaryRow {
        latitude: parse_field(fields, idx[0])?,
        longitude: parse_field(fields, idx[1])?,
        depth: parse_field(fields, idx[2])?,
        magnitude: parse_field(fields, idx[3])?,
    })
}

/// Parse every row that has all four primary fields. Rows with a missing or
/// unparsable value are dropped.
pub fn read_primary<R: BufRead>(reader: R) -> Result<Vec<PrimaryRow>> {
    let mut lines = reader.lines();
    let header = match lines.next() {
        Some(line) => split_csv_line(line?.trim_start_matches('\u{feff}')),
        None => return Err(Error::Catalog("empty catalog: no header row".to_string())),
    };
    let mut idx = [0usize; 4];
    for (slot, name) in idx.iter_mut().zip(REQUIRED) {
        *slot = header
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| Error::Catalog(format!("missing column `{name}`")))?;
    }

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_csv_line(&line);
        match parse_row(&fields, &idx) {
            Some(r) => rows.push(r),
            None => dropped += 1,
        }
    }
    debug!(rows = rows.len(), dropped, "parsed catalog");
    Ok(rows)
}

pub fn read_primary_file(path: &Path) -> Result<Vec<PrimaryRow>> {
    let file = File::open(path)?;
    read_primary(BufReader::new(file))
}

/// Fit the 3-D coordinate model and the 1-D magnitude model.
pub fn fit_models(rows: &[PrimaryRow], coord_bandwidth: f64, mag_bandwidth: f64) -> Result<DensityModels> {
    if rows.is_empty() {
        return Err(Error::Catalog("no usable rows to fit".to_string()));
    }
    let coords = GaussianKde::fit(
        rows.iter().map(|r| vec![r.latitude, r.longitude, r.depth]).collect(),
        coord_bandwidth,
    )?;
    let magnitudes = GaussianKde::fit(rows.iter().map(|r| vec![r.magnitude]).collect(), mag_bandwidth)?;
    info!(rows = rows.len(), coord_bandwidth, mag_bandwidth, "fitted density models");
    Ok(DensityModels { coords, magnitudes })
}

/// Read a historical catalog, fit both models with the default bandwidths and
/// save them to `coord_path` and `mag_path`.
pub fn train(catalog: &Path, coord_path: &Path, mag_path: &Path) -> Result<DensityModels> {
    let rows = read_primary_file(catalog)?;
    let models = fit_models(&rows, COORD_BANDWIDTH, MAG_BANDWIDTH)?;
    models.coords.save(coord_path)?;
    models.magnitudes.save(mag_path)?;
    Ok(models)
}
