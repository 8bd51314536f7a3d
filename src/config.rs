use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Bandwidth used when fitting the (latitude, longitude, depth) model.
pub const COORD_BANDWIDTH: f64 = 0.3;
/// Bandwidth used when fitting the magnitude model.
pub const MAG_BANDWIDTH: f64 = 0.1;

/// Historical window for event timestamps: `start` inclusive, `end` exclusive,
/// both at midnight UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateWindow { start, end }
    }

    /// 1975-01-01 to 2025-01-01.
    pub fn canonical() -> Self {
        DateWindow {
            start: NaiveDate::from_ymd_opt(1975, 1, 1).expect("valid calendar date"),
            end: NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid calendar date"),
        }
    }

    /// Unix-second bounds `[start, end)`. Fails on an empty or inverted window.
    pub fn bounds_secs(&self) -> Result<(i64, i64)> {
        let start = midnight_secs(self.start)?;
        let end = midnight_secs(self.end)?;
        if start >= end {
            return Err(Error::InvalidWindow(format!(
                "start {} must precede end {}",
                self.start, self.end
            )));
        }
        Ok((start, end))
    }
}

fn midnight_secs(date: NaiveDate) -> Result<i64> {
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| Error::InvalidWindow(format!("{date} has no midnight")))?;
    let secs = midnight.and_utc().timestamp();
    // Round-trip through chrono so every second in the window is representable.
    DateTime::from_timestamp(secs, 0)
        .map(|_| secs)
        .ok_or_else(|| Error::InvalidWindow(format!("{date} is out of range")))
}

/// Everything a generation run needs before the core starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub seed: u64,
    /// Requested record count. Signed so that a negative request can be
    /// rejected explicitly rather than wrapped.
    pub rows: i64,
    pub window: DateWindow,
    pub coord_model: PathBuf,
    pub mag_model: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::canonical()
    }
}

impl GeneratorConfig {
    pub fn canonical() -> Self {
        GeneratorConfig {
            seed: 42,
            rows: 10_000,
            window: DateWindow::canonical(),
            coord_model: PathBuf::from("data/kde_coords.json"),
            mag_model: PathBuf::from("data/kde_mag.json"),
        }
    }

    /// Read a JSON config; absent keys fall back to `canonical()`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Check the row count and window, returning the row count as `usize`.
    pub fn validate(&self) -> Result<usize> {
        let rows = usize::try_from(self.rows).map_err(|_| Error::InvalidRowCount(self.rows))?;
        self.window.bounds_secs()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_window_bounds() {
        let (start, end) = DateWindow::canonical().bounds_secs().unwrap();
        assert_eq!(start, 157_766_400);
        assert_eq!(end, 1_735_689_600);
    }

    #[test]
    fn inverted_or_empty_window_is_rejected() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        let inverted = DateWindow::new(d(2025, 1, 1), d(1975, 1, 1));
        assert!(matches!(inverted.bounds_secs(), Err(Error::InvalidWindow(_))));
        let empty = DateWindow::new(d(2000, 1, 1), d(2000, 1, 1));
        assert!(matches!(empty.bounds_secs(), Err(Error::InvalidWindow(_))));
    }

    #[test]
    fn negative_rows_rejected_zero_accepted() {
        let mut config = GeneratorConfig::canonical();
        config.rows = -1;
        assert!(matches!(config.validate(), Err(Error::InvalidRowCount(-1))));
        config.rows = 0;
        assert_eq!(config.validate().unwrap(), 0);
    }

    #[test]
    fn partial_json_falls_back_to_canonical() {
        let config: GeneratorConfig =
            serde_json::from_str(r#"{"seed":7,"window":{"start":"1990-01-01","end":"2000-01-01"}}"#)
                .unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.rows, 10_000);
        assert_eq!(config.window.start, NaiveDate::from_ymd_opt(1990, 1, 1).unwrap());
        assert_eq!(config.coord_model, PathBuf::from("data/kde_coords.json"));
    }
}
