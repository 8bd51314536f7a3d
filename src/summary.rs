use std::collections::BTreeMap;
use std::fmt;

use crate::catalog::PrimaryRow;
use crate::record::EventBatch;
use crate::types::{AlertLevel, Region, TectonicPlate};

/// Order statistics plus mean and sample std-dev of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct DistStats {
    pub n: usize,
    pub min: f64,
    pub p5: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl DistStats {
    /// NaN values are skipped. `None` when nothing is left.
    ///
    /// Percentiles interpolate linearly between the two closest ranks at
    /// position `p * (n - 1)` of the sorted values (the "linear" method).
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut values: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
        if values.is_empty() {
            return None;
        }
        values.sort_by(|a, b| a.total_cmp(b));
        let n = values.len();

        let interp = |p: f64| -> f64 {
            let h = p * (n - 1) as f64;
            let lo = h.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            let frac = h - lo as f64;
            values[lo] * (1.0 - frac) + values[hi] * frac
        };

        let mean = values.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };

        Some(DistStats {
            n,
            min: values[0],
            p5: interp(0.05),
            p25: interp(0.25),
            p50: interp(0.50),
            p75: interp(0.75),
            p95: interp(0.95),
            max: values[n - 1],
            mean,
            std_dev: variance.sqrt(),
        })
    }
}

/// Headline numbers for one generated batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub rows: usize,
    pub plates: BTreeMap<TectonicPlate, usize>,
    pub alerts: BTreeMap<AlertLevel, usize>,
    pub regions: BTreeMap<Region, usize>,
    pub intensity: Option<DistStats>,
    pub cost: Option<DistStats>,
    pub casualties: u64,
    pub injuries: u64,
    pub displaced: u64,
    /// Rows carrying at least one NaN-derived value.
    pub rows_with_missing: usize,
}

pub fn summarize(batch: &EventBatch) -> BatchSummary {
    let mut plates = BTreeMap::new();
    let mut alerts = BTreeMap::new();
    let mut regions = BTreeMap::new();
    let (mut casualties, mut injuries, mut displaced) = (0u64, 0u64, 0u64);
    let mut rows_with_missing = 0;

    for r in batch {
        *plates.entry(r.tectonic_plate).or_insert(0) += 1;
        *alerts.entry(r.alert_level).or_insert(0) += 1;
        *regions.entry(r.region).or_insert(0) += 1;
        casualties += r.casualties.unwrap_or(0);
        injuries += r.injuries.unwrap_or(0);
        displaced += r.displaced.unwrap_or(0);
        let missing = r.intensity_level.is_nan()
            || r.estimated_cost.is_nan()
            || r.casualties.is_none()
            || r.injuries.is_none()
            || r.displaced.is_none();
        if missing {
            rows_with_missing += 1;
        }
    }

    BatchSummary {
        rows: batch.len(),
        plates,
        alerts,
        regions,
        intensity: DistStats::from_values(batch.iter().map(|r| r.intensity_level)),
        cost: DistStats::from_values(batch.iter().map(|r| r.estimated_cost)),
        casualties,
        injuries,
        displaced,
        rows_with_missing,
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "synthetic batch: {} rows", self.rows)?;
        for plate in TectonicPlate::ALL {
            let n = self.plates.get(&plate).copied().unwrap_or(0);
            writeln!(f, "  plate={:<16} events={n:>7}", plate.label())?;
        }
        for alert in AlertLevel::ALL {
            let n = self.alerts.get(&alert).copied().unwrap_or(0);
            writeln!(f, "  alert={:<16} events={n:>7}", alert.label())?;
        }
        for region in Region::ALL {
            let n = self.regions.get(&region).copied().unwrap_or(0);
            writeln!(f, "  region={:<15} events={n:>7}", region.label())?;
        }
        if let Some(i) = &self.intensity {
            writeln!(f, "  intensity  mean={:.2}  min={:.1}  max={:.1}", i.mean, i.min, i.max)?;
        }
        if let Some(c) = &self.cost {
            writeln!(f, "  cost       mean={:.2}  min={:.2}  max={:.2}", c.mean, c.min, c.max)?;
        }
        writeln!(
            f,
            "  impacts    casualties={}  injuries={}  displaced={}",
            self.casualties, self.injuries, self.displaced
        )?;
        if self.rows_with_missing > 0 {
            writeln!(f, "  rows with missing values: {}", self.rows_with_missing)?;
        }
        Ok(())
    }
}

/// Side-by-side distributions of the primary fields in two catalogs.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryComparison {
    pub columns: Vec<(&'static str, Option<DistStats>, Option<DistStats>)>,
}

pub fn compare_primary(reference: &[PrimaryRow], synthetic: &[PrimaryRow]) -> PrimaryComparison {
    let fields: [(&'static str, fn(&PrimaryRow) -> f64); 4] = [
        ("latitude", |r| r.latitude),
        ("longitude", |r| r.longitude),
        ("depth", |r| r.depth),
        ("mag", |r| r.magnitude),
    ];
    let columns = fields
        .into_iter()
        .map(|(name, get)| {
            (
                name,
                DistStats::from_values(reference.iter().map(get)),
                DistStats::from_values(synthetic.iter().map(get)),
            )
        })
        .collect();
    PrimaryComparison { columns }
}

impl fmt::Display for PrimaryComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>9} | {:>9} | {:>9} | {:>9} | {:>9} | {:>9} | {:>9} | {:>9} | {:>9}",
            "column", "source", "n", "min", "p25", "p50", "p75", "max", "mean"
        )?;
        writeln!(f, "{}", "-".repeat(105))?;
        for (name, reference, synthetic) in &self.columns {
            for (source, stats) in [("real", reference), ("synthetic", synthetic)] {
                match stats {
                    Some(s) => writeln!(
                        f,
                        "{:>9} | {:>9} | {:>9} | {:>9.3} | {:>9.3} | {:>9.3} | {:>9.3} | {:>9.3} | {:>9.3}",
                        name, source, s.n, s.min, s.p25, s.p50, s.p75, s.max, s.mean
                    )?,
                    None => writeln!(f, "{name:>9} | {source:>9} | {:>9}", 0)?,
                }
            }
        }
        Ok(())
    }
}
