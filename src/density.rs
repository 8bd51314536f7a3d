use std::fs;
use std::path::Path;

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};

/// Anything that can draw independent samples from a fitted distribution.
pub trait DensityModel {
    /// Number of values per sample row.
    fn dims(&self) -> usize;

    /// Draw `n` rows of `dims()` values each.
    fn sample<R: Rng>(&self, n: usize, rng: &mut R) -> Vec<Vec<f64>>;
}

/// Gaussian kernel density estimate with a single isotropic bandwidth.
///
/// Fitting stores the training points verbatim. Sampling picks a training
/// point uniformly at random and perturbs every coordinate with N(0, bandwidth).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaussianKde {
    bandwidth: f64,
    points: Vec<Vec<f64>>,
}

impl GaussianKde {
    pub fn fit(points: Vec<Vec<f64>>, bandwidth: f64) -> Result<Self> {
        let kde = GaussianKde { bandwidth, points };
        kde.check().map_err(|reason| match reason {
            KdeDefect::Bandwidth => Error::InvalidBandwidth(bandwidth),
            other => Error::Catalog(other.to_string()),
        })?;
        Ok(kde)
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Load a serialized model and require `expected_dims` values per point.
    /// Any defect is reported as `Error::Artifact` against `path`.
    pub fn load(path: &Path, expected_dims: usize) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::artifact(path, e.to_string()))?;
        let kde: GaussianKde =
            serde_json::from_str(&text).map_err(|e| Error::artifact(path, e.to_string()))?;
        kde.check().map_err(|d| Error::artifact(path, d.to_string()))?;
        if kde.dims() != expected_dims {
            return Err(Error::artifact(
                path,
                format!("expected {expected_dims}-dimensional points, found {}", kde.dims()),
            ));
        }
        info!(path = %path.display(), points = kde.len(), bandwidth = kde.bandwidth, "loaded density model");
        Ok(kde)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string(self)?)?;
        info!(path = %path.display(), points = self.len(), "saved density model");
        Ok(())
    }

    fn check(&self) -> std::result::Result<(), KdeDefect> {
        if !(self.bandwidth.is_finite() && self.bandwidth > 0.0) {
            return Err(KdeDefect::Bandwidth);
        }
        let Some(first) = self.points.first() else {
            return Err(KdeDefect::NoPoints);
        };
        let dims = first.len();
        if dims == 0 {
            return Err(KdeDefect::ZeroDims);
        }
        if let Some(i) = self.points.iter().position(|p| p.len() != dims) {
            return Err(KdeDefect::Ragged { row: i, dims });
        }
        Ok(())
    }
}

#[derive(Debug)]
enum KdeDefect {
    Bandwidth,
    NoPoints,
    ZeroDims,
    Ragged { row: usize, dims: usize },
}

impl std::fmt::Display for KdeDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KdeDefect::Bandwidth => f.write_str("bandwidth must be finite and positive"),
            KdeDefect::NoPoints => f.write_str("no fitted points"),
            KdeDefect::ZeroDims => f.write_str("points have zero dimensions"),
            KdeDefect::Ragged { row, dims } => {
                write!(f, "point {row} does not have {dims} dimensions")
            }
        }
    }
}

impl DensityModel for GaussianKde {
    fn dims(&self) -> usize {
        self.points.first().map_or(0, Vec::len)
    }

    fn sample<R: Rng>(&self, n: usize, rng: &mut R) -> Vec<Vec<f64>> {
        if self.points.is_empty() {
            return Vec::new();
        }
        // Every index is drawn before any noise so the stream order is stable.
        let picks: Vec<usize> = (0..n).map(|_| rng.random_range(0..self.points.len())).collect();
        picks
            .into_iter()
            .map(|i| {
                self.points[i]
                    .iter()
                    .map(|&centre| {
                        let z: f64 = StandardNormal.sample(rng);
                        centre + self.bandwidth * z
                    })
                    .collect::<Vec<f64>>()
            })
            .collect()
    }
}
