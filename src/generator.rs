use std::path::Path;

use chrono::{DateTime, NaiveDateTime};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::{DateWindow, GeneratorConfig};
use crate::density::{DensityModel, GaussianKde};
use crate::error::{Error, Result};
use crate::pipeline::{
    alert_level, assign_plate, assign_region, calculate_intensity, estimate_cost, estimate_impacts,
};
use crate::record::{EventBatch, EventRecord};
use crate::sampler::sample_primary;
use crate::types::EventId;

/// The two fitted models a run samples from. Loaded once, read-only after.
#[derive(Debug, Clone)]
pub struct DensityModels<C = GaussianKde, M = GaussianKde> {
    pub coords: C,
    pub magnitudes: M,
}

impl DensityModels {
    /// Load both artifacts. Either one missing or malformed is fatal.
    pub fn load(coord_path: &Path, mag_path: &Path) -> Result<Self> {
        let coords = GaussianKde::load(coord_path, 3)?;
        let magnitudes = GaussianKde::load(mag_path, 1)?;
        Ok(DensityModels { coords, magnitudes })
    }

    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        Self::load(&config.coord_model, &config.mag_model)
    }
}

impl<C: DensityModel, M: DensityModel> DensityModels<C, M> {
    /// Seed a fresh stream from `config.seed` and generate `config.rows` records.
    pub fn generate(&self, config: &GeneratorConfig) -> Result<EventBatch> {
        let n = config.validate()?;
        let mut rng = ChaCha20Rng::seed_from_u64(config.seed);
        let batch = generate_batch(self, n, &config.window, &mut rng)?;
        info!(seed = config.seed, rows = batch.len(), "generated synthetic batch");
        Ok(batch)
    }

    /// One batch per seed in `config.seed..config.seed + runs`, in parallel.
    /// Every run owns its stream, so each batch equals a single run with that seed.
    pub fn generate_runs(&self, config: &GeneratorConfig, runs: u64) -> Vec<(u64, Result<EventBatch>)>
    where
        C: Sync,
        M: Sync,
    {
        (0..runs)
            .into_par_iter()
            .map(|i| {
                let seed = config.seed.wrapping_add(i);
                let run_config = GeneratorConfig { seed, ..config.clone() };
                (seed, self.generate(&run_config))
            })
            .collect()
    }
}

/// `EVT0000001` .. `EVT{n:07}` in row order.
pub fn event_ids(n: usize) -> Vec<EventId> {
    (1..=n as u64).map(EventId).collect()
}

/// `n` timestamps uniform over `[window.start, window.end)` at one-second resolution.
pub fn random_dates<R: Rng>(n: usize, window: &DateWindow, rng: &mut R) -> Result<Vec<NaiveDateTime>> {
    let (start, end) = window.bounds_secs()?;
    (0..n)
        .map(|_| {
            let secs = rng.random_range(start..end);
            DateTime::from_timestamp(secs, 0)
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| Error::InvalidWindow(format!("timestamp {secs} out of range")))
        })
        .collect()
}

/// Sample, derive and assemble `n` records from one explicitly passed stream.
///
/// Draw order: coordinates, magnitudes, dates, intensity noise, cost noise,
/// casualties, injuries, displaced. Changing it changes every seeded output.
pub fn generate_batch<C, M, R>(
    models: &DensityModels<C, M>,
    n: usize,
    window: &DateWindow,
    rng: &mut R,
) -> Result<EventBatch>
where
    C: DensityModel,
    M: DensityModel,
    R: Rng,
{
    // Reject a bad window or model shape before any draw.
    window.bounds_secs()?;

    let (coord_dims, mag_dims) = (models.coords.dims(), models.magnitudes.dims());
    if coord_dims != 3 || mag_dims != 1 {
        return Err(Error::Sampling(format!(
            "coordinate model must be 3-dimensional and magnitude model 1-dimensional, got {coord_dims} and {mag_dims}"
        )));
    }

    let primary = sample_primary(&models.coords, &models.magnitudes, n, rng)?;
    let ids = event_ids(n);
    let dates = random_dates(n, window, rng)?;
    let intensity = calculate_intensity(&primary.magnitude, &primary.depth, rng);
    let cost = estimate_cost(&primary.magnitude, &intensity, rng);
    let impacts = estimate_impacts(&intensity, &primary.magnitude, rng);
    debug!(rows = n, "derivation pipeline complete");

    let records = (0..n)
        .map(|i| {
            let latitude = primary.latitude[i];
            let longitude = primary.longitude[i];
            let magnitude = primary.magnitude[i];
            EventRecord {
                event_id: ids[i],
                latitude,
                longitude,
                depth: primary.depth[i],
                magnitude,
                date: dates[i],
                tectonic_plate: assign_plate(latitude, longitude),
                alert_level: alert_level(magnitude),
                intensity_level: intensity[i],
                estimated_cost: cost[i],
                casualties: impacts.casualties[i],
                injuries: impacts.injuries[i],
                displaced: impacts.displaced[i],
                region: assign_region(latitude),
            }
        })
        .collect();

    Ok(EventBatch::new(records))
}
