use rand::Rng;
use tracing::debug;

use crate::density::DensityModel;
use crate::error::{Error, Result};

/// Raw primary columns for one batch, aligned by row index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrimarySample {
    pub latitude: Vec<f64>,
    pub longitude: Vec<f64>,
    pub depth: Vec<f64>,
    pub magnitude: Vec<f64>,
}

impl PrimarySample {
    pub fn len(&self) -> usize {
        self.latitude.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latitude.is_empty()
    }
}

/// Draw `n` (latitude, longitude, depth) triples, then `n` magnitudes.
///
/// Every coordinate row must hold exactly 3 values and every magnitude row
/// exactly 1. A model that returns the wrong number of rows or a row of the
/// wrong width is a `Sampling` error.
pub fn sample_primary<C, M, R>(coords: &C, mags: &M, n: usize, rng: &mut R) -> Result<PrimarySample>
where
    C: DensityModel,
    M: DensityModel,
    R: Rng,
{
    let coord_rows = coords.sample(n, rng);
    let mag_rows = mags.sample(n, rng);
    if coord_rows.len() != n || mag_rows.len() != n {
        return Err(Error::Sampling(format!(
            "expected {n} rows, got {} coordinates and {} magnitudes",
            coord_rows.len(),
            mag_rows.len()
        )));
    }

    let mut out = PrimarySample {
        latitude: Vec::with_capacity(n),
        longitude: Vec::with_capacity(n),
        depth: Vec::with_capacity(n),
        magnitude: Vec::with_capacity(n),
    };
    for (i, row) in coord_rows.into_iter().enumerate() {
        let [lat, lon, depth] = row[..] else {
            return Err(width_error("coordinate", i, 3, row.len()));
        };
        out.latitude.push(lat);
        out.longitude.push(lon);
        out.depth.push(depth);
    }
    for (i, row) in mag_rows.into_iter().enumerate() {
        let [mag] = row[..] else {
            return Err(width_error("magnitude", i, 1, row.len()));
        };
        out.magnitude.push(mag);
    }
    debug!(rows = out.len(), "sampled primary fields");
    Ok(out)
}

fn width_error(model: &str, row: usize, expected: usize, found: usize) -> Error {
    Error::Sampling(format!("{model} row {row} has {found} values, expected {expected}"))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::*;
    use crate::density::GaussianKde;

    fn models() -> (GaussianKde, GaussianKde) {
        let coords = GaussianKde::fit(
            vec![vec![35.0, 139.0, 30.0], vec![-20.0, -70.0, 100.0], vec![61.0, -150.0, 15.0]],
            0.3,
        )
        .unwrap();
        let mags = GaussianKde::fit(vec![vec![4.5], vec![5.2], vec![6.8]], 0.1).unwrap();
        (coords, mags)
    }

    #[test]
    fn columns_are_aligned_and_sized() {
        let (coords, mags) = models();
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let s = sample_primary(&coords, &mags, 500, &mut rng).unwrap();
        assert_eq!(s.latitude.len(), 500);
        assert_eq!(s.longitude.len(), 500);
        assert_eq!(s.depth.len(), 500);
        assert_eq!(s.magnitude.len(), 500);
        assert!(s.magnitude.iter().all(|m| (4.0..7.5).contains(m)));
    }

    #[test]
    fn zero_rows_gives_empty_columns() {
        let (coords, mags) = models();
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let s = sample_primary(&coords, &mags, 0, &mut rng).unwrap();
        assert!(s.is_empty());
        assert!(s.magnitude.is_empty());
    }

    /// Coordinates are drawn before magnitudes from the same stream.
    #[test]
    fn draw_order_is_coords_then_magnitudes() {
        let (coords, mags) = models();
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let s = sample_primary(&coords, &mags, 10, &mut rng).unwrap();

        let mut manual = ChaCha20Rng::seed_from_u64(42);
        let rows = coords.sample(10, &mut manual);
        let m: Vec<f64> = mags.sample(10, &mut manual).into_iter().flatten().collect();
        assert_eq!(s.latitude, rows.iter().map(|r| r[0]).collect::<Vec<_>>());
        assert_eq!(s.magnitude, m);
    }

    /// Fixed-output model of any width, for shape checks.
    struct Rows(Vec<f64>);

    impl DensityModel for Rows {
        fn dims(&self) -> usize {
            self.0.len()
        }

        fn sample<R: Rng>(&self, n: usize, _rng: &mut R) -> Vec<Vec<f64>> {
            vec![self.0.clone(); n]
        }
    }

    #[test]
    fn wrong_row_width_is_an_error() {
        let (coords, mags) = models();
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let wide_mags = Rows(vec![4.0, -999.0]);
        assert!(matches!(
            sample_primary(&coords, &wide_mags, 4, &mut rng),
            Err(Error::Sampling(_))
        ));
        let flat_coords = Rows(vec![10.0, 20.0]);
        assert!(matches!(
            sample_primary(&flat_coords, &mags, 2, &mut rng),
            Err(Error::Sampling(_))
        ));
        let ok = sample_primary(&Rows(vec![1.0, 2.0, 3.0]), &Rows(vec![5.0]), 2, &mut rng).unwrap();
        assert_eq!(ok.depth, [3.0, 3.0]);
        assert_eq!(ok.magnitude, [5.0, 5.0]);
    }
}
