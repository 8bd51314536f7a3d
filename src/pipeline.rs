//! Rules that turn primary fields into every secondary column.
//!
//! The classifiers are pure. The numeric derivations take the shared stream
//! and draw column-wise: all noise for one column before the next column.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::{debug, warn};

use crate::numeric::{clip, clip_lower, poisson_count, round_to};
use crate::types::{AlertLevel, Region, TectonicPlate};

pub const INTENSITY_MIN: f64 = 1.0;
pub const INTENSITY_MAX: f64 = 12.0;
pub const INTENSITY_NOISE_SD: f64 = 0.5;
pub const COST_NOISE_SD: f64 = 10_000.0;

type PlateRule = (fn(f64, f64) -> bool, TectonicPlate);

fn antarctic(lat: f64, _lon: f64) -> bool {
    lat <= -60.0
}

fn pacific(lat: f64, lon: f64) -> bool {
    lon <= -130.0 && (-60.0..=60.0).contains(&lat)
}

fn eurasian(lat: f64, lon: f64) -> bool {
    lat >= 30.0 && (-30.0..=150.0).contains(&lon)
}

fn north_american(lat: f64, lon: f64) -> bool {
    (0.0..60.0).contains(&lat) && (-170.0..=-50.0).contains(&lon)
}

fn south_american(lat: f64, lon: f64) -> bool {
    lat > -60.0 && lat < 0.0 && (-90.0..=-30.0).contains(&lon)
}

fn indo_australian(lat: f64, lon: f64) -> bool {
    (-45.0..=0.0).contains(&lat) && (100.0..=180.0).contains(&lon)
}

/// Checked top to bottom; the regions overlap, so order decides the label.
const PLATE_RULES: [PlateRule; 6] = [
    (antarctic, TectonicPlate::Antarctic),
    (pacific, TectonicPlate::Pacific),
    (eurasian, TectonicPlate::Eurasian),
    (north_american, TectonicPlate::NorthAmerican),
    (south_american, TectonicPlate::SouthAmerican),
    (indo_australian, TectonicPlate::IndoAustralian),
];

pub fn assign_plate(lat: f64, lon: f64) -> TectonicPlate {
    PLATE_RULES
        .iter()
        .find(|(rule, _)| rule(lat, lon))
        .map_or(TectonicPlate::Other, |&(_, plate)| plate)
}

/// Lower bound of each tier is inclusive: exactly 4.0 is Yellow.
pub fn alert_level(mag: f64) -> AlertLevel {
    if mag < 4.0 {
        AlertLevel::Green
    } else if mag < 5.5 {
        AlertLevel::Yellow
    } else if mag < 6.5 {
        AlertLevel::Orange
    } else {
        AlertLevel::Red
    }
}

/// Lower bound of each band is inclusive: exactly 0.0 is Africa.
pub fn assign_region(lat: f64) -> Region {
    if lat < -30.0 {
        Region::Oceania
    } else if lat < 0.0 {
        Region::SouthAmerica
    } else if lat < 30.0 {
        Region::Africa
    } else if lat < 60.0 {
        Region::Asia
    } else {
        Region::Europe
    }
}

/// Intensity before noise: magnitude attenuated by one unit per 100 km depth.
pub fn base_intensity(mag: f64, depth: f64) -> f64 {
    mag - depth / 100.0
}

/// `clip(mag − depth/100 + N(0, 0.5), 1, 12)` rounded to one decimal.
pub fn calculate_intensity<R: Rng>(mags: &[f64], depths: &[f64], rng: &mut R) -> Vec<f64> {
    let noise = Normal::new(0.0, INTENSITY_NOISE_SD).expect("constant std-dev is valid");
    let out: Vec<f64> = mags
        .iter()
        .zip(depths)
        .map(|(&mag, &depth)| {
            let raw = base_intensity(mag, depth) + noise.sample(rng);
            round_to(clip(raw, INTENSITY_MIN, INTENSITY_MAX), 1)
        })
        .collect();
    debug!(rows = out.len(), "derived intensity");
    out
}

/// Cost before noise: cubic in magnitude, linear in intensity.
pub fn base_cost(mag: f64, intensity: f64) -> f64 {
    mag.powi(3) * (intensity / 10.0) * 10_000.0
}

/// `max(mag³ × intensity/10 × 10 000 + N(0, 10 000), 0)` rounded to cents.
/// A zero cost after flooring is a legitimate outcome.
pub fn estimate_cost<R: Rng>(mags: &[f64], intensities: &[f64], rng: &mut R) -> Vec<f64> {
    let noise = Normal::new(0.0, COST_NOISE_SD).expect("constant std-dev is valid");
    let out: Vec<f64> = mags
        .iter()
        .zip(intensities)
        .map(|(&mag, &intensity)| {
            round_to(clip_lower(base_cost(mag, intensity) + noise.sample(rng), 0.0), 2)
        })
        .collect();
    debug!(rows = out.len(), "derived cost");
    out
}

/// Human-impact counts per row. `None` marks a row whose rate was not a
/// valid Poisson rate (NaN or negative inputs).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Impacts {
    pub casualties: Vec<Option<u64>>,
    pub injuries: Vec<Option<u64>>,
    pub displaced: Vec<Option<u64>>,
}

pub fn casualty_rate(intensity: f64, mag: f64) -> f64 {
    intensity * mag / 10.0
}

pub fn injury_rate(intensity: f64) -> f64 {
    intensity * 2.0
}

pub fn displaced_rate(intensity: f64) -> f64 {
    intensity * 5.0
}

/// Three independent Poisson columns: casualties, then injuries, then displaced.
pub fn estimate_impacts<R: Rng>(intensities: &[f64], mags: &[f64], rng: &mut R) -> Impacts {
    let casualties: Vec<Option<u64>> = intensities
        .iter()
        .zip(mags)
        .map(|(&i, &m)| poisson_count(casualty_rate(i, m), rng))
        .collect();
    let injuries: Vec<Option<u64>> =
        intensities.iter().map(|&i| poisson_count(injury_rate(i), rng)).collect();
    let displaced: Vec<Option<u64>> =
        intensities.iter().map(|&i| poisson_count(displaced_rate(i), rng)).collect();

    let missing = casualties.iter().chain(&injuries).chain(&displaced).filter(|c| c.is_none()).count();
    if missing > 0 {
        warn!(missing, "impact counts without a valid Poisson rate");
    }
    Impacts { casualties, injuries, displaced }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::*;

    fn rng() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(42)
    }

    #[test]
    fn plate_reference_points() {
        assert_eq!(assign_plate(-70.0, 0.0), TectonicPlate::Antarctic);
        assert_eq!(assign_plate(45.0, 60.0), TectonicPlate::Eurasian);
        assert_eq!(assign_plate(20.0, -140.0), TectonicPlate::Pacific);
        assert_eq!(assign_plate(40.0, -100.0), TectonicPlate::NorthAmerican);
        assert_eq!(assign_plate(-20.0, -60.0), TectonicPlate::SouthAmerican);
        assert_eq!(assign_plate(-30.0, 120.0), TectonicPlate::IndoAustralian);
        assert_eq!(assign_plate(0.0, 0.0), TectonicPlate::Other);
    }

    #[test]
    fn plate_boundaries_and_overlaps() {
        // -60 is Antarctic (rule 1 wins over Pacific's inclusive -60).
        assert_eq!(assign_plate(-60.0, -140.0), TectonicPlate::Antarctic);
        assert_eq!(assign_plate(60.0, -130.0), TectonicPlate::Pacific);
        assert_eq!(assign_plate(60.5, -130.0), TectonicPlate::Other);
        // Pacific and North American overlap at lon -150; Pacific is earlier.
        assert_eq!(assign_plate(10.0, -150.0), TectonicPlate::Pacific);
        // Eurasian stops at lon -30; North American starts at lon -50.
        assert_eq!(assign_plate(40.0, -30.0), TectonicPlate::Eurasian);
        assert_eq!(assign_plate(40.0, -50.0), TectonicPlate::NorthAmerican);
        // North American excludes lat 60; Eurasian does not reach lon -60.
        assert_eq!(assign_plate(60.0, -60.0), TectonicPlate::Other);
        assert_eq!(assign_plate(0.0, -60.0), TectonicPlate::NorthAmerican);
        // South American excludes lat 0 and lat -60.
        assert_eq!(assign_plate(-59.9, -90.0), TectonicPlate::SouthAmerican);
        // Indo-Australian includes both lat 0 and lon 180.
        assert_eq!(assign_plate(0.0, 180.0), TectonicPlate::IndoAustralian);
        assert_eq!(assign_plate(-45.0, 100.0), TectonicPlate::IndoAustralian);
        assert_eq!(assign_plate(-45.1, 100.0), TectonicPlate::Other);
    }

    #[test]
    fn plate_nan_falls_through_to_other() {
        assert_eq!(assign_plate(f64::NAN, 0.0), TectonicPlate::Other);
        assert_eq!(assign_plate(45.0, f64::NAN), TectonicPlate::Other);
    }

    #[test]
    fn alert_reference_and_boundaries() {
        assert_eq!(alert_level(3.5), AlertLevel::Green);
        assert_eq!(alert_level(4.5), AlertLevel::Yellow);
        assert_eq!(alert_level(6.0), AlertLevel::Orange);
        assert_eq!(alert_level(7.0), AlertLevel::Red);
        assert_eq!(alert_level(4.0), AlertLevel::Yellow);
        assert_eq!(alert_level(5.5), AlertLevel::Orange);
        assert_eq!(alert_level(6.5), AlertLevel::Red);
        assert_eq!(alert_level(3.999), AlertLevel::Green);
    }

    #[test]
    fn region_reference_and_boundaries() {
        assert_eq!(assign_region(-45.0), Region::Oceania);
        assert_eq!(assign_region(-15.0), Region::SouthAmerica);
        assert_eq!(assign_region(15.0), Region::Africa);
        assert_eq!(assign_region(45.0), Region::Asia);
        assert_eq!(assign_region(65.0), Region::Europe);
        assert_eq!(assign_region(-30.0), Region::SouthAmerica);
        assert_eq!(assign_region(0.0), Region::Africa);
        assert_eq!(assign_region(30.0), Region::Asia);
        assert_eq!(assign_region(60.0), Region::Europe);
    }

    #[test]
    fn intensity_bounded_and_one_decimal() {
        let mags = [5.0, 6.0, 7.0, 1.0, 16.0];
        let depths = [10.0, 50.0, 100.0, 600.0, 0.0];
        let out = calculate_intensity(&mags, &depths, &mut rng());
        assert_eq!(out.len(), 5);
        for v in &out {
            assert!((INTENSITY_MIN..=INTENSITY_MAX).contains(v), "{v}");
            assert!(((v * 10.0).round() - v * 10.0).abs() < 1e-9, "{v} not 1 dp");
        }
        // Deep, weak events clip at the floor; huge shallow ones at the ceiling.
        assert_eq!(out[3], 1.0);
        assert_eq!(out[4], 12.0);
    }

    /// mag 6, depth 0: noise N(0, 0.5) means 10k intensities average 6.0 ± 0.05.
    #[test]
    fn intensity_noise_is_centred() {
        let n = 10_000;
        let out = calculate_intensity(&vec![6.0; n], &vec![0.0; n], &mut rng());
        let mean = out.iter().sum::<f64>() / n as f64;
        assert!((mean - 6.0).abs() < 0.05, "mean {mean}");
    }

    #[test]
    fn intensity_propagates_nan() {
        let out = calculate_intensity(&[f64::NAN, 5.0], &[10.0, f64::NAN], &mut rng());
        assert!(out[0].is_nan());
        assert!(out[1].is_nan());
    }

    #[test]
    fn cost_non_negative_and_floors_small_events_at_zero() {
        let n = 2_000;
        // mag 1, intensity 1: base 1 000 against noise sd 10 000, so Φ(-0.1) ≈ 46 % clip to 0.
        let out = estimate_cost(&vec![1.0; n], &vec![1.0; n], &mut rng());
        assert!(out.iter().all(|&c| c >= 0.0));
        let zeros = out.iter().filter(|&&c| c == 0.0).count();
        let rate = zeros as f64 / n as f64;
        assert!((0.40..=0.54).contains(&rate), "zero rate {rate:.3}");
    }

    #[test]
    fn cost_scales_cubically_with_magnitude() {
        let n = 2_000;
        let out = estimate_cost(&vec![8.0; n], &vec![8.0; n], &mut rng());
        let mean = out.iter().sum::<f64>() / n as f64;
        let expected = base_cost(8.0, 8.0);
        assert!((mean - expected).abs() < 1_000.0, "mean {mean} vs {expected}");
        for c in &out {
            assert!(((c * 100.0).round() - c * 100.0).abs() < 1e-6, "{c} not 2 dp");
        }
    }

    #[test]
    fn cost_propagates_nan() {
        let out = estimate_cost(&[f64::NAN], &[5.0], &mut rng());
        assert!(out[0].is_nan());
    }

    #[test]
    fn impact_means_follow_rates() {
        let n = 5_000;
        let intensities = vec![6.0; n];
        let mags = vec![5.0; n];
        let impacts = estimate_impacts(&intensities, &mags, &mut rng());
        let mean = |v: &[Option<u64>]| v.iter().flatten().sum::<u64>() as f64 / n as f64;
        assert!((mean(&impacts.casualties) - 3.0).abs() < 0.15);
        assert!((mean(&impacts.injuries) - 12.0).abs() < 0.3);
        assert!((mean(&impacts.displaced) - 30.0).abs() < 0.5);
    }

    #[test]
    fn impacts_missing_for_invalid_rates() {
        let impacts = estimate_impacts(&[f64::NAN, 2.0], &[5.0, -1.0], &mut rng());
        assert_eq!(impacts.casualties[0], None);
        assert_eq!(impacts.injuries[0], None);
        assert_eq!(impacts.displaced[0], None);
        assert_eq!(impacts.casualties[1], None);
        assert!(impacts.injuries[1].is_some());
    }

    proptest! {
        #[test]
        fn intensity_always_in_range(mag in -2.0f64..12.0, depth in 0.0f64..700.0, seed in any::<u64>()) {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let out = calculate_intensity(&[mag], &[depth], &mut rng);
            prop_assert!((INTENSITY_MIN..=INTENSITY_MAX).contains(&out[0]));
        }

        #[test]
        fn cost_never_negative(mag in 0.0f64..10.0, intensity in 1.0f64..12.0, seed in any::<u64>()) {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let out = estimate_cost(&[mag], &[intensity], &mut rng);
            prop_assert!(out[0] >= 0.0);
        }

        #[test]
        fn classifiers_are_total_and_deterministic(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            prop_assert_eq!(assign_plate(lat, lon), assign_plate(lat, lon));
            prop_assert_eq!(assign_region(lat), assign_region(lat));
            if lat <= -60.0 {
                prop_assert_eq!(assign_plate(lat, lon), TectonicPlate::Antarctic);
            }
        }
    }
}
