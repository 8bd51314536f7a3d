//! Scalar helpers shared by the derivation rules.
//!
//! All of them let NaN through untouched: a malformed primary sample must
//! surface downstream rather than be silently replaced by a bound.

use rand::Rng;
use rand_distr::{Distribution, Poisson};

/// Clamp `x` into `[lo, hi]`. NaN stays NaN.
pub fn clip(x: f64, lo: f64, hi: f64) -> f64 {
    if x < lo {
        lo
    } else if x > hi {
        hi
    } else {
        x
    }
}

/// Floor `x` at `lo` with no upper bound. Unlike `f64::max`, NaN stays NaN.
pub fn clip_lower(x: f64, lo: f64) -> f64 {
    if x < lo { lo } else { x }
}

/// Round to `decimals` places, ties to even.
pub fn round_to(x: f64, decimals: i32) -> f64 {
    let scale = 10_f64.powi(decimals);
    (x * scale).round_ties_even() / scale
}

/// One Poisson draw at `rate`.
///
/// A zero rate yields `Some(0)` without touching the stream. A NaN, negative
/// or non-finite rate has no valid count and yields `None`.
pub fn poisson_count<R: Rng>(rate: f64, rng: &mut R) -> Option<u64> {
    if rate == 0.0 {
        return Some(0);
    }
    let dist = Poisson::new(rate).ok()?;
    Some(dist.sample(rng) as u64)
}
