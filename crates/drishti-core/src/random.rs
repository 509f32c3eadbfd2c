//! Random draws used by the simulated sensors.
//!
//! Every component takes `&mut impl Rng` so callers decide where entropy
//! comes from: [`seeded_rng`] gives a reproducible stream for a fixed seed
//! and an OS-seeded one otherwise. The helpers here never panic on an empty
//! range; bounds are reordered instead.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ConfidenceBand;

/// Build the generator for a component. `None` seeds from the OS.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64)
}

/// Derive an independent generator from a parent one.
pub fn fork_rng<R: Rng + ?Sized>(parent: &mut R) -> StdRng {
    StdRng::seed_from_u64(parent.random())
}

/// Uniform integer in `[a, b]` (either order).
pub fn int_between<R: Rng + ?Sized>(rng: &mut R, a: i32, b: i32) -> i32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    rng.random_range(lo..=hi)
}

/// Uniform unsigned integer in `[a, b]` (either order).
pub fn uint_between<R: Rng + ?Sized>(rng: &mut R, a: u32, b: u32) -> u32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    rng.random_range(lo..=hi)
}

/// Uniform float in `[low, high)`; `low` when the range is empty.
pub fn float_between<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    if low < high {
        rng.random_range(low..high)
    } else {
        low
    }
}

/// Round to two decimals, the precision confidence values are reported at.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl ConfidenceBand {
    /// Draw a confidence value from the band, rounded to two decimals.
    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> f64 {
        round2(float_between(rng, self.low, self.high)).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = seeded_rng(Some(11));
        let mut b = seeded_rng(Some(11));
        let xs: Vec<i32> = (0..16).map(|_| int_between(&mut a, -10, 15)).collect();
        let ys: Vec<i32> = (0..16).map(|_| int_between(&mut b, -10, 15)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn int_between_accepts_reversed_bounds() {
        let mut rng = seeded_rng(Some(3));
        for _ in 0..200 {
            let v = int_between(&mut rng, 15, -10);
            assert!((-10..=15).contains(&v));
        }
    }

    #[test]
    fn float_between_empty_range_returns_low() {
        let mut rng = seeded_rng(Some(3));
        assert!((float_between(&mut rng, 0.5, 0.5) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn band_sample_stays_in_band() {
        let mut rng = seeded_rng(Some(5));
        let band = ConfidenceBand {
            low: 0.85,
            high: 0.98,
        };
        for _ in 0..500 {
            let c = band.sample(&mut rng);
            assert!((0.85..=0.98).contains(&c), "confidence {c} out of band");
        }
    }
}
