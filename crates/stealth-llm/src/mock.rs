//! Deterministic stand-in scores for when no live model answered.
//!
//! The generator is seeded by the hour bucket of the request time, so every
//! request in the same clock hour gets the same vector. Values are drawn from
//! plausible-looking ranges and rounded to one decimal.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stealth_types::ScoreVector;

/// Seconds per bucket.
pub const BUCKET_SECS: u64 = 3600;

/// The hour bucket containing `unix_secs`.
pub fn hour_bucket(unix_secs: u64) -> u64 {
    unix_secs / BUCKET_SECS
}

/// Mock scores for the given hour bucket.
pub fn mock_scores(hour: u64) -> ScoreVector {
    let mut rng = StdRng::seed_from_u64(hour);
    let clarity = round1(rng.gen_range(7.0..=9.5));
    let originality = round1(rng.gen_range(6.5..=9.0));
    let team_strength = round1(rng.gen_range(6.0..=8.5));
    let market_fit = round1(rng.gen_range(6.5..=9.2));
    ScoreVector::clamped(clarity, originality, team_strength, market_fit)
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
