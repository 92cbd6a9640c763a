//! Transforms that map raw repository metrics onto a comparable 0–100 scale.
//!
//! Every transform returns `None` for absent or unusable input so callers can
//! drop the term from a weighted sum instead of scoring it as zero.

use serde::{Deserialize, Serialize};

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;

const LOG_GROWTH_SCALE: f64 = 18.0;

pub fn clamp_score(value: f64) -> f64 {
    value.clamp(SCORE_MIN, SCORE_MAX)
}

pub fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// `clamp(18 * ln(1 + x), 0, 100)` for volume-type metrics.
pub fn log_growth(value: Option<f64>) -> Option<f64> {
    let value = value.filter(|v| v.is_finite() && *v >= 0.0)?;
    Some(clamp_score(LOG_GROWTH_SCALE * value.ln_1p()))
}

/// Good/bad duration thresholds in hours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeThreshold {
    pub good: f64,
    pub bad: f64,
}

impl TimeThreshold {
    pub const fn new(good: f64, bad: f64) -> Self {
        Self { good, bad }
    }

    pub fn score(&self, hours: Option<f64>) -> Option<f64> {
        threshold_time(hours, self.good, self.bad)
    }
}

pub const ISSUE_FIRST_RESPONSE: TimeThreshold = TimeThreshold::new(24.0, 168.0);
pub const PR_FIRST_RESPONSE: TimeThreshold = TimeThreshold::new(12.0, 120.0);
pub const ISSUE_CLOSE: TimeThreshold = TimeThreshold::new(72.0, 720.0);
pub const PR_CLOSE: TimeThreshold = TimeThreshold::new(48.0, 720.0);
pub const ISSUE_AGE: TimeThreshold = TimeThreshold::new(168.0, 2160.0);
pub const PR_AGE: TimeThreshold = TimeThreshold::new(168.0, 2160.0);

/// `T(h, g, b)`: 100 at or below `good`, 0 at or above `bad`, linear between.
pub fn threshold_time(hours: Option<f64>, good: f64, bad: f64) -> Option<f64> {
    let hours = hours.filter(|h| h.is_finite())?;
    if hours <= good {
        return Some(SCORE_MAX);
    }
    if hours >= bad {
        return Some(SCORE_MIN);
    }
    Some(clamp_score(SCORE_MAX * (bad - hours) / (bad - good)))
}

/// 10th/90th percentile pair of a reference population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p10: f64,
    pub p90: f64,
}

impl Percentiles {
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut sorted = values
            .into_iter()
            .filter(|v| v.is_finite())
            .collect::<Vec<_>>();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);
        Some(Self {
            p10: percentile_sorted(&sorted, 10.0),
            p90: percentile_sorted(&sorted, 90.0),
        })
    }

    fn unit_position(&self, value: f64) -> Option<f64> {
        let span = self.p90 - self.p10;
        if !value.is_finite() || span == 0.0 || !span.is_finite() {
            return None;
        }
        Some(clamp_unit((value - self.p10) / span))
    }
}

/// Linear interpolation between closest ranks, `k = (n - 1) * pct / 100`.
pub fn percentile(values: &[f64], pct: f64) -> Option<f64> {
    let mut sorted = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .collect::<Vec<_>>();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    Some(percentile_sorted(&sorted, pct))
}

fn percentile_sorted(sorted: &[f64], pct: f64) -> f64 {
    let k = (sorted.len() - 1) as f64 * pct.clamp(0.0, 100.0) / 100.0;
    let lower = k.floor() as usize;
    let upper = k.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    sorted[lower] * (upper as f64 - k) + sorted[upper] * (k - lower as f64)
}

/// Larger-is-better percentile transform onto 0–100.
pub fn norm_hi(value: Option<f64>, reference: Option<&Percentiles>) -> Option<f64> {
    let position = reference?.unit_position(value?)?;
    Some(clamp_score(SCORE_MAX * position))
}

/// Smaller-is-better percentile transform onto 0–100.
pub fn norm_lo(value: Option<f64>, reference: Option<&Percentiles>) -> Option<f64> {
    let position = reference?.unit_position(value?)?;
    Some(clamp_score(SCORE_MAX * (1.0 - position)))
}

/// Weighted average over the terms that are present; the weight of a missing
/// term is redistributed proportionally among the others.
pub fn reweighted_average(terms: &[(Option<f64>, f64)]) -> Option<f64> {
    let mut acc = 0.0;
    let mut weight = 0.0;
    for (score, w) in terms {
        let Some(score) = score.filter(|s| s.is_finite()) else {
            continue;
        };
        if !w.is_finite() || *w <= 0.0 {
            continue;
        }
        acc += score * w;
        weight += w;
    }
    if weight <= 0.0 {
        return None;
    }
    Some(acc / weight)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_growth_skips_absent_and_caps_large_values() {
        assert_eq!(log_growth(None), None);
        assert_eq!(log_growth(Some(-1.0)), None);
        assert_eq!(log_growth(Some(f64::NAN)), None);
        assert_eq!(log_growth(Some(0.0)), Some(0.0));
        assert_eq!(log_growth(Some(1.0e9)), Some(100.0));
        let mid = log_growth(Some(10.0)).expect("score should exist");
        assert!((mid - 18.0 * 11f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn threshold_time_hits_boundaries() {
        assert_eq!(threshold_time(Some(24.0), 24.0, 168.0), Some(100.0));
        assert_eq!(threshold_time(Some(168.0), 24.0, 168.0), Some(0.0));
        assert_eq!(threshold_time(Some(96.0), 24.0, 168.0), Some(50.0));
        assert_eq!(threshold_time(None, 24.0, 168.0), None);
    }

    #[test]
    fn threshold_time_is_non_increasing() {
        let mut previous = f64::INFINITY;
        for step in 0..300 {
            let hours = step as f64 * 3.0;
            let score = ISSUE_FIRST_RESPONSE
                .score(Some(hours))
                .expect("score should exist");
            assert!(score <= previous);
            previous = score;
        }
    }

    #[test]
    fn percentile_interpolates_between_ranks() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&values, 50.0), Some(3.0));
        let p10 = percentile(&values, 10.0).expect("p10 should exist");
        assert!((p10 - 1.4).abs() < 1e-9);
        assert_eq!(percentile(&[], 10.0), None);
    }

    #[test]
    fn norm_directions_are_mirrored() {
        let reference = Percentiles {
            p10: 10.0,
            p90: 110.0,
        };
        assert_eq!(norm_hi(Some(60.0), Some(&reference)), Some(50.0));
        assert_eq!(norm_lo(Some(35.0), Some(&reference)), Some(75.0));
        assert_eq!(norm_hi(Some(500.0), Some(&reference)), Some(100.0));
        assert_eq!(norm_lo(Some(500.0), Some(&reference)), Some(0.0));
    }

    #[test]
    fn norm_skips_degenerate_reference() {
        let flat = Percentiles { p10: 5.0, p90: 5.0 };
        assert_eq!(norm_hi(Some(5.0), Some(&flat)), None);
        assert_eq!(norm_lo(Some(5.0), None), None);
    }

    #[test]
    fn reweighted_average_redistributes_missing_weight() {
        let full = reweighted_average(&[(Some(80.0), 0.5), (Some(40.0), 0.5)]);
        assert_eq!(full, Some(60.0));
        let partial = reweighted_average(&[(Some(80.0), 0.5), (None, 0.5)]);
        assert_eq!(partial, Some(80.0));
        assert_eq!(reweighted_average(&[(None, 1.0)]), None);
    }
}
