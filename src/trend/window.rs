use crate::error::PulseError;
use crate::trend::stats::{mean, population_std};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlidingWindow {
    Week,
    Month,
}

impl SlidingWindow {
    pub fn width(self) -> usize {
        match self {
            Self::Week => 7,
            Self::Month => 30,
        }
    }
}

impl FromStr for SlidingWindow {
    type Err = PulseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "7" | "week" => Ok(Self::Week),
            "30" | "month" => Ok(Self::Month),
            other => Err(PulseError::ConfigParse(format!(
                "sliding window must be 7 or 30 (got {other})"
            ))),
        }
    }
}

/// Z-scores each point against the `window` points before it.
///
/// Points with fewer than two predecessors, or whose predecessors have no
/// spread, are dropped.
pub fn normalize(values: &[f64], window: SlidingWindow) -> Vec<f64> {
    let width = window.width();
    let mut normalized = Vec::with_capacity(values.len());
    for (index, value) in values.iter().enumerate() {
        let start = index.saturating_sub(width);
        let history = &values[start..index];
        if history.len() < 2 {
            continue;
        }
        let (Some(center), Some(spread)) = (mean(history), population_std(history)) else {
            continue;
        };
        if spread > 0.0 {
            normalized.push((value - center) / spread);
        }
    }
    normalized
}
