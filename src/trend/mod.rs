pub mod composite;
pub mod stats;
pub mod window;

use crate::error::Result;
use crate::types::config::TrendDefaults;
use crate::types::metrics::{MetricSample, MetricSeries};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use stats::{mean, median, ols_slope, population_std, sample_std};
pub use window::SlidingWindow;

const SHORT_WINDOW: usize = 7;
const LONG_WINDOW: usize = 30;
const OUTLIER_MIN_POINTS: usize = 5;
const OUTLIER_THRESHOLD: f64 = 2.0;

/// Shape of a metric, which decides how its series should be pre-processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Count,
    Duration,
    Ratio,
}

impl MetricKind {
    /// Classifies by whole `_`-separated name tokens, so `generated_prs`
    /// stays a count while `retention_rate` is a ratio.
    pub fn from_metric_name(metric: &str) -> Self {
        let metric = metric.to_ascii_lowercase();
        let tokens = metric
            .split(|c: char| c == '_' || c == '-' || c == '.')
            .filter(|token| !token.is_empty())
            .collect::<Vec<_>>();
        let has = |markers: &[&str]| tokens.iter().any(|token| markers.contains(token));

        if tokens.last() == Some(&"h") || has(&["hours", "response", "duration"]) {
            Self::Duration
        } else if has(&["hhi", "share", "rate", "ratio", "scorecard", "percentage", "pct"])
            || (tokens.first() == Some(&"score") && tokens.len() > 1)
        {
            Self::Ratio
        } else {
            Self::Count
        }
    }

    /// Sliding window suited to the metric; bounded ratios are left as-is.
    pub fn recommended_window(self) -> Option<SlidingWindow> {
        match self {
            Self::Count => Some(SlidingWindow::Month),
            Self::Duration => Some(SlidingWindow::Week),
            Self::Ratio => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendParams {
    pub slope_window: usize,
    pub response_hours: Option<f64>,
    pub normalize: Option<SlidingWindow>,
}

impl Default for TrendParams {
    fn default() -> Self {
        Self {
            slope_window: TrendDefaults::default().slope_window,
            response_hours: None,
            normalize: None,
        }
    }
}

impl TrendParams {
    /// Parameters for `kind`; duration metrics get the response ratio enabled.
    pub fn for_kind(defaults: &TrendDefaults, kind: MetricKind) -> Self {
        Self {
            slope_window: defaults.slope_window,
            response_hours: (kind == MetricKind::Duration).then_some(defaults.response_hours),
            normalize: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Rising,
    Falling,
    Flat,
}

impl Direction {
    pub fn from_slope(slope: Option<f64>) -> Self {
        match slope {
            Some(slope) if slope > 0.0 => Self::Rising,
            Some(slope) if slope < 0.0 => Self::Falling,
            _ => Self::Flat,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RollingStats {
    pub mean_7d: Option<f64>,
    pub median_7d: Option<f64>,
    pub mean_30d: Option<f64>,
    pub median_30d: Option<f64>,
}

impl RollingStats {
    pub fn from_values(values: &[f64]) -> Self {
        let short = tail(values, SHORT_WINDOW);
        let long = tail(values, LONG_WINDOW);
        Self {
            mean_7d: mean(short),
            median_7d: median(short),
            mean_30d: mean(long),
            median_30d: median(long),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outlier {
    pub index: usize,
    pub value: f64,
    pub z_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendDerived {
    pub points: usize,
    pub slope: Option<f64>,
    pub direction: Direction,
    pub rolling: RollingStats,
    pub anomaly_zscore: Option<f64>,
    pub response_ratio: Option<f64>,
    pub normalized_with: Option<SlidingWindow>,
    pub first_value: Option<f64>,
    pub last_value: Option<f64>,
    pub delta: Option<f64>,
    pub delta_pct: Option<f64>,
    pub volatility: f64,
    pub outliers: Vec<Outlier>,
}

fn tail(values: &[f64], count: usize) -> &[f64] {
    &values[values.len().saturating_sub(count)..]
}

/// Derives trend statistics for an ordered series.
///
/// Slope and z-score run on the sliding-window normalized series when
/// `params.normalize` is set; everything else reads the raw values. Short
/// series leave the affected fields empty rather than failing.
pub fn compute_trend_derived(values: &[f64], params: &TrendParams) -> TrendDerived {
    let values = values
        .iter()
        .copied()
        .filter(|value| value.is_finite())
        .collect::<Vec<_>>();

    let analysed = match params.normalize {
        Some(window) => window::normalize(&values, window),
        None => values.clone(),
    };

    let slope_len = params.slope_window.max(2).min(analysed.len());
    let slope = ols_slope(tail(&analysed, slope_len));

    let first_value = values.first().copied();
    let last_value = values.last().copied();
    let delta = first_value.zip(last_value).map(|(first, last)| last - first);
    let delta_pct = first_value.zip(delta).map(|(first, delta)| {
        if first == 0.0 {
            0.0
        } else {
            delta / first * 100.0
        }
    });

    let derived = TrendDerived {
        points: values.len(),
        slope,
        direction: Direction::from_slope(slope),
        rolling: RollingStats::from_values(&values),
        anomaly_zscore: anomaly_zscore(&analysed),
        response_ratio: params
            .response_hours
            .and_then(|hours| response_ratio(&values, hours)),
        normalized_with: params.normalize,
        first_value,
        last_value,
        delta,
        delta_pct,
        volatility: sample_std(&values).unwrap_or(0.0),
        outliers: outliers(&values),
    };
    tracing::debug!(
        points = derived.points,
        slope = ?derived.slope,
        zscore = ?derived.anomaly_zscore,
        "trend derived"
    );
    derived
}

/// Trend of one (repo, metric) series, as rendered by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesTrend {
    pub repo: String,
    pub metric: String,
    pub kind: MetricKind,
    pub derived: TrendDerived,
}

/// Splits loose samples into per-(repo, metric) series, in key order.
pub fn group_samples(samples: Vec<MetricSample>) -> Result<Vec<MetricSeries>> {
    let mut grouped: BTreeMap<(String, String), MetricSeries> = BTreeMap::new();
    for sample in samples {
        let series = grouped
            .entry((sample.repo.clone(), sample.metric.clone()))
            .or_insert_with(|| MetricSeries::new(sample.repo.clone(), sample.metric.clone()));
        series.push(sample)?;
    }
    Ok(grouped.into_values().collect())
}

/// Command-line adjustments layered over the per-kind parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrendOverrides {
    pub slope_window: Option<usize>,
    pub response_hours: Option<f64>,
    pub normalize: Option<SlidingWindow>,
}

impl TrendParams {
    pub fn with_overrides(self, overrides: &TrendOverrides) -> Self {
        Self {
            slope_window: overrides.slope_window.unwrap_or(self.slope_window),
            response_hours: overrides.response_hours.or(self.response_hours),
            normalize: overrides.normalize.or(self.normalize),
        }
    }
}

/// Runs [`compute_trend_derived`] over a series with parameters picked from
/// its metric kind. Bounded ratios are never window-normalized.
pub fn trend_for_series(
    series: &MetricSeries,
    defaults: &TrendDefaults,
    overrides: &TrendOverrides,
) -> SeriesTrend {
    let kind = MetricKind::from_metric_name(&series.metric);
    let mut params = TrendParams::for_kind(defaults, kind).with_overrides(overrides);
    if kind.recommended_window().is_none() {
        params.normalize = None;
    }
    SeriesTrend {
        repo: series.repo.clone(),
        metric: series.metric.clone(),
        kind,
        derived: compute_trend_derived(&series.values(), &params),
    }
}

fn anomaly_zscore(values: &[f64]) -> Option<f64> {
    if values.len() < 3 {
        return None;
    }
    let last = *values.last()?;
    let spread = population_std(values).filter(|std| *std > 0.0)?;
    Some((last - mean(values)?) / spread)
}

fn response_ratio(values: &[f64], hours: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let within = values.iter().filter(|value| **value <= hours).count();
    Some(within as f64 / values.len() as f64)
}

fn outliers(values: &[f64]) -> Vec<Outlier> {
    if values.len() < OUTLIER_MIN_POINTS {
        return Vec::new();
    }
    let (Some(center), Some(spread)) = (mean(values), sample_std(values)) else {
        return Vec::new();
    };
    if spread == 0.0 {
        return Vec::new();
    }
    values
        .iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let z_score = (value - center) / spread;
            (z_score.abs() > OUTLIER_THRESHOLD).then_some(Outlier {
                index,
                value: *value,
                z_score,
            })
        })
        .collect()
}
