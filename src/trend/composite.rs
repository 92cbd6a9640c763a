//! Rolling-percentile composite series.
//!
//! Each component metric is ranked against its own trailing window (p10/p90)
//! on every date, then the component scores are blended per composite.

use crate::normalize::{norm_hi, norm_lo, reweighted_average, Percentiles};
use crate::types::metrics::MetricSeries;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Score given to a point whose window has no spread.
pub const FLAT_WINDOW_SCORE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeKind {
    Vitality,
    Responsiveness,
    Resilience,
}

struct Component {
    metric: &'static str,
    weight: f64,
    high_is_good: bool,
}

const fn component(metric: &'static str, weight: f64, high_is_good: bool) -> Component {
    Component {
        metric,
        weight,
        high_is_good,
    }
}

const VITALITY: [Component; 4] = [
    component("activity", 0.45, true),
    component("openrank", 0.25, true),
    component("participants", 0.20, true),
    component("attention", 0.10, true),
];

const RESPONSIVENESS: [Component; 4] = [
    component("issue_response_time_h", 0.30, false),
    component("pr_response_time_h", 0.30, false),
    component("issue_resolution_duration_h", 0.20, false),
    component("pr_resolution_duration_h", 0.20, false),
];

const RESILIENCE: [Component; 4] = [
    component("bus_factor", 0.35, true),
    component("top1_share", 0.25, false),
    component("hhi", 0.20, false),
    component("retention_rate", 0.20, true),
];

impl CompositeKind {
    pub const ALL: [CompositeKind; 3] = [
        CompositeKind::Vitality,
        CompositeKind::Responsiveness,
        CompositeKind::Resilience,
    ];

    fn components(self) -> &'static [Component] {
        match self {
            Self::Vitality => &VITALITY,
            Self::Responsiveness => &RESPONSIVENESS,
            Self::Resilience => &RESILIENCE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositePoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// Latest composite value and its change since the first valued point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    pub value: Option<f64>,
    pub delta: Option<f64>,
}

impl Kpi {
    pub fn from_points(points: &[CompositePoint]) -> Self {
        let valued = points
            .iter()
            .filter_map(|point| point.value)
            .collect::<Vec<_>>();
        let value = valued.last().copied();
        let delta = match valued.as_slice() {
            [first, .., last] => Some(last - first),
            _ => None,
        };
        Self { value, delta }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentLatest {
    pub metric: String,
    pub weight: f64,
    pub raw: Option<f64>,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeSeries {
    pub kind: CompositeKind,
    pub points: Vec<CompositePoint>,
    pub kpi: Kpi,
    pub components_latest: Vec<ComponentLatest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoComposites {
    pub repo: String,
    pub window_days: u32,
    pub composites: Vec<CompositeSeries>,
}

fn metric_key(name: &str) -> &str {
    name.strip_prefix("metric_").unwrap_or(name)
}

fn window_score(raw: f64, window: &[f64], high_is_good: bool) -> Option<f64> {
    let reference = Percentiles::from_values(window.iter().copied())?;
    if reference.p10 == reference.p90 {
        return Some(FLAT_WINDOW_SCORE);
    }
    if high_is_good {
        norm_hi(Some(raw), Some(&reference))
    } else {
        norm_lo(Some(raw), Some(&reference))
    }
}

/// Score of `series` on `date` against the values in the trailing window.
fn score_on(series: &MetricSeries, date: NaiveDate, window_days: u32, high_is_good: bool) -> Option<f64> {
    let raw = series.value_on(date)?;
    let start = date - Duration::days(i64::from(window_days.max(1)) - 1);
    let window = series.values_between(start, date);
    window_score(raw, &window, high_is_good)
}

/// Builds one composite for a single repository's metric series.
///
/// Points are the union of the component dates; a point whose components
/// are all missing has no value.
pub fn compute_composite(kind: CompositeKind, series: &[MetricSeries], window_days: u32) -> CompositeSeries {
    // an unprefixed name wins over its `metric_` twin
    let mut lookup: BTreeMap<&str, &MetricSeries> = BTreeMap::new();
    for entry in series {
        let key = metric_key(&entry.metric);
        if entry.metric == key || !lookup.contains_key(key) {
            lookup.insert(key, entry);
        }
    }
    let present = kind
        .components()
        .iter()
        .filter_map(|component| lookup.get(component.metric).map(|series| (component, *series)))
        .collect::<Vec<_>>();

    let dates = present
        .iter()
        .flat_map(|(_, series)| series.dates())
        .collect::<BTreeSet<_>>();

    let points = dates
        .into_iter()
        .map(|date| {
            let terms = present
                .iter()
                .map(|(component, series)| {
                    (
                        score_on(series, date, window_days, component.high_is_good),
                        component.weight,
                    )
                })
                .collect::<Vec<_>>();
            CompositePoint {
                date,
                value: reweighted_average(&terms),
            }
        })
        .collect::<Vec<_>>();

    let components_latest = kind
        .components()
        .iter()
        .map(|component| {
            let series = lookup.get(component.metric);
            let latest = series.and_then(|series| series.latest());
            ComponentLatest {
                metric: component.metric.to_string(),
                weight: component.weight,
                raw: latest.map(|(_, value)| value),
                score: series.zip(latest).and_then(|(series, (date, _))| {
                    score_on(series, date, window_days, component.high_is_good)
                }),
            }
        })
        .collect();

    CompositeSeries {
        kind,
        kpi: Kpi::from_points(&points),
        points,
        components_latest,
    }
}

/// All three composites per repository, in repository order.
pub fn compute_repo_composites(series: &[MetricSeries], window_days: u32) -> Vec<RepoComposites> {
    let mut by_repo: BTreeMap<&str, Vec<MetricSeries>> = BTreeMap::new();
    for entry in series {
        by_repo.entry(entry.repo.as_str()).or_default().push(entry.clone());
    }
    by_repo
        .into_iter()
        .map(|(repo, series)| {
            let composites = CompositeKind::ALL
                .iter()
                .map(|kind| compute_composite(*kind, &series, window_days))
                .collect::<Vec<_>>();
            tracing::debug!(repo, composites = composites.len(), "composites computed");
            RepoComposites {
                repo: repo.to_string(),
                window_days,
                composites,
            }
        })
        .collect()
}
