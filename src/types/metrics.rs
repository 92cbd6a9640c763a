use crate::error::{PulseError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Latest metric values for one repository, as handed over by ingestion.
///
/// Every numeric field is optional; scorers treat `None` as "skip this term".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoMetrics {
    pub repo: String,
    pub as_of: Option<NaiveDate>,

    pub openrank: Option<f64>,
    pub activity: Option<f64>,
    pub activity_3m: Option<f64>,
    pub activity_prev_3m: Option<f64>,
    pub participants: Option<f64>,
    pub new_contributors: Option<f64>,

    pub issues_new: Option<f64>,
    pub prs_new: Option<f64>,
    pub issue_response_time_h: Option<f64>,
    pub pr_response_time_h: Option<f64>,
    pub issue_resolution_duration_h: Option<f64>,
    pub pr_resolution_duration_h: Option<f64>,
    pub issue_age_h: Option<f64>,
    pub pr_age_h: Option<f64>,

    pub bus_factor: Option<f64>,
    pub hhi: Option<f64>,
    pub top1_share: Option<f64>,
    pub inactive_contributors: Option<f64>,
    pub retention_rate: Option<f64>,

    pub github_health_percentage: Option<f64>,
    pub governance_files: Option<GovernanceFiles>,

    pub scorecard_score: Option<f64>,
    pub scorecard_checks: BTreeMap<String, f64>,
    pub security_defaulted: bool,
}

impl RepoMetrics {
    /// Rejects NaN or infinite values; absent values are fine.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("openrank", self.openrank),
            ("activity", self.activity),
            ("activity_3m", self.activity_3m),
            ("activity_prev_3m", self.activity_prev_3m),
            ("participants", self.participants),
            ("new_contributors", self.new_contributors),
            ("issues_new", self.issues_new),
            ("prs_new", self.prs_new),
            ("issue_response_time_h", self.issue_response_time_h),
            ("pr_response_time_h", self.pr_response_time_h),
            ("issue_resolution_duration_h", self.issue_resolution_duration_h),
            ("pr_resolution_duration_h", self.pr_resolution_duration_h),
            ("issue_age_h", self.issue_age_h),
            ("pr_age_h", self.pr_age_h),
            ("bus_factor", self.bus_factor),
            ("hhi", self.hhi),
            ("top1_share", self.top1_share),
            ("inactive_contributors", self.inactive_contributors),
            ("retention_rate", self.retention_rate),
            ("github_health_percentage", self.github_health_percentage),
            ("scorecard_score", self.scorecard_score),
        ];
        for (metric, value) in fields {
            if let Some(value) = value {
                ensure_finite(metric, value)?;
            }
        }
        for (check, value) in &self.scorecard_checks {
            ensure_finite(&format!("scorecard_checks.{check}"), *value)?;
        }
        Ok(())
    }
}

fn ensure_finite(metric: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PulseError::InvalidValue {
            metric: metric.to_string(),
            value,
        })
    }
}

/// Presence flags for the seven community files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceFiles {
    pub readme: bool,
    pub license: bool,
    pub contributing: bool,
    pub code_of_conduct: bool,
    pub security: bool,
    pub issue_template: bool,
    pub pull_request_template: bool,
}

impl GovernanceFiles {
    pub const CHECKLIST_LEN: usize = 7;

    pub fn present_count(&self) -> usize {
        [
            self.readme,
            self.license,
            self.contributing,
            self.code_of_conduct,
            self.security,
            self.issue_template,
            self.pull_request_template,
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }

    pub fn has_core_set(&self) -> bool {
        self.readme
            && self.license
            && self.contributing
            && (self.issue_template || self.pull_request_template)
    }
}

/// One observation of a named metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub repo: String,
    pub metric: String,
    pub date: NaiveDate,
    pub value: f64,
}

/// Date-ordered samples of a single (repo, metric) pair.
///
/// Append-only: a date may be recorded once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub repo: String,
    pub metric: String,
    points: BTreeMap<NaiveDate, f64>,
}

impl MetricSeries {
    pub fn new(repo: impl Into<String>, metric: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            metric: metric.into(),
            points: BTreeMap::new(),
        }
    }

    pub fn from_samples<I>(repo: &str, metric: &str, samples: I) -> Result<Self>
    where
        I: IntoIterator<Item = MetricSample>,
    {
        let mut series = Self::new(repo, metric);
        for sample in samples {
            series.push(sample)?;
        }
        Ok(series)
    }

    pub fn push(&mut self, sample: MetricSample) -> Result<()> {
        if sample.repo != self.repo || sample.metric != self.metric {
            return Err(PulseError::SeriesMismatch {
                expected: format!("{}/{}", self.repo, self.metric),
                found: format!("{}/{}", sample.repo, sample.metric),
            });
        }
        ensure_finite(&sample.metric, sample.value)?;
        if self.points.contains_key(&sample.date) {
            return Err(PulseError::DuplicateSample {
                repo: sample.repo,
                metric: sample.metric,
                date: sample.date,
            });
        }
        self.points.insert(sample.date, sample.value);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.values().copied().collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.keys().copied().collect()
    }

    pub fn value_on(&self, date: NaiveDate) -> Option<f64> {
        self.points.get(&date).copied()
    }

    /// Values dated within `[start, end]`, oldest first.
    pub fn values_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<f64> {
        if start > end {
            return Vec::new();
        }
        self.points.range(start..=end).map(|(_, value)| *value).collect()
    }

    pub fn latest(&self) -> Option<(NaiveDate, f64)> {
        self.points
            .iter()
            .next_back()
            .map(|(date, value)| (*date, *value))
    }
}
