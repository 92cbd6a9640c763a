pub mod json;
pub mod md;

use crate::error::Result;
use crate::store::UpsertOutcome;
use crate::trend::composite::RepoComposites;
use crate::trend::SeriesTrend;
use crate::types::report::{RecommendationResult, TaskBundle};
use crate::types::scoring::HealthSnapshot;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Md,
}

/// One row of a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchRow {
    pub path: String,
    pub repo: Option<String>,
    pub health_score: Option<f64>,
    pub degraded: Vec<String>,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger: Option<&'static str>,
}

impl BatchRow {
    pub fn scored(path: String, snapshot: &HealthSnapshot, ledger: Option<UpsertOutcome>) -> Self {
        Self {
            path,
            repo: Some(snapshot.repo.clone()),
            health_score: Some(snapshot.health_score()),
            degraded: snapshot
                .degraded_dimensions()
                .iter()
                .map(|dimension| dimension.to_string())
                .collect(),
            error: None,
            ledger: ledger.map(UpsertOutcome::as_str),
        }
    }

    pub fn failed(path: String, error: String) -> Self {
        Self {
            path,
            repo: None,
            health_score: None,
            degraded: Vec::new(),
            error: Some(error),
            ledger: None,
        }
    }
}

pub fn render_health(snapshot: &HealthSnapshot, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(json::to_json(snapshot)?),
        OutputFormat::Md => Ok(md::health_markdown(snapshot)),
    }
}

pub fn render_trends(trends: &[SeriesTrend], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(json::to_json(&trends)?),
        OutputFormat::Md => Ok(md::trend_markdown(trends)),
    }
}

pub fn render_composites(reports: &[RepoComposites], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(json::to_json(&reports)?),
        OutputFormat::Md => Ok(md::composite_markdown(reports)),
    }
}

pub fn render_recommendation(result: &RecommendationResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(json::to_json(result)?),
        OutputFormat::Md => Ok(md::recommendation_markdown(result)),
    }
}

pub fn render_batch(rows: &[BatchRow], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(json::to_json(&rows)?),
        OutputFormat::Md => Ok(md::batch_markdown(rows)),
    }
}

pub fn render_task(bundle: &TaskBundle, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(json::to_json(bundle)?),
        OutputFormat::Md => Ok(bundle.checklist.clone()),
    }
}
