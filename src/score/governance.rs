use crate::normalize::{clamp_score, reweighted_average, SCORE_MAX};
use crate::score::evidence;
use crate::types::metrics::{GovernanceFiles, RepoMetrics};
use crate::types::scoring::{Dimension, DimensionScore, ScoreOutcome, SubScore};

/// Governance reuses the responsiveness sub-scores for its process term and
/// falls back to vitality when nothing else is known.
pub fn governance_score(
    metrics: &RepoMetrics,
    responsiveness: &DimensionScore,
    vitality: Option<f64>,
) -> DimensionScore {
    let files = metrics.github_health_percentage.map(clamp_score);
    let process = reweighted_average(&[
        (responsiveness.sub_score("first_response"), 0.6),
        (responsiveness.sub_score("closing"), 0.4),
    ]);
    let transparency = metrics.governance_files.as_ref().map(transparency_score);

    let outcome = match reweighted_average(&[(files, 0.45), (process, 0.35), (transparency, 0.20)])
    {
        Some(score) => ScoreOutcome::computed(score),
        None => {
            let base = vitality.unwrap_or(0.0);
            tracing::warn!(repo = %metrics.repo, vitality = base, "governance derived from vitality");
            ScoreOutcome::degraded(
                0.8 * base + 20.0,
                "no community files, process or transparency data",
            )
        }
    };
    tracing::debug!(repo = %metrics.repo, score = ?outcome.score(), "governance computed");

    let mut evidence_items = evidence(
        metrics,
        &[("github_health_percentage", metrics.github_health_percentage)],
    );
    if let Some(files) = &metrics.governance_files {
        evidence_items.extend(evidence(
            metrics,
            &[("governance_files_present", Some(files.present_count() as f64))],
        ));
    }

    DimensionScore {
        dimension: Dimension::Governance,
        outcome,
        sub_scores: vec![
            SubScore::new("files", files),
            SubScore::new("process", process),
            SubScore::new("transparency", transparency),
        ],
        evidence: evidence_items,
    }
}

pub fn transparency_score(files: &GovernanceFiles) -> f64 {
    if files.has_core_set() {
        return SCORE_MAX;
    }
    SCORE_MAX * files.present_count() as f64 / GovernanceFiles::CHECKLIST_LEN as f64
}
