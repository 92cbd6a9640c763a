use crate::normalize::{clamp_score, reweighted_average};
use crate::score::evidence;
use crate::types::metrics::RepoMetrics;
use crate::types::scoring::{Dimension, DimensionScore, ScoreOutcome, SubScore};

pub const DEFAULTED_SCORE: f64 = 50.0;
pub const MISSING_SCORE: f64 = 60.0;
const BONUS: f64 = 10.0;

pub fn security_score(metrics: &RepoMetrics) -> DimensionScore {
    let (base, critical, bonus, outcome) = if metrics.security_defaulted {
        tracing::warn!(repo = %metrics.repo, "scorecard defaulted");
        (
            Some(DEFAULTED_SCORE),
            None,
            None,
            ScoreOutcome::degraded(DEFAULTED_SCORE, "scorecard data defaulted upstream"),
        )
    } else {
        let base = metrics.scorecard_score.map(|score| clamp_score(10.0 * score));
        let critical = critical_checks_score(metrics);
        if base.is_none() && critical.is_none() {
            tracing::warn!(repo = %metrics.repo, "no scorecard data");
            (
                None,
                None,
                None,
                ScoreOutcome::degraded(MISSING_SCORE, "no scorecard score or checks"),
            )
        } else {
            let bonus = Some(BONUS);
            let score = reweighted_average(&[(base, 0.70), (critical, 0.20), (bonus, 0.10)]);
            let outcome = score
                .map(ScoreOutcome::computed)
                .unwrap_or_else(|| ScoreOutcome::degraded(MISSING_SCORE, "no scorecard data"));
            (base, critical, bonus, outcome)
        }
    };
    tracing::debug!(repo = %metrics.repo, score = ?outcome.score(), "security computed");

    let mut evidence_items = evidence(metrics, &[("scorecard_score", metrics.scorecard_score)]);
    for (check, value) in &metrics.scorecard_checks {
        evidence_items.extend(evidence(metrics, &[(check.as_str(), Some(*value))]));
    }

    DimensionScore {
        dimension: Dimension::Security,
        outcome,
        sub_scores: vec![
            SubScore::new("base", base),
            SubScore::new("critical", critical),
            SubScore::new("bonus", bonus),
        ],
        evidence: evidence_items,
    }
}

/// Mean of the critical check scores (0–10 each) on the 0–100 scale.
fn critical_checks_score(metrics: &RepoMetrics) -> Option<f64> {
    let checks = metrics
        .scorecard_checks
        .values()
        .copied()
        .filter(|value| value.is_finite())
        .collect::<Vec<_>>();
    if checks.is_empty() {
        return None;
    }
    let mean = checks.iter().sum::<f64>() / checks.len() as f64;
    Some(clamp_score(mean * 10.0))
}
