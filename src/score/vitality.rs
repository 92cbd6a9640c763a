use crate::normalize::{clamp_score, log_growth, reweighted_average};
use crate::score::{evidence, outcome_or_unavailable};
use crate::types::metrics::RepoMetrics;
use crate::types::scoring::{Dimension, DimensionScore, SubScore};

const INFLUENCE_WEIGHT: f64 = 0.30;
const MOMENTUM_WEIGHT: f64 = 0.40;
const COMMUNITY_WEIGHT: f64 = 0.20;
const GROWTH_WEIGHT: f64 = 0.10;

pub fn vitality_score(metrics: &RepoMetrics) -> DimensionScore {
    let influence = log_growth(metrics.openrank);
    let momentum = log_growth(metrics.activity_3m);
    let community = reweighted_average(&[
        (log_growth(metrics.participants), 0.7),
        (log_growth(metrics.new_contributors), 0.3),
    ]);
    let growth = growth_score(metrics.activity_3m, metrics.activity_prev_3m);

    let score = reweighted_average(&[
        (influence, INFLUENCE_WEIGHT),
        (momentum, MOMENTUM_WEIGHT),
        (community, COMMUNITY_WEIGHT),
        (growth, GROWTH_WEIGHT),
    ]);
    tracing::debug!(repo = %metrics.repo, ?score, "vitality computed");

    DimensionScore {
        dimension: Dimension::Vitality,
        outcome: outcome_or_unavailable(score, "no openrank, activity or contributor data"),
        sub_scores: vec![
            SubScore::new("influence", influence),
            SubScore::new("momentum", momentum),
            SubScore::new("community", community),
            SubScore::new("growth", growth),
        ],
        evidence: evidence(
            metrics,
            &[
                ("openrank", metrics.openrank),
                ("activity_3m", metrics.activity_3m),
                ("activity_prev_3m", metrics.activity_prev_3m),
                ("participants", metrics.participants),
                ("new_contributors", metrics.new_contributors),
            ],
        ),
    }
}

/// Quarter-over-quarter change mapped so that a flat quarter scores 100.
pub fn growth_score(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    let current = current.filter(|v| v.is_finite())?;
    let previous = previous.filter(|v| v.is_finite())?;
    let change = (current - previous) / (3.0 * previous.max(1.0));
    Some(clamp_score(100.0 * change + 100.0))
}
