use crate::normalize::{clamp_score, reweighted_average};
use crate::score::{evidence, outcome_or_unavailable};
use crate::types::metrics::RepoMetrics;
use crate::types::scoring::{Dimension, DimensionScore, SubScore};

pub fn resilience_score(metrics: &RepoMetrics) -> DimensionScore {
    let bus_factor = metrics
        .bus_factor
        .map(|bus_factor| clamp_score(20.0 * bus_factor));
    let diversity = metrics
        .hhi
        .or(metrics.top1_share)
        .map(|concentration| clamp_score(100.0 * (1.0 - concentration)));
    let retention = retention_score(metrics);

    let score = reweighted_average(&[(bus_factor, 0.45), (diversity, 0.35), (retention, 0.20)]);
    tracing::debug!(repo = %metrics.repo, ?score, "resilience computed");

    DimensionScore {
        dimension: Dimension::Resilience,
        outcome: outcome_or_unavailable(score, "no contributor concentration data"),
        sub_scores: vec![
            SubScore::new("bus_factor", bus_factor),
            SubScore::new("diversity", diversity),
            SubScore::new("retention", retention),
        ],
        evidence: evidence(
            metrics,
            &[
                ("bus_factor", metrics.bus_factor),
                ("hhi", metrics.hhi),
                ("top1_share", metrics.top1_share),
                ("inactive_contributors", metrics.inactive_contributors),
                ("retention_rate", metrics.retention_rate),
                ("participants", metrics.participants),
            ],
        ),
    }
}

fn retention_score(metrics: &RepoMetrics) -> Option<f64> {
    if let Some(rate) = metrics.retention_rate {
        return Some(clamp_score(100.0 * rate));
    }
    // no participants means no retention signal, not full retention
    let total = metrics.participants.filter(|total| *total > 0.0)?;
    let inactive = metrics.inactive_contributors.unwrap_or(0.0);
    Some(clamp_score(100.0 * (1.0 - inactive / total.max(1.0))))
}
