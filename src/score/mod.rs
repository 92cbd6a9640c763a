pub mod aggregate;
pub mod governance;
pub mod resilience;
pub mod responsiveness;
pub mod security;
pub mod vitality;

use crate::types::metrics::RepoMetrics;
use crate::types::scoring::{EvidenceItem, HealthSnapshot, HealthWeights, Score, ScoreOutcome};
use chrono::{NaiveDate, Utc};

/// Scores `metrics` for its `as_of` date, or today when the payload has none.
pub fn compute_health_snapshot(metrics: &RepoMetrics, weights: &HealthWeights) -> HealthSnapshot {
    let date = metrics.as_of.unwrap_or_else(|| Utc::now().date_naive());
    compute_health_snapshot_on(metrics, weights, date)
}

pub fn compute_health_snapshot_on(
    metrics: &RepoMetrics,
    weights: &HealthWeights,
    date: NaiveDate,
) -> HealthSnapshot {
    let vitality = vitality::vitality_score(metrics);
    let responsiveness = responsiveness::responsiveness_score(metrics);
    let resilience = resilience::resilience_score(metrics);
    let governance = governance::governance_score(metrics, &responsiveness, vitality.score());
    let security = security::security_score(metrics);

    let dimensions = vec![vitality, responsiveness, resilience, governance, security];
    let scores = aggregate::aggregate(&dimensions, weights);
    let snapshot = HealthSnapshot {
        repo: metrics.repo.clone(),
        date,
        dimensions,
        scores,
    };

    let degraded = snapshot.degraded_dimensions();
    tracing::info!(
        repo = %snapshot.repo,
        date = %snapshot.date,
        health = snapshot.health_score(),
        degraded = degraded.len(),
        "health snapshot computed"
    );
    snapshot
}

pub(crate) fn evidence(metrics: &RepoMetrics, items: &[(&str, Option<f64>)]) -> Vec<EvidenceItem> {
    items
        .iter()
        .map(|(key, value)| EvidenceItem {
            key: (*key).to_string(),
            value: *value,
            as_of: metrics.as_of,
        })
        .collect()
}

pub(crate) fn outcome_or_unavailable(score: Option<Score>, reason: &str) -> ScoreOutcome {
    match score {
        Some(score) => ScoreOutcome::computed(score),
        None => ScoreOutcome::unavailable(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::metrics::GovernanceFiles;
    use crate::types::scoring::Dimension;

    fn healthy() -> RepoMetrics {
        RepoMetrics {
            repo: "acme/widget".to_string(),
            as_of: NaiveDate::from_ymd_opt(2024, 6, 1),
            openrank: Some(40.0),
            activity: Some(120.0),
            activity_3m: Some(300.0),
            activity_prev_3m: Some(250.0),
            participants: Some(80.0),
            new_contributors: Some(12.0),
            issues_new: Some(40.0),
            prs_new: Some(60.0),
            issue_response_time_h: Some(10.0),
            pr_response_time_h: Some(8.0),
            issue_resolution_duration_h: Some(100.0),
            pr_resolution_duration_h: Some(60.0),
            issue_age_h: Some(400.0),
            pr_age_h: Some(200.0),
            bus_factor: Some(4.0),
            hhi: Some(0.15),
            retention_rate: Some(0.7),
            github_health_percentage: Some(85.0),
            governance_files: Some(GovernanceFiles {
                readme: true,
                license: true,
                contributing: true,
                issue_template: true,
                ..GovernanceFiles::default()
            }),
            scorecard_score: Some(7.5),
            ..RepoMetrics::default()
        }
    }

    #[test]
    fn snapshot_has_all_dimensions_in_order() {
        let snapshot = compute_health_snapshot(&healthy(), &HealthWeights::default());
        let order = snapshot
            .dimensions
            .iter()
            .map(|entry| entry.dimension)
            .collect::<Vec<_>>();
        assert_eq!(order, Dimension::ALL.to_vec());
        assert!(snapshot.degraded_dimensions().is_empty());
        assert!((0.0..=100.0).contains(&snapshot.health_score()));
        assert_eq!(snapshot.date, NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date"));
    }

    #[test]
    fn snapshot_recomputation_is_bit_identical() {
        let metrics = healthy();
        let first = compute_health_snapshot(&metrics, &HealthWeights::default());
        let second = compute_health_snapshot(&metrics, &HealthWeights::default());
        assert_eq!(first, second);
        assert_eq!(
            first.health_score().to_bits(),
            second.health_score().to_bits()
        );
    }

    #[test]
    fn empty_metrics_degrade_without_panicking() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
        let snapshot =
            compute_health_snapshot_on(&RepoMetrics::default(), &HealthWeights::default(), date);
        let degraded = snapshot.degraded_dimensions();
        assert_eq!(degraded.len(), 5);
        // governance (20) and security (60) still contribute via fallbacks
        let expected = (0.15 * 20.0 + 0.10 * 60.0) / 0.25;
        assert!((snapshot.health_score() - expected).abs() < 1e-9);
    }

    #[test]
    fn evidence_carries_as_of_date() {
        let snapshot = compute_health_snapshot(&healthy(), &HealthWeights::default());
        let vitality = snapshot
            .dimension(Dimension::Vitality)
            .expect("vitality should be present");
        assert!(vitality
            .evidence
            .iter()
            .all(|item| item.as_of == NaiveDate::from_ymd_opt(2024, 6, 1)));
    }
}
