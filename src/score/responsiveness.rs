use crate::normalize::{
    reweighted_average, ISSUE_AGE, ISSUE_CLOSE, ISSUE_FIRST_RESPONSE, PR_AGE, PR_CLOSE,
    PR_FIRST_RESPONSE,
};
use crate::score::evidence;
use crate::types::metrics::RepoMetrics;
use crate::types::scoring::{Dimension, DimensionScore, ScoreOutcome, SubScore};

pub const FALLBACK_SCORE: f64 = 50.0;

/// Issue/PR side weights, `ln(1 + new items)` each. With no new items on
/// either side every term drops out and the activity fallback decides.
fn side_weights(metrics: &RepoMetrics) -> (f64, f64) {
    (
        volume_weight(metrics.issues_new),
        volume_weight(metrics.prs_new),
    )
}

fn volume_weight(count: Option<f64>) -> f64 {
    count
        .filter(|c| c.is_finite() && *c > 0.0)
        .map(f64::ln_1p)
        .unwrap_or(0.0)
}

pub fn responsiveness_score(metrics: &RepoMetrics) -> DimensionScore {
    let (w_issue, w_pr) = side_weights(metrics);
    let first_response = reweighted_average(&[
        (ISSUE_FIRST_RESPONSE.score(metrics.issue_response_time_h), w_issue),
        (PR_FIRST_RESPONSE.score(metrics.pr_response_time_h), w_pr),
    ]);
    let closing = reweighted_average(&[
        (ISSUE_CLOSE.score(metrics.issue_resolution_duration_h), w_issue),
        (PR_CLOSE.score(metrics.pr_resolution_duration_h), w_pr),
    ]);
    let backlog = reweighted_average(&[
        (ISSUE_AGE.score(metrics.issue_age_h), w_issue),
        (PR_AGE.score(metrics.pr_age_h), w_pr),
    ]);

    let outcome = match reweighted_average(&[
        (first_response, 0.45),
        (closing, 0.35),
        (backlog, 0.20),
    ]) {
        Some(score) => ScoreOutcome::computed(score),
        None if metrics.activity.map(|a| a > 0.0).unwrap_or(false) => {
            tracing::warn!(repo = %metrics.repo, "no response data; using activity fallback");
            ScoreOutcome::degraded(
                FALLBACK_SCORE,
                "no response-time data for an active repository",
            )
        }
        None => ScoreOutcome::unavailable("no response-time data and no activity"),
    };
    tracing::debug!(repo = %metrics.repo, score = ?outcome.score(), "responsiveness computed");

    DimensionScore {
        dimension: Dimension::Responsiveness,
        outcome,
        sub_scores: vec![
            SubScore::new("first_response", first_response),
            SubScore::new("closing", closing),
            SubScore::new("backlog", backlog),
        ],
        evidence: evidence(
            metrics,
            &[
                ("issues_new", metrics.issues_new),
                ("prs_new", metrics.prs_new),
                ("issue_response_time_h", metrics.issue_response_time_h),
                ("pr_response_time_h", metrics.pr_response_time_h),
                ("issue_resolution_duration_h", metrics.issue_resolution_duration_h),
                ("pr_resolution_duration_h", metrics.pr_resolution_duration_h),
                ("issue_age_h", metrics.issue_age_h),
                ("pr_age_h", metrics.pr_age_h),
            ],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> RepoMetrics {
        RepoMetrics {
            repo: "acme/widget".to_string(),
            ..RepoMetrics::default()
        }
    }

    #[test]
    fn fast_responses_score_full_marks() {
        let metrics = RepoMetrics {
            issues_new: Some(10.0),
            prs_new: Some(5.0),
            issue_response_time_h: Some(2.0),
            pr_response_time_h: Some(1.0),
            issue_resolution_duration_h: Some(24.0),
            pr_resolution_duration_h: Some(24.0),
            issue_age_h: Some(100.0),
            pr_age_h: Some(100.0),
            ..base()
        };
        let scored = responsiveness_score(&metrics);
        assert_eq!(scored.outcome, ScoreOutcome::computed(100.0));
    }

    #[test]
    fn zero_volume_drops_response_terms() {
        let metrics = RepoMetrics {
            issues_new: Some(0.0),
            prs_new: Some(0.0),
            issue_response_time_h: Some(24.0),
            pr_response_time_h: Some(120.0),
            ..base()
        };
        let scored = responsiveness_score(&metrics);
        assert_eq!(scored.sub_score("first_response"), None);
        assert!(matches!(scored.outcome, ScoreOutcome::Unavailable { .. }));

        let active = RepoMetrics {
            activity: Some(3.0),
            ..metrics
        };
        let scored = responsiveness_score(&active);
        assert!(matches!(scored.outcome, ScoreOutcome::Degraded { .. }));
        assert_eq!(scored.score(), Some(FALLBACK_SCORE));
    }

    #[test]
    fn busier_side_dominates() {
        let metrics = RepoMetrics {
            issues_new: Some(100.0),
            prs_new: Some(0.0),
            issue_response_time_h: Some(24.0),
            pr_response_time_h: Some(120.0),
            ..base()
        };
        let scored = responsiveness_score(&metrics);
        assert_eq!(scored.sub_score("first_response"), Some(100.0));
    }

    #[test]
    fn active_repo_without_response_data_degrades_to_fifty() {
        let metrics = RepoMetrics {
            activity: Some(4.2),
            ..base()
        };
        let scored = responsiveness_score(&metrics);
        assert!(matches!(scored.outcome, ScoreOutcome::Degraded { .. }));
        assert_eq!(scored.score(), Some(FALLBACK_SCORE));
    }

    #[test]
    fn inactive_repo_without_response_data_is_unavailable() {
        let scored = responsiveness_score(&base());
        assert_eq!(scored.score(), None);
    }
}
