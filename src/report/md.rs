use crate::report::BatchRow;
use crate::trend::composite::RepoComposites;
use crate::trend::SeriesTrend;
use crate::types::report::{BoardItem, RecommendationResult};
use crate::types::scoring::{HealthSnapshot, ScoreOutcome};

fn fmt_opt(value: Option<f64>) -> String {
    value
        .map(|value| format!("{value:.2}"))
        .unwrap_or_else(|| "n/a".to_string())
}

pub fn health_markdown(snapshot: &HealthSnapshot) -> String {
    let mut output = String::new();
    output.push_str(&format!("# Health Report: {}\n\n", snapshot.repo));
    output.push_str(&format!("Date: {}\n\n", snapshot.date));
    output.push_str(&format!(
        "Health score: {:.2}\n\n",
        snapshot.health_score()
    ));

    output.push_str("## Dimensions\n\n");
    for dimension in &snapshot.dimensions {
        let status = match &dimension.outcome {
            ScoreOutcome::Computed { score } => format!("{score:.2}"),
            ScoreOutcome::Degraded { score, reason } => format!("{score:.2} (degraded: {reason})"),
            ScoreOutcome::Unavailable { reason } => format!("unavailable ({reason})"),
        };
        output.push_str(&format!("- {}: {}\n", dimension.dimension, status));
        for sub in &dimension.sub_scores {
            output.push_str(&format!("  - {}: {}\n", sub.name, fmt_opt(sub.score)));
        }
    }
    output.push('\n');

    let degraded = snapshot.degraded_dimensions();
    output.push_str("## Degraded\n\n");
    if degraded.is_empty() {
        output.push_str("- none\n");
    } else {
        for dimension in degraded {
            output.push_str(&format!("- {dimension}\n"));
        }
    }

    output
}

pub fn trend_markdown(trends: &[SeriesTrend]) -> String {
    let mut output = String::new();
    output.push_str("# Trend Report\n\n");
    if trends.is_empty() {
        output.push_str("- no series\n");
        return output;
    }

    for trend in trends {
        let derived = &trend.derived;
        output.push_str(&format!("## {} / {}\n\n", trend.repo, trend.metric));
        output.push_str(&format!("- points: {}\n", derived.points));
        output.push_str(&format!(
            "- slope: {} ({:?})\n",
            fmt_opt(derived.slope),
            derived.direction
        ));
        output.push_str(&format!(
            "- rolling 7d: mean {}, median {}\n",
            fmt_opt(derived.rolling.mean_7d),
            fmt_opt(derived.rolling.median_7d)
        ));
        output.push_str(&format!(
            "- rolling 30d: mean {}, median {}\n",
            fmt_opt(derived.rolling.mean_30d),
            fmt_opt(derived.rolling.median_30d)
        ));
        output.push_str(&format!(
            "- anomaly z-score: {}\n",
            fmt_opt(derived.anomaly_zscore)
        ));
        if let Some(ratio) = derived.response_ratio {
            output.push_str(&format!("- response ratio: {ratio:.2}\n"));
        }
        output.push_str(&format!(
            "- delta: {} ({}%)\n",
            fmt_opt(derived.delta),
            fmt_opt(derived.delta_pct)
        ));
        output.push_str(&format!("- volatility: {:.2}\n", derived.volatility));
        match (derived.normalized_with, trend.kind.recommended_window()) {
            (Some(window), _) => {
                output.push_str(&format!("- normalized over {} points\n", window.width()))
            }
            (None, Some(window)) => output.push_str(&format!(
                "- suggested normalization: --normalize {}\n",
                window.width()
            )),
            (None, None) => {}
        }
        if !derived.outliers.is_empty() {
            let indices = derived
                .outliers
                .iter()
                .map(|outlier| outlier.index.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            output.push_str(&format!("- outliers at: {indices}\n"));
        }
        output.push('\n');
    }

    output
}

pub fn composite_markdown(reports: &[RepoComposites]) -> String {
    let mut output = String::new();
    output.push_str("# Composite Report\n\n");
    if reports.is_empty() {
        output.push_str("- no series\n");
        return output;
    }

    for report in reports {
        output.push_str(&format!(
            "## {} (trailing {} days)\n\n",
            report.repo, report.window_days
        ));
        output.push_str("| composite | latest | delta | points |\n");
        output.push_str("|---|---|---|---|\n");
        for composite in &report.composites {
            output.push_str(&format!(
                "| {:?} | {} | {} | {} |\n",
                composite.kind,
                fmt_opt(composite.kpi.value),
                fmt_opt(composite.kpi.delta),
                composite.points.len()
            ));
        }
        output.push('\n');
        for composite in &report.composites {
            let components = composite
                .components_latest
                .iter()
                .filter(|component| component.raw.is_some())
                .map(|component| {
                    format!(
                        "{} {} -> {}",
                        component.metric,
                        fmt_opt(component.raw),
                        fmt_opt(component.score)
                    )
                })
                .collect::<Vec<_>>();
            if !components.is_empty() {
                output.push_str(&format!("- {:?}: {}\n", composite.kind, components.join("; ")));
            }
        }
        output.push('\n');
    }

    output
}

fn board_lines(output: &mut String, title: &str, items: &[BoardItem]) {
    output.push_str(&format!("### {title}\n\n"));
    if items.is_empty() {
        output.push_str("- none\n\n");
        return;
    }
    for item in items {
        let link = item
            .url
            .as_deref()
            .map(|url| format!(" ({url})"))
            .unwrap_or_default();
        output.push_str(&format!(
            "- #{} {}{} [freshness {:.2}, score {:.2}]\n",
            item.number, item.title, link, item.freshness, item.task_score
        ));
    }
    output.push('\n');
}

pub fn recommendation_markdown(result: &RecommendationResult) -> String {
    let mut output = String::new();
    output.push_str("# Newcomer Recommendations\n\n");
    output.push_str(&format!(
        "Profile: domain `{}`, stack `{}`, {:.1} h/week\n\n",
        result.profile.domain, result.profile.stack, result.profile.hours_per_week
    ));

    output.push_str("## Repositories\n\n");
    if result.recommended.is_empty() {
        output.push_str("- no matching repositories\n");
        return output;
    }
    for (rank, repo) in result.recommended.iter().enumerate() {
        output.push_str(&format!(
            "{}. [{}]({}) match {:.1} (fit {:.1}, readiness {:.1}, {:?}, {:?})\n",
            rank + 1,
            repo.repo,
            repo.url,
            repo.match_score,
            repo.fit_score,
            repo.readiness_score,
            repo.difficulty,
            repo.tier
        ));
        for reason in &repo.reasons {
            output.push_str(&format!("   - {reason}\n"));
        }
    }
    output.push('\n');

    output.push_str("## Issue Board\n\n");
    board_lines(&mut output, "Good first issues", &result.issue_board.good_first_issue);
    board_lines(&mut output, "Help wanted", &result.issue_board.help_wanted);

    output.push_str("## Timeline\n\n");
    for week in &result.timeline {
        output.push_str(&format!("- week {} ({:?})\n", week.week, week.focus));
        for task in &week.tasks {
            output.push_str(&format!("  - {task}\n"));
        }
    }
    output.push('\n');

    output.push_str(&result.checklist);
    if !result.checklist.ends_with('\n') {
        output.push('\n');
    }
    output
}

pub fn batch_markdown(rows: &[BatchRow]) -> String {
    let mut output = String::new();
    output.push_str("# Batch Health\n\n");
    output.push_str("| file | repo | health | degraded |\n");
    output.push_str("|---|---|---|---|\n");
    for row in rows {
        match &row.error {
            Some(error) => output.push_str(&format!("| {} | error | {} | |\n", row.path, error)),
            None => output.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                row.path,
                row.repo.as_deref().unwrap_or_default(),
                fmt_opt(row.health_score),
                row.degraded.join(", ")
            )),
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::compute_health_snapshot_on;
    use crate::trend::{trend_for_series, MetricKind, TrendOverrides};
    use crate::types::config::TrendDefaults;
    use crate::types::metrics::{MetricSeries, RepoMetrics};
    use crate::types::report::Profile;
    use crate::types::scoring::HealthWeights;
    use chrono::NaiveDate;

    #[test]
    fn health_markdown_lists_dimensions_and_degradations() {
        let metrics = RepoMetrics {
            repo: "acme/widget".to_string(),
            openrank: Some(20.0),
            ..RepoMetrics::default()
        };
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date");
        let snapshot = compute_health_snapshot_on(&metrics, &HealthWeights::default(), date);

        let rendered = health_markdown(&snapshot);
        assert!(rendered.contains("# Health Report: acme/widget"));
        assert!(rendered.contains("- vitality: "));
        assert!(rendered.contains("- security: 60.00 (degraded"));
        assert!(rendered.contains("- responsiveness: unavailable"));
    }

    #[test]
    fn trend_markdown_shows_response_ratio_only_when_present() {
        let mut series = MetricSeries::new("acme/widget", "issue_response_time_h");
        for (day, value) in [(1, 10.0), (2, 70.0), (3, 20.0)] {
            series
                .push(crate::types::metrics::MetricSample {
                    repo: "acme/widget".to_string(),
                    metric: "issue_response_time_h".to_string(),
                    date: NaiveDate::from_ymd_opt(2024, 5, day).expect("valid date"),
                    value,
                })
                .expect("sample should push");
        }
        let trend = trend_for_series(&series, &TrendDefaults::default(), &TrendOverrides::default());
        assert_eq!(trend.kind, MetricKind::Duration);

        let rendered = trend_markdown(&[trend]);
        assert!(rendered.contains("## acme/widget / issue_response_time_h"));
        assert!(rendered.contains("- response ratio: 0.67"));
    }

    #[test]
    fn composite_markdown_tabulates_kpis() {
        let mut series = MetricSeries::new("acme/widget", "bus_factor");
        for (day, value) in [(1, 2.0), (2, 5.0)] {
            series
                .push(crate::types::metrics::MetricSample {
                    repo: "acme/widget".to_string(),
                    metric: "bus_factor".to_string(),
                    date: NaiveDate::from_ymd_opt(2024, 5, day).expect("valid date"),
                    value,
                })
                .expect("sample should push");
        }
        let reports = crate::trend::composite::compute_repo_composites(&[series], 180);

        let rendered = composite_markdown(&reports);
        assert!(rendered.contains("## acme/widget (trailing 180 days)"));
        assert!(rendered.contains("| Resilience | 100.00 | 50.00 | 2 |"));
        assert!(rendered.contains("| Vitality | n/a | n/a | 0 |"));
        assert!(rendered.contains("- Resilience: bus_factor 5.00 -> 100.00"));
        assert!(composite_markdown(&[]).contains("- no series"));
    }

    #[test]
    fn empty_recommendation_says_so() {
        let result = RecommendationResult::empty(Profile {
            domain: "ml".to_string(),
            stack: "rust".to_string(),
            keywords: Vec::new(),
            hours_per_week: 3.0,
        });
        let rendered = recommendation_markdown(&result);
        assert!(rendered.contains("no matching repositories"));
        assert!(!rendered.contains("## Timeline"));
    }

    #[test]
    fn batch_markdown_reports_errors_inline() {
        let rows = vec![BatchRow::failed("bad.json".to_string(), "json error".to_string())];
        let rendered = batch_markdown(&rows);
        assert!(rendered.contains("| bad.json | error | json error | |"));
    }
}
