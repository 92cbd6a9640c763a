//! Recall → score → assemble pipeline that matches first-time contributors
//! with catalog repositories.

pub mod assemble;
pub mod bundle;
pub mod recall;
pub mod scoring;

use crate::error::{PulseError, Result};
use crate::normalize::Percentiles;
use crate::types::catalog::CatalogEntry;
use crate::types::config::NewcomerLimits;
use crate::types::report::{Profile, RecommendationResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Weekly time a newcomer can spend, in hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeBudget {
    pub hours_per_week: f64,
}

impl TimeBudget {
    pub fn from_hours(hours_per_week: f64) -> Self {
        Self { hours_per_week }
    }

    /// Accepts `"5"`, `"5h"`, ranges such as `"1-2h"` (midpoint) and open
    /// bounds such as `"6h+"` (lower bound).
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = || PulseError::InvalidTimeBudget(raw.to_string());
        let cleaned = raw
            .trim()
            .to_ascii_lowercase()
            .trim_end_matches("/week")
            .trim_end_matches("/wk")
            .replace("hours", "")
            .replace("hrs", "")
            .replace('h', "")
            .replace(' ', "");
        let open_ended = cleaned.ends_with('+');
        let body = cleaned.trim_end_matches('+');
        let hours = match body.split_once('-') {
            Some(_) if open_ended => return Err(invalid()),
            Some((low, high)) => {
                let low = low.parse::<f64>().map_err(|_| invalid())?;
                let high = high.parse::<f64>().map_err(|_| invalid())?;
                if high < low {
                    return Err(invalid());
                }
                (low + high) / 2.0
            }
            None => body.parse::<f64>().map_err(|_| invalid())?,
        };
        if !hours.is_finite() || hours <= 0.0 {
            return Err(invalid());
        }
        Ok(Self::from_hours(hours))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewcomerRequest {
    pub domain: String,
    pub stack: String,
    pub keywords: Vec<String>,
    pub time_budget: TimeBudget,
}

impl NewcomerRequest {
    /// Keywords are split on whitespace and commas and lower-cased.
    pub fn new(domain: &str, stack: &str, keywords: &str, time_budget: TimeBudget) -> Self {
        let keywords = keywords
            .split(|c: char| c.is_whitespace() || c == ',')
            .map(|keyword| keyword.trim().to_lowercase())
            .filter(|keyword| !keyword.is_empty())
            .collect();
        Self {
            domain: domain.trim().to_string(),
            stack: stack.trim().to_string(),
            keywords,
            time_budget,
        }
    }

    fn profile(&self) -> Profile {
        Profile {
            domain: self.domain.clone(),
            stack: self.stack.clone(),
            keywords: self.keywords.clone(),
            hours_per_week: self.time_budget.hours_per_week,
        }
    }
}

/// Corpus-wide 10th/90th percentiles used by the readiness transforms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTables {
    pub responsiveness: Option<Percentiles>,
    pub activity: Option<Percentiles>,
    pub supply: Option<Percentiles>,
}

impl ReferenceTables {
    /// Pools every catalog row: response and age hours into one reference,
    /// activity inputs into another, and `ln(1 + S)` of rows with issues
    /// into the supply reference.
    pub fn from_catalog(catalog: &[CatalogEntry]) -> Self {
        let responsiveness = catalog.iter().flat_map(|entry| {
            let inputs = &entry.readiness;
            [
                inputs.issue_response_time_h,
                inputs.pr_response_time_h,
                inputs.issue_age_h,
                inputs.pr_age_h,
            ]
            .into_iter()
            .flatten()
        });
        let activity = catalog.iter().flat_map(|entry| {
            let inputs = &entry.readiness;
            [
                inputs.activity_3m,
                inputs.activity_growth,
                inputs.new_contributors,
            ]
            .into_iter()
            .flatten()
        });
        let supply = catalog
            .iter()
            .filter(|entry| !entry.readiness.issues.is_empty())
            .map(|entry| scoring::supply_value(&scoring::issue_counts(&entry.readiness.issues)));

        Self {
            responsiveness: Percentiles::from_values(responsiveness),
            activity: Percentiles::from_values(activity),
            supply: Percentiles::from_values(supply),
        }
    }
}

/// Ranks catalog repositories for a newcomer and assembles a starter plan
/// around the best one.
pub fn recommend_for_newcomer(
    catalog: &[CatalogEntry],
    references: &ReferenceTables,
    request: &NewcomerRequest,
    limits: &NewcomerLimits,
    as_of: DateTime<Utc>,
) -> RecommendationResult {
    let candidates = recall::recall(catalog, request, limits);
    if candidates.is_empty() {
        tracing::warn!(catalog = catalog.len(), "no newcomer candidates recalled");
        return RecommendationResult::empty(request.profile());
    }

    let mut scored = candidates
        .iter()
        .map(|candidate| {
            (
                candidate.catalog_index,
                scoring::score_candidate(
                    candidate,
                    request,
                    references,
                    limits.low_budget_hours,
                    as_of,
                ),
            )
        })
        .collect::<Vec<_>>();
    scoring::rank(&mut scored);
    scored.truncate(limits.return_limit);

    let mut result = RecommendationResult::empty(request.profile());
    if let Some((index, top)) = scored.first() {
        let entry = &catalog[*index];
        result.issue_board = assemble::issue_board(entry, top.readiness_score, as_of);
        result.timeline =
            assemble::timeline(entry, &result.issue_board, request, limits.low_budget_hours);
        result.checklist = assemble::checklist(entry, top, request);
    }
    result.recommended = scored.into_iter().map(|(_, repo)| repo).collect();

    tracing::info!(
        candidates = candidates.len(),
        returned = result.recommended.len(),
        top = result.top().map(|repo| repo.repo.as_str()).unwrap_or_default(),
        "newcomer recommendation assembled"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::catalog::{IssueCategory, IssueRecord, OnboardingDocs, ReadinessInputs};
    use crate::types::report::MatchTier;
    use chrono::TimeZone;

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn entry(repo: &str, domain: &str, stack: &str, response_h: f64, good_first: u64) -> CatalogEntry {
        CatalogEntry {
            repo: repo.to_string(),
            domains: vec![domain.to_string()],
            stacks: vec![stack.to_string()],
            readiness: ReadinessInputs {
                issue_response_time_h: Some(response_h),
                activity_3m: Some(100.0 / response_h),
                issues: (0..good_first)
                    .map(|number| IssueRecord {
                        number,
                        title: format!("starter {number}"),
                        url: None,
                        category: IssueCategory::GoodFirst,
                        labels: vec!["good first issue".to_string()],
                        updated_at: Some(as_of() - chrono::Duration::days(number as i64)),
                    })
                    .collect(),
                docs: OnboardingDocs {
                    readme: true,
                    ..OnboardingDocs::default()
                },
                ..ReadinessInputs::default()
            },
            ..CatalogEntry::default()
        }
    }

    #[test]
    fn time_budget_parses_common_forms() {
        assert_eq!(TimeBudget::parse("5").ok(), Some(TimeBudget::from_hours(5.0)));
        assert_eq!(TimeBudget::parse("3h").ok(), Some(TimeBudget::from_hours(3.0)));
        assert_eq!(TimeBudget::parse("1-2h").ok(), Some(TimeBudget::from_hours(1.5)));
        assert_eq!(TimeBudget::parse("3-5 hours").ok(), Some(TimeBudget::from_hours(4.0)));
        assert_eq!(TimeBudget::parse("6h+").ok(), Some(TimeBudget::from_hours(6.0)));
        for bad in ["", "soon", "0", "-3", "5-2h", "2-4+"] {
            assert!(
                matches!(TimeBudget::parse(bad), Err(PulseError::InvalidTimeBudget(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn request_splits_keywords() {
        let request = NewcomerRequest::new(" ml ", "python", "NLP, tokenizer  vision", TimeBudget::from_hours(4.0));
        assert_eq!(request.domain, "ml");
        assert_eq!(request.keywords, vec!["nlp", "tokenizer", "vision"]);
    }

    #[test]
    fn references_pool_whole_catalog() {
        let catalog = vec![
            entry("a/one", "ml", "python", 10.0, 1),
            entry("b/two", "web", "go", 110.0, 0),
        ];
        let references = ReferenceTables::from_catalog(&catalog);
        let responsiveness = references.responsiveness.expect("reference should exist");
        assert!((responsiveness.p10 - 20.0).abs() < 1e-9);
        assert!((responsiveness.p90 - 100.0).abs() < 1e-9);
        // only one row has issues, so the supply reference is degenerate
        let supply = references.supply.expect("reference should exist");
        assert_eq!(supply.p10, supply.p90);
    }

    #[test]
    fn recommendation_ranks_and_assembles_for_top_candidate() {
        let catalog = vec![
            entry("acme/slow", "ml", "python", 160.0, 0),
            entry("acme/fast", "ml", "python", 4.0, 3),
            entry("acme/web", "web", "ruby", 2.0, 5),
        ];
        let references = ReferenceTables::from_catalog(&catalog);
        let request = NewcomerRequest::new("ml", "python", "", TimeBudget::from_hours(2.0));
        let result = recommend_for_newcomer(
            &catalog,
            &references,
            &request,
            &NewcomerLimits::default(),
            as_of(),
        );

        let top = result.top().expect("a candidate should be returned");
        assert_eq!(top.repo, "acme/fast");
        assert_eq!(top.tier, MatchTier::Strict);
        assert_eq!(result.recommended.len(), 3);
        assert_eq!(result.recommended[2].tier, MatchTier::Filler);
        assert_eq!(result.issue_board.good_first_issue.len(), 3);
        assert_eq!(result.timeline.len(), 4);
        assert!(result.checklist.contains("acme/fast"));
        assert_eq!(result.profile.hours_per_week, 2.0);
    }

    #[test]
    fn recommendation_is_deterministic() {
        let catalog = (0..12)
            .map(|i| entry(&format!("acme/r{i}"), "ml", "python", 10.0 + (i % 3) as f64, i % 2))
            .collect::<Vec<_>>();
        let references = ReferenceTables::from_catalog(&catalog);
        let request = NewcomerRequest::new("ml", "python", "", TimeBudget::from_hours(5.0));
        let limits = NewcomerLimits::default();
        let first = recommend_for_newcomer(&catalog, &references, &request, &limits, as_of());
        let second = recommend_for_newcomer(&catalog, &references, &request, &limits, as_of());
        assert_eq!(first, second);
        assert_eq!(first.recommended.len(), limits.return_limit);
    }

    #[test]
    fn empty_catalog_yields_empty_result() {
        let request = NewcomerRequest::new("ml", "python", "", TimeBudget::from_hours(5.0));
        let result = recommend_for_newcomer(
            &[],
            &ReferenceTables::default(),
            &request,
            &NewcomerLimits::default(),
            as_of(),
        );
        assert!(result.recommended.is_empty());
        assert!(result.issue_board.is_empty());
        assert!(result.checklist.is_empty());
    }
}
