use crate::newcomer::recall::{tag_hit, Candidate};
use crate::newcomer::{NewcomerRequest, ReferenceTables};
use crate::normalize::{clamp_score, clamp_unit, norm_hi, norm_lo, reweighted_average};
use crate::types::catalog::{
    CatalogEntry, IssueCategory, IssueRecord, OnboardingDocs, ReadinessInputs,
};
use crate::types::report::{Difficulty, IssueStats, ScoredRepo};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

pub const DEFAULT_FRESHNESS: f64 = 0.6;
const FRESHNESS_DECAY_DAYS: f64 = 30.0;
const MAX_REASONS: usize = 5;

pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Share of the user's keywords found among the repo's tag and description tokens.
pub fn keyword_overlap(keywords: &[String], entry: &CatalogEntry) -> f64 {
    let wanted = keywords
        .iter()
        .map(|keyword| keyword.to_lowercase())
        .filter(|keyword| !keyword.is_empty())
        .collect::<BTreeSet<_>>();
    if wanted.is_empty() {
        return 0.0;
    }
    let mut tokens = tokenize(&entry.tags.join(" "))
        .into_iter()
        .collect::<BTreeSet<_>>();
    tokens.extend(tokenize(entry.description.as_deref().unwrap_or_default()));
    let overlap = wanted.intersection(&tokens).count();
    clamp_unit(overlap as f64 / wanted.len() as f64)
}

pub fn fit_score(entry: &CatalogEntry, request: &NewcomerRequest) -> f64 {
    let domain_hit = if tag_hit(&entry.domains, &request.domain) { 1.0 } else { 0.0 };
    let stack_hit = if tag_hit(&entry.stacks, &request.stack) { 1.0 } else { 0.0 };
    let overlap = keyword_overlap(&request.keywords, entry);
    clamp_score(40.0 * domain_hit + 35.0 * stack_hit + 25.0 * overlap)
}

/// `exp(-days / 30)` since the last update; undated issues get the default.
pub fn freshness(updated_at: Option<DateTime<Utc>>, as_of: DateTime<Utc>) -> f64 {
    let Some(updated_at) = updated_at else {
        return DEFAULT_FRESHNESS;
    };
    let days = (as_of - updated_at).num_days().max(0) as f64;
    clamp_unit((-days / FRESHNESS_DECAY_DAYS).exp())
}

/// Per-category issue counts with the default freshness factor.
pub fn issue_counts(issues: &[IssueRecord]) -> IssueStats {
    let mut stats = IssueStats {
        freshness_factor: DEFAULT_FRESHNESS,
        ..IssueStats::default()
    };
    for issue in issues {
        match issue.category {
            IssueCategory::GoodFirst => stats.good_first += 1,
            IssueCategory::HelpWanted => stats.help_wanted += 1,
            IssueCategory::Docs => stats.docs += 1,
            IssueCategory::I18n => stats.i18n += 1,
        }
    }
    stats
}

/// Issue counts plus the freshest issue's decay factor.
pub fn issue_stats(readiness: &ReadinessInputs, as_of: DateTime<Utc>) -> IssueStats {
    let mut stats = issue_counts(&readiness.issues);
    for issue in &readiness.issues {
        stats.freshness_factor = stats
            .freshness_factor
            .max(freshness(issue.updated_at, as_of));
    }
    stats
}

/// `ln(1 + S)` with `S = 2*good_first + 1.5*help_wanted + docs + i18n`.
pub fn supply_value(stats: &IssueStats) -> f64 {
    let raw = 2.0 * f64::from(stats.good_first)
        + 1.5 * f64::from(stats.help_wanted)
        + f64::from(stats.docs)
        + f64::from(stats.i18n);
    raw.ln_1p()
}

pub fn onboarding_score(docs: &OnboardingDocs) -> f64 {
    let mut score = 0.0;
    if docs.readme {
        score += 30.0;
    }
    if docs.contributing {
        score += 40.0;
    }
    if docs.pr_template {
        score += 15.0;
    }
    if docs.has_extracted_commands() {
        score += 15.0;
    }
    f64::min(score, 100.0)
}

pub fn readiness_score(
    inputs: &ReadinessInputs,
    stats: &IssueStats,
    references: &ReferenceTables,
) -> f64 {
    let responsiveness_ref = references.responsiveness.as_ref();
    let responsiveness = reweighted_average(&[
        (norm_lo(inputs.issue_response_time_h, responsiveness_ref), 0.40),
        (norm_lo(inputs.pr_response_time_h, responsiveness_ref), 0.30),
        (norm_lo(inputs.issue_age_h, responsiveness_ref), 0.20),
        (norm_lo(inputs.pr_age_h, responsiveness_ref), 0.10),
    ]);

    let activity_ref = references.activity.as_ref();
    let activity = reweighted_average(&[
        (norm_hi(inputs.activity_3m, activity_ref), 0.45),
        (norm_hi(inputs.activity_growth, activity_ref), 0.30),
        (norm_hi(inputs.new_contributors, activity_ref), 0.25),
    ]);

    let supply_norm =
        norm_hi(Some(supply_value(stats)), references.supply.as_ref()).unwrap_or(0.0);
    let supply = supply_norm * stats.freshness_factor.clamp(DEFAULT_FRESHNESS, 1.0);

    let onboarding = onboarding_score(&inputs.docs);

    reweighted_average(&[
        (responsiveness, 0.35),
        (activity, 0.20),
        (Some(supply), 0.25),
        (Some(onboarding), 0.20),
    ])
    .map(clamp_score)
    .unwrap_or(0.0)
}

pub fn difficulty(readiness: f64, hours_per_week: f64, low_budget_hours: f64) -> Difficulty {
    let label = if readiness > 75.0 {
        Difficulty::Easy
    } else if readiness > 55.0 {
        Difficulty::Medium
    } else {
        Difficulty::Hard
    };
    if hours_per_week < low_budget_hours {
        label.harder()
    } else {
        label
    }
}

pub fn build_reasons(
    inputs: &ReadinessInputs,
    stats: &IssueStats,
    fit: f64,
    readiness: f64,
) -> Vec<String> {
    let mut reasons = vec![format!("interest fit {:.0}% on domain, stack and keywords", fit)];
    if let Some(hours) = inputs.issue_response_time_h {
        reasons.push(format!("issues get a first response in about {:.0}h", hours));
    }
    if stats.good_first > 0 {
        reasons.push(format!("{} good first issues open", stats.good_first));
    }
    if stats.docs > 0 {
        reasons.push(format!("{} documentation tasks open", stats.docs));
    }
    if readiness > 0.0 {
        reasons.push(format!("newcomer readiness {:.0}%", readiness));
    }
    reasons.truncate(MAX_REASONS);
    reasons
}

/// `0.5*label + 0.3*freshness + 0.2*readiness/100`.
pub fn issue_task_score(category: IssueCategory, freshness: f64, readiness: f64) -> f64 {
    0.5 * category.label_priority() + 0.3 * freshness + 0.2 * (readiness / 100.0)
}

pub fn score_candidate(
    candidate: &Candidate<'_>,
    request: &NewcomerRequest,
    references: &ReferenceTables,
    low_budget_hours: f64,
    as_of: DateTime<Utc>,
) -> ScoredRepo {
    let entry = candidate.entry;
    let stats = issue_stats(&entry.readiness, as_of);
    let fit = fit_score(entry, request);
    let readiness = readiness_score(&entry.readiness, &stats, references);
    ScoredRepo {
        repo: entry.repo.clone(),
        url: entry.url(),
        tier: candidate.tier,
        fit_score: fit,
        readiness_score: readiness,
        match_score: 0.55 * fit + 0.45 * readiness,
        difficulty: difficulty(
            readiness,
            request.time_budget.hours_per_week,
            low_budget_hours,
        ),
        reasons: build_reasons(&entry.readiness, &stats, fit, readiness),
        stats,
    }
}

/// Match score, then readiness, both descending; catalog order breaks ties.
pub fn rank(scored: &mut [(usize, ScoredRepo)]) {
    scored.sort_by(|(left_index, left), (right_index, right)| {
        right
            .match_score
            .total_cmp(&left.match_score)
            .then_with(|| right.readiness_score.total_cmp(&left.readiness_score))
            .then_with(|| left_index.cmp(right_index))
    });
}
