use crate::newcomer::NewcomerRequest;
use crate::types::catalog::CatalogEntry;
use crate::types::config::NewcomerLimits;
use crate::types::report::MatchTier;

/// A catalog row that survived recall, with its position in the catalog.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub entry: &'a CatalogEntry,
    pub catalog_index: usize,
    pub tier: MatchTier,
}

/// Case-insensitive containment in either direction against any tag.
pub fn tag_hit(values: &[String], target: &str) -> bool {
    let target = target.trim().to_lowercase();
    if target.is_empty() {
        return false;
    }
    values.iter().any(|value| {
        let value = value.trim().to_lowercase();
        !value.is_empty() && (value.contains(&target) || target.contains(&value))
    })
}

/// Any user keyword appearing in the tags or description.
pub fn keyword_hit(entry: &CatalogEntry, keywords: &[String]) -> bool {
    if keywords.is_empty() {
        return false;
    }
    let text = format!(
        "{} {}",
        entry.tags.join(" "),
        entry.description.as_deref().unwrap_or_default()
    )
    .to_lowercase();
    keywords.iter().any(|keyword| text.contains(keyword.as_str()))
}

fn constraint_hit(values: &[String], target: &str) -> bool {
    target.trim().is_empty() || tag_hit(values, target)
}

fn strict_match(entry: &CatalogEntry, request: &NewcomerRequest) -> bool {
    entry.is_matchable()
        && constraint_hit(&entry.domains, &request.domain)
        && constraint_hit(&entry.stacks, &request.stack)
        && (request.keywords.is_empty() || keyword_hit(entry, &request.keywords))
}

fn relaxed_match(entry: &CatalogEntry, request: &NewcomerRequest) -> bool {
    entry.is_matchable()
        && (tag_hit(&entry.domains, &request.domain)
            || tag_hit(&entry.stacks, &request.stack)
            || keyword_hit(entry, &request.keywords))
}

/// Strict matches first; relaxed matches and then filler rows top the list
/// up whenever fewer than `min_matches` candidates were found.
pub fn recall<'a>(
    catalog: &'a [CatalogEntry],
    request: &NewcomerRequest,
    limits: &NewcomerLimits,
) -> Vec<Candidate<'a>> {
    let scanned = &catalog[..catalog.len().min(limits.scan_limit)];
    let mut taken = vec![false; scanned.len()];
    let mut candidates = Vec::new();

    for (index, entry) in scanned.iter().enumerate() {
        if candidates.len() >= limits.recall_limit {
            break;
        }
        if strict_match(entry, request) {
            taken[index] = true;
            candidates.push(Candidate {
                entry,
                catalog_index: index,
                tier: MatchTier::Strict,
            });
        }
    }
    let strict = candidates.len();

    if candidates.len() < limits.min_matches {
        for (index, entry) in scanned.iter().enumerate() {
            if candidates.len() >= limits.recall_limit {
                break;
            }
            if !taken[index] && relaxed_match(entry, request) {
                taken[index] = true;
                candidates.push(Candidate {
                    entry,
                    catalog_index: index,
                    tier: MatchTier::Relaxed,
                });
            }
        }
    }
    let relaxed = candidates.len() - strict;

    if candidates.len() < limits.min_matches {
        for (index, entry) in scanned.iter().enumerate() {
            if candidates.len() >= limits.recall_limit {
                break;
            }
            if !taken[index] {
                taken[index] = true;
                candidates.push(Candidate {
                    entry,
                    catalog_index: index,
                    tier: MatchTier::Filler,
                });
            }
        }
    }

    tracing::debug!(
        scanned = scanned.len(),
        strict,
        relaxed,
        filler = candidates.len() - strict - relaxed,
        "recall finished"
    );
    candidates
}
