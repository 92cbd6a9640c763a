use crate::types::scoring::{Dimension, DimensionScore, HealthWeights, ScoreCard};

/// Builds the composite card from per-dimension results; unavailable
/// dimensions hand their weight to the others.
pub fn aggregate(dimensions: &[DimensionScore], weights: &HealthWeights) -> ScoreCard {
    let score_of = |dimension: Dimension| {
        dimensions
            .iter()
            .find(|entry| entry.dimension == dimension)
            .and_then(DimensionScore::score)
    };
    ScoreCard::new(
        score_of(Dimension::Vitality),
        score_of(Dimension::Responsiveness),
        score_of(Dimension::Resilience),
        score_of(Dimension::Governance),
        score_of(Dimension::Security),
    )
    .finalize(weights)
}
