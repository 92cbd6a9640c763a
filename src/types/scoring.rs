use crate::normalize::clamp_score;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type Score = f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Vitality,
    Responsiveness,
    Resilience,
    Governance,
    Security,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Vitality,
        Dimension::Responsiveness,
        Dimension::Resilience,
        Dimension::Governance,
        Dimension::Security,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vitality => "vitality",
            Self::Responsiveness => "responsiveness",
            Self::Resilience => "resilience",
            Self::Governance => "governance",
            Self::Security => "security",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a dimension score came to be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScoreOutcome {
    Computed { score: Score },
    Degraded { score: Score, reason: String },
    Unavailable { reason: String },
}

impl ScoreOutcome {
    pub fn computed(score: Score) -> Self {
        Self::Computed {
            score: clamp_score(score),
        }
    }

    pub fn degraded(score: Score, reason: impl Into<String>) -> Self {
        Self::Degraded {
            score: clamp_score(score),
            reason: reason.into(),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn score(&self) -> Option<Score> {
        match self {
            Self::Computed { score } | Self::Degraded { score, .. } => Some(*score),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        !matches!(self, Self::Computed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubScore {
    pub name: String,
    pub score: Option<Score>,
}

impl SubScore {
    pub fn new(name: &str, score: Option<Score>) -> Self {
        Self {
            name: name.to_string(),
            score: score.map(clamp_score),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub key: String,
    pub value: Option<f64>,
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub dimension: Dimension,
    pub outcome: ScoreOutcome,
    pub sub_scores: Vec<SubScore>,
    pub evidence: Vec<EvidenceItem>,
}

impl DimensionScore {
    pub fn score(&self) -> Option<Score> {
        self.outcome.score()
    }

    pub fn sub_score(&self, name: &str) -> Option<Score> {
        self.sub_scores
            .iter()
            .find(|sub| sub.name == name)
            .and_then(|sub| sub.score)
    }
}

/// Composite weights in dimension order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthWeights {
    pub vitality: f64,
    pub responsiveness: f64,
    pub resilience: f64,
    pub governance: f64,
    pub security: f64,
}

impl Default for HealthWeights {
    fn default() -> Self {
        Self {
            vitality: 0.30,
            responsiveness: 0.25,
            resilience: 0.20,
            governance: 0.15,
            security: 0.10,
        }
    }
}

impl HealthWeights {
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.vitality,
            self.responsiveness,
            self.resilience,
            self.governance,
            self.security,
        ]
    }

    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub vitality: Option<Score>,
    pub responsiveness: Option<Score>,
    pub resilience: Option<Score>,
    pub governance: Option<Score>,
    pub security: Option<Score>,
    pub overall: Score,
}

impl ScoreCard {
    pub fn new(
        vitality: Option<Score>,
        responsiveness: Option<Score>,
        resilience: Option<Score>,
        governance: Option<Score>,
        security: Option<Score>,
    ) -> Self {
        Self {
            vitality,
            responsiveness,
            resilience,
            governance,
            security,
            overall: 0.0,
        }
    }

    /// Weighted composite over the available dimensions, clamped to 0–100.
    pub fn finalize(mut self, weights: &HealthWeights) -> Self {
        let scores = [
            self.vitality,
            self.responsiveness,
            self.resilience,
            self.governance,
            self.security,
        ];
        let mut acc = 0.0;
        let mut total = 0.0;
        for (score, weight) in scores.iter().zip(weights.as_array()) {
            if let Some(score) = score {
                acc += score * weight;
                total += weight;
            }
        }
        self.overall = if total > 0.0 {
            clamp_score(acc / total)
        } else {
            0.0
        };
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub repo: String,
    pub date: NaiveDate,
    pub dimensions: Vec<DimensionScore>,
    pub scores: ScoreCard,
}

impl HealthSnapshot {
    pub fn health_score(&self) -> Score {
        self.scores.overall
    }

    pub fn dimension(&self, dimension: Dimension) -> Option<&DimensionScore> {
        self.dimensions
            .iter()
            .find(|entry| entry.dimension == dimension)
    }

    pub fn degraded_dimensions(&self) -> Vec<Dimension> {
        self.dimensions
            .iter()
            .filter(|entry| entry.outcome.is_degraded())
            .map(|entry| entry.dimension)
            .collect()
    }
}
