use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    GoodFirst,
    HelpWanted,
    Docs,
    I18n,
}

impl IssueCategory {
    /// Priority used by the issue task score.
    pub fn label_priority(self) -> f64 {
        match self {
            Self::GoodFirst => 1.0,
            Self::Docs => 0.8,
            Self::HelpWanted => 0.7,
            Self::I18n => 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    pub category: IssueCategory,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnboardingDocs {
    pub readme: bool,
    pub contributing: bool,
    pub pr_template: bool,
    /// Commands pulled out of the docs, keyed by stage (`setup`, `build`, `test`).
    pub extracted: BTreeMap<String, Vec<String>>,
}

impl OnboardingDocs {
    pub const COMMAND_STAGES: [&'static str; 4] = ["setup", "build", "test", "commands"];

    pub fn has_extracted_commands(&self) -> bool {
        Self::COMMAND_STAGES.iter().any(|stage| {
            self.extracted
                .get(*stage)
                .map(|commands| !commands.is_empty())
                .unwrap_or(false)
        })
    }

    pub fn commands(&self, stage: &str) -> Option<&[String]> {
        self.extracted
            .get(stage)
            .filter(|commands| !commands.is_empty())
            .map(Vec::as_slice)
    }
}

/// Latest readiness-relevant metrics of a catalog repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessInputs {
    pub issue_response_time_h: Option<f64>,
    pub pr_response_time_h: Option<f64>,
    pub issue_age_h: Option<f64>,
    pub pr_age_h: Option<f64>,
    pub activity_3m: Option<f64>,
    pub activity_growth: Option<f64>,
    pub new_contributors: Option<f64>,
    pub issues: Vec<IssueRecord>,
    pub docs: OnboardingDocs,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogEntry {
    pub repo: String,
    pub url: Option<String>,
    pub domains: Vec<String>,
    pub stacks: Vec<String>,
    pub tags: Vec<String>,
    pub description: Option<String>,
    pub readiness: ReadinessInputs,
}

impl CatalogEntry {
    /// Rows without an identifier or without any domain/stack tag cannot match.
    pub fn is_matchable(&self) -> bool {
        !self.repo.trim().is_empty() && !(self.domains.is_empty() && self.stacks.is_empty())
    }

    pub fn url(&self) -> String {
        self.url
            .clone()
            .unwrap_or_else(|| format!("https://github.com/{}", self.repo))
    }
}
