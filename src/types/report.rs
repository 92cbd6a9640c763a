use crate::types::catalog::IssueCategory;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Strict,
    Relaxed,
    Filler,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn harder(self) -> Self {
        match self {
            Self::Easy => Self::Medium,
            Self::Medium | Self::Hard => Self::Hard,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueStats {
    pub good_first: u32,
    pub help_wanted: u32,
    pub docs: u32,
    pub i18n: u32,
    pub freshness_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRepo {
    pub repo: String,
    pub url: String,
    pub tier: MatchTier,
    pub fit_score: f64,
    pub readiness_score: f64,
    pub match_score: f64,
    pub difficulty: Difficulty,
    pub reasons: Vec<String>,
    pub stats: IssueStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardItem {
    pub number: u64,
    pub title: String,
    pub url: Option<String>,
    pub category: IssueCategory,
    pub labels: Vec<String>,
    pub freshness: f64,
    pub task_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueBoard {
    pub good_first_issue: Vec<BoardItem>,
    pub help_wanted: Vec<BoardItem>,
}

impl IssueBoard {
    pub fn is_empty(&self) -> bool {
        self.good_first_issue.is_empty() && self.help_wanted.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Focus {
    Setup,
    Documentation,
    Code,
    Review,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineWeek {
    pub week: u8,
    pub focus: Focus,
    pub tasks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub domain: String,
    pub stack: String,
    pub keywords: Vec<String>,
    pub hours_per_week: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub profile: Profile,
    pub recommended: Vec<ScoredRepo>,
    pub issue_board: IssueBoard,
    pub timeline: Vec<TimelineWeek>,
    pub checklist: String,
}

impl RecommendationResult {
    pub fn empty(profile: Profile) -> Self {
        Self {
            profile,
            recommended: Vec::new(),
            issue_board: IssueBoard::default(),
            timeline: Vec::new(),
            checklist: String::new(),
        }
    }

    pub fn top(&self) -> Option<&ScoredRepo> {
        self.recommended.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskIssue {
    pub number: u64,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStep {
    pub title: String,
    pub commands: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Step-by-step plan for working one issue of one repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskBundle {
    pub repo: String,
    pub issue: Option<TaskIssue>,
    pub steps: Vec<TaskStep>,
    pub checklist: String,
}
