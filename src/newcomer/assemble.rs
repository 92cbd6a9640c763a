use crate::newcomer::scoring::{freshness, issue_task_score};
use crate::newcomer::NewcomerRequest;
use crate::types::catalog::{CatalogEntry, IssueCategory, IssueRecord};
use crate::types::report::{BoardItem, Focus, IssueBoard, ScoredRepo, TimelineWeek};
use chrono::{DateTime, Utc};

pub const BOARD_BUCKET_LIMIT: usize = 20;
const TIMELINE_TOTAL_HOURS: f64 = 12.0;
const MAX_WEEKS: usize = 4;

pub fn issue_board(entry: &CatalogEntry, readiness: f64, as_of: DateTime<Utc>) -> IssueBoard {
    IssueBoard {
        good_first_issue: bucket(&entry.readiness.issues, IssueCategory::GoodFirst, readiness, as_of),
        help_wanted: bucket(&entry.readiness.issues, IssueCategory::HelpWanted, readiness, as_of),
    }
}

fn bucket(
    issues: &[IssueRecord],
    category: IssueCategory,
    readiness: f64,
    as_of: DateTime<Utc>,
) -> Vec<BoardItem> {
    let mut items = issues
        .iter()
        .filter(|issue| issue.category == category)
        .map(|issue| {
            let freshness = freshness(issue.updated_at, as_of);
            BoardItem {
                number: issue.number,
                title: issue.title.clone(),
                url: issue.url.clone(),
                category: issue.category,
                labels: issue.labels.clone(),
                freshness,
                task_score: issue_task_score(issue.category, freshness, readiness),
            }
        })
        .collect::<Vec<_>>();
    items.sort_by(|left, right| {
        right
            .freshness
            .total_cmp(&left.freshness)
            .then_with(|| right.task_score.total_cmp(&left.task_score))
            .then_with(|| left.number.cmp(&right.number))
    });
    items.truncate(BOARD_BUCKET_LIMIT);
    items
}

/// `clamp(ceil(12 / hours), 1, 4)` weeks.
pub fn timeline_weeks(hours_per_week: f64) -> usize {
    if !(hours_per_week > 0.0) {
        return MAX_WEEKS;
    }
    let weeks = (TIMELINE_TOTAL_HOURS / hours_per_week).ceil();
    (weeks as usize).clamp(1, MAX_WEEKS)
}

fn focus_plan(weeks: usize, low_budget: bool) -> Vec<Focus> {
    use Focus::*;
    let plan: &[Focus] = match (low_budget, weeks) {
        (true, 1) => &[Documentation],
        (true, 2) => &[Setup, Documentation],
        (true, 3) => &[Setup, Documentation, Code],
        (true, _) => &[Setup, Documentation, Documentation, Code],
        (false, 1) => &[Code],
        (false, 2) => &[Setup, Code],
        (false, 3) => &[Setup, Code, Review],
        (false, _) => &[Setup, Code, Code, Review],
    };
    plan.to_vec()
}

pub fn timeline(
    entry: &CatalogEntry,
    board: &IssueBoard,
    request: &NewcomerRequest,
    low_budget_hours: f64,
) -> Vec<TimelineWeek> {
    let hours = request.time_budget.hours_per_week;
    let weeks = timeline_weeks(hours);
    let low_budget = hours < low_budget_hours;
    let mut code_issues = board
        .good_first_issue
        .iter()
        .chain(board.help_wanted.iter());
    let mut docs_issues = entry
        .readiness
        .issues
        .iter()
        .filter(|issue| matches!(issue.category, IssueCategory::Docs | IssueCategory::I18n));

    focus_plan(weeks, low_budget)
        .into_iter()
        .enumerate()
        .map(|(index, focus)| {
            let tasks = match focus {
                Focus::Setup => {
                    let mut tasks = vec![
                        format!("Fork and clone {}", entry.repo),
                        "Run the setup and test commands from the checklist".to_string(),
                    ];
                    if entry.readiness.docs.contributing {
                        tasks.push("Read CONTRIBUTING and the code of conduct".to_string());
                    }
                    tasks
                }
                Focus::Documentation => match docs_issues.next() {
                    Some(issue) => vec![
                        format!("Pick up #{}: {}", issue.number, issue.title),
                        "Open a small documentation PR".to_string(),
                    ],
                    None => vec![
                        "Fix an unclear step found while setting up".to_string(),
                        "Open a small documentation PR".to_string(),
                    ],
                },
                Focus::Code => match code_issues.next() {
                    Some(item) => vec![
                        format!("Comment on #{} to claim it: {}", item.number, item.title),
                        "Implement the change with a test and open a PR".to_string(),
                    ],
                    None => vec![
                        "Ask maintainers for a starter issue".to_string(),
                        "Implement the change with a test and open a PR".to_string(),
                    ],
                },
                Focus::Review => vec![
                    "Address review feedback until the PR merges".to_string(),
                    "Review another newcomer PR".to_string(),
                ],
            };
            TimelineWeek {
                week: (index + 1) as u8,
                focus,
                tasks,
            }
        })
        .collect()
}

fn stack_template(stacks: &[String], requested: &str, stage: &str) -> Vec<String> {
    let haystack = format!("{} {}", requested, stacks.join(" ")).to_lowercase();
    let commands: &[&str] = if haystack.contains("rust") {
        match stage {
            "setup" => &["cargo fetch"],
            "build" => &["cargo build"],
            _ => &["cargo test"],
        }
    } else if haystack.contains("python") {
        match stage {
            "setup" => &[
                "python -m venv .venv",
                "source .venv/bin/activate",
                "pip install -r requirements.txt",
            ],
            "build" => &[],
            _ => &["pytest"],
        }
    } else if haystack.split_whitespace().any(|tag| tag == "go" || tag == "golang") {
        match stage {
            "setup" => &["go mod download"],
            "build" => &["go build ./..."],
            _ => &["go test ./..."],
        }
    } else {
        match stage {
            "setup" => &["npm install"],
            "build" => &["npm run build"],
            _ => &["npm test"],
        }
    };
    commands.iter().map(|command| command.to_string()).collect()
}

fn stage_commands(entry: &CatalogEntry, request: &NewcomerRequest, stage: &str) -> Vec<String> {
    entry
        .readiness
        .docs
        .commands(stage)
        .map(<[String]>::to_vec)
        .unwrap_or_else(|| stack_template(&entry.stacks, &request.stack, stage))
}

/// Markdown checklist of concrete first-contribution steps for `top`.
pub fn checklist(entry: &CatalogEntry, top: &ScoredRepo, request: &NewcomerRequest) -> String {
    let note = if entry.readiness.docs.has_extracted_commands() {
        "commands extracted from the repository docs"
    } else {
        "generic commands for the stack; check the repository docs"
    };
    let mut build_and_test = stage_commands(entry, request, "build");
    build_and_test.extend(stage_commands(entry, request, "test"));

    let steps = [
        ("Fork", vec![format!("{}/fork", top.url)], None),
        ("Clone", vec![format!("git clone {}.git", top.url)], None),
        ("Setup", stage_commands(entry, request, "setup"), Some(note)),
        ("Build & Test", build_and_test, Some(note)),
        (
            "First PR",
            vec![
                "git checkout -b first-contribution".to_string(),
                "git commit -am \"<summary>\"".to_string(),
                "git push origin HEAD".to_string(),
                "Open a PR that links the issue and describe how you tested it".to_string(),
            ],
            None,
        ),
    ];

    let mut lines = vec![format!("## {} contribution checklist", top.repo), String::new()];
    for (title, commands, note) in steps {
        lines.push(format!("### {title}"));
        lines.extend(commands.into_iter().map(|command| format!("- [ ] {command}")));
        if let Some(note) = note {
            lines.push(format!("> {note}"));
        }
        lines.push(String::new());
    }
    lines.join("\n").trim_end().to_string()
}
