use crate::types::catalog::{CatalogEntry, IssueRecord};
use crate::types::report::{TaskBundle, TaskIssue, TaskStep};

const EXTRACTED_NOTE: &str = "commands extracted from the repository docs";
const GENERIC_NOTE: &str = "no commands found in the docs; generic steps shown";

/// Finds the issue named by `issue_ref` (`12`, `#12` or its URL), falling
/// back to the first listed issue.
pub fn select_issue<'a>(entry: &'a CatalogEntry, issue_ref: Option<&str>) -> Option<&'a IssueRecord> {
    let issues = &entry.readiness.issues;
    let wanted = issue_ref.map(str::trim).filter(|raw| !raw.is_empty());
    let matched = wanted.and_then(|raw| {
        let number = raw.trim_start_matches('#').parse::<u64>().ok();
        issues.iter().find(|issue| {
            Some(issue.number) == number
                || issue_url(entry, issue).trim_end_matches('/') == raw.trim_end_matches('/')
        })
    });
    if matched.is_none() {
        if let Some(raw) = wanted {
            tracing::debug!(repo = %entry.repo, issue = raw, "issue not listed, using first");
        }
    }
    matched.or_else(|| issues.first())
}

fn issue_url(entry: &CatalogEntry, issue: &IssueRecord) -> String {
    issue
        .url
        .clone()
        .unwrap_or_else(|| format!("{}/issues/{}", entry.url(), issue.number))
}

fn extracted_or(entry: &CatalogEntry, stage: &str, fallback: Option<&str>) -> Vec<String> {
    match entry.readiness.docs.commands(stage) {
        Some(commands) => commands.to_vec(),
        None => fallback.map(str::to_string).into_iter().collect(),
    }
}

/// Builds the setup, build, test and pull-request steps for one issue.
pub fn task_bundle(entry: &CatalogEntry, issue_ref: Option<&str>) -> TaskBundle {
    let issue = select_issue(entry, issue_ref).map(|issue| TaskIssue {
        number: issue.number,
        title: issue.title.clone(),
        url: issue_url(entry, issue),
    });
    let note = if entry.readiness.docs.has_extracted_commands() {
        EXTRACTED_NOTE
    } else {
        GENERIC_NOTE
    };
    let clone = format!("git clone https://github.com/{}.git", entry.repo);

    let (branch, summary, link) = match &issue {
        Some(issue) => (
            format!("fix-issue-{}", issue.number),
            issue.title.clone(),
            format!("Open a PR linked to issue #{}", issue.number),
        ),
        None => (
            "first-contribution".to_string(),
            "<summary>".to_string(),
            "Open a PR and describe how you tested it".to_string(),
        ),
    };

    let steps = vec![
        TaskStep {
            title: "Setup".to_string(),
            commands: extracted_or(entry, "setup", Some(clone.as_str())),
            note: Some(note.to_string()),
        },
        TaskStep {
            title: "Build".to_string(),
            commands: extracted_or(entry, "build", None),
            note: None,
        },
        TaskStep {
            title: "Test".to_string(),
            commands: extracted_or(
                entry,
                "test",
                Some("(optional) run the tests described in the repository docs"),
            ),
            note: None,
        },
        TaskStep {
            title: "Pull request".to_string(),
            commands: vec![
                format!("git checkout -b {branch}"),
                "git status".to_string(),
                "git add .".to_string(),
                format!("git commit -m 'fix: {summary}'"),
                "git push origin HEAD".to_string(),
                link,
            ],
            note: None,
        },
    ];

    let checklist = render_checklist(&entry.repo, issue.as_ref(), &steps);
    TaskBundle {
        repo: entry.repo.clone(),
        issue,
        steps,
        checklist,
    }
}

fn render_checklist(repo: &str, issue: Option<&TaskIssue>, steps: &[TaskStep]) -> String {
    let heading = match issue {
        Some(issue) => format!("## {repo} · {}", issue.title),
        None => format!("## {repo}"),
    };
    let mut lines = vec![heading, String::new()];
    if let Some(issue) = issue {
        lines.push(format!("Issue: {}", issue.url));
        lines.push(String::new());
    }
    for step in steps.iter().filter(|step| !step.commands.is_empty()) {
        lines.push(format!("### {}", step.title));
        lines.extend(step.commands.iter().map(|command| format!("- {command}")));
        if let Some(note) = &step.note {
            lines.push(format!("> {note}"));
        }
        lines.push(String::new());
    }
    if let Some(issue) = issue {
        lines.push(format!(
            "PR template: \"Fixes #{}: <what changed and how it was tested>\"",
            issue.number
        ));
    }
    lines.join("\n").trim_end().to_string()
}
