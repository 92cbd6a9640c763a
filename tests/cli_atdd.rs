#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const HEALTHY_METRICS: &str = r#"{
    "repo": "acme/widget",
    "as_of": "2024-06-01",
    "openrank": 40.0,
    "activity_3m": 300.0,
    "activity_prev_3m": 250.0,
    "participants": 80.0,
    "new_contributors": 12.0,
    "issues_new": 40.0,
    "prs_new": 60.0,
    "issue_response_time_h": 10.0,
    "pr_response_time_h": 8.0,
    "issue_resolution_duration_h": 100.0,
    "pr_resolution_duration_h": 60.0,
    "issue_age_h": 400.0,
    "pr_age_h": 200.0,
    "bus_factor": 4.0,
    "hhi": 0.15,
    "retention_rate": 0.7,
    "github_health_percentage": 85.0,
    "governance_files": {"readme": true, "license": true, "contributing": true, "issue_template": true},
    "scorecard_score": 7.5
}"#;

const SPARSE_METRICS: &str = r#"{"repo": "acme/sparse", "as_of": "2024-06-01", "openrank": 3.0}"#;

const CATALOG: &str = r#"[
    {
        "repo": "acme/fast",
        "domains": ["ml"],
        "stacks": ["python"],
        "tags": ["nlp"],
        "readiness": {
            "issue_response_time_h": 4.0,
            "activity_3m": 120.0,
            "issues": [
                {"number": 1, "title": "Fix docstring", "category": "good_first",
                 "updated_at": "2024-05-30T00:00:00Z"},
                {"number": 2, "title": "Add CLI flag", "category": "help_wanted",
                 "updated_at": "2024-05-20T00:00:00Z"}
            ],
            "docs": {"readme": true, "contributing": true,
                     "extracted": {"setup": ["pip install -e ."], "test": ["pytest -q"]}}
        }
    },
    {
        "repo": "acme/slow",
        "domains": ["ml"],
        "stacks": ["python"],
        "readiness": {"issue_response_time_h": 300.0, "activity_3m": 2.0}
    },
    {
        "repo": "acme/web",
        "domains": ["web"],
        "stacks": ["go"],
        "readiness": {"issue_response_time_h": 20.0, "activity_3m": 40.0}
    }
]"#;

fn pulse(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("repo-pulse").expect("binary should compile");
    cmd.current_dir(dir).env_remove("REPO_PULSE_LOG");
    cmd
}

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("parent dir should be created");
    }
    fs::write(path, content).expect("fixture should write");
}

#[test]
fn health_json_for_complete_metrics_exits_success() {
    let dir = TempDir::new().expect("temp dir should be created");
    write(dir.path(), "metrics.json", HEALTHY_METRICS);

    let output = pulse(dir.path())
        .args(["health", "metrics.json", "--format", "json"])
        .assert()
        .code(0)
        .get_output()
        .stdout
        .clone();
    let snapshot: serde_json::Value =
        serde_json::from_slice(&output).expect("stdout should be json");
    assert_eq!(snapshot["repo"], "acme/widget");
    assert_eq!(snapshot["date"], "2024-06-01");
    assert_eq!(
        snapshot["dimensions"]
            .as_array()
            .expect("dimensions should be an array")
            .len(),
        5
    );
    let overall = snapshot["scores"]["overall"]
        .as_f64()
        .expect("overall should be a number");
    assert!((0.0..=100.0).contains(&overall));
}

#[test]
fn health_with_degraded_dimensions_exits_one() {
    let dir = TempDir::new().expect("temp dir should be created");
    write(dir.path(), "metrics.json", SPARSE_METRICS);

    pulse(dir.path())
        .args(["health", "metrics.json", "--format", "md"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("# Health Report: acme/sparse"))
        .stdout(predicate::str::contains("(degraded:"));
}

#[test]
fn health_date_flag_overrides_payload_date() {
    let dir = TempDir::new().expect("temp dir should be created");
    write(dir.path(), "metrics.json", HEALTHY_METRICS);

    pulse(dir.path())
        .args(["health", "metrics.json", "--date", "2024-07-15"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"date\": \"2024-07-15\""));

    pulse(dir.path())
        .args(["health", "metrics.json", "--date", "15/07/2024"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("invalid date"));
}

#[test]
fn health_ledger_upsert_is_idempotent() {
    let dir = TempDir::new().expect("temp dir should be created");
    write(dir.path(), "metrics.json", HEALTHY_METRICS);

    for _ in 0..2 {
        pulse(dir.path())
            .args(["health", "metrics.json", "--ledger", "state/ledger.json"])
            .assert()
            .success();
    }

    let ledger: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join("state/ledger.json")).expect("ledger should exist"),
    )
    .expect("ledger should be json");
    let entries = ledger["entries"]
        .as_array()
        .expect("entries should be an array");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["snapshot"]["repo"], "acme/widget");
    assert_eq!(
        entries[0]["fingerprint"]
            .as_str()
            .expect("fingerprint should be a string")
            .len(),
        64
    );
}

#[test]
fn config_weights_change_the_composite() {
    let dir = TempDir::new().expect("temp dir should be created");
    write(dir.path(), "metrics.json", SPARSE_METRICS);
    write(
        dir.path(),
        "repo-pulse.toml",
        "[weights]\nvitality = 0.0\nresponsiveness = 0.0\nresilience = 0.0\ngovernance = 0.0\nsecurity = 1.0\n",
    );

    pulse(dir.path())
        .args(["health", "metrics.json"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"overall\": 60.0"));
}

#[test]
fn trend_reports_each_series() {
    let dir = TempDir::new().expect("temp dir should be created");
    write(
        dir.path(),
        "series.json",
        r#"[
            {"repo": "acme/widget", "metric": "activity", "date": "2024-05-01", "value": 1.0},
            {"repo": "acme/widget", "metric": "activity", "date": "2024-05-02", "value": 1.0},
            {"repo": "acme/widget", "metric": "activity", "date": "2024-05-03", "value": 1.0},
            {"repo": "acme/widget", "metric": "activity", "date": "2024-05-04", "value": 1.0},
            {"repo": "acme/widget", "metric": "activity", "date": "2024-05-05", "value": 10.0},
            {"repo": "acme/widget", "metric": "issue_response_time_h", "date": "2024-05-01", "value": 30.0},
            {"repo": "acme/widget", "metric": "issue_response_time_h", "date": "2024-05-02", "value": 90.0}
        ]"#,
    );

    let output = pulse(dir.path())
        .args(["trend", "series.json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let trends: serde_json::Value = serde_json::from_slice(&output).expect("stdout should be json");
    let trends = trends.as_array().expect("trends should be an array");
    assert_eq!(trends.len(), 2);

    assert_eq!(trends[0]["metric"], "activity");
    assert_eq!(trends[0]["derived"]["direction"], "rising");
    let z = trends[0]["derived"]["anomaly_zscore"]
        .as_f64()
        .expect("zscore should exist");
    assert!((z - 2.0).abs() < 1e-9);
    assert!(trends[0]["derived"]["response_ratio"].is_null());

    assert_eq!(trends[1]["kind"], "duration");
    assert_eq!(trends[1]["derived"]["response_ratio"], 0.5);
    assert!(trends[1]["derived"]["anomaly_zscore"].is_null());
}

#[test]
fn trend_rejects_duplicate_samples() {
    let dir = TempDir::new().expect("temp dir should be created");
    write(
        dir.path(),
        "series.json",
        r#"[
            {"repo": "a/b", "metric": "stars", "date": "2024-05-01", "value": 1.0},
            {"repo": "a/b", "metric": "stars", "date": "2024-05-01", "value": 2.0}
        ]"#,
    );
    pulse(dir.path())
        .args(["trend", "series.json", "--format", "md"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("duplicate sample"));
}

#[test]
fn recommend_builds_plan_for_top_repository() {
    let dir = TempDir::new().expect("temp dir should be created");
    write(dir.path(), "catalog.json", CATALOG);

    pulse(dir.path())
        .args([
            "recommend",
            "catalog.json",
            "--domain",
            "ml",
            "--stack",
            "python",
            "--keywords",
            "nlp",
            "--time-per-week",
            "1-2h",
            "--as-of",
            "2024-06-01",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. [acme/fast]"))
        .stdout(predicate::str::contains("#1 Fix docstring"))
        .stdout(predicate::str::contains("## acme/fast contribution checklist"))
        .stdout(predicate::str::contains("pip install -e ."));
}

#[test]
fn recommend_json_is_deterministic() {
    let dir = TempDir::new().expect("temp dir should be created");
    write(dir.path(), "catalog.json", CATALOG);
    let args = [
        "recommend",
        "catalog.json",
        "--domain",
        "ml",
        "--stack",
        "python",
        "--time-per-week",
        "6h+",
        "--as-of",
        "2024-06-01T12:00:00Z",
        "--format",
        "json",
    ];

    let first = pulse(dir.path()).args(args).assert().success().get_output().stdout.clone();
    let second = pulse(dir.path()).args(args).assert().success().get_output().stdout.clone();
    assert_eq!(first, second);

    let result: serde_json::Value = serde_json::from_slice(&first).expect("stdout should be json");
    assert_eq!(result["profile"]["hours_per_week"], 6.0);
    assert_eq!(result["recommended"][0]["repo"], "acme/fast");
}

#[test]
fn batch_scores_directory_and_survives_bad_files() {
    let dir = TempDir::new().expect("temp dir should be created");
    write(dir.path(), "metrics/widget.json", HEALTHY_METRICS);
    write(dir.path(), "metrics/nested/sparse.json", SPARSE_METRICS);
    write(dir.path(), "metrics/broken.json", "{ not json");
    write(dir.path(), "metrics/README.md", "ignored");

    pulse(dir.path())
        .args(["batch", "metrics", "--ledger", "ledger.json"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("| acme/widget |"))
        .stdout(predicate::str::contains("| acme/sparse |"))
        .stdout(predicate::str::contains("broken.json | error |"));

    let ledger: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join("ledger.json")).expect("ledger should exist"),
    )
    .expect("ledger should be json");
    assert_eq!(
        ledger["entries"]
            .as_array()
            .expect("entries should be an array")
            .len(),
        2
    );
}

#[test]
fn batch_of_healthy_files_exits_success() {
    let dir = TempDir::new().expect("temp dir should be created");
    write(dir.path(), "metrics/widget.json", HEALTHY_METRICS);

    pulse(dir.path())
        .args(["batch", "metrics", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"health_score\""))
        .stdout(predicate::str::contains("\"ledger\"").not());
}

#[test]
fn composite_ranks_each_point_against_trailing_window() {
    let dir = TempDir::new().expect("temp dir should be created");
    write(
        dir.path(),
        "series.json",
        r#"[
            {"repo": "acme/widget", "metric": "activity", "date": "2024-05-01", "value": 10.0},
            {"repo": "acme/widget", "metric": "activity", "date": "2024-05-02", "value": 20.0},
            {"repo": "acme/widget", "metric": "metric_activity", "date": "2024-05-02", "value": 99.0},
            {"repo": "acme/widget", "metric": "issue_response_time_h", "date": "2024-05-02", "value": 12.0}
        ]"#,
    );

    let output = pulse(dir.path())
        .args(["composite", "series.json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let reports: serde_json::Value = serde_json::from_slice(&output).expect("stdout should be json");
    let report = &reports[0];
    assert_eq!(report["repo"], "acme/widget");
    assert_eq!(report["window_days"], 180);

    let composites = report["composites"]
        .as_array()
        .expect("composites should be an array");
    assert_eq!(composites.len(), 3);
    assert_eq!(composites[0]["kind"], "vitality");
    assert_eq!(composites[0]["kpi"]["value"], 100.0);
    assert_eq!(composites[0]["components_latest"][0]["raw"], 20.0);
    assert_eq!(composites[1]["kind"], "responsiveness");
    assert_eq!(composites[1]["kpi"]["value"], 50.0);
    assert!(composites[1]["kpi"]["delta"].is_null());
    assert!(composites[2]["kpi"]["value"].is_null());
}

#[test]
fn composite_window_comes_from_config_and_flag() {
    let dir = TempDir::new().expect("temp dir should be created");
    write(
        dir.path(),
        "series.json",
        r#"[{"repo": "a/b", "metric": "bus_factor", "date": "2024-05-01", "value": 3.0}]"#,
    );
    write(dir.path(), "repo-pulse.toml", "[trend]\ncomposite_window_days = 30\n");

    pulse(dir.path())
        .args(["composite", "series.json", "--format", "md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("## a/b (trailing 30 days)"));

    pulse(dir.path())
        .args(["composite", "series.json", "--window-days", "0"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("--window-days"));
}

#[test]
fn task_renders_checklist_for_named_issue() {
    let dir = TempDir::new().expect("temp dir should be created");
    write(dir.path(), "catalog.json", CATALOG);

    pulse(dir.path())
        .args(["task", "catalog.json", "--repo", "acme/fast", "--issue", "#2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("## acme/fast · Add CLI flag"))
        .stdout(predicate::str::contains("- pip install -e ."))
        .stdout(predicate::str::contains("- git checkout -b fix-issue-2"))
        .stdout(predicate::str::contains("Open a PR linked to issue #2"));

    pulse(dir.path())
        .args(["task", "catalog.json", "--repo", "acme/missing"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not in catalog"));
}
