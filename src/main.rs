use chrono::{DateTime, NaiveDate, Utc};
use clap::Parser;
use repo_pulse::cli::{self, Commands};
use repo_pulse::newcomer::{self, bundle, NewcomerRequest, ReferenceTables, TimeBudget};
use repo_pulse::report::{self, BatchRow};
use repo_pulse::store::SnapshotLedger;
use repo_pulse::trend::{self, composite, TrendOverrides};
use repo_pulse::types::catalog::CatalogEntry;
use repo_pulse::types::config::PulseConfig;
use repo_pulse::types::metrics::MetricSample;
use repo_pulse::{batch, config, logging, score, PulseError, Result};
use std::path::Path;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const DEGRADED: i32 = 1;
    pub const RUNTIME_FAILURE: i32 = 3;
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(PulseError::PathNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| PulseError::InvalidDate(raw.to_string()))
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw.trim()) {
        return Ok(instant.with_timezone(&Utc));
    }
    parse_date(raw)?
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .ok_or_else(|| PulseError::InvalidDate(raw.to_string()))
}

fn load_config() -> Result<PulseConfig> {
    let cwd = std::env::current_dir()?;
    config::load_validated(&cwd)
}

fn run() -> Result<i32> {
    let cli = cli::Cli::parse();
    logging::init(cli.verbose, cli.quiet);
    let cfg = load_config()?;

    match cli.command {
        Commands::Health(cmd) => {
            let metrics = batch::load_metrics(&cmd.metrics)?;
            let weights = cfg.weights();
            let snapshot = match cmd.date.as_deref() {
                Some(raw) => score::compute_health_snapshot_on(&metrics, &weights, parse_date(raw)?),
                None => score::compute_health_snapshot(&metrics, &weights),
            };

            if let Some(path) = &cmd.ledger {
                let mut ledger = SnapshotLedger::load(path)?;
                let outcome = ledger.upsert(snapshot.clone())?;
                ledger.save(path)?;
                tracing::info!(ledger = %path.display(), outcome = outcome.as_str(), "ledger updated");
            }

            println!("{}", report::render_health(&snapshot, cmd.format.into())?);
            if snapshot.degraded_dimensions().is_empty() {
                Ok(exit_code::SUCCESS)
            } else {
                Ok(exit_code::DEGRADED)
            }
        }
        Commands::Trend(cmd) => {
            let samples: Vec<MetricSample> = read_json(&cmd.series)?;
            let overrides = TrendOverrides {
                slope_window: cmd.slope_window,
                response_hours: cmd.response_hours,
                normalize: cmd.normalize,
            };
            if let Some(window) = overrides.slope_window.filter(|window| *window < 2) {
                return Err(PulseError::ConfigParse(format!(
                    "--slope-window must be at least 2 (got {window})"
                )));
            }
            let defaults = cfg.trend_defaults();
            let trends = trend::group_samples(samples)?
                .iter()
                .map(|series| trend::trend_for_series(series, &defaults, &overrides))
                .collect::<Vec<_>>();
            println!("{}", report::render_trends(&trends, cmd.format.into())?);
            Ok(exit_code::SUCCESS)
        }
        Commands::Composite(cmd) => {
            let samples: Vec<MetricSample> = read_json(&cmd.series)?;
            let window_days = cmd
                .window_days
                .unwrap_or(cfg.trend_defaults().composite_window_days);
            if window_days == 0 {
                return Err(PulseError::ConfigParse(
                    "--window-days must be greater than 0".to_string(),
                ));
            }
            let series = trend::group_samples(samples)?;
            let reports = composite::compute_repo_composites(&series, window_days);
            println!("{}", report::render_composites(&reports, cmd.format.into())?);
            Ok(exit_code::SUCCESS)
        }
        Commands::Recommend(cmd) => {
            let catalog: Vec<CatalogEntry> = read_json(&cmd.catalog)?;
            let budget = TimeBudget::parse(&cmd.time_per_week)?;
            let as_of = match cmd.as_of.as_deref() {
                Some(raw) => parse_instant(raw)?,
                None => Utc::now(),
            };
            let request = NewcomerRequest::new(&cmd.domain, &cmd.stack, &cmd.keywords, budget);
            let references = ReferenceTables::from_catalog(&catalog);
            let result = newcomer::recommend_for_newcomer(
                &catalog,
                &references,
                &request,
                &cfg.newcomer_limits(),
                as_of,
            );
            println!("{}", report::render_recommendation(&result, cmd.format.into())?);
            Ok(exit_code::SUCCESS)
        }
        Commands::Task(cmd) => {
            let catalog: Vec<CatalogEntry> = read_json(&cmd.catalog)?;
            let entry = catalog
                .iter()
                .find(|entry| entry.repo.eq_ignore_ascii_case(cmd.repo.trim()))
                .ok_or_else(|| PulseError::UnknownRepo(cmd.repo.clone()))?;
            let bundle = bundle::task_bundle(entry, cmd.issue.as_deref());
            println!("{}", report::render_task(&bundle, cmd.format.into())?);
            Ok(exit_code::SUCCESS)
        }
        Commands::Batch(cmd) => {
            let files = batch::discover(&cmd.dir)?;
            let items = batch::score_all(&files, &cfg.weights());

            let mut ledger = match &cmd.ledger {
                Some(path) => Some(SnapshotLedger::load(path)?),
                None => None,
            };
            let mut degraded = false;
            let mut rows = Vec::with_capacity(items.len());
            for item in items {
                let path = item.path.display().to_string();
                match item.result {
                    Ok(snapshot) => {
                        degraded |= !snapshot.degraded_dimensions().is_empty();
                        let outcome = match ledger.as_mut() {
                            Some(ledger) => Some(ledger.upsert(snapshot.clone())?),
                            None => None,
                        };
                        rows.push(BatchRow::scored(path, &snapshot, outcome));
                    }
                    Err(err) => {
                        degraded = true;
                        rows.push(BatchRow::failed(path, err.to_string()));
                    }
                }
            }
            if let (Some(ledger), Some(path)) = (&ledger, &cmd.ledger) {
                ledger.save(path)?;
            }

            println!("{}", report::render_batch(&rows, cmd.format.into())?);
            if degraded {
                Ok(exit_code::DEGRADED)
            } else {
                Ok(exit_code::SUCCESS)
            }
        }
    }
}

fn main() {
    match run() {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(exit_code::RUNTIME_FAILURE);
        }
    }
}
