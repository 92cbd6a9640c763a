use crate::report::OutputFormat;
use crate::trend::SlidingWindow;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "repo-pulse",
    version,
    about = "Health, trend and newcomer-readiness scoring for open-source repositories"
)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score one repository metrics snapshot
    Health(HealthCommand),
    /// Derive trend statistics from metric samples
    Trend(TrendCommand),
    /// Rolling-percentile vitality, responsiveness and resilience composites
    Composite(CompositeCommand),
    /// Recommend starter repositories for a newcomer
    Recommend(RecommendCommand),
    /// Step-by-step plan for one issue of a catalog repository
    Task(TaskCommand),
    /// Score every metrics file under a directory
    Batch(BatchCommand),
}

#[derive(Args)]
pub struct HealthCommand {
    /// JSON file holding one repository's metrics
    pub metrics: PathBuf,
    /// Snapshot date (YYYY-MM-DD); defaults to the payload's as_of, then today
    #[arg(long)]
    pub date: Option<String>,
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: ReportFormat,
    /// Ledger file the snapshot is upserted into
    #[arg(long)]
    pub ledger: Option<PathBuf>,
}

#[derive(Args)]
pub struct TrendCommand {
    /// JSON array of {repo, metric, date, value} samples
    pub series: PathBuf,
    #[arg(long)]
    pub slope_window: Option<usize>,
    /// Response threshold in hours for the response ratio
    #[arg(long)]
    pub response_hours: Option<f64>,
    /// Sliding-window z-score normalization (7 or 30)
    #[arg(long, value_parser = parse_window)]
    pub normalize: Option<SlidingWindow>,
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: ReportFormat,
}

#[derive(Args)]
pub struct CompositeCommand {
    /// JSON array of {repo, metric, date, value} samples
    pub series: PathBuf,
    /// Trailing days each point is ranked against
    #[arg(long)]
    pub window_days: Option<u32>,
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: ReportFormat,
}

#[derive(Args)]
pub struct RecommendCommand {
    /// JSON array of catalog entries
    pub catalog: PathBuf,
    #[arg(long)]
    pub domain: String,
    #[arg(long)]
    pub stack: String,
    /// Free-text keywords, split on spaces and commas
    #[arg(long, default_value = "")]
    pub keywords: String,
    /// Weekly time budget, e.g. "5", "3h", "1-2h", "6h+"
    #[arg(long)]
    pub time_per_week: String,
    /// Reference instant (RFC 3339 or YYYY-MM-DD); defaults to now
    #[arg(long)]
    pub as_of: Option<String>,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
}

#[derive(Args)]
pub struct TaskCommand {
    /// JSON array of catalog entries
    pub catalog: PathBuf,
    #[arg(long)]
    pub repo: String,
    /// Issue number or URL; defaults to the first listed issue
    #[arg(long)]
    pub issue: Option<String>,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
}

#[derive(Args)]
pub struct BatchCommand {
    pub dir: PathBuf,
    #[arg(long)]
    pub ledger: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ReportFormat {
    Json,
    Md,
}

impl From<ReportFormat> for OutputFormat {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Json => OutputFormat::Json,
            ReportFormat::Md => OutputFormat::Md,
        }
    }
}

fn parse_window(raw: &str) -> Result<SlidingWindow, String> {
    raw.parse::<SlidingWindow>().map_err(|err| err.to_string())
}
