use thiserror::Error;

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("config parse error: {0}")]
    ConfigParse(String),

    #[error("path does not exist: {0}")]
    PathNotFound(String),

    #[error("invalid metric value for {metric}: {value}")]
    InvalidValue { metric: String, value: f64 },

    #[error("duplicate sample for {repo}/{metric} on {date}")]
    DuplicateSample {
        repo: String,
        metric: String,
        date: chrono::NaiveDate,
    },

    #[error("sample {found} does not belong to series {expected}")]
    SeriesMismatch { expected: String, found: String },

    #[error("invalid time budget: {0}")]
    InvalidTimeBudget(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("repository not in catalog: {0}")]
    UnknownRepo(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PulseError>;
