use crate::error::{PulseError, Result};
use crate::score::compute_health_snapshot;
use crate::types::metrics::RepoMetrics;
use crate::types::scoring::{HealthSnapshot, HealthWeights};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Outcome of scoring one metrics file.
#[derive(Debug)]
pub struct BatchItem {
    pub path: PathBuf,
    pub result: Result<HealthSnapshot>,
}

/// Every `*.json` file under `root`, sorted by path.
pub fn discover(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(PulseError::PathNotFound(root.display().to_string()));
    }
    let mut files = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().to_path_buf())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("json"))
                .unwrap_or(false)
        })
        .collect::<Vec<_>>();
    files.sort();
    Ok(files)
}

pub fn load_metrics(path: &Path) -> Result<RepoMetrics> {
    let content = std::fs::read_to_string(path)?;
    let mut metrics: RepoMetrics = serde_json::from_str(&content)?;
    metrics.validate()?;
    if metrics.repo.trim().is_empty() {
        metrics.repo = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
    }
    Ok(metrics)
}

/// Scores each file on its own rayon task; results keep the input order.
pub fn score_all(paths: &[PathBuf], weights: &HealthWeights) -> Vec<BatchItem> {
    paths
        .par_iter()
        .map(|path| {
            let result = load_metrics(path).map(|metrics| compute_health_snapshot(&metrics, weights));
            if let Err(err) = &result {
                tracing::warn!(path = %path.display(), error = %err, "skipping metrics file");
            }
            BatchItem {
                path: path.clone(),
                result,
            }
        })
        .collect()
}
