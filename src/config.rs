use crate::error::{PulseError, Result};
use crate::types::config::PulseConfig;
use std::path::{Path, PathBuf};
use toml::map::Map;
use toml::Value;

pub const DEFAULT_CONFIG_FILE: &str = "repo-pulse.toml";
pub const DEFAULT_LOCAL_FILE: &str = ".repo-pulse/local.toml";
pub const DEFAULT_GLOBAL_CONFIG_FILE: &str = ".config/repo-pulse/config.toml";

/// Loads the layered configuration for `root`, or `None` when no layer exists.
pub fn load_config(root: &Path) -> Result<Option<PulseConfig>> {
    let global = std::env::var_os("HOME")
        .map(PathBuf::from)
        .map(|home| home.join(DEFAULT_GLOBAL_CONFIG_FILE));
    load_config_with_global(root, global.as_deref())
}

/// Same as [`load_config`], then validated; absent layers yield defaults.
pub fn load_validated(root: &Path) -> Result<PulseConfig> {
    let cfg = load_config(root)?.unwrap_or_default();
    cfg.validate()?;
    Ok(cfg)
}

pub(crate) fn load_config_with_global(
    root: &Path,
    global_path: Option<&Path>,
) -> Result<Option<PulseConfig>> {
    let layers = [
        global_path.map(Path::to_path_buf),
        Some(root.join(DEFAULT_CONFIG_FILE)),
        Some(root.join(DEFAULT_LOCAL_FILE)),
    ];
    let existing = layers
        .into_iter()
        .flatten()
        .filter(|path| path.exists())
        .collect::<Vec<_>>();
    if existing.is_empty() {
        return Ok(None);
    }

    let mut merged = Value::Table(Map::new());
    for path in &existing {
        tracing::debug!(path = %path.display(), "merging config layer");
        merge_toml(&mut merged, read_toml_value(path)?);
    }

    let cfg: PulseConfig = merged
        .try_into()
        .map_err(|e: toml::de::Error| PulseError::ConfigParse(e.to_string()))?;
    Ok(Some(cfg))
}

fn read_toml_value(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| PulseError::ConfigParse(format!("{}: {}", path.display(), e)))
}

fn merge_toml(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Table(base_table), Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => {
            *slot = value;
        }
    }
}
