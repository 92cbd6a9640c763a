use crate::error::{PulseError, Result};
use crate::types::scoring::HealthSnapshot;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Replaced,
    Unchanged,
}

impl UpsertOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inserted => "inserted",
            Self::Replaced => "replaced",
            Self::Unchanged => "unchanged",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub fingerprint: String,
    pub snapshot: HealthSnapshot,
}

#[derive(Debug, Serialize, Deserialize)]
struct LedgerFile {
    version: String,
    updated_at: String,
    entries: Vec<LedgerEntry>,
}

/// One health snapshot per (repo, date); writing the same key again
/// overwrites it in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotLedger {
    entries: BTreeMap<(String, NaiveDate), LedgerEntry>,
}

impl SnapshotLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a ledger file; a missing file is an empty ledger.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)?;
        let file: LedgerFile = serde_json::from_str(&content)?;
        let entries = file
            .entries
            .into_iter()
            .map(|entry| {
                (
                    (entry.snapshot.repo.clone(), entry.snapshot.date),
                    entry,
                )
            })
            .collect();
        Ok(Self { entries })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(PulseError::Io)?;
        }
        let file = LedgerFile {
            version: env!("CARGO_PKG_VERSION").to_string(),
            updated_at: Utc::now().to_rfc3339(),
            entries: self.entries.values().cloned().collect(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        fs::write(path, json).map_err(PulseError::Io)?;
        Ok(())
    }

    pub fn upsert(&mut self, snapshot: HealthSnapshot) -> Result<UpsertOutcome> {
        let fingerprint = fingerprint(&snapshot)?;
        let key = (snapshot.repo.clone(), snapshot.date);
        let outcome = match self.entries.get(&key) {
            Some(existing) if existing.fingerprint == fingerprint => UpsertOutcome::Unchanged,
            Some(_) => UpsertOutcome::Replaced,
            None => UpsertOutcome::Inserted,
        };
        if outcome != UpsertOutcome::Unchanged {
            self.entries.insert(
                key,
                LedgerEntry {
                    fingerprint,
                    snapshot,
                },
            );
        }
        tracing::debug!(outcome = outcome.as_str(), "snapshot upserted");
        Ok(outcome)
    }

    pub fn get(&self, repo: &str, date: NaiveDate) -> Option<&HealthSnapshot> {
        self.entries
            .get(&(repo.to_string(), date))
            .map(|entry| &entry.snapshot)
    }

    /// Snapshots of `repo` in date order.
    pub fn history(&self, repo: &str) -> Vec<&HealthSnapshot> {
        self.entries
            .values()
            .filter(|entry| entry.snapshot.repo == repo)
            .map(|entry| &entry.snapshot)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// SHA-256 over the serialized scores and dimensions.
pub fn fingerprint(snapshot: &HealthSnapshot) -> Result<String> {
    let bytes = serde_json::to_vec(&(&snapshot.dimensions, &snapshot.scores))?;
    Ok(sha256_hex(&bytes))
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    format!("{digest:x}")
}
