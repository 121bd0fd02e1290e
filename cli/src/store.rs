//! # State Persistence
//!
//! Loads and saves the full ledger state as a JSON file. The store wraps
//! the state in a `parking_lot::RwLock` so a concurrent host (tests, a
//! future long-running server) can share one `Store` across threads;
//! command handlers funnel every mutation through [`Store::mutate`], which
//! persists on success and discards the in-memory change on failure.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use nova_ledger::{Ledger, VestingEngine};

/// Everything the binary persists: the ledger plus an optional vesting
/// engine bound to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerState {
    pub ledger: Ledger,
    #[serde(default)]
    pub vesting: Option<VestingEngine>,
}

/// A JSON-file-backed state store.
pub struct Store {
    path: PathBuf,
    state: RwLock<LedgerState>,
}

impl Store {
    /// Creates a new state file. Fails if `path` already exists.
    pub fn create(path: impl Into<PathBuf>, state: LedgerState) -> Result<Self> {
        let path = path.into();
        if path.exists() {
            bail!("state file already exists: {}", path.display());
        }
        persist(&path, &state)?;
        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    /// Opens an existing state file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read state file: {}", path.display()))?;
        let state: LedgerState = serde_json::from_str(&raw)
            .with_context(|| format!("malformed state file: {}", path.display()))?;
        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    /// Runs a read-only closure against the current state.
    pub fn read<R>(&self, f: impl FnOnce(&LedgerState) -> R) -> R {
        f(&self.state.read())
    }

    /// Runs a fallible mutation and persists the result.
    ///
    /// On error the in-memory state is rolled back to what the last
    /// successful persist wrote, so a rejected operation leaves neither
    /// the file nor the cached copy half-updated.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut LedgerState) -> Result<R>) -> Result<R> {
        let mut guard = self.state.write();
        let snapshot = guard.clone();
        match f(&mut guard) {
            Ok(value) => {
                persist(&self.path, &guard)?;
                Ok(value)
            }
            Err(e) => {
                *guard = snapshot;
                Err(e)
            }
        }
    }
}

/// Writes the state as pretty-printed JSON via a sibling temp file, so a
/// crash mid-write never truncates the previous good state.
fn persist(path: &Path, state: &LedgerState) -> Result<()> {
    let json = serde_json::to_string_pretty(state).context("failed to serialize ledger state")?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)
        .with_context(|| format!("failed to write state file: {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("failed to replace state file: {}", path.display()))?;
    Ok(())
}
