//! # Backup Module
//!
//! Records the original text of every file a run modifies so that `--revert`
//! can restore it. The artifact lives at the project root:
//!
//! ```json
//! {
//!   "timestamp": "2024-03-09T12:00:00+00:00",
//!   "files": { "src/app.py": "print('hi')\n" }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::verbose_log;

/// Name of the backup artifact written at the project root.
pub const BACKUP_FILENAME: &str = ".annot8_backup.json";

/// On-disk backup format.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackupFile {
  /// RFC 3339 time of the run that wrote the backup
  pub timestamp: String,
  /// Original contents keyed by path relative to the project root
  pub files: BTreeMap<String, String>,
}

/// Counts reported by [`revert_files`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevertStats {
  pub reverted: usize,
  pub missing: usize,
  pub errors: usize,
}

pub fn backup_path(root: &Path) -> PathBuf {
  root.join(BACKUP_FILENAME)
}

/// Writes the backup artifact. An empty map leaves any existing artifact in
/// place.
///
/// # Errors
///
/// Returns an error if the artifact cannot be serialized or written.
pub fn save_backup(root: &Path, files: BTreeMap<String, String>) -> Result<()> {
  if files.is_empty() {
    debug!("Nothing modified, keeping any existing backup");
    return Ok(());
  }

  let backup = BackupFile {
    timestamp: Local::now().to_rfc3339(),
    files,
  };
  let path = backup_path(root);
  let json = serde_json::to_string_pretty(&backup).with_context(|| "Failed to serialize backup")?;
  std::fs::write(&path, json).with_context(|| format!("Failed to write backup file: {}", path.display()))?;

  verbose_log!("Saved backup of {} files to {}", backup.files.len(), path.display());
  Ok(())
}

/// Reads the backup artifact, `None` when there is none.
///
/// # Errors
///
/// Returns an error if the artifact exists but cannot be read or parsed.
pub fn load_backup(root: &Path) -> Result<Option<BackupFile>> {
  let path = backup_path(root);
  if !path.is_file() {
    return Ok(None);
  }

  let content =
    std::fs::read_to_string(&path).with_context(|| format!("Failed to read backup file: {}", path.display()))?;
  let backup =
    serde_json::from_str(&content).with_context(|| format!("Failed to parse backup file: {}", path.display()))?;
  Ok(Some(backup))
}

/// Deletes the backup artifact if present.
///
/// # Errors
///
/// Returns an error if the artifact exists but cannot be removed.
pub fn clear_backup(root: &Path) -> Result<()> {
  let path = backup_path(root);
  if path.exists() {
    std::fs::remove_file(&path).with_context(|| format!("Failed to remove backup file: {}", path.display()))?;
  }
  Ok(())
}

/// Restores every file recorded in the backup artifact.
///
/// Files that no longer exist are counted as missing and not recreated. In
/// dry-run mode nothing is written and the artifact is kept; otherwise the
/// artifact is deleted afterwards.
///
/// # Returns
///
/// `Ok(None)` when there is no backup to revert.
///
/// # Errors
///
/// Returns an error if the artifact cannot be read or removed.
pub fn revert_files(root: &Path, dry_run: bool) -> Result<Option<RevertStats>> {
  let Some(backup) = load_backup(root)? else {
    return Ok(None);
  };

  verbose_log!("Reverting {} files from backup taken at {}", backup.files.len(), backup.timestamp);

  let mut stats = RevertStats::default();
  for (relative, original) in &backup.files {
    let path = root.join(relative);
    if !path.is_file() {
      debug!("Backed-up file no longer exists: {}", path.display());
      stats.missing += 1;
      continue;
    }

    if dry_run {
      verbose_log!("Would revert: {}", relative);
      stats.reverted += 1;
      continue;
    }

    match std::fs::write(&path, original) {
      Ok(()) => {
        verbose_log!("Reverted: {}", relative);
        stats.reverted += 1;
      }
      Err(e) => {
        error!("Failed to revert {}: {}", path.display(), e);
        stats.errors += 1;
      }
    }
  }

  if !dry_run {
    clear_backup(root)?;
  }

  Ok(Some(stats))
}
