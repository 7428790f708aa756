//! # Hook Module
//!
//! Installs a git pre-commit hook that annotates staged files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::verbose_log;

/// Marker identifying hooks written by annot8.
const HOOK_MARKER: &str = "# installed by annot8";

const HOOK_SCRIPT: &str = "#!/bin/sh
# installed by annot8
# Adds file path headers to staged files before each commit.
annot8 --staged --use-git-metadata
";

/// Writes `.git/hooks/pre-commit` under `repo_root`.
///
/// An existing hook written by someone else is left untouched unless `force`
/// is set.
///
/// # Returns
///
/// The path of the installed hook.
///
/// # Errors
///
/// Returns an error if `repo_root` has no `.git` directory, a foreign hook is
/// present without `force`, or the hook cannot be written.
pub fn install_pre_commit_hook(repo_root: &Path, force: bool) -> Result<PathBuf> {
  let git_dir = repo_root.join(".git");
  if !git_dir.is_dir() {
    bail!("No .git directory found in {}", repo_root.display());
  }

  let hooks_dir = git_dir.join("hooks");
  std::fs::create_dir_all(&hooks_dir)
    .with_context(|| format!("Failed to create hooks directory: {}", hooks_dir.display()))?;

  let hook_path = hooks_dir.join("pre-commit");
  if hook_path.exists() && !force {
    let existing = std::fs::read_to_string(&hook_path).unwrap_or_default();
    if !existing.contains(HOOK_MARKER) {
      bail!(
        "A pre-commit hook already exists at {} (use --force to overwrite)",
        hook_path.display()
      );
    }
  }

  std::fs::write(&hook_path, HOOK_SCRIPT).with_context(|| format!("Failed to write hook: {}", hook_path.display()))?;
  make_executable(&hook_path)?;

  verbose_log!("Installed pre-commit hook at {}", hook_path.display());
  Ok(hook_path)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
  use std::os::unix::fs::PermissionsExt;

  std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
    .with_context(|| format!("Failed to make hook executable: {}", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
  Ok(())
}
