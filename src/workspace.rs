//! # Workspace Module
//!
//! This module validates the project root annot8 operates on and notes
//! whether it lives inside a git repository. A missing or non-directory root
//! is the only fatal condition of a run.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use crate::git;

/// Fatal problems with the requested project root.
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
  #[error("Directory '{0}' does not exist")]
  NotFound(PathBuf),

  #[error("'{0}' is not a directory")]
  NotADirectory(PathBuf),
}

/// Workspace root selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Workspace {
  /// Project root inside a git repository.
  Git { root: PathBuf, repo_root: PathBuf },
  /// Project root outside any repository.
  Directory { root: PathBuf },
}

impl Workspace {
  pub fn root(&self) -> &Path {
    match self {
      Self::Git { root, .. } | Self::Directory { root } => root.as_path(),
    }
  }

  /// Working directory of the enclosing repository, if any.
  pub fn repo_root(&self) -> Option<&Path> {
    match self {
      Self::Git { repo_root, .. } => Some(repo_root.as_path()),
      Self::Directory { .. } => None,
    }
  }
}

/// Resolves and validates the project root.
///
/// # Errors
///
/// Returns a [`WorkspaceError`] if `directory` does not exist or is not a
/// directory. Repository discovery failures are logged and treated as "not a
/// repository".
pub fn resolve_workspace(directory: &Path) -> Result<Workspace, WorkspaceError> {
  if !directory.exists() {
    return Err(WorkspaceError::NotFound(directory.to_path_buf()));
  }
  if !directory.is_dir() {
    return Err(WorkspaceError::NotADirectory(directory.to_path_buf()));
  }

  let root = std::fs::canonicalize(directory).unwrap_or_else(|_| directory.to_path_buf());

  match git::discover_repo_root(&root) {
    Ok(Some(repo_root)) => {
      debug!("Project root {} is inside repository {}", root.display(), repo_root.display());
      Ok(Workspace::Git { root, repo_root })
    }
    Ok(None) => Ok(Workspace::Directory { root }),
    Err(e) => {
      debug!("Git discovery failed for {}: {:#}", root.display(), e);
      Ok(Workspace::Directory { root })
    }
  }
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;

  #[test]
  fn test_missing_directory() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let result = resolve_workspace(&temp_dir.path().join("missing"));
    assert!(matches!(result, Err(WorkspaceError::NotFound(_))));
  }

  #[test]
  fn test_file_is_not_a_directory() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let file = temp_dir.path().join("a.py");
    std::fs::write(&file, "").expect("write");
    assert!(matches!(resolve_workspace(&file), Err(WorkspaceError::NotADirectory(_))));
  }

  #[test]
  fn test_git_workspace() {
    let temp_dir = TempDir::new().expect("create temp dir");
    git2::Repository::init(temp_dir.path()).expect("init repo");
    let sub = temp_dir.path().join("pkg");
    std::fs::create_dir(&sub).expect("create dir");

    let workspace = resolve_workspace(&sub).expect("resolve");
    assert!(matches!(workspace, Workspace::Git { .. }));
    let expected_repo = std::fs::canonicalize(temp_dir.path()).expect("canonicalize");
    assert_eq!(workspace.repo_root(), Some(expected_repo.as_path()));
    assert_eq!(workspace.root(), std::fs::canonicalize(&sub).expect("canonicalize"));
  }
}
