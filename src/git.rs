//! # Git Module
//!
//! This module contains functionality for interacting with git repositories:
//! locating the repository, listing tracked or staged files, and reading the
//! per-file author and date that feed header metadata.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use git2::{Delta, ErrorCode, Repository, Sort};
use tracing::debug;

use crate::verbose_log;

/// Upper bound on commits inspected when looking for a file's last change.
const MAX_HISTORY_COMMITS: usize = 1000;

/// Author and date information for a single file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMetadata {
  pub author: Option<String>,
  pub email: Option<String>,
  pub date: Option<DateTime<FixedOffset>>,
}

/// Source of per-file metadata.
pub trait MetadataProvider {
  /// Returns whatever is known about `path`. Never fails; unknown fields are
  /// left empty.
  fn metadata_for(&self, path: &Path) -> FileMetadata;
}

/// Provider used when git metadata is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetadata;

impl MetadataProvider for NoMetadata {
  fn metadata_for(&self, _path: &Path) -> FileMetadata {
    FileMetadata::default()
  }
}

/// Reads metadata from the last commit touching each file, falling back to
/// the repository's configured `user.name` and `user.email`.
pub struct GitMetadataProvider {
  repo: Repository,
  workdir: PathBuf,
  fallback_author: Option<String>,
  fallback_email: Option<String>,
}

impl GitMetadataProvider {
  /// Opens the repository containing `path`.
  ///
  /// # Errors
  ///
  /// Returns an error if no repository contains `path` or it is bare.
  pub fn discover(path: &Path) -> Result<Self> {
    let repo = Repository::discover(path)
      .with_context(|| format!("Failed to open git repository at {}", path.display()))?;
    let workdir = repo
      .workdir()
      .map(canonical)
      .with_context(|| "Git repository has no working directory")?;

    let (fallback_author, fallback_email) = match repo.config() {
      Ok(config) => (config.get_string("user.name").ok(), config.get_string("user.email").ok()),
      Err(e) => {
        debug!("Failed to read git config: {}", e);
        (None, None)
      }
    };

    Ok(Self {
      repo,
      workdir,
      fallback_author,
      fallback_email,
    })
  }

  fn last_commit_metadata(&self, relative: &Path) -> Result<Option<FileMetadata>> {
    let mut revwalk = self.repo.revwalk().with_context(|| "Failed to create revwalk")?;
    revwalk.set_sorting(Sort::TIME)?;
    if revwalk.push_head().is_err() {
      // Unborn HEAD: no history yet.
      return Ok(None);
    }

    for oid in revwalk.take(MAX_HISTORY_COMMITS) {
      let commit = self.repo.find_commit(oid?)?;
      let entry_id = commit.tree()?.get_path(relative).ok().map(|entry| entry.id());
      let Some(entry_id) = entry_id else {
        continue;
      };

      let parent_id = match commit.parent(0) {
        Ok(parent) => parent.tree()?.get_path(relative).ok().map(|entry| entry.id()),
        Err(_) => None,
      };

      if parent_id != Some(entry_id) {
        let author = commit.author();
        return Ok(Some(FileMetadata {
          author: author.name().map(str::to_string),
          email: author.email().map(str::to_string),
          date: commit_date(commit.time()),
        }));
      }
    }

    Ok(None)
  }
}

impl MetadataProvider for GitMetadataProvider {
  fn metadata_for(&self, path: &Path) -> FileMetadata {
    let absolute = canonical(path);
    let relative = absolute.strip_prefix(&self.workdir).unwrap_or(absolute.as_path());

    let mut metadata = match self.last_commit_metadata(relative) {
      Ok(Some(metadata)) => metadata,
      Ok(None) => FileMetadata::default(),
      Err(e) => {
        debug!("Failed to read git history for {}: {:#}", relative.display(), e);
        FileMetadata::default()
      }
    };

    if metadata.author.is_none() {
      metadata.author.clone_from(&self.fallback_author);
    }
    if metadata.email.is_none() {
      metadata.email.clone_from(&self.fallback_email);
    }
    metadata
  }
}

fn commit_date(time: git2::Time) -> Option<DateTime<FixedOffset>> {
  let offset = FixedOffset::east_opt(time.offset_minutes() * 60)?;
  DateTime::from_timestamp(time.seconds(), 0).map(|utc| utc.with_timezone(&offset))
}

fn canonical(path: &Path) -> PathBuf {
  std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Finds the working directory of the repository containing `path`.
///
/// # Returns
///
/// `Ok(None)` when `path` is not inside a repository.
pub fn discover_repo_root(path: &Path) -> Result<Option<PathBuf>> {
  match Repository::discover(path) {
    Ok(repo) => Ok(repo.workdir().map(canonical)),
    Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
    Err(e) => Err(e).with_context(|| format!("Failed to discover git repository from {}", path.display())),
  }
}

/// Gets the absolute paths of all files in the index.
///
/// # Errors
///
/// Returns an error if the repository or its index cannot be opened.
pub fn tracked_files(repo_root: &Path) -> Result<HashSet<PathBuf>> {
  verbose_log!("Getting tracked files in: {}", repo_root.display());

  let repo = Repository::open(repo_root).with_context(|| "Failed to open git repository")?;
  let index = repo.index().with_context(|| "Failed to read git index")?;

  let files: HashSet<PathBuf> = index
    .iter()
    .map(|entry| repo_root.join(String::from_utf8_lossy(&entry.path).as_ref()))
    .collect();

  verbose_log!("Found {} tracked files", files.len());
  Ok(files)
}

/// Gets the absolute paths of files staged for commit (added, copied,
/// modified or renamed relative to HEAD). Before the first commit every index
/// entry counts as staged.
///
/// # Errors
///
/// Returns an error if the repository, its index, or the diff cannot be read.
pub fn staged_files(repo_root: &Path) -> Result<HashSet<PathBuf>> {
  verbose_log!("Getting staged files in: {}", repo_root.display());

  let repo = Repository::open(repo_root).with_context(|| "Failed to open git repository")?;
  let head_tree = repo.head().ok().and_then(|head| head.peel_to_tree().ok());
  let Some(head_tree) = head_tree else {
    debug!("HEAD is unborn, treating every index entry as staged");
    return tracked_files(repo_root);
  };

  let index = repo.index().with_context(|| "Failed to read git index")?;
  let diff = repo
    .diff_tree_to_index(Some(&head_tree), Some(&index), None)
    .with_context(|| "Failed to diff HEAD against the index")?;

  let files: HashSet<PathBuf> = diff
    .deltas()
    .filter(|delta| matches!(delta.status(), Delta::Added | Delta::Copied | Delta::Modified | Delta::Renamed))
    .filter_map(|delta| delta.new_file().path().map(|path| repo_root.join(path)))
    .collect();

  verbose_log!("Found {} staged files", files.len());
  Ok(files)
}

#[cfg(test)]
mod tests {
  use git2::{Commit, IndexAddOption, Signature, Time};
  use tempfile::TempDir;

  use super::*;

  fn init_repo() -> (TempDir, PathBuf, Repository) {
    let temp_dir = TempDir::new().expect("create temp dir");
    let root = canonical(temp_dir.path());
    let repo = Repository::init(&root).expect("init repo");
    {
      let mut config = repo.config().expect("repo config");
      config.set_str("user.name", "Config User").expect("set name");
      config.set_str("user.email", "config@example.com").expect("set email");
    }
    (temp_dir, root, repo)
  }

  fn stage(repo: &Repository) {
    let mut index = repo.index().expect("index");
    index
      .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
      .expect("add all");
    index.write().expect("write index");
  }

  fn commit_all(repo: &Repository, author: &str, seconds: i64) {
    stage(repo);
    let mut index = repo.index().expect("index");
    let tree_id = index.write_tree().expect("write tree");
    let tree = repo.find_tree(tree_id).expect("find tree");
    let sig = Signature::new(author, "author@example.com", &Time::new(seconds, 60)).expect("signature");
    let parents: Vec<Commit> = repo
      .head()
      .ok()
      .and_then(|head| head.peel_to_commit().ok())
      .into_iter()
      .collect();
    let parent_refs: Vec<&Commit> = parents.iter().collect();
    repo
      .commit(Some("HEAD"), &sig, &sig, "commit", &tree, &parent_refs)
      .expect("commit");
  }

  #[test]
  fn test_discover_repo_root() {
    let (_temp_dir, root, _repo) = init_repo();
    let nested = root.join("src");
    std::fs::create_dir_all(&nested).expect("create dir");

    let found = discover_repo_root(&nested).expect("discover");
    assert_eq!(found, Some(root));
  }

  #[test]
  fn test_discover_repo_root_outside_repo() {
    let temp_dir = TempDir::new().expect("create temp dir");
    // A temp dir may itself live inside a repository on some machines.
    if Repository::discover(temp_dir.path()).is_err() {
      assert_eq!(discover_repo_root(temp_dir.path()).expect("discover"), None);
    }
  }

  #[test]
  fn test_tracked_and_staged_files() {
    let (_temp_dir, root, repo) = init_repo();
    std::fs::write(root.join("committed.py"), "x = 1\n").expect("write");
    commit_all(&repo, "First", 1_700_000_000);

    std::fs::write(root.join("staged.py"), "y = 2\n").expect("write");
    stage(&repo);
    std::fs::write(root.join("untracked.py"), "z = 3\n").expect("write");

    let tracked = tracked_files(&root).expect("tracked");
    assert!(tracked.contains(&root.join("committed.py")));
    assert!(tracked.contains(&root.join("staged.py")));
    assert!(!tracked.contains(&root.join("untracked.py")));

    let staged = staged_files(&root).expect("staged");
    assert_eq!(staged, HashSet::from([root.join("staged.py")]));
  }

  #[test]
  fn test_staged_files_with_unborn_head() {
    let (_temp_dir, root, repo) = init_repo();
    std::fs::write(root.join("a.py"), "a = 1\n").expect("write");
    stage(&repo);

    let staged = staged_files(&root).expect("staged");
    assert!(staged.contains(&root.join("a.py")));
  }

  #[test]
  fn test_metadata_from_last_commit() {
    let (_temp_dir, root, repo) = init_repo();
    std::fs::write(root.join("a.py"), "a = 1\n").expect("write");
    std::fs::write(root.join("b.py"), "b = 1\n").expect("write");
    commit_all(&repo, "Alice", 1_700_000_000);
    std::fs::write(root.join("b.py"), "b = 2\n").expect("write");
    commit_all(&repo, "Bob", 1_700_086_400);

    let provider = GitMetadataProvider::discover(&root).expect("provider");

    let a = provider.metadata_for(&root.join("a.py"));
    assert_eq!(a.author.as_deref(), Some("Alice"));
    assert_eq!(a.email.as_deref(), Some("author@example.com"));
    assert_eq!(a.date.map(|d| d.timestamp()), Some(1_700_000_000));
    assert_eq!(a.date.map(|d| d.offset().local_minus_utc()), Some(3600));

    let b = provider.metadata_for(&root.join("b.py"));
    assert_eq!(b.author.as_deref(), Some("Bob"));
  }

  #[test]
  fn test_metadata_falls_back_to_config() {
    let (_temp_dir, root, _repo) = init_repo();
    std::fs::write(root.join("new.py"), "x = 1\n").expect("write");

    let provider = GitMetadataProvider::discover(&root).expect("provider");
    let metadata = provider.metadata_for(&root.join("new.py"));
    assert_eq!(metadata.author.as_deref(), Some("Config User"));
    assert_eq!(metadata.email.as_deref(), Some("config@example.com"));
    assert_eq!(metadata.date, None);
  }

  #[test]
  fn test_no_metadata() {
    assert_eq!(NoMetadata.metadata_for(Path::new("a.py")), FileMetadata::default());
  }
}
