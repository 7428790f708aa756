//! # File Collector Module
//!
//! This module walks a directory tree depth-first, pruning ignored
//! directories, and returns the regular files found in a stable order.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, error};
use walkdir::{DirEntry, WalkDir};

use crate::dialect::tables::IGNORED_DIRECTORIES;

/// File collector for directory traversal.
///
/// Directories are matched by name (`node_modules`) or, for entries containing
/// a slash, by their path relative to the walk root (`docs/generated`).
pub struct FileCollector {
  ignored_names: HashSet<String>,
  ignored_paths: HashSet<PathBuf>,
}

impl FileCollector {
  /// Creates a collector pruning the built-in directories plus `extra`.
  pub fn new(extra: &[String]) -> Self {
    let mut ignored_names: HashSet<String> = IGNORED_DIRECTORIES.iter().map(|name| (*name).to_string()).collect();
    let mut ignored_paths = HashSet::new();

    for entry in extra {
      let trimmed = entry.trim_end_matches('/');
      if trimmed.contains('/') {
        ignored_paths.insert(PathBuf::from(trimmed));
      } else {
        ignored_names.insert(trimmed.to_string());
      }
    }

    Self {
      ignored_names,
      ignored_paths,
    }
  }

  fn is_ignored_dir(&self, entry: &DirEntry, root: &Path) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
      return false;
    }

    let by_name = entry
      .file_name()
      .to_str()
      .is_some_and(|name| self.ignored_names.contains(name));
    let by_path = entry
      .path()
      .strip_prefix(root)
      .is_ok_and(|relative| self.ignored_paths.contains(relative));

    by_name || by_path
  }

  /// Traverses a directory recursively and collects all regular files.
  ///
  /// Symlinks are not followed. Unreadable directories are logged and
  /// skipped; their siblings are still visited.
  ///
  /// # Parameters
  ///
  /// * `dir` - The directory to traverse
  ///
  /// # Returns
  ///
  /// The files found, in depth-first order sorted by name within each
  /// directory.
  pub fn traverse_directory(&self, dir: &Path) -> Vec<PathBuf> {
    debug!("Scanning directory: {}", dir.display());
    let start_time = std::time::Instant::now();

    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
      .sort_by(|a, b| a.file_name().cmp(b.file_name()))
      .into_iter()
      .filter_entry(|entry| {
        let ignored = self.is_ignored_dir(entry, dir);
        if ignored {
          debug!("Pruning ignored directory: {}", entry.path().display());
        }
        !ignored
      });

    for entry in walker {
      match entry {
        Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
        Ok(_) => {}
        Err(e) => {
          let location = e.path().map_or_else(|| dir.display().to_string(), |p| p.display().to_string());
          error!("Error reading directory {}: {}", location, e);
        }
      }
    }

    debug!("Found {} files in {}ms", files.len(), start_time.elapsed().as_millis());
    files
  }
}
