//! # File Filter Module
//!
//! This module contains components for deciding which files are eligible for
//! a header: ignored names and patterns, document types, binary content, and
//! an optional restriction to git-tracked or staged files.
//!
//! Ignored directories are not filtered here; the processor prunes them while
//! walking so their contents are never visited.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::warn;

use crate::config::{CONFIG_FILENAMES, FileConfig};
use crate::dialect::tables::{DOCUMENT_EXTENSIONS, IGNORED_FILES};
use crate::dialect::{extension_of, is_binary_extension, is_special_file};
use crate::processor::{FileIO, SNIFF_READ_LIMIT, looks_binary};
use crate::verbose_log;

/// Built-in name patterns for legal boilerplate files.
const IGNORED_FILE_PATTERNS: &[&str] = &["LICENSE*", "LICENCE*", "COPYING*", "NOTICE*"];

/// Result of a file filtering operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterResult {
  /// Whether the file should be processed
  pub should_process: bool,
  /// Reason why the file should not be processed (if any)
  pub reason: Option<String>,
}

impl FilterResult {
  /// Creates a new FilterResult indicating the file should be processed.
  pub const fn process() -> Self {
    Self {
      should_process: true,
      reason: None,
    }
  }

  /// Creates a new FilterResult indicating the file should be skipped.
  pub fn skip(reason: impl Into<String>) -> Self {
    Self {
      should_process: false,
      reason: Some(reason.into()),
    }
  }
}

/// Trait for components that filter files based on certain criteria.
pub trait FileFilter: Send + Sync {
  /// Determines whether a file should be processed.
  ///
  /// # Parameters
  ///
  /// * `path` - The path to the file to check
  ///
  /// # Returns
  ///
  /// A `FilterResult` indicating whether the file should be processed and why
  /// not if applicable.
  fn should_process(&self, path: &Path) -> Result<FilterResult>;
}

fn file_name_of(path: &Path) -> String {
  path
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_default()
}

/// Filter that excludes ignored file names and glob patterns.
///
/// Patterns are matched against the file name and against the path relative
/// to the project root, so both `*.min.js` and `src/generated/*.py` work.
pub struct IgnoredFileFilter {
  root: PathBuf,
  names: HashSet<String>,
  patterns: Vec<glob::Pattern>,
}

impl IgnoredFileFilter {
  /// Creates a filter from the built-in ignore list plus `extra` entries.
  pub fn new(root: &Path, extra: &[String]) -> Self {
    let mut names: HashSet<String> = IGNORED_FILES
      .iter()
      .chain(CONFIG_FILENAMES)
      .map(|name| (*name).to_string())
      .collect();
    let mut patterns: Vec<glob::Pattern> = IGNORED_FILE_PATTERNS
      .iter()
      .filter_map(|pattern| glob::Pattern::new(pattern).ok())
      .collect();

    for entry in extra {
      names.insert(entry.clone());
      if entry.contains(['*', '?', '[']) {
        match glob::Pattern::new(entry) {
          Ok(pattern) => patterns.push(pattern),
          Err(e) => warn!("Invalid ignore pattern '{}': {}", entry, e),
        }
      }
    }

    Self {
      root: root.to_path_buf(),
      names,
      patterns,
    }
  }
}

impl FileFilter for IgnoredFileFilter {
  fn should_process(&self, path: &Path) -> Result<FilterResult> {
    let name = file_name_of(path);
    let relative = path.strip_prefix(&self.root).unwrap_or(path);

    if self.names.contains(&name) {
      verbose_log!("Skipping: {} (ignored file)", path.display());
      return Ok(FilterResult::skip("ignored file"));
    }

    if self
      .patterns
      .iter()
      .any(|pattern| pattern.matches(&name) || pattern.matches_path(relative))
    {
      verbose_log!("Skipping: {} (matches ignore pattern)", path.display());
      return Ok(FilterResult::skip("matches ignore pattern"));
    }

    Ok(FilterResult::process())
  }
}

/// Filter that excludes documentation and data files such as `README.md` or
/// `data.json`, except for special files like `requirements.txt` and types
/// given a custom comment style in configuration.
pub struct DocumentFilter {
  allowed: HashSet<String>,
}

impl DocumentFilter {
  pub fn new(files: &FileConfig) -> Self {
    let allowed = files
      .custom_patterns
      .keys()
      .map(|ext| ext.to_lowercase())
      .chain(files.custom_filenames.keys().cloned())
      .collect();
    Self { allowed }
  }
}

impl FileFilter for DocumentFilter {
  fn should_process(&self, path: &Path) -> Result<FilterResult> {
    let name = file_name_of(path);
    let Some(ext) = extension_of(&name) else {
      return Ok(FilterResult::process());
    };

    let is_document = DOCUMENT_EXTENSIONS.contains(&ext.as_str())
      && !is_special_file(&name)
      && !self.allowed.contains(&ext)
      && !self.allowed.contains(&name);

    if is_document {
      verbose_log!("Skipping: {} (document file)", path.display());
      Ok(FilterResult::skip("document file"))
    } else {
      Ok(FilterResult::process())
    }
  }
}

/// Filter that excludes binary files by extension or by a null byte in the
/// first kilobyte.
pub struct BinaryFilter;

impl FileFilter for BinaryFilter {
  fn should_process(&self, path: &Path) -> Result<FilterResult> {
    let name = file_name_of(path);
    if extension_of(&name).is_some_and(|ext| is_binary_extension(&ext)) {
      verbose_log!("Skipping: {} (binary extension)", path.display());
      return Ok(FilterResult::skip("binary file"));
    }

    let prefix = FileIO::read_prefix(path, SNIFF_READ_LIMIT)?;
    if looks_binary(&prefix) {
      verbose_log!("Skipping: {} (binary content)", path.display());
      return Ok(FilterResult::skip("binary file"));
    }

    Ok(FilterResult::process())
  }
}

/// Filter restricting processing to a set of files reported by git.
pub struct GitFileSetFilter {
  files: HashSet<PathBuf>,
  reason: &'static str,
}

impl GitFileSetFilter {
  /// Only files tracked in the index.
  pub const fn tracked(files: HashSet<PathBuf>) -> Self {
    Self {
      files,
      reason: "not tracked by git",
    }
  }

  /// Only files staged for commit.
  pub const fn staged(files: HashSet<PathBuf>) -> Self {
    Self {
      files,
      reason: "not staged",
    }
  }
}

impl FileFilter for GitFileSetFilter {
  fn should_process(&self, path: &Path) -> Result<FilterResult> {
    if self.files.contains(path) {
      Ok(FilterResult::process())
    } else {
      Ok(FilterResult::skip(self.reason))
    }
  }
}

/// Filter that combines multiple filters.
pub struct CompositeFilter {
  filters: Vec<Box<dyn FileFilter>>,
}

impl CompositeFilter {
  /// Creates a new CompositeFilter with the given filters.
  pub fn new(filters: Vec<Box<dyn FileFilter>>) -> Self {
    Self { filters }
  }

  /// Adds a filter to this CompositeFilter.
  pub fn add_filter(&mut self, filter: Box<dyn FileFilter>) {
    self.filters.push(filter);
  }
}

impl FileFilter for CompositeFilter {
  fn should_process(&self, path: &Path) -> Result<FilterResult> {
    for filter in &self.filters {
      let result = filter.should_process(path)?;
      if !result.should_process {
        return Ok(result);
      }
    }
    Ok(FilterResult::process())
  }
}

/// Constructs the eligibility filter for a run.
///
/// Cheap name checks run first and the binary sniff, which reads the file,
/// runs last.
///
/// # Parameters
///
/// * `root` - Project root, for relative ignore patterns
/// * `files` - File selection settings from configuration
/// * `git_files` - Optional restriction to tracked or staged files
pub fn create_default_filter(root: &Path, files: &FileConfig, git_files: Option<GitFileSetFilter>) -> CompositeFilter {
  let mut filters: Vec<Box<dyn FileFilter>> = vec![Box::new(IgnoredFileFilter::new(root, &files.ignored_files))];
  if let Some(git_files) = git_files {
    filters.push(Box::new(git_files));
  }
  filters.push(Box::new(DocumentFilter::new(files)));
  filters.push(Box::new(BinaryFilter));
  CompositeFilter::new(filters)
}
