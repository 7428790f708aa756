//! # Diff Module
//!
//! This module renders line diffs between a file's original and annotated
//! content. It backs `--show-diff` (coloured, to stderr) and `--save-diff`
//! (plain, appended to one consolidated file).

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};
use similar::{ChangeTag, TextDiff};

/// Manages diff creation and rendering for header changes.
///
/// This struct handles:
/// - Generating diffs between original and modified content
/// - Displaying diffs to stderr with colorization
/// - Saving diffs to a file
pub struct DiffManager {
  /// Whether to print diffs to stderr
  pub show_diff: bool,

  /// Path to append diffs to
  pub save_diff_path: Option<PathBuf>,
}

impl DiffManager {
  /// Creates a new DiffManager with the specified configuration.
  ///
  /// # Parameters
  ///
  /// * `show_diff` - Whether to print diffs to stderr
  /// * `save_diff_path` - Path to save the diffs to
  pub const fn new(show_diff: bool, save_diff_path: Option<PathBuf>) -> Self {
    Self {
      show_diff,
      save_diff_path,
    }
  }

  /// Whether any diff output is requested.
  pub const fn is_enabled(&self) -> bool {
    self.show_diff || self.save_diff_path.is_some()
  }

  /// Truncates the save file so a run starts with an empty diff.
  ///
  /// # Errors
  ///
  /// Returns an error if the save file cannot be created.
  pub fn init(&self) -> Result<()> {
    if let Some(ref diff_path) = self.save_diff_path {
      std::fs::write(diff_path, "").with_context(|| format!("Failed to create diff file: {}", diff_path.display()))?;
    }
    Ok(())
  }

  /// Displays and/or saves a diff between the original and new content.
  ///
  /// # Parameters
  ///
  /// * `path` - Path of the file, as shown in the diff header
  /// * `original` - Original file content
  /// * `new` - New file content with the header
  ///
  /// # Errors
  ///
  /// Returns an error if the save file cannot be opened or written.
  pub fn display_diff(&self, path: &Path, original: &str, new: &str) -> Result<()> {
    let diff = TextDiff::from_lines(original, new);
    let display_path = path.display();

    let mut diff_content = format!("--- a/{display_path}\n+++ b/{display_path}\n");
    if self.show_diff {
      eprint!("{}", diff_content.if_supports_color(Stream::Stderr, |s| s.bold()));
    }

    for change in diff.iter_all_changes() {
      let sign = match change.tag() {
        ChangeTag::Delete => "-",
        ChangeTag::Insert => "+",
        ChangeTag::Equal => " ",
      };
      let mut line = format!("{sign}{change}");
      if change.missing_newline() {
        line.push('\n');
      }

      if self.show_diff {
        match change.tag() {
          ChangeTag::Delete => eprint!("{}", line.if_supports_color(Stream::Stderr, |s| s.red())),
          ChangeTag::Insert => eprint!("{}", line.if_supports_color(Stream::Stderr, |s| s.green())),
          ChangeTag::Equal => eprint!("{line}"),
        }
      }

      diff_content.push_str(&line);
    }

    if self.show_diff {
      eprintln!();
    }
    diff_content.push('\n');

    if let Some(ref diff_path) = self.save_diff_path {
      let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(diff_path)
        .with_context(|| format!("Failed to open diff file: {}", diff_path.display()))?;
      file
        .write_all(diff_content.as_bytes())
        .with_context(|| format!("Failed to write diff file: {}", diff_path.display()))?;
    }

    Ok(())
  }
}
