//! # Output Module
//!
//! This module centralizes all user-facing output for annot8.
//! It provides consistent formatting, colors, and symbols for terminal output.
//!
//! ## Design Goals
//!
//! - **Informative**: Show actionable information without requiring flags
//! - **Progressive**: More detail with `-v`, silence with `-q`
//! - **Scriptable**: Keep stdout predictable for piping/automation

use std::path::Path;

use owo_colors::{OwoColorize, Stream};

use crate::backup::RevertStats;
use crate::logging::{is_quiet, is_verbose};
use crate::processor::RunStats;

/// Symbols used in output
pub mod symbols {
  /// Success
  pub const SUCCESS: &str = "\u{2713}"; // ✓
  /// Failure
  pub const FAILURE: &str = "\u{2717}"; // ✗
  /// Modified / reverted
  pub const UPDATED: &str = "\u{21bb}"; // ↻
}

/// Maximum number of files to show in the default output before truncating
const DEFAULT_FILE_LIST_LIMIT: usize = 20;

/// Print the initial "Annotating <dir>..." message.
pub fn print_start_message(root: &Path, dry_run: bool) {
  if is_quiet() {
    return;
  }

  let verb = if dry_run { "Checking" } else { "Annotating" };
  println!("{} files in {}...", verb, root.display());
}

/// Print a blank line for visual separation (respects quiet mode).
pub fn print_blank_line() {
  if !is_quiet() {
    println!();
  }
}

/// Print the files that received (or would receive) a header.
///
/// Shows up to `DEFAULT_FILE_LIST_LIMIT` files; in verbose mode, all of them.
/// In quiet mode only bare paths are printed, for scripting.
pub fn print_modified_files<P: AsRef<Path>>(files: &[P], root: &Path, dry_run: bool) {
  if files.is_empty() {
    return;
  }

  if is_quiet() {
    for file in files {
      println!("{}", make_relative_path(file.as_ref(), root));
    }
    return;
  }

  let count = files.len();
  let action = if dry_run { "Would annotate" } else { "Annotated" };
  println!(
    "{} {} {} {}:",
    symbols::UPDATED.if_supports_color(Stream::Stdout, |s| s.yellow()),
    action,
    count,
    if count == 1 { "file" } else { "files" }
  );

  let limit = if is_verbose() { count } else { DEFAULT_FILE_LIST_LIMIT };
  for file in files.iter().take(limit) {
    println!("  {}", make_relative_path(file.as_ref(), root));
  }

  if count > limit {
    println!(
      "  {} ... and {} more (use -v to see all)",
      "".if_supports_color(Stream::Stdout, |s| s.dimmed()),
      count - limit
    );
  }
}

/// Format the processing summary line.
///
/// Format: "Summary: X modified, Y unchanged, Z skipped"
pub fn format_summary(stats: &RunStats) -> String {
  let modified = if stats.modified > 0 {
    stats.modified.if_supports_color(Stream::Stdout, |s| s.yellow()).to_string()
  } else {
    stats.modified.if_supports_color(Stream::Stdout, |s| s.cyan()).to_string()
  };

  format!(
    "Summary: {} modified, {} unchanged, {} skipped",
    modified,
    stats.unchanged.if_supports_color(Stream::Stdout, |s| s.cyan()),
    stats.skipped.if_supports_color(Stream::Stdout, |s| s.dimmed())
  )
}

/// Print the processing summary.
pub fn print_summary(stats: &RunStats, dry_run: bool) {
  if is_quiet() {
    return;
  }

  let mut line = format_summary(stats);
  if dry_run {
    line.push_str(" (dry run)");
  }
  println!("{line}");
}

/// Print the result of `--revert`.
pub fn print_revert_summary(stats: &RevertStats, dry_run: bool) {
  if is_quiet() {
    return;
  }

  let symbol = if stats.errors > 0 {
    symbols::FAILURE.if_supports_color(Stream::Stdout, |s| s.red()).to_string()
  } else {
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()).to_string()
  };
  let verb = if dry_run { "Would revert" } else { "Reverted" };

  println!(
    "{} {} {} {}, {} missing, {} errors",
    symbol,
    verb,
    stats.reverted,
    if stats.reverted == 1 { "file" } else { "files" },
    stats.missing,
    stats.errors
  );
}

/// Print a hint for the user about what to do next.
pub fn print_hint(message: &str) {
  if is_quiet() {
    return;
  }

  println!("{}", message.if_supports_color(Stream::Stdout, |s| s.yellow()));
}

/// Make a path relative to the project root for display.
fn make_relative_path(path: &Path, root: &Path) -> String {
  path
    .strip_prefix(root)
    .map(|p| p.to_string_lossy().to_string())
    .unwrap_or_else(|_| path.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use super::*;

  #[test]
  fn test_format_summary() {
    owo_colors::set_override(false);
    let stats = RunStats {
      modified: 2,
      skipped: 1,
      unchanged: 5,
    };
    assert_eq!(format_summary(&stats), "Summary: 2 modified, 5 unchanged, 1 skipped");
    owo_colors::unset_override();
  }

  #[test]
  fn test_make_relative_path_with_root() {
    let path = PathBuf::from("/workspace/project/src/main.py");
    let root = PathBuf::from("/workspace/project");
    assert_eq!(make_relative_path(&path, &root), "src/main.py");
  }

  #[test]
  fn test_make_relative_path_outside_root() {
    let path = PathBuf::from("/elsewhere/main.py");
    let root = PathBuf::from("/workspace/project");
    assert_eq!(make_relative_path(&path, &root), "/elsewhere/main.py");
  }
}
