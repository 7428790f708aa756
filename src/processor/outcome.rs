//! # Processing Outcomes
//!
//! The result of processing one file and the run totals built from them.

use std::fmt;

/// Why a file was left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
  /// No comment dialect is known for the file.
  Unsupported,
  /// The eligibility filter rejected the file.
  Excluded(String),
  /// The content is neither UTF-8 nor plain Latin-1 text.
  Decode,
  /// A header exists but its markers cannot be matched up safely.
  AmbiguousHeader,
  /// Reading or writing failed.
  Io(String),
}

impl fmt::Display for SkipReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Unsupported => write!(f, "unsupported file type"),
      Self::Excluded(reason) => write!(f, "excluded: {reason}"),
      Self::Decode => write!(f, "cannot decode content"),
      Self::AmbiguousHeader => write!(f, "existing header cannot be parsed"),
      Self::Io(message) => write!(f, "I/O error: {message}"),
    }
  }
}

/// What happened to a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingOutcome {
  /// The content changed (and was written unless this is a dry run).
  Modified,
  /// The file already carries the expected header.
  Unchanged,
  Skipped(SkipReason),
}

/// Counts accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
  pub modified: usize,
  pub skipped: usize,
  pub unchanged: usize,
}

impl RunStats {
  pub const fn record(&mut self, outcome: &ProcessingOutcome) {
    match outcome {
      ProcessingOutcome::Modified => self.modified += 1,
      ProcessingOutcome::Unchanged => self.unchanged += 1,
      ProcessingOutcome::Skipped(_) => self.skipped += 1,
    }
  }

  pub const fn total(&self) -> usize {
    self.modified + self.skipped + self.unchanged
  }
}
