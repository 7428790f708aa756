//! # Header Detector
//!
//! Decides whether the top of a file body already carries a header and, if
//! so, which lines belong to it.
//!
//! Detection is driven by the file's own comment dialect: a header exists only
//! when one of the first two lines is a comment whose text opens with a path
//! label (`File:`, `Filename:`, `Source:`, `Path:` or `@file`). Ordinary
//! comments without such a label are never treated as a header.
//!
//! Whether a detected header can be rewritten safely is a separate question,
//! answered by [`classify_header_style`].

use std::sync::LazyLock;

use regex::Regex;

use crate::dialect::CommentDialect;

/// Number of leading lines checked for the path label.
const PRIMARY_WINDOW: usize = 2;

/// Upper bound on the number of lines a header may span.
pub const MAX_HEADER_LINES: usize = 10;

/// Path label directly after the comment marker and at most one space.
static PATH_LABEL: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)^ ?(?:file:|filename:|source:|path:|@file\b)").expect("path label regex must compile")
});

/// A header block found at the top of a file body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingHeaderSpan {
  /// Index of the first header line
  pub start_line: usize,
  /// Index of the last header line (inclusive)
  pub end_line: usize,
  /// The header lines as they appear in the file
  pub raw_lines: Vec<String>,
}

/// How an existing header lays out its comment markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStyle {
  /// One line comment per line (`# ...`, `// ...`).
  LineComments,
  /// One self-closing block comment per line (`/* ... */`).
  BlockPerLine,
  /// A block comment opened on the first line and closed on a later one.
  MultiLineBlock,
}

/// Whether `line` is a comment whose text opens with a path label.
pub fn is_header_indicator(line: &str, dialect: &CommentDialect) -> bool {
  dialect
    .strip_start(line.trim())
    .is_some_and(|rest| PATH_LABEL.is_match(rest))
}

/// Whether the lines from `start_index` open with a header.
pub fn has_header(lines: &[&str], dialect: &CommentDialect, start_index: usize) -> bool {
  find_header_span(lines, dialect, start_index).is_some()
}

/// Locates the header block beginning at `start_index`.
///
/// The span covers the labelled line, a comment line directly above it, and
/// the comment lines that follow, up to [`MAX_HEADER_LINES`]. A blank line or
/// a non-comment line ends it. For block dialects a comment opened on the
/// labelled line extends the span to its closing marker.
///
/// # Returns
///
/// `None` when no path label is found; the caller must then leave every line
/// untouched.
pub fn find_header_span(lines: &[&str], dialect: &CommentDialect, start_index: usize) -> Option<ExistingHeaderSpan> {
  let window = lines.get(start_index..)?;
  let indicator = (0..PRIMARY_WINDOW.min(window.len())).find(|&i| is_header_indicator(window[i], dialect))?;

  let block_start = if indicator == 0 {
    0
  } else if window[0].trim().is_empty() {
    indicator
  } else if dialect.is_comment_line(window[0]) {
    0
  } else {
    return None;
  };

  let limit = (block_start + MAX_HEADER_LINES).min(window.len());
  let mut end = indicator;

  if dialect.is_block() && !opens_and_closes(window[indicator], dialect) {
    // Multi-line block: run to the first line holding the closer, or to the
    // bound if there is none.
    end = (indicator + 1..limit)
      .find(|&i| window[i].contains(dialect.end.as_str()))
      .unwrap_or(limit.saturating_sub(1).max(indicator));
  }

  while end + 1 < limit {
    let next = window[end + 1];
    if next.trim().is_empty() || !dialect.is_comment_line(next) {
      break;
    }
    if dialect.is_block() && !opens_and_closes(next, dialect) {
      break;
    }
    end += 1;
  }

  Some(ExistingHeaderSpan {
    start_line: start_index + block_start,
    end_line: start_index + end,
    raw_lines: window[block_start..=end].iter().map(|line| (*line).to_string()).collect(),
  })
}

/// Identifies the marker layout of a detected header.
///
/// # Returns
///
/// `None` when the start and end markers cannot be matched up with
/// confidence: a block left unclosed within the span, a closer that appears
/// on the wrong line, or code following a closer on the same line. Such a
/// header is left alone.
pub fn classify_header_style(raw_lines: &[String], dialect: &CommentDialect) -> Option<HeaderStyle> {
  if !dialect.is_block() {
    return raw_lines
      .iter()
      .all(|line| dialect.is_comment_line(line))
      .then_some(HeaderStyle::LineComments);
  }

  let first = raw_lines.first()?;
  if opens_and_closes(first, dialect) {
    return raw_lines
      .iter()
      .all(|line| opens_and_closes(line, dialect) && closer_ends_line(line, dialect))
      .then_some(HeaderStyle::BlockPerLine);
  }

  // The closer may appear only once, at the end of the block's last line.
  // Trailing self-contained comments after it are allowed.
  let closing = raw_lines.iter().position(|line| line.contains(dialect.end.as_str()))?;
  let body_is_clean = raw_lines[..closing]
    .iter()
    .all(|line| !line.contains(dialect.end.as_str()));
  let tail_is_clean = raw_lines[closing + 1..]
    .iter()
    .all(|line| opens_and_closes(line, dialect) && closer_ends_line(line, dialect));

  (body_is_clean && closer_ends_line(&raw_lines[closing], dialect) && tail_is_clean)
    .then_some(HeaderStyle::MultiLineBlock)
}

/// Counts how many lines at `start_index` match the layout of a rendered
/// multi-line header: blank where the header is blank, a comment elsewhere.
pub fn match_template_layout(
  lines: &[&str],
  dialect: &CommentDialect,
  start_index: usize,
  header_lines: &[String],
) -> Option<usize> {
  let window = lines.get(start_index..)?;
  if header_lines.is_empty() || window.len() < header_lines.len() {
    return None;
  }

  let matches = header_lines.iter().zip(window).all(|(expected, actual)| {
    if expected.trim().is_empty() {
      actual.trim().is_empty()
    } else {
      dialect.is_comment_line(actual) && (!dialect.is_block() || opens_and_closes(actual, dialect))
    }
  });

  matches.then_some(header_lines.len())
}

/// A line that both opens and closes a block comment.
fn opens_and_closes(line: &str, dialect: &CommentDialect) -> bool {
  dialect
    .strip_start(line.trim())
    .is_some_and(|rest| rest.contains(dialect.end.as_str()))
}

/// Nothing but whitespace follows the last closer on the line.
fn closer_ends_line(line: &str, dialect: &CommentDialect) -> bool {
  line.trim_end().ends_with(dialect.end.as_str())
}
