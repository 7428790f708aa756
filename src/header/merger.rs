//! # Header Merger
//!
//! Carries metadata from an existing header into a freshly composed one so
//! that lines such as `Author:` or `Version:` survive a path change.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::composer::HeaderBlock;
use super::detector::ExistingHeaderSpan;
use crate::dialect::CommentDialect;

/// A path keyword closer to the start than this marks a path line.
const PATH_KEYWORD_WINDOW: usize = 15;

/// Longest text before a colon still read as a `Label:` prefix.
const MAX_LABEL_LEN: usize = 30;

static PATH_KEYWORD: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)file:|filename:|source:|path:|@file").expect("path keyword regex must compile"));

/// Whether stripped header text names the file's path.
pub fn is_path_line(text: &str) -> bool {
  PATH_KEYWORD
    .find(text)
    .is_some_and(|found| found.start() < PATH_KEYWORD_WINDOW)
}

/// Merges an existing header into a newly composed default-mode header.
///
/// The new lines come first. Every other non-empty line of the old header
/// follows in its original order, re-wrapped in the dialect's markers, unless
/// it is a path line, repeats a label the new header already supplies, or
/// duplicates a line already kept. Template headers replace the old header
/// outright and are returned unchanged.
pub fn merge(existing: &ExistingHeaderSpan, new_header: &HeaderBlock, dialect: &CommentDialect) -> HeaderBlock {
  if new_header.is_template() {
    return new_header.clone();
  }

  let mut seen: HashSet<String> = HashSet::new();
  let mut supplied_labels: HashSet<String> = HashSet::new();
  for line in &new_header.lines {
    let text = dialect.strip_markers(line);
    seen.insert(text.to_string());
    if let Some(label) = label_of(text) {
      supplied_labels.insert(label);
    }
  }

  let mut lines = new_header.lines.clone();
  for raw in &existing.raw_lines {
    let text = dialect.strip_markers(raw);
    if text.is_empty() || is_path_line(text) {
      continue;
    }
    if label_of(text).is_some_and(|label| supplied_labels.contains(&label)) {
      continue;
    }
    if seen.insert(text.to_string()) {
      lines.push(dialect.format_line(text));
    }
  }

  HeaderBlock {
    lines,
    mode: new_header.mode,
  }
}

/// Lowercase label of a `Label: value` line.
fn label_of(text: &str) -> Option<String> {
  let (label, _) = text.split_once(':')?;
  let label = label.trim();
  let plausible = !label.is_empty()
    && label.len() <= MAX_LABEL_LEN
    && label.chars().all(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'));
  plausible.then(|| label.to_lowercase())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::header::composer::HeaderMode;

  fn span(lines: &[&str]) -> ExistingHeaderSpan {
    ExistingHeaderSpan {
      start_line: 0,
      end_line: lines.len().saturating_sub(1),
      raw_lines: lines.iter().map(|line| (*line).to_string()).collect(),
    }
  }

  fn default_header(lines: &[&str]) -> HeaderBlock {
    HeaderBlock {
      lines: lines.iter().map(|line| (*line).to_string()).collect(),
      mode: HeaderMode::Default,
    }
  }

  #[test]
  fn test_metadata_preserved_in_order() {
    let dialect = CommentDialect::new("#", "");
    let existing = span(&["# File: old.py", "# Author: John Doe", "# Version: 1.0"]);
    let merged = merge(&existing, &default_header(&["# File: new.py"]), &dialect);
    assert_eq!(merged.lines, vec!["# File: new.py", "# Author: John Doe", "# Version: 1.0"]);
  }

  #[test]
  fn test_no_doubled_closer() {
    let dialect = CommentDialect::new("/*", "*/");
    let existing = span(&["/* File: old.css */", "/* Author: Jane */"]);
    let merged = merge(&existing, &default_header(&["/* File: new.css */"]), &dialect);
    assert_eq!(merged.lines, vec!["/* File: new.css */", "/* Author: Jane */"]);
    assert!(!merged.text().contains("*/ */"));
  }

  #[test]
  fn test_multi_line_block_flattened() {
    let dialect = CommentDialect::new("/*", "*/");
    let existing = span(&[
      "/* Source: styles.css",
      " * Description: Main stylesheet for the application",
      " * Author: Design Team",
      " */",
    ]);
    let merged = merge(&existing, &default_header(&["/* File: legacy/styles.css */"]), &dialect);
    assert_eq!(
      merged.lines,
      vec![
        "/* File: legacy/styles.css */",
        "/* Description: Main stylesheet for the application */",
        "/* Author: Design Team */",
      ]
    );
  }

  #[test]
  fn test_new_labels_supersede_old_ones() {
    let dialect = CommentDialect::new("#", "");
    let existing = span(&["# File: a.py", "# Author: Old Name", "# License: MIT"]);
    let merged = merge(
      &existing,
      &default_header(&["# File: a.py", "# Author: New Name"]),
      &dialect,
    );
    assert_eq!(merged.lines, vec!["# File: a.py", "# Author: New Name", "# License: MIT"]);
  }

  #[test]
  fn test_duplicates_dropped() {
    let dialect = CommentDialect::new("//", "");
    let existing = span(&["// File: a.js", "// Reviewed", "// Reviewed"]);
    let merged = merge(&existing, &default_header(&["// File: a.js"]), &dialect);
    assert_eq!(merged.lines, vec!["// File: a.js", "// Reviewed"]);
  }

  #[test]
  fn test_path_keyword_window() {
    assert!(is_path_line("File: a.py"));
    assert!(is_path_line("Original Path: a.py"));
    assert!(is_path_line("@file a.rb"));
    assert!(!is_path_line("Notes: see the config file: settings.yaml"));
    assert!(!is_path_line("Author: Jane"));
  }

  #[test]
  fn test_template_bypasses_merge() {
    let dialect = CommentDialect::new("#", "");
    let existing = span(&["# File: a.py", "# Old comment"]);
    let template = HeaderBlock {
      lines: vec!["# File: a.py".to_string(), "# Author: Jane".to_string()],
      mode: HeaderMode::Template,
    };
    assert_eq!(merge(&existing, &template, &dialect), template);
  }
}
