//! # Header Module
//!
//! The header-rewriting engine. Given a file's text, its classification and a
//! freshly composed header, [`rewrite`] produces the new text:
//!
//! 1. split off the structural preamble ([`preamble`])
//! 2. look for an existing header right after it ([`detector`])
//! 3. merge the old header's metadata into the new one, or let a template
//!    replace it ([`merger`])
//! 4. stitch everything back together ([`assembler`])
//!
//! Applying [`rewrite`] to its own output yields the same text.

pub mod assembler;
pub mod composer;
pub mod detector;
pub mod merger;
pub mod preamble;

pub use assembler::assemble;
pub use composer::{HeaderBlock, HeaderComposer, HeaderMode, PathInfo, TemplateVariables};
pub use detector::{ExistingHeaderSpan, HeaderStyle, find_header_span, has_header};
pub use merger::merge;
pub use preamble::{FileShape, extract_preamble};

use tracing::trace;

use crate::dialect::FileClassification;

/// Result of rewriting a file's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
  /// The new file text. It may equal the input.
  Content(String),
  /// A header exists but its comment markers cannot be matched up safely.
  AmbiguousHeader,
}

/// UTF-8 byte-order mark.
const BOM: char = '\u{feff}';

/// Rewrites `content` so that it carries `header`.
///
/// A leading byte-order mark stays at the very start of the file.
pub fn rewrite(content: &str, classification: &FileClassification, header: &HeaderBlock) -> Rewrite {
  let Some(text) = content.strip_prefix(BOM) else {
    return rewrite_text(content, classification, header);
  };
  match rewrite_text(text, classification, header) {
    Rewrite::Content(body) => Rewrite::Content(format!("{BOM}{body}")),
    Rewrite::AmbiguousHeader => Rewrite::AmbiguousHeader,
  }
}

fn rewrite_text(content: &str, classification: &FileClassification, header: &HeaderBlock) -> Rewrite {
  let lines: Vec<&str> = content.lines().collect();
  let (preamble, rest) = extract_preamble(&lines, classification);
  let dialect = &classification.dialect;

  let Some(span) = find_header_span(rest, dialect, 0) else {
    // A template without a path label cannot be detected; recognize an exact
    // copy of it instead of stacking a second one on top.
    let existing = if header.is_template() { exact_prefix_len(rest, &header.lines) } else { 0 };
    return Rewrite::Content(assemble(preamble, header, &rest[existing..]));
  };

  if detector::classify_header_style(&span.raw_lines, dialect).is_none() {
    return Rewrite::AmbiguousHeader;
  }

  let (block, end_line) = if header.is_template() {
    let end_line = detector::match_template_layout(rest, dialect, span.start_line, &header.lines)
      .map_or(span.end_line, |len| span.end_line.max(span.start_line + len - 1));
    (header.clone(), end_line)
  } else {
    (merge(&span, header, dialect), span.end_line)
  };

  trace!("Replacing header lines {}..={}", span.start_line, end_line);
  Rewrite::Content(assemble(preamble, &block, &rest[end_line + 1..]))
}

fn exact_prefix_len(lines: &[&str], header_lines: &[String]) -> usize {
  let matches = lines.len() >= header_lines.len()
    && lines
      .iter()
      .zip(header_lines)
      .all(|(line, expected)| line.trim_end() == expected.as_str());
  if matches { header_lines.len() } else { 0 }
}
