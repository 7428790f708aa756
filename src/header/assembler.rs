//! # Content Assembler
//!
//! The only place final file text is produced. Joins preamble, header and
//! body with a fixed layout:
//!
//! ```text
//! <preamble lines>
//! <header lines>
//! <blank line>        (only when the body is non-empty)
//! <body lines>
//! ```
//!
//! followed by exactly one trailing newline.

use super::composer::HeaderBlock;

pub fn assemble(preamble: &[&str], header: &HeaderBlock, body: &[&str]) -> String {
  let body = trim_blank_edges(body);

  let mut text = String::new();
  for line in preamble {
    text.push_str(line);
    text.push('\n');
  }

  text.push_str(&header.text());

  if body.is_empty() {
    text.push('\n');
  } else {
    text.push_str("\n\n");
    text.push_str(&body.join("\n"));
  }

  let content_len = text.trim_end_matches(['\n', '\r']).len();
  text.truncate(content_len);
  text.push('\n');
  text
}

/// Drops blank lines from both ends of the body.
fn trim_blank_edges<'l, 'a>(body: &'l [&'a str]) -> &'l [&'a str] {
  let is_content = |line: &&str| !line.trim().is_empty();
  match (body.iter().position(is_content), body.iter().rposition(is_content)) {
    (Some(first), Some(last)) => &body[first..=last],
    _ => &[],
  }
}
