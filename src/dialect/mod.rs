//! # Dialect Module
//!
//! This module maps file names to the comment syntax used for their header
//! line. The mapping lives in a [`DialectRegistry`], built once at startup from
//! the built-in [`tables`] plus any overrides from configuration, and passed by
//! reference to the processor.
//!
//! Lookup order:
//! 1. exact file name (configured overrides, then built-in special files such
//!    as `Makefile` or `.gitignore`)
//! 2. extension (configured overrides, then the ordered built-in rules), with
//!    a content sniff for extensions shared by unrelated formats
//! 3. the first line of the file, if it opens with a bare comment marker
//!
//! ## Example
//!
//! ```rust
//! use annot8::dialect::DialectRegistry;
//!
//! let registry = DialectRegistry::new();
//! let classification = registry.classify("main.py", None).expect("python is supported");
//! assert_eq!(classification.dialect.format_line("File: main.py"), "# File: main.py");
//! ```

pub mod tables;

use std::collections::HashMap;
use std::path::Path;

use tracing::trace;

use crate::config::{CommentStyleConfig, FileConfig};
use tables::{
  BINARY_EXTENSIONS, EXTENSION_RULES, MULTI_SECTION_EXTENSIONS, SNIFFED_EXTENSIONS, SPECIAL_FILE_PREFIXES,
  SPECIAL_FILES, XML_LIKE_EXTENSIONS,
};

/// Number of leading lines inspected by content sniffing.
const SNIFF_LINES: usize = 5;

/// The comment markers used to write a header line.
///
/// `end` is empty for line comments (`#`, `//`) and set for block comments
/// (`/* */`, `<!-- -->`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommentDialect {
  pub start: String,
  pub end: String,
}

impl CommentDialect {
  pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
    Self {
      start: start.into(),
      end: end.into(),
    }
  }

  /// Whether this dialect closes each comment with an end marker.
  pub fn is_block(&self) -> bool {
    !self.end.is_empty()
  }

  /// Wraps `text` in this dialect's markers: `"{start} {text}"` or
  /// `"{start} {text} {end}"`.
  ///
  /// A trailing end marker already present in `text` is dropped first, so the
  /// result never carries a doubled closer.
  pub fn format_line(&self, text: &str) -> String {
    let text = self.trim_end_marker(text.trim());
    if self.is_block() {
      format!("{} {} {}", self.start, text, self.end)
    } else {
      format!("{} {}", self.start, text)
    }
  }

  /// Returns the rest of `text` after a leading start marker.
  ///
  /// Word markers such as `REM` match in any letter case and must not run
  /// into the following word.
  pub fn strip_start<'a>(&self, text: &'a str) -> Option<&'a str> {
    let is_word_marker = !self.start.is_empty() && self.start.chars().all(|c| c.is_ascii_alphabetic());
    if !is_word_marker {
      return text.strip_prefix(self.start.as_str());
    }

    let head = text.get(..self.start.len())?;
    let rest = &text[self.start.len()..];
    let joins_word = rest.starts_with(|c: char| c.is_alphanumeric() || c == '_');
    (head.eq_ignore_ascii_case(&self.start) && !joins_word).then_some(rest)
  }

  /// Whether `line` is a comment in this dialect, ignoring indentation.
  pub fn is_comment_line(&self, line: &str) -> bool {
    self.strip_start(line.trim_start()).is_some()
  }

  /// Returns the text of a comment line without its markers.
  ///
  /// Handles the start marker, a trailing end marker, and the `*` that
  /// decorates continuation lines of C-style and ML-style blocks.
  pub fn strip_markers<'a>(&self, line: &'a str) -> &'a str {
    let mut text = line.trim();

    if let Some(rest) = self.strip_start(text) {
      text = rest.trim_start();
    }
    if self.is_block()
      && self.start.ends_with('*')
      && !text.starts_with(self.end.as_str())
      && let Some(rest) = text.strip_prefix('*')
    {
      text = rest.trim_start();
    }

    self.trim_end_marker(text)
  }

  fn trim_end_marker<'a>(&self, text: &'a str) -> &'a str {
    if !self.is_block() {
      return text;
    }
    text.strip_suffix(self.end.as_str()).map_or(text, str::trim_end)
  }
}

/// Per-file classification derived from name, extension and content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileClassification {
  pub dialect: CommentDialect,
  /// Markup-style file whose leading declarations must stay first.
  pub is_structural_xml_like: bool,
  /// Single-file component made of template/script/style sections.
  pub is_multi_section_framework: bool,
}

impl FileClassification {
  const fn plain(dialect: CommentDialect) -> Self {
    Self {
      dialect,
      is_structural_xml_like: false,
      is_multi_section_framework: false,
    }
  }
}

/// Source of leading file lines for content sniffing.
pub trait ContentSniffer {
  /// Returns up to `count` lines from the start of the content. An unreadable
  /// source yields an empty vector.
  fn leading_lines(&self, count: usize) -> Vec<String>;
}

impl ContentSniffer for &str {
  fn leading_lines(&self, count: usize) -> Vec<String> {
    self.lines().take(count).map(str::to_string).collect()
  }
}

/// Immutable lookup structure for comment dialects.
#[derive(Debug, Default, Clone)]
pub struct DialectRegistry {
  /// Exact file name overrides from configuration
  filename_overrides: HashMap<String, CommentDialect>,
  /// Extension overrides from configuration, keyed by lowercase extension
  extension_overrides: HashMap<String, CommentDialect>,
}

impl DialectRegistry {
  /// Creates a registry backed by the built-in tables only.
  pub fn new() -> Self {
    Self::default()
  }

  /// Creates a registry whose configured `custom_patterns` and
  /// `custom_filenames` take precedence over the built-in tables.
  pub fn from_config(files: &FileConfig) -> Self {
    let to_dialect = |style: &CommentStyleConfig| CommentDialect::new(style.start.trim(), style.end.trim());

    Self {
      filename_overrides: files
        .custom_filenames
        .iter()
        .map(|(name, style)| (name.clone(), to_dialect(style)))
        .collect(),
      extension_overrides: files
        .custom_patterns
        .iter()
        .map(|(ext, style)| (ext.to_lowercase(), to_dialect(style)))
        .collect(),
    }
  }

  /// Classifies a file by name, consulting `sniffer` for ambiguous
  /// extensions and for the first-line fallback.
  ///
  /// # Returns
  ///
  /// `None` when the file type is unsupported or known to be binary. This is
  /// not an error: the caller skips the file.
  pub fn classify(&self, file_name: &str, sniffer: Option<&dyn ContentSniffer>) -> Option<FileClassification> {
    let extension = extension_of(file_name);

    if let Some(ext) = extension.as_deref()
      && is_binary_extension(ext)
    {
      trace!("{} has a binary extension", file_name);
      return None;
    }

    if let Some(dialect) = self.lookup_filename(file_name) {
      trace!("{} matched a special file name", file_name);
      return Some(FileClassification::plain(dialect));
    }

    if let Some(ext) = extension.as_deref()
      && let Some(classification) = self.lookup_extension(ext, sniffer)
    {
      return Some(classification);
    }

    let first_line = sniffer.and_then(|s| s.leading_lines(1).into_iter().next())?;
    let dialect = dialect_from_first_line(&first_line)?;
    trace!("{} classified from its first line", file_name);
    Some(FileClassification::plain(dialect))
  }

  fn lookup_filename(&self, file_name: &str) -> Option<CommentDialect> {
    if let Some(dialect) = self.filename_overrides.get(file_name) {
      return Some(dialect.clone());
    }

    SPECIAL_FILES
      .iter()
      .find(|(name, _, _)| *name == file_name)
      .or_else(|| {
        SPECIAL_FILE_PREFIXES
          .iter()
          .find(|(prefix, _, _)| file_name.starts_with(prefix) && file_name.len() > prefix.len())
      })
      .map(|(_, start, end)| CommentDialect::new(*start, *end))
  }

  fn lookup_extension(&self, ext: &str, sniffer: Option<&dyn ContentSniffer>) -> Option<FileClassification> {
    let mut classification = match self.extension_overrides.get(ext) {
      Some(dialect) => FileClassification::plain(dialect.clone()),
      None => {
        let rule = EXTENSION_RULES.iter().find(|rule| rule.extensions.contains(&ext))?;
        FileClassification::plain(CommentDialect::new(rule.start, rule.end))
      }
    };

    classification.is_structural_xml_like = XML_LIKE_EXTENSIONS.contains(&ext);
    classification.is_multi_section_framework = MULTI_SECTION_EXTENSIONS.contains(&ext);

    if SNIFFED_EXTENSIONS.contains(&ext)
      && !self.extension_overrides.contains_key(ext)
      && let Some(sniffer) = sniffer
      && looks_like_xml_document(&sniffer.leading_lines(SNIFF_LINES))
    {
      trace!(".{} content sniffed as an XML document", ext);
      classification.dialect = CommentDialect::new("<!--", "-->");
      classification.is_structural_xml_like = true;
    }

    Some(classification)
  }
}

/// Whether `file_name` is a built-in special file such as `Makefile` or
/// `requirements.txt`.
pub fn is_special_file(file_name: &str) -> bool {
  SPECIAL_FILES.iter().any(|(name, _, _)| *name == file_name)
    || SPECIAL_FILE_PREFIXES
      .iter()
      .any(|(prefix, _, _)| file_name.starts_with(prefix) && file_name.len() > prefix.len())
}

/// Whether `ext` (lowercase, no dot) belongs to a known binary format.
pub fn is_binary_extension(ext: &str) -> bool {
  BINARY_EXTENSIONS.contains(&ext)
}

/// Lowercase extension of a file name, `None` for dotfiles and bare names.
pub fn extension_of(file_name: &str) -> Option<String> {
  Path::new(file_name)
    .extension()
    .and_then(|ext| ext.to_str())
    .map(str::to_lowercase)
}

/// Detects XML documents sharing an extension with a programming language,
/// e.g. Qt `.ts` translation files.
fn looks_like_xml_document(lines: &[String]) -> bool {
  lines.iter().any(|line| {
    let line = line.trim_start().to_lowercase();
    line.starts_with("<?xml")
      || line.starts_with("<!doctype ts")
      || line.starts_with("<ts>")
      || line.starts_with("<ts ")
  })
}

fn dialect_from_first_line(line: &str) -> Option<CommentDialect> {
  let line = line.trim_start();
  if line.starts_with("//") {
    Some(CommentDialect::new("//", ""))
  } else if line.starts_with("/*") {
    Some(CommentDialect::new("/*", "*/"))
  } else if line.starts_with("<!--") {
    Some(CommentDialect::new("<!--", "-->"))
  } else if line.starts_with('#') {
    Some(CommentDialect::new("#", ""))
  } else {
    None
  }
}
