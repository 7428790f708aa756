//! # Header Composer
//!
//! Builds the header block for a file, either in the default layout
//! (`File: <path>` plus optional metadata lines) or from a user template with
//! `{name}` and `{name|default}` placeholders.

use std::collections::BTreeMap;
use std::path::{Component, Path};
use std::sync::LazyLock;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Local};
use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::config::HeaderConfig;
use crate::dialect::{CommentDialect, FileClassification};
use crate::git::FileMetadata;

/// Date pattern used when the configured one is not a valid strftime pattern.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

static PLACEHOLDER: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\{(\w+)(?:\|([^{}]*))?\}").expect("placeholder regex must compile"));

/// Whether a header came from the default layout or a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMode {
  Default,
  Template,
}

/// A freshly composed header, one formatted line per entry. Blank entries are
/// blank lines inside a template header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderBlock {
  pub lines: Vec<String>,
  pub mode: HeaderMode,
}

impl HeaderBlock {
  pub fn text(&self) -> String {
    self.lines.join("\n")
  }

  pub fn is_template(&self) -> bool {
    self.mode == HeaderMode::Template
  }
}

/// A file's location relative to the project root, with forward slashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathInfo {
  relative: String,
}

impl PathInfo {
  /// Computes the path of `file` relative to `root`.
  pub fn new(file: &Path, root: &Path) -> Self {
    let relative = pathdiff::diff_paths(file, root).unwrap_or_else(|| file.to_path_buf());
    Self::from_relative(&relative)
  }

  /// Normalizes an already-relative path.
  pub fn from_relative(path: &Path) -> Self {
    let relative = path
      .components()
      .filter_map(|component| match component {
        Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
        Component::ParentDir => Some("..".to_string()),
        Component::CurDir | Component::RootDir | Component::Prefix(_) => None,
      })
      .collect::<Vec<_>>()
      .join("/");
    Self { relative }
  }

  pub fn relative(&self) -> &str {
    &self.relative
  }

  fn as_path(&self) -> &Path {
    Path::new(&self.relative)
  }

  pub fn file_name(&self) -> String {
    self.as_path().file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
  }

  pub fn file_stem(&self) -> String {
    self.as_path().file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
  }

  /// Extension with its leading dot, or an empty string.
  pub fn file_suffix(&self) -> String {
    self
      .as_path()
      .extension()
      .map(|ext| format!(".{}", ext.to_string_lossy()))
      .unwrap_or_default()
  }

  /// Parent directory, `.` for files at the root.
  pub fn file_dir(&self) -> String {
    match self.relative.rsplit_once('/') {
      Some((dir, _)) if !dir.is_empty() => dir.to_string(),
      _ => ".".to_string(),
    }
  }
}

/// Values available to header templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateVariables {
  values: BTreeMap<&'static str, String>,
}

impl TemplateVariables {
  /// Variables derived from the file path alone.
  pub fn for_path(path: &PathInfo) -> Self {
    let mut vars = Self::default();
    vars.insert("file_path", path.relative());
    vars.insert("file_name", path.file_name());
    vars.insert("file_stem", path.file_stem());
    vars.insert("file_suffix", path.file_suffix());
    vars.insert("file_dir", path.file_dir());
    vars
  }

  pub fn insert(&mut self, name: &'static str, value: impl Into<String>) {
    self.values.insert(name, value.into());
  }

  /// Returns a bound, non-empty value.
  pub fn get(&self, name: &str) -> Option<&str> {
    self.values.get(name).map(String::as_str).filter(|value| !value.is_empty())
  }
}

/// Substitutes `{name}` and `{name|default}` placeholders. An unbound
/// placeholder without a default renders as an empty string.
pub fn render_template(template: &str, vars: &TemplateVariables) -> String {
  PLACEHOLDER
    .replace_all(template, |caps: &Captures| {
      let name = caps.get(1).map_or("", |m| m.as_str());
      match vars.get(name) {
        Some(value) => value.to_string(),
        None => caps.get(2).map_or_else(String::new, |m| m.as_str().to_string()),
      }
    })
    .into_owned()
}

/// Formats `date` with a strftime pattern, falling back to `YYYY-MM-DD` when
/// the pattern is empty or invalid.
pub fn format_date(date: &DateTime<FixedOffset>, pattern: &str) -> String {
  let items = StrftimeItems::new(pattern);
  if pattern.is_empty() || items.clone().any(|item| matches!(item, Item::Error)) {
    debug!("Invalid date format '{}', using {}", pattern, DEFAULT_DATE_FORMAT);
    return date.format(DEFAULT_DATE_FORMAT).to_string();
  }
  date.format_with_items(items).to_string()
}

/// Composes header blocks from configuration and per-file metadata.
#[derive(Debug, Clone)]
pub struct HeaderComposer {
  config: HeaderConfig,
  /// Clock reading used for `date` when no commit date is available
  now: DateTime<FixedOffset>,
}

impl HeaderComposer {
  pub fn new(config: HeaderConfig) -> Self {
    Self::with_clock(config, Local::now().fixed_offset())
  }

  /// Creates a composer with a fixed notion of "now".
  pub const fn with_clock(config: HeaderConfig, now: DateTime<FixedOffset>) -> Self {
    Self { config, now }
  }

  /// Builds the template variables for one file.
  ///
  /// Configured values take precedence; git metadata fills in a missing
  /// author or email. `date` is bound only when `include_date` is set.
  pub fn variables(&self, path: &PathInfo, metadata: &FileMetadata) -> TemplateVariables {
    let mut vars = TemplateVariables::for_path(path);

    if let Some(author) = self.config.author.as_ref().or(metadata.author.as_ref()) {
      vars.insert("author", author.as_str());
    }
    if let Some(email) = self.config.author_email.as_ref().or(metadata.email.as_ref()) {
      vars.insert("author_email", email.as_str());
    }
    if let Some(version) = &self.config.version {
      vars.insert("version", version.as_str());
    }
    if self.config.include_date {
      let date = metadata.date.unwrap_or(self.now);
      vars.insert("date", format_date(&date, &self.config.date_format));
    }

    vars
  }

  /// Composes the header for a file.
  pub fn compose(&self, classification: &FileClassification, path: &PathInfo, metadata: &FileMetadata) -> HeaderBlock {
    let vars = self.variables(path, metadata);
    let dialect = &classification.dialect;

    if let Some(template) = self.config.template.as_deref() {
      let lines = template_lines(&render_template(template, &vars), dialect);
      if !lines.is_empty() {
        return HeaderBlock {
          lines,
          mode: HeaderMode::Template,
        };
      }
      warn!("Header template renders to nothing, using the default header");
    }

    let mut lines = vec![dialect.format_line(&format!("File: {}", path.relative()))];
    for (label, name) in [("Author", "author"), ("Email", "author_email"), ("Version", "version"), ("Date", "date")] {
      if let Some(value) = vars.get(name) {
        lines.push(dialect.format_line(&format!("{label}: {value}")));
      }
    }

    HeaderBlock {
      lines,
      mode: HeaderMode::Default,
    }
  }
}

/// Wraps each rendered template line in comment markers, keeping interior
/// blank lines and dropping leading and trailing ones.
fn template_lines(rendered: &str, dialect: &CommentDialect) -> Vec<String> {
  let lines: Vec<&str> = rendered.lines().collect();
  let Some(first) = lines.iter().position(|line| !line.trim().is_empty()) else {
    return Vec::new();
  };
  let last = lines.iter().rposition(|line| !line.trim().is_empty()).unwrap_or(first);

  lines[first..=last]
    .iter()
    .map(|line| {
      if line.trim().is_empty() {
        String::new()
      } else {
        dialect.format_line(line)
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::dialect::DialectRegistry;

  fn fixed_now() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
      .and_then(|tz| tz.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).single())
      .expect("valid date")
  }

  fn classify(name: &str) -> FileClassification {
    DialectRegistry::new().classify(name, None).expect("supported")
  }

  fn compose(config: HeaderConfig, rel: &str, metadata: &FileMetadata) -> HeaderBlock {
    let composer = HeaderComposer::with_clock(config, fixed_now());
    let path = PathInfo::from_relative(Path::new(rel));
    let name = path.file_name();
    composer.compose(&classify(&name), &path, metadata)
  }

  #[test]
  fn test_path_info() {
    let path = PathInfo::new(Path::new("/project/src/utils/helpers.py"), Path::new("/project"));
    assert_eq!(path.relative(), "src/utils/helpers.py");
    assert_eq!(path.file_name(), "helpers.py");
    assert_eq!(path.file_stem(), "helpers");
    assert_eq!(path.file_suffix(), ".py");
    assert_eq!(path.file_dir(), "src/utils");

    let root_file = PathInfo::from_relative(Path::new("./Makefile"));
    assert_eq!(root_file.relative(), "Makefile");
    assert_eq!(root_file.file_suffix(), "");
    assert_eq!(root_file.file_dir(), ".");
  }

  #[test]
  fn test_default_header() {
    let header = compose(HeaderConfig::default(), "src/app.py", &FileMetadata::default());
    assert_eq!(header.lines, vec!["# File: src/app.py"]);
    assert_eq!(header.mode, HeaderMode::Default);
  }

  #[test]
  fn test_default_header_block_dialect() {
    let header = compose(HeaderConfig::default(), "styles/main.css", &FileMetadata::default());
    assert_eq!(header.text(), "/* File: styles/main.css */");

    let header = compose(HeaderConfig::default(), "index.html", &FileMetadata::default());
    assert_eq!(header.text(), "<!-- File: index.html -->");
  }

  #[test]
  fn test_default_header_with_metadata() {
    let config = HeaderConfig {
      author: Some("Jane Doe".to_string()),
      author_email: Some("jane@example.com".to_string()),
      version: Some("1.2.0".to_string()),
      include_date: true,
      ..HeaderConfig::default()
    };
    let header = compose(config, "lib.rs", &FileMetadata::default());
    assert_eq!(
      header.lines,
      vec![
        "// File: lib.rs",
        "// Author: Jane Doe",
        "// Email: jane@example.com",
        "// Version: 1.2.0",
        "// Date: 2024-03-09",
      ]
    );
  }

  #[test]
  fn test_git_metadata_fills_gaps() {
    let metadata = FileMetadata {
      author: Some("Git Author".to_string()),
      email: Some("git@example.com".to_string()),
      date: FixedOffset::east_opt(3600).and_then(|tz| tz.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).single()),
    };
    let config = HeaderConfig {
      author: Some("Configured".to_string()),
      include_date: true,
      date_format: "%d/%m/%Y".to_string(),
      ..HeaderConfig::default()
    };
    let header = compose(config, "a.py", &metadata);
    assert_eq!(
      header.lines,
      vec!["# File: a.py", "# Author: Configured", "# Email: git@example.com", "# Date: 02/01/2020"]
    );
  }

  #[test]
  fn test_render_template_defaults() {
    let mut vars = TemplateVariables::default();
    vars.insert("file_path", "a.py");
    vars.insert("author", "");

    assert_eq!(render_template("File: {file_path}", &vars), "File: a.py");
    assert_eq!(render_template("Author: {author|Unknown Author}", &vars), "Author: Unknown Author");
    assert_eq!(render_template("Version: {version}", &vars), "Version: ");
    assert_eq!(render_template("{{not a var}}", &vars), "{{not a var}}");
  }

  #[test]
  fn test_template_header() {
    let config = HeaderConfig {
      author: Some("John Doe".to_string()),
      version: Some("1.0.0".to_string()),
      template: Some("File: {file_path}\n\nDescription: {file_stem} module\nAuthor: {author}\nVersion: {version}\n".to_string()),
      ..HeaderConfig::default()
    };
    let header = compose(config, "pkg/test.py", &FileMetadata::default());
    assert_eq!(header.mode, HeaderMode::Template);
    assert_eq!(
      header.lines,
      vec![
        "# File: pkg/test.py",
        "",
        "# Description: test module",
        "# Author: John Doe",
        "# Version: 1.0.0",
      ]
    );
  }

  #[test]
  fn test_template_file_variables() {
    let config = HeaderConfig {
      template: Some("{file_name} | {file_stem} | {file_suffix} | {file_dir}".to_string()),
      ..HeaderConfig::default()
    };
    let header = compose(config, "src/utils/helpers.py", &FileMetadata::default());
    assert_eq!(header.lines, vec!["# helpers.py | helpers | .py | src/utils"]);
  }

  #[test]
  fn test_blank_template_falls_back_to_default() {
    let config = HeaderConfig {
      template: Some("\n  \n".to_string()),
      ..HeaderConfig::default()
    };
    let header = compose(config, "a.py", &FileMetadata::default());
    assert_eq!(header.lines, vec!["# File: a.py"]);
    assert_eq!(header.mode, HeaderMode::Default);
  }

  #[test]
  fn test_date_format() {
    let now = fixed_now();
    assert_eq!(format_date(&now, "%Y-%m-%d"), "2024-03-09");
    assert_eq!(format_date(&now, "%B %d, %Y"), "March 09, 2024");
    assert_eq!(format_date(&now, "%Q"), "2024-03-09");
    assert_eq!(format_date(&now, ""), "2024-03-09");
  }
}
