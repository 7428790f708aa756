//! # Configuration Module
//!
//! This module provides configuration support for annot8: header metadata,
//! an optional header template, extra ignored files and directories, and
//! custom comment styles.
//!
//! Configuration is read from the first of these found:
//! 1. the path given with `--config`
//! 2. the path in the `ANNOT8_CONFIG` environment variable
//! 3. `.annot8.yaml`, `.annot8.yml`, `.annot8.json`, `.annot8.toml`, or a
//!    `pyproject.toml` with a `[tool.annot8]` table, searching upward from the
//!    project root
//!
//! ## Example
//!
//! ```yaml
//! header:
//!   author: Jane Doe
//!   version: "1.0"
//!   include_date: true
//!   date_format: "%d %B %Y"
//!   template: |
//!     File: {file_path}
//!     Author: {author|Unknown}
//! files:
//!   ignored_files: ["generated.py", "*.min.js"]
//!   ignored_directories: ["third_party"]
//!   custom_patterns:
//!     xyz: { start: "##" }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};

use crate::header::composer::DEFAULT_DATE_FORMAT;
use crate::verbose_log;

/// Config file names searched in each directory, in priority order.
pub const CONFIG_FILENAMES: &[&str] = &[".annot8.yaml", ".annot8.yml", ".annot8.json", ".annot8.toml"];

/// Python project manifest that may carry a `[tool.annot8]` table.
pub const PYPROJECT_FILENAME: &str = "pyproject.toml";

/// Environment variable for specifying config file path.
pub const CONFIG_ENV_VAR: &str = "ANNOT8_CONFIG";

/// Header metadata and template settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HeaderConfig {
  pub author: Option<String>,
  pub author_email: Option<String>,
  #[serde(deserialize_with = "scalar_string")]
  pub version: Option<String>,
  /// Add a `Date:` line / bind the `{date}` variable
  pub include_date: bool,
  /// strftime-style pattern for dates
  pub date_format: String,
  /// Multi-line header template with `{name}` / `{name|default}` placeholders
  pub template: Option<String>,
}

impl Default for HeaderConfig {
  fn default() -> Self {
    Self {
      author: None,
      author_email: None,
      version: None,
      include_date: false,
      date_format: DEFAULT_DATE_FORMAT.to_string(),
      template: None,
    }
  }
}

/// A user-defined comment style.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CommentStyleConfig {
  /// Comment start marker (e.g. "#" or "/*")
  pub start: String,

  /// Comment end marker, empty for line comments
  #[serde(default)]
  pub end: String,
}

/// File selection and comment style overrides.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FileConfig {
  /// Extra file names or glob patterns to skip
  pub ignored_files: Vec<String>,
  /// Extra directory names to prune from traversal
  pub ignored_directories: Vec<String>,
  /// Comment styles keyed by extension, without the leading dot
  pub custom_patterns: HashMap<String, CommentStyleConfig>,
  /// Comment styles keyed by exact file name
  pub custom_filenames: HashMap<String, CommentStyleConfig>,
}

/// Main configuration struct for annot8.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
  pub header: HeaderConfig,
  pub files: FileConfig,
}

/// Parser failure for one of the supported formats.
#[derive(Debug, thiserror::Error)]
pub enum ParseFailure {
  #[error(transparent)]
  Yaml(#[from] serde_yaml::Error),
  #[error(transparent)]
  Json(#[from] serde_json::Error),
  #[error(transparent)]
  Toml(#[from] toml::de::Error),
}

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// The config file could not be read.
  #[error("Failed to read config file '{path}': {source}")]
  ReadError { path: PathBuf, source: std::io::Error },

  /// The config file is not valid in its format.
  #[error("Failed to parse config file '{path}': {source}")]
  ParseError { path: PathBuf, source: ParseFailure },

  /// The file extension does not name a supported format.
  #[error("Unsupported config file format: '{path}'")]
  UnsupportedFormat { path: PathBuf },

  /// A comment style configuration is invalid.
  #[error("Invalid comment style for '{key}': {message}")]
  InvalidCommentStyle { key: String, message: String },
}

impl Config {
  /// Load configuration from a file, choosing the parser by extension.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read, cannot be parsed, or
  /// defines an invalid comment style.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    verbose_log!("Loading config from: {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
      path: path.to_path_buf(),
      source: e,
    })?;

    let config = Self::parse(path, &content)?;
    config.validate()?;
    Ok(config.normalize())
  }

  fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
    let is_pyproject = path.file_name().is_some_and(|name| name == PYPROJECT_FILENAME);
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();

    if content.trim().is_empty() {
      return Ok(Self::default());
    }

    let parsed: Result<Self, ParseFailure> = match extension {
      "yaml" | "yml" => serde_yaml::from_str(content).map_err(ParseFailure::from),
      "json" => serde_json::from_str(content).map_err(ParseFailure::from),
      "toml" if is_pyproject => toml::from_str::<toml::Table>(content)
        .and_then(|table| match pyproject_section(&table) {
          Some(section) => section.clone().try_into(),
          None => Ok(Self::default()),
        })
        .map_err(ParseFailure::from),
      "toml" => toml::from_str(content).map_err(ParseFailure::from),
      _ => {
        return Err(ConfigError::UnsupportedFormat {
          path: path.to_path_buf(),
        });
      }
    };

    parsed.map_err(|source| ConfigError::ParseError {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Validate the configuration.
  ///
  /// Checks that:
  /// - every custom comment style has a non-empty `start`
  /// - extension keys don't include the leading dot
  fn validate(&self) -> Result<(), ConfigError> {
    for (key, style) in self.files.custom_patterns.iter().chain(&self.files.custom_filenames) {
      if style.start.trim().is_empty() {
        return Err(ConfigError::InvalidCommentStyle {
          key: key.clone(),
          message: "start field cannot be empty".to_string(),
        });
      }
    }

    for ext in self.files.custom_patterns.keys() {
      if ext.starts_with('.') {
        return Err(ConfigError::InvalidCommentStyle {
          key: ext.clone(),
          message: "extension should not include leading dot".to_string(),
        });
      }
    }

    Ok(())
  }

  /// Lowercase extension keys for case-insensitive matching.
  fn normalize(mut self) -> Self {
    self.files.custom_patterns = self
      .files
      .custom_patterns
      .into_iter()
      .map(|(k, v)| (k.to_lowercase(), v))
      .collect();
    self
  }
}

fn pyproject_section(table: &toml::Table) -> Option<&toml::Value> {
  table.get("tool")?.get("annot8")
}

/// Accepts a string, integer, float or boolean and keeps its text, so that
/// `version: 1.0` in YAML reads as `"1.0"`.
fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
  }

  Ok(Option::<Scalar>::deserialize(deserializer)?.map(|scalar| match scalar {
    Scalar::Text(text) => text,
    Scalar::Integer(n) => n.to_string(),
    Scalar::Float(n) => format!("{n:?}"),
    Scalar::Flag(flag) => flag.to_string(),
  }))
}

/// Discover the configuration file path.
///
/// # Arguments
///
/// * `explicit_path` - Optional explicit path from CLI flag
/// * `project_root` - Directory the upward search starts from
///
/// # Returns
///
/// The path to the configuration file, or `None` if no config file is found.
pub fn discover_config_path(explicit_path: Option<&Path>, project_root: &Path) -> Option<PathBuf> {
  // 1. Explicit path from CLI takes highest priority
  if let Some(path) = explicit_path {
    if path.exists() {
      verbose_log!("Using explicit config path: {}", path.display());
      return Some(path.to_path_buf());
    }
    verbose_log!("Explicit config path does not exist: {}", path.display());
    return None;
  }

  // 2. Check environment variable
  if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
    let path = PathBuf::from(&env_path);
    if path.exists() {
      verbose_log!("Using config from {}: {}", CONFIG_ENV_VAR, path.display());
      return Some(path);
    }
    verbose_log!("{} path does not exist: {}", CONFIG_ENV_VAR, env_path);
  }

  // 3. Search upward from the project root
  for dir in project_root.ancestors() {
    if let Some(found) = find_config_in(dir) {
      verbose_log!("Using config: {}", found.display());
      return Some(found);
    }
  }

  verbose_log!("No config file found");
  None
}

fn find_config_in(dir: &Path) -> Option<PathBuf> {
  if let Some(path) = CONFIG_FILENAMES.iter().map(|name| dir.join(name)).find(|p| p.is_file()) {
    return Some(path);
  }

  let pyproject = dir.join(PYPROJECT_FILENAME);
  let has_section = std::fs::read_to_string(&pyproject)
    .ok()
    .and_then(|content| toml::from_str::<toml::Table>(&content).ok())
    .is_some_and(|table| pyproject_section(&table).is_some());
  has_section.then_some(pyproject)
}

/// Load configuration from the discovered path.
///
/// # Arguments
///
/// * `explicit_path` - Optional explicit path from CLI flag
/// * `project_root` - The project root directory
/// * `no_config` - If true, skip config file discovery
///
/// # Returns
///
/// The loaded configuration, or `None` if no config file is found or
/// discovery is disabled.
pub fn load_config(explicit_path: Option<&Path>, project_root: &Path, no_config: bool) -> Result<Option<Config>> {
  if no_config {
    verbose_log!("Config file discovery disabled (--no-config)");
    return Ok(None);
  }

  match discover_config_path(explicit_path, project_root) {
    Some(path) => {
      let config = Config::load(&path).with_context(|| format!("Failed to load config from {}", path.display()))?;
      Ok(Some(config))
    }
    None => Ok(None),
  }
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;

  #[test]
  fn test_parse_yaml_config() {
    let content = concat!(
      "header:\n",
      "  author: Jane Doe\n",
      "  author_email: jane@example.com\n",
      "  version: 1.0\n",
      "  include_date: true\n",
      "  date_format: \"%d/%m/%Y\"\n",
      "files:\n",
      "  ignored_files: [\"generated.py\"]\n",
      "  ignored_directories: [\"third_party\"]\n",
      "  custom_patterns:\n",
      "    xyz: { start: \"##\" }\n",
    );

    let config = Config::parse(Path::new(".annot8.yaml"), content).expect("valid yaml should parse");

    assert_eq!(config.header.author.as_deref(), Some("Jane Doe"));
    assert_eq!(config.header.author_email.as_deref(), Some("jane@example.com"));
    assert_eq!(config.header.version.as_deref(), Some("1.0"));
    assert!(config.header.include_date);
    assert_eq!(config.header.date_format, "%d/%m/%Y");
    assert_eq!(config.files.ignored_files, vec!["generated.py"]);
    assert_eq!(config.files.ignored_directories, vec!["third_party"]);
    let style = config.files.custom_patterns.get("xyz").expect("xyz should exist");
    assert_eq!(style.start, "##");
    assert_eq!(style.end, "");
  }

  #[test]
  fn test_parse_json_config() {
    let content = r#"{"header": {"author": "JSON Author", "template": "File: {file_path}"}}"#;
    let config = Config::parse(Path::new(".annot8.json"), content).expect("valid json should parse");
    assert_eq!(config.header.author.as_deref(), Some("JSON Author"));
    assert_eq!(config.header.template.as_deref(), Some("File: {file_path}"));
    assert_eq!(config.header.date_format, DEFAULT_DATE_FORMAT);
  }

  #[test]
  fn test_parse_toml_config() {
    let content = concat!("[header]\n", "version = \"2.1.0\"\n", "\n", "[files]\n", "ignored_files = [\"a.py\"]\n");
    let config = Config::parse(Path::new(".annot8.toml"), content).expect("valid toml should parse");
    assert_eq!(config.header.version.as_deref(), Some("2.1.0"));
    assert_eq!(config.files.ignored_files, vec!["a.py"]);
  }

  #[test]
  fn test_parse_pyproject_section() {
    let content = concat!(
      "[project]\n",
      "name = \"demo\"\n",
      "\n",
      "[tool.annot8.header]\n",
      "author = \"Py Author\"\n",
    );
    let config = Config::parse(Path::new("pyproject.toml"), content).expect("pyproject should parse");
    assert_eq!(config.header.author.as_deref(), Some("Py Author"));
  }

  #[test]
  fn test_parse_empty_config() {
    let config = Config::parse(Path::new(".annot8.yaml"), "").expect("empty config should parse");
    assert_eq!(config, Config::default());
  }

  #[test]
  fn test_parse_invalid_yaml() {
    let result = Config::parse(Path::new(".annot8.yaml"), "header: [unclosed");
    assert!(matches!(
      result,
      Err(ConfigError::ParseError {
        source: ParseFailure::Yaml(_),
        ..
      })
    ));
  }

  #[test]
  fn test_validate_leading_dot() {
    let mut config = Config::default();
    config.files.custom_patterns.insert(
      ".bad".to_string(),
      CommentStyleConfig {
        start: "//".to_string(),
        end: String::new(),
      },
    );
    let err = config.validate().expect_err("should fail");
    assert!(matches!(err, ConfigError::InvalidCommentStyle { .. }));
  }

  #[test]
  fn test_validate_empty_start() {
    let mut config = Config::default();
    config.files.custom_filenames.insert(
      "Tiltfile".to_string(),
      CommentStyleConfig {
        start: " ".to_string(),
        end: String::new(),
      },
    );
    let err = config.validate().expect_err("should fail");
    assert!(matches!(err, ConfigError::InvalidCommentStyle { .. }));
  }

  #[test]
  fn test_load_normalizes_extension_keys() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let config_path = temp_dir.path().join(".annot8.yaml");
    std::fs::write(&config_path, "files:\n  custom_patterns:\n    XYZ: { start: \"##\" }\n").expect("write config");

    let config = Config::load(&config_path).expect("load should succeed");
    assert!(config.files.custom_patterns.contains_key("xyz"));
    assert!(!config.files.custom_patterns.contains_key("XYZ"));
  }

  #[test]
  fn test_load_config_file_not_found() {
    let result = Config::load(Path::new("/nonexistent/path/.annot8.yaml"));
    assert!(matches!(result, Err(ConfigError::ReadError { .. })));
  }

  #[test]
  fn test_discover_config_explicit_path() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let config_path = temp_dir.path().join("custom-config.yaml");
    std::fs::write(&config_path, "").expect("write config");

    let result = discover_config_path(Some(&config_path), temp_dir.path());
    assert_eq!(result, Some(config_path));

    let missing = temp_dir.path().join("missing.yaml");
    assert_eq!(discover_config_path(Some(&missing), temp_dir.path()), None);
  }

  #[test]
  fn test_discover_config_searches_upward() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let config_path = temp_dir.path().join(".annot8.yml");
    std::fs::write(&config_path, "").expect("write config");
    let nested = temp_dir.path().join("src").join("pkg");
    std::fs::create_dir_all(&nested).expect("create dirs");

    assert_eq!(discover_config_path(None, &nested), Some(config_path));
  }

  #[test]
  fn test_discover_prefers_yaml_over_json() {
    let temp_dir = TempDir::new().expect("create temp dir");
    std::fs::write(temp_dir.path().join(".annot8.json"), "{}").expect("write config");
    std::fs::write(temp_dir.path().join(".annot8.yaml"), "").expect("write config");

    assert_eq!(
      discover_config_path(None, temp_dir.path()),
      Some(temp_dir.path().join(".annot8.yaml"))
    );
  }

  #[test]
  fn test_pyproject_without_section_is_skipped() {
    let temp_dir = TempDir::new().expect("create temp dir");
    std::fs::write(temp_dir.path().join("pyproject.toml"), "[project]\nname = \"x\"\n").expect("write pyproject");
    assert_eq!(find_config_in(temp_dir.path()), None);

    std::fs::write(
      temp_dir.path().join("pyproject.toml"),
      "[project]\nname = \"x\"\n[tool.annot8]\n",
    )
    .expect("write pyproject");
    assert_eq!(find_config_in(temp_dir.path()), Some(temp_dir.path().join("pyproject.toml")));
  }

  #[test]
  fn test_load_config_disabled() {
    let temp_dir = TempDir::new().expect("create temp dir");
    std::fs::write(temp_dir.path().join(".annot8.yaml"), "header:\n  author: X\n").expect("write config");
    let config = load_config(None, temp_dir.path(), true).expect("no error");
    assert!(config.is_none());
  }
}
