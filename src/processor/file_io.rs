//! # File I/O Module
//!
//! This module provides file reading and writing utilities for the processor.
//! Reads try UTF-8 first and fall back to Latin-1 for text-like content;
//! writes are always UTF-8.

use std::io::Read as _;
use std::path::Path;

use anyhow::{Context, Result};

use crate::dialect::ContentSniffer;

/// Number of bytes read up front for binary detection and content sniffing.
pub const SNIFF_READ_LIMIT: usize = 1024;

/// Why a file's text could not be obtained.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
  #[error("Failed to read {path}: {source}")]
  Io { path: String, source: std::io::Error },

  #[error("Failed to decode {path}: not UTF-8 and not plain Latin-1 text")]
  Decode { path: String },
}

/// File I/O operations for the processor.
///
/// This struct provides static methods for reading and writing files.
pub struct FileIO;

impl FileIO {
  /// Reads up to `limit` bytes from the start of a file.
  ///
  /// # Errors
  ///
  /// Returns [`ReadError::Io`] if the file cannot be opened or read.
  pub fn read_prefix(path: &Path, limit: usize) -> Result<Vec<u8>, ReadError> {
    let io_error = |source| ReadError::Io {
      path: path.display().to_string(),
      source,
    };

    let file = std::fs::File::open(path).map_err(io_error)?;
    let mut buf = Vec::with_capacity(limit);
    file.take(limit as u64).read_to_end(&mut buf).map_err(io_error)?;
    Ok(buf)
  }

  /// Reads a whole file as text.
  ///
  /// # Errors
  ///
  /// Returns [`ReadError::Io`] on I/O failure and [`ReadError::Decode`] when
  /// the bytes are neither UTF-8 nor plain Latin-1 text.
  pub fn read_text(path: &Path) -> Result<String, ReadError> {
    let bytes = std::fs::read(path).map_err(|source| ReadError::Io {
      path: path.display().to_string(),
      source,
    })?;

    decode(bytes).ok_or_else(|| ReadError::Decode {
      path: path.display().to_string(),
    })
  }

  /// Write file content as UTF-8.
  ///
  /// # Parameters
  ///
  /// * `path` - Path to the file to write
  /// * `content` - Content to write to the file
  pub fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).with_context(|| format!("Failed to write file: {}", path.display()))
  }
}

/// UTF-8 first, then Latin-1 when the bytes hold no control characters other
/// than whitespace.
fn decode(bytes: Vec<u8>) -> Option<String> {
  match String::from_utf8(bytes) {
    Ok(text) => Some(text),
    Err(e) => {
      let bytes = e.into_bytes();
      let plain = bytes
        .iter()
        .all(|&b| !b.is_ascii_control() || matches!(b, b'\t' | b'\n' | b'\r' | 0x0c));
      plain.then(|| bytes.iter().map(|&b| char::from(b)).collect())
    }
  }
}

/// Whether a byte prefix looks like binary data.
pub fn looks_binary(prefix: &[u8]) -> bool {
  prefix.contains(&0)
}

/// Serves content sniffing from a file's first bytes without reading the
/// whole file.
pub struct FileSniffer {
  prefix: String,
}

impl FileSniffer {
  pub fn from_prefix(prefix: &[u8]) -> Self {
    Self {
      prefix: String::from_utf8_lossy(prefix).into_owned(),
    }
  }
}

impl ContentSniffer for FileSniffer {
  fn leading_lines(&self, count: usize) -> Vec<String> {
    let text = self.prefix.strip_prefix('\u{feff}').unwrap_or(&self.prefix);
    text.lines().take(count).map(str::to_string).collect()
  }
}
