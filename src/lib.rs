//! # annot8
//!
//! A tool that gives every source file in a project a header comment naming its path relative to the project root.
//!
//! `annot8` modifies source files in place. It picks the comment syntax for each file type, keeps structural
//! preambles (shebangs, XML declarations, front matter) above the header, preserves metadata already recorded in an
//! existing header, and never adds a second header to a file that already has one.
//!
//! ## Features
//!
//! * Per-language comment syntax, including block comments and content-sniffed special files
//! * Default `File:` headers or fully custom templates with variable substitution
//! * Author, email and date metadata from configuration or git history
//! * Dry-run previews with colored or saved diffs
//! * Revertible runs through a backup artifact in the project root
//! * Restricting a run to git-tracked or staged files, and a pre-commit hook installer
//!
//! ## Usage as a Library
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//!
//! use annot8::processor::{Processor, ProcessorConfig};
//!
//! let root = PathBuf::from(".");
//! let mut processor = Processor::new(ProcessorConfig {
//!     dry_run: true,
//!     ..ProcessorConfig::new(root.clone())
//! });
//!
//! let stats = processor.process_directory(&root);
//! println!("{} files would change", stats.modified);
//! ```
//!
//! ## Modules
//!
//! * [`dialect`] - File classification and comment syntax
//! * [`header`] - Detecting, composing and rewriting headers
//! * [`processor`] - Per-file pipeline and directory traversal
//! * [`config`] - Configuration file discovery and parsing
//! * [`logging`] - Output modes and diagnostics

pub mod backup;
pub mod cli;
pub mod config;
pub mod dialect;
pub mod diff;
pub mod file_filter;
pub mod git;
pub mod header;
pub mod hook;
pub mod logging;
pub mod output;
pub mod processor;
pub mod workspace;
