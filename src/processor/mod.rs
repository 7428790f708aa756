//! # Processor Module
//!
//! This module drives a run: it walks the project, decides per file whether a
//! header applies, rewrites the text and records what happened.
//!
//! The module is organized into several submodules:
//! - [`file_io`] - File reading and writing operations
//! - [`file_collector`] - Directory traversal with ignored-directory pruning
//! - [`outcome`] - Per-file outcomes and run statistics
//!
//! Each file moves through the same steps:
//!
//! ```text
//! filter -> classify -> read -> compose -> rewrite -> compare -> write
//!   |          |         |                    |          |
//!   skip     skip      skip                 skip     unchanged
//! (excluded) (unsupported) (decode / io)  (ambiguous header)
//! ```
//!
//! A dry run performs every step except the write and the backup record, so
//! its preview always matches a real run.

mod file_collector;
mod file_io;
mod outcome;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub use file_collector::FileCollector;
pub use file_io::{FileIO, FileSniffer, ReadError, SNIFF_READ_LIMIT, looks_binary};
pub use outcome::{ProcessingOutcome, RunStats, SkipReason};
use tracing::{debug, error, trace};

use crate::config::HeaderConfig;
use crate::diff::DiffManager;
use crate::dialect::DialectRegistry;
use crate::file_filter::{FileFilter, FilterResult};
use crate::git::{MetadataProvider, NoMetadata};
use crate::header::{HeaderComposer, PathInfo, Rewrite, rewrite};

/// Configuration for creating a Processor instance.
pub struct ProcessorConfig {
  pub project_root: PathBuf,
  pub registry: DialectRegistry,
  pub header: HeaderConfig,

  // Behavior flags
  pub dry_run: bool,

  // Optional components
  pub ignored_directories: Vec<String>,
  pub file_filter: Option<Box<dyn FileFilter>>,
  pub metadata: Option<Box<dyn MetadataProvider>>,
  pub diff_manager: Option<DiffManager>,
}

impl ProcessorConfig {
  /// Creates a new ProcessorConfig with required fields and sensible defaults.
  ///
  /// Use struct update syntax to override specific fields:
  /// ```ignore
  /// ProcessorConfig {
  ///     dry_run: true,
  ///     ..ProcessorConfig::new(project_root)
  /// }
  /// ```
  pub fn new(project_root: PathBuf) -> Self {
    Self {
      project_root,
      registry: DialectRegistry::new(),
      header: HeaderConfig::default(),
      dry_run: false,
      ignored_directories: Vec::new(),
      file_filter: None,
      metadata: None,
      diff_manager: None,
    }
  }
}

/// Passthrough filter that allows all files.
struct PassthroughFilter;

impl FileFilter for PassthroughFilter {
  fn should_process(&self, _path: &Path) -> anyhow::Result<FilterResult> {
    Ok(FilterResult::process())
  }
}

/// Processor for adding path headers to files.
///
/// The `Processor` owns the run state: the accumulated backup of original
/// contents and the list of modified files. Both are only updated between
/// files.
pub struct Processor {
  /// Root the header paths are relative to
  project_root: PathBuf,

  registry: DialectRegistry,

  composer: HeaderComposer,

  /// Eligibility predicate applied before a file is read
  file_filter: Box<dyn FileFilter>,

  metadata: Box<dyn MetadataProvider>,

  /// Whether to compute changes without writing them
  dry_run: bool,

  /// Manager for handling diff creation and rendering
  diff_manager: DiffManager,

  /// Directory traversal with ignored-directory pruning
  file_collector: FileCollector,

  /// Original contents of written files, keyed by relative path
  backups: BTreeMap<String, String>,

  /// Files modified (or that would be, in a dry run), in processing order
  modified_files: Vec<PathBuf>,
}

impl Processor {
  /// Creates a new processor with the specified configuration.
  pub fn new(config: ProcessorConfig) -> Self {
    Self {
      composer: HeaderComposer::new(config.header),
      file_filter: config.file_filter.unwrap_or_else(|| Box::new(PassthroughFilter)),
      metadata: config.metadata.unwrap_or_else(|| Box::new(NoMetadata)),
      diff_manager: config.diff_manager.unwrap_or_else(|| DiffManager::new(false, None)),
      file_collector: FileCollector::new(&config.ignored_directories),
      project_root: config.project_root,
      registry: config.registry,
      dry_run: config.dry_run,
      backups: BTreeMap::new(),
      modified_files: Vec::new(),
    }
  }

  /// Replaces the header composer, e.g. to pin the clock.
  pub fn with_composer(mut self, composer: HeaderComposer) -> Self {
    self.composer = composer;
    self
  }

  /// Processes every eligible file under `dir`, depth-first.
  ///
  /// Per-file failures are counted as skipped; they never abort the walk.
  pub fn process_directory(&mut self, dir: &Path) -> RunStats {
    let mut stats = RunStats::default();
    for path in self.file_collector.traverse_directory(dir) {
      let outcome = self.process_file(&path);
      stats.record(&outcome);
    }
    debug!(
      "Processed {} files: {} modified, {} unchanged, {} skipped",
      stats.total(),
      stats.modified,
      stats.unchanged,
      stats.skipped
    );
    stats
  }

  /// Runs one file through the header pipeline.
  pub fn process_file(&mut self, path: &Path) -> ProcessingOutcome {
    let outcome = self.run_pipeline(path);
    match &outcome {
      ProcessingOutcome::Skipped(reason) => trace!("Skipping: {} ({})", path.display(), reason),
      ProcessingOutcome::Unchanged => trace!("Unchanged: {}", path.display()),
      ProcessingOutcome::Modified => self.modified_files.push(path.to_path_buf()),
    }
    outcome
  }

  fn run_pipeline(&mut self, path: &Path) -> ProcessingOutcome {
    match self.file_filter.should_process(path) {
      Ok(result) if !result.should_process => {
        let reason = result.reason.unwrap_or_else(|| "filtered".to_string());
        return ProcessingOutcome::Skipped(SkipReason::Excluded(reason));
      }
      Ok(_) => {}
      Err(e) => {
        error!("Failed to check {}: {:#}", path.display(), e);
        return ProcessingOutcome::Skipped(SkipReason::Io(e.to_string()));
      }
    }

    let path_info = PathInfo::new(path, &self.project_root);
    let file_name = path_info.file_name();

    let prefix = match FileIO::read_prefix(path, SNIFF_READ_LIMIT) {
      Ok(prefix) => prefix,
      Err(e) => return read_failure(e),
    };
    if looks_binary(&prefix) {
      return ProcessingOutcome::Skipped(SkipReason::Excluded("binary file".to_string()));
    }
    let sniffer = FileSniffer::from_prefix(&prefix);
    let Some(classification) = self.registry.classify(&file_name, Some(&sniffer)) else {
      return ProcessingOutcome::Skipped(SkipReason::Unsupported);
    };

    let original = match FileIO::read_text(path) {
      Ok(text) => text,
      Err(e) => return read_failure(e),
    };

    let metadata = self.metadata.metadata_for(path);
    let header = self.composer.compose(&classification, &path_info, &metadata);

    let updated = match rewrite(&original, &classification, &header) {
      Rewrite::Content(text) => text,
      Rewrite::AmbiguousHeader => {
        debug!("Existing header in {} cannot be parsed, leaving it alone", path.display());
        return ProcessingOutcome::Skipped(SkipReason::AmbiguousHeader);
      }
    };

    if updated == original {
      return ProcessingOutcome::Unchanged;
    }

    if self.diff_manager.is_enabled()
      && let Err(e) = self.diff_manager.display_diff(Path::new(path_info.relative()), &original, &updated)
    {
      error!("Failed to render diff for {}: {:#}", path.display(), e);
    }

    if self.dry_run {
      return ProcessingOutcome::Modified;
    }

    if let Err(e) = FileIO::write_file(path, &updated) {
      error!("{:#}", e);
      return ProcessingOutcome::Skipped(SkipReason::Io(e.to_string()));
    }

    self.backups.entry(path_info.relative().to_string()).or_insert(original);
    ProcessingOutcome::Modified
  }

  /// Files modified so far (or that would be, in a dry run).
  pub fn modified_files(&self) -> &[PathBuf] {
    &self.modified_files
  }

  /// Takes the original contents recorded for every written file.
  pub fn take_backups(&mut self) -> BTreeMap<String, String> {
    std::mem::take(&mut self.backups)
  }
}

fn read_failure(error: ReadError) -> ProcessingOutcome {
  match error {
    ReadError::Decode { path } => {
      debug!("Skipping {}: content is not decodable text", path);
      ProcessingOutcome::Skipped(SkipReason::Decode)
    }
    ReadError::Io { .. } => {
      error!("{}", error);
      ProcessingOutcome::Skipped(SkipReason::Io(error.to_string()))
    }
  }
}
