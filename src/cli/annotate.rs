//! # Annotate Command
//!
//! This module implements the default command: add or update path headers
//! across a project, plus the `--revert` and `--install-hook` maintenance
//! actions.

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Args;
use tracing::{debug, error, warn};

use crate::backup::{BACKUP_FILENAME, revert_files, save_backup};
use crate::config::{Config, load_config};
use crate::dialect::DialectRegistry;
use crate::diff::DiffManager;
use crate::file_filter::{GitFileSetFilter, create_default_filter};
use crate::git::{GitMetadataProvider, MetadataProvider, staged_files, tracked_files};
use crate::hook::install_pre_commit_hook;
use crate::info_log;
use crate::logging::{ColorMode, init_tracing, is_verbose, set_quiet, set_verbose};
use crate::output::{
  print_blank_line, print_hint, print_modified_files, print_revert_summary, print_start_message, print_summary,
};
use crate::processor::{Processor, ProcessorConfig};
use crate::workspace::{Workspace, resolve_workspace};

/// Arguments for the annotate command
#[derive(Args, Debug)]
pub struct AnnotateArgs {
  /// Project root; header paths are relative to it
  #[arg(short = 'd', long, value_name = "DIR", default_value = ".")]
  pub directory: PathBuf,

  /// Compute changes without writing any file
  #[arg(long)]
  pub dry_run: bool,

  /// Print a diff of every change to stderr
  #[arg(long)]
  pub show_diff: bool,

  /// Save a diff of every change to a file
  #[arg(long, value_name = "FILE")]
  pub save_diff: Option<PathBuf>,

  /// Only annotate files tracked by git
  #[arg(long, conflicts_with = "staged")]
  pub git: bool,

  /// Only annotate files staged for commit
  #[arg(long)]
  pub staged: bool,

  /// Fill author, email and date from git history and config
  #[arg(long)]
  pub use_git_metadata: bool,

  /// Restore every file changed by the last run from its backup
  #[arg(long, conflicts_with = "install_hook")]
  pub revert: bool,

  /// Install a git pre-commit hook that annotates staged files
  #[arg(long)]
  pub install_hook: bool,

  /// Overwrite an existing pre-commit hook
  #[arg(long, requires = "install_hook")]
  pub force: bool,

  /// Path to config file (default: discovered from the project root upward)
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Ignore config files even if present
  #[arg(long, conflicts_with = "config")]
  pub no_config: bool,

  /// Increase verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Suppress all output except errors
  #[arg(short, long, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Control when to use colored output (auto, never, always)
  #[arg(
    long,
    value_name = "WHEN",
    num_args = 0..=1,
    default_value_t = ColorMode::Auto,
    default_missing_value = "always",
    value_enum
  )]
  pub colors: ColorMode,
}

/// Run the annotate command with the given arguments
pub fn run_annotate(args: AnnotateArgs) -> Result<()> {
  // Initialize tracing subscriber for structured logging
  init_tracing(args.quiet, args.verbose);

  // Set verbose mode for output formatting and info_log! macro
  if args.verbose > 0 {
    set_verbose();
  } else if args.quiet {
    set_quiet();
  }
  args.colors.apply();

  let workspace = match resolve_workspace(&args.directory) {
    Ok(workspace) => workspace,
    Err(e) => {
      eprintln!("ERROR: {e}");
      process::exit(1);
    }
  };
  debug!("Using project root: {}", workspace.root().display());

  if args.revert {
    return run_revert(&workspace, args.dry_run);
  }

  if args.install_hook {
    return run_install_hook(&workspace, args.force);
  }

  run_processing(&args, &workspace)
}

fn run_revert(workspace: &Workspace, dry_run: bool) -> Result<()> {
  match revert_files(workspace.root(), dry_run)? {
    Some(stats) => print_revert_summary(&stats, dry_run),
    None => print_hint(&format!("No {BACKUP_FILENAME} found, nothing to revert.")),
  }
  Ok(())
}

fn run_install_hook(workspace: &Workspace, force: bool) -> Result<()> {
  let Some(repo_root) = workspace.repo_root() else {
    eprintln!("ERROR: --install-hook requires a git repository");
    process::exit(1);
  };

  match install_pre_commit_hook(repo_root, force) {
    Ok(hook_path) => {
      info_log!("Installed pre-commit hook at {}", hook_path.display());
      Ok(())
    }
    Err(e) => {
      eprintln!("ERROR: {e:#}");
      process::exit(1);
    }
  }
}

fn git_file_filter(args: &AnnotateArgs, workspace: &Workspace) -> Result<Option<GitFileSetFilter>> {
  if !args.git && !args.staged {
    return Ok(None);
  }

  let Some(repo_root) = workspace.repo_root() else {
    let flag = if args.staged { "--staged" } else { "--git" };
    eprintln!("ERROR: {flag} requires a git repository");
    eprintln!("Run annot8 from inside a git repository or point -d at one");
    process::exit(1);
  };

  let filter = if args.staged {
    info_log!("Only processing staged files");
    GitFileSetFilter::staged(staged_files(repo_root)?)
  } else {
    info_log!("Only processing git-tracked files");
    GitFileSetFilter::tracked(tracked_files(repo_root)?)
  };
  Ok(Some(filter))
}

fn metadata_provider(args: &AnnotateArgs, workspace: &Workspace) -> Option<Box<dyn MetadataProvider>> {
  if !args.use_git_metadata {
    return None;
  }

  match GitMetadataProvider::discover(workspace.root()) {
    Ok(provider) => Some(Box::new(provider)),
    Err(e) => {
      warn!("Git metadata unavailable: {:#}", e);
      None
    }
  }
}

fn run_processing(args: &AnnotateArgs, workspace: &Workspace) -> Result<()> {
  let root = workspace.root().to_path_buf();

  // Configuration problems are never fatal
  let config = match load_config(args.config.as_deref(), &root, args.no_config) {
    Ok(config) => config.unwrap_or_default(),
    Err(e) => {
      warn!("{:#}; using default settings", e);
      Config::default()
    }
  };

  let git_filter = git_file_filter(args, workspace)?;
  let metadata = metadata_provider(args, workspace);

  let diff_manager = DiffManager::new(args.show_diff, args.save_diff.clone());
  diff_manager.init()?;

  let file_filter = create_default_filter(&root, &config.files, git_filter);

  let mut processor = Processor::new(ProcessorConfig {
    registry: DialectRegistry::from_config(&config.files),
    ignored_directories: config.files.ignored_directories.clone(),
    header: config.header,
    dry_run: args.dry_run,
    file_filter: Some(Box::new(file_filter)),
    metadata,
    diff_manager: Some(diff_manager),
    ..ProcessorConfig::new(root.clone())
  });

  print_start_message(&root, args.dry_run);
  let stats = processor.process_directory(&root);

  if args.dry_run || is_verbose() {
    print_blank_line();
    print_modified_files(processor.modified_files(), &root, args.dry_run);
  }

  if !args.dry_run
    && let Err(e) = save_backup(&root, processor.take_backups())
  {
    error!("Failed to save backup: {:#}", e);
  }

  print_blank_line();
  print_summary(&stats, args.dry_run);

  if stats.modified > 0 {
    if args.dry_run {
      print_hint("Run without --dry-run to apply these changes.");
    } else {
      print_hint(&format!("Originals saved to {BACKUP_FILENAME}; run `annot8 --revert` to undo."));
    }
  }

  Ok(())
}
