//! # CLI Module
//!
//! This module contains the command-line interface implementation.
//! It uses clap for argument parsing.

mod annotate;

use std::sync::LazyLock;

pub use annotate::{AnnotateArgs, run_annotate};
use clap::Parser;
use clap::builder::styling::{AnsiColor, Color, Style, Styles};

const CUSTOM_STYLES: Styles = Styles::styled()
  .header(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .usage(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Blue))).bold())
  .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
  .error(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red))).bold())
  .valid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
  .invalid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow))));

/// Package version plus the commit it was built from, when known.
fn version_string() -> &'static str {
  static VERSION: LazyLock<String> = LazyLock::new(|| {
    let version = env!("CARGO_PKG_VERSION");
    match (option_env!("GIT_HASH"), option_env!("GIT_DATE")) {
      (Some(hash), Some(date)) if !hash.is_empty() => format!("{version} ({hash} {date})"),
      _ => version.to_string(),
    }
  });
  VERSION.as_str()
}

/// Top-level CLI arguments
#[derive(Parser, Debug)]
#[command(
  name = "annot8",
  author,
  version = version_string(),
  about,
  styles = CUSTOM_STYLES,
  after_help = "Examples:
  # Add path headers to every source file under the current directory
  annot8

  # Preview the changes for another project without writing anything
  annot8 -d ../service --dry-run --show-diff

  # Save the preview as a diff file
  annot8 --dry-run --save-diff changes.diff

  # Only annotate staged files, filling author/date from git history
  annot8 --staged --use-git-metadata

  # Undo the last run
  annot8 --revert

  # Run automatically before every commit
  annot8 --install-hook
",
  help_template = "{before-help}{name} v{version}
{about-section}
{usage-heading} {usage}

{all-args}{after-help}
"
)]
pub struct Cli {
  #[command(flatten)]
  pub args: AnnotateArgs,
}

impl Cli {
  /// Parse CLI arguments and return the Cli struct
  pub fn parse_args() -> Self {
    Self::parse()
  }
}

#[cfg(test)]
mod tests {
  use clap::CommandFactory;

  use super::*;

  #[test]
  fn test_cli_definition_is_valid() {
    Cli::command().debug_assert();
  }

  #[test]
  fn test_git_and_staged_conflict() {
    assert!(Cli::try_parse_from(["annot8", "--git", "--staged"]).is_err());
  }

  #[test]
  fn test_force_requires_install_hook() {
    assert!(Cli::try_parse_from(["annot8", "--force"]).is_err());
    assert!(Cli::try_parse_from(["annot8", "--install-hook", "--force"]).is_ok());
  }

  #[test]
  fn test_defaults() {
    let cli = Cli::try_parse_from(["annot8"]).expect("parse");
    assert_eq!(cli.args.directory, std::path::PathBuf::from("."));
    assert!(!cli.args.dry_run);
    assert_eq!(cli.args.verbose, 0);
  }
}
