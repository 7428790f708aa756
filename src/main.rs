//! # annot8
//!
//! Adds a `File: relative/path` header comment to every source file in a
//! project.

use annot8::cli::{Cli, run_annotate};
use anyhow::Result;

fn main() -> Result<()> {
  let cli = Cli::parse_args();
  run_annotate(cli.args)
}
