//! # Logging Module
//!
//! This module provides logging utilities for annot8, including:
//! - Output modes (normal, quiet, verbose) shared by all user-facing output
//! - Verbose logging that can be enabled/disabled
//! - Standard info logging with color support
//! - Setup of the `tracing` subscriber used for diagnostics
//!
//! Verbose logs and diagnostics go to stderr; info logs and the run summary go
//! to stdout for better pipeline integration.
//!
//! ## Example
//!
//! ```rust
//! use annot8::logging::{ColorMode, set_verbose};
//! use annot8::{info_log, verbose_log};
//!
//! // Enable verbose logging
//! set_verbose();
//!
//! // Set color mode to Auto (uses owo-colors' automatic TTY detection)
//! ColorMode::Auto.apply();
//!
//! // Log a verbose message (goes to stderr)
//! verbose_log!("Processing file: {}", "example.py");
//!
//! // Log an info message (goes to stdout)
//! info_log!("Header added to: {}", "example.py");
//! ```

mod modes;

pub use modes::{ColorMode, LOG_ENV_VAR, init_tracing, is_quiet, is_verbose, set_quiet, set_verbose};
use owo_colors::{OwoColorize, Stream};

/// Logs a message to stderr if verbose mode is enabled.
///
/// This macro is used for detailed logging that is only shown when verbose mode
/// is enabled via [`set_verbose`]. It uses the same format string syntax as
/// the standard [`eprintln!`] macro.
#[macro_export]
macro_rules! verbose_log {
    ($($arg:tt)*) => {
        if $crate::logging::is_verbose() {
            eprintln!($($arg)*);
        }
    };
}

/// Logs a message to stdout unless quiet mode is enabled.
///
/// It uses the same format string syntax as the standard [`println!`] macro.
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        if !$crate::logging::is_quiet() {
            $crate::logging::print_info_log(&format!($($arg)*));
        }
    };
}

/// Internal function to print info log messages with formatting.
///
/// This function is used by the [`info_log!`] macro to format and print
/// messages with colors if enabled.
pub fn print_info_log(message: &str) {
  println!("{}", message.if_supports_color(Stream::Stdout, |m| m.yellow()));
}
