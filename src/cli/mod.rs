//! CLI module
//!
//! Command-line interface, argument parsing and subcommand runners.

mod args;
mod run;

pub use args::{sender_profile, CliArgs, Command, FormatArg};
pub use run::{run_export, run_scan};

use clap::Parser;

/// Parse command-line arguments using clap
///
/// If parsing fails (invalid arguments, missing required arguments, or
/// the --help flag), clap displays an error message or help text and
/// exits the process.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}
