//! CLI command handling module
//!
//! Handles all CLI subcommands and argument parsing.

mod commands;
mod logging;

pub use commands::{ConfigSubcommand, OutputFormat, handle_config_command, run_extract};
pub use logging::*;
