//! CLI Adapter
//!
//! Command-line interface for the pairs signal generator.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{CliApp, Command, RunCmd, CheckCmd, OutputFormat};
