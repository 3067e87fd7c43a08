//! Command-line entry point.
//!
//! # Error Handling Strategy
//!
//! Usage errors from clap and configuration errors exit with code 1. Per-conversation
//! fetch failures never abort a batch run; they are reported inline and turn the exit
//! code into 2.

pub mod commands;

pub use commands::{Cli, run};
