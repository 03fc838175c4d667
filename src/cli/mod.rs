//! CLI module for planq - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for queue management,
//! slot status, health checks, and the error log.

pub mod commands;

pub use commands::Cli;
