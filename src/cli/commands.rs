//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - status: queue and slot summary
//! - health: check store, slots, and probe wiring
//! - queue: list/add/remove queue entries
//! - errors: show the recent error log

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// planq - persistent planning queue and slot estimator
#[derive(Parser, Debug)]
#[command(name = "planq")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show queue and slot status summary
    Status,

    /// Check health of the store, slot calculator, and probe
    Health,

    /// Queue management commands
    Queue {
        #[command(subcommand)]
        command: QueueCommands,
    },

    /// Show recent error records
    Errors {
        /// Maximum number of records to show
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
}

/// Queue management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum QueueCommands {
    /// List queue entries that are ready for dispatch
    List {
        /// Include entries that are not ready yet
        #[arg(short, long)]
        all: bool,
    },

    /// Add a work item to the queue (or update its retry time)
    Add {
        /// Repository (format: owner/repo)
        repo: String,

        /// Work item number
        number: u64,
    },

    /// Remove a work item from the queue
    Remove {
        /// Repository (format: owner/repo)
        repo: String,

        /// Work item number
        number: u64,
    },
}
