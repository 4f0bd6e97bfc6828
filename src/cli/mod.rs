//! CLI argument parsing for leaselock.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Leaselock: lease-based mutual exclusion on top of an object store.
///
/// A lock protects one namespace of the store. Holders keep their lease
/// alive with a heartbeat; a holder that stops renewing has its lease
/// stolen after the steal-wait window.
#[derive(Parser, Debug)]
#[command(name = "leaselock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Config file (default: ./leaselock.yaml if present).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the local backend's root directory.
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for leaselock.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a namespace in the configured store.
    ///
    /// Locks can only be taken on namespaces that exist.
    Init(NamespaceArgs),

    /// Show the lock record of a namespace.
    ///
    /// Prints owner, lease flag, generation, timeouts and steal-wait.
    Status(NamespaceArgs),

    /// Erase the lock record of a namespace.
    ///
    /// Requires --force flag to prevent accidental clearing.
    Clear(ClearArgs),

    /// List the objects stored in a namespace.
    Objects(NamespaceArgs),

    /// Acquire the lock and hold it for a while.
    ///
    /// The heartbeat renews the lease while holding; the lock is released
    /// afterwards.
    Hold(HoldArgs),

    /// Run a program while holding the lock.
    ///
    /// The program is killed if the lease is lost while it runs.
    Run(RunArgs),
}

/// Arguments for commands that only need a namespace.
#[derive(Parser, Debug)]
pub struct NamespaceArgs {
    /// Namespace protected by the lock.
    pub namespace: String,
}

/// Arguments for the `clear` command.
#[derive(Parser, Debug)]
pub struct ClearArgs {
    /// Namespace whose lock record should be erased.
    pub namespace: String,

    /// Force clearing the lock (required for safety).
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `hold` command.
#[derive(Parser, Debug)]
pub struct HoldArgs {
    /// Namespace to lock.
    pub namespace: String,

    /// How long to hold the lock.
    #[arg(long, default_value_t = 10)]
    pub seconds: u64,
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Namespace to lock.
    pub namespace: String,

    /// Program and arguments to run while holding the lock.
    #[arg(last = true, required = true, num_args = 1..)]
    pub program: Vec<String>,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
