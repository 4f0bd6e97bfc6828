//! Command implementations for leaselock.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Each handler takes the resolved [`CommandContext`] so it
//! can be driven directly from tests.

mod clear;
mod hold;
mod namespace;
mod run;
mod status;


use crate::cli::{Cli, Command};
use crate::context::CommandContext;
use leaselock::error::Result;
use leaselock::lease::GuardedLock;

/// Dispatch a command to its implementation.
///
/// This is the main entry point for command execution. The context is
/// resolved once from the global flags, then the command is routed to its
/// handler function.
pub fn dispatch(cli: Cli) -> Result<()> {
    let ctx = CommandContext::resolve(cli.config.as_deref(), cli.root.as_deref())?;

    match cli.command {
        Command::Init(args) => namespace::cmd_init(&ctx, args),
        Command::Status(args) => status::cmd_status(&ctx, args),
        Command::Clear(args) => clear::cmd_clear(&ctx, args),
        Command::Objects(args) => namespace::cmd_objects(&ctx, args),
        Command::Hold(args) => hold::cmd_hold(&ctx, args),
        Command::Run(args) => run::cmd_run(&ctx, args),
    }
}

/// Guarded lock on `namespace` using the configured lease and acquisition
/// settings.
fn guarded_lock(ctx: &CommandContext, namespace: &str) -> GuardedLock {
    GuardedLock::new(ctx.lock_store(namespace), ctx.config.lease_settings())
        .retries(ctx.config.acquire.retries)
        .backoff(ctx.config.acquire_backoff())
}
