//! Implementation of the `leaselock hold` command.

use super::guarded_lock;
use crate::cli::HoldArgs;
use crate::context::CommandContext;
use leaselock::error::Result;
use std::time::Duration;

/// Execute the `leaselock hold` command.
///
/// Fails with [`leaselock::LockError::Lost`] (exit code 5) if the lease is
/// lost before the hold period ends.
pub fn cmd_hold(ctx: &CommandContext, args: HoldArgs) -> Result<()> {
    let mut guarded = guarded_lock(ctx, &args.namespace);
    let hold_for = Duration::from_secs(args.seconds);

    guarded.run(|token| {
        println!("Holding lock '{}' for {}s...", token.name(), args.seconds);
        token.wait_for(hold_for)
    })??;

    println!("Released lock '{}'.", guarded.service().name());
    Ok(())
}
