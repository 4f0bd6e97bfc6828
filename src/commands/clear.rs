//! Implementation of the `leaselock clear` command.

use crate::cli::ClearArgs;
use crate::context::CommandContext;
use leaselock::error::{LockError, Result};
use leaselock::store::StoreError;
use tracing::warn;

/// Execute the `leaselock clear` command.
///
/// Erasing the record makes a live holder lose its lease on its next
/// renewal, and lets the next contender create a fresh record without
/// waiting.
pub fn cmd_clear(ctx: &CommandContext, args: ClearArgs) -> Result<()> {
    // Require --force flag
    if !args.force {
        return Err(LockError::UserError(
            "refusing to clear lock without --force flag.\n\n\
             Clearing a lock makes its current holder lose the lease; it may still be working.\n\
             Only clear locks if you are certain the lock holder has crashed.\n\n\
             To clear the lock, run:\n  leaselock clear {} --force"
                .replace("{}", &args.namespace),
        ));
    }

    ctx.require_namespace(&args.namespace)?;
    let store = ctx.lock_store(&args.namespace);

    let previous = match store.read() {
        Ok((record, _)) => Some(record),
        Err(StoreError::NotFound(_)) => None,
        // An unreadable record is exactly what an operator may need to clear.
        Err(StoreError::Corrupt { .. }) => None,
        Err(e) => return Err(e.into()),
    };

    match store.erase() {
        Ok(()) => {}
        Err(StoreError::NotFound(_)) => {
            return Err(LockError::UserError(format!(
                "no lock record for '{}'",
                store.name()
            )));
        }
        Err(e) => return Err(e.into()),
    }

    warn!(lock = store.name(), "lock record erased by operator");
    println!("Cleared lock: {}", store.name());
    if let Some(record) = previous {
        println!("  Owner:      {}", record.owner_id);
        if let Some(holder) = &record.holder {
            println!("  Holder:     {}", holder);
        }
        println!("  Age:        {}", record.age_string());
        println!(
            "  State:      {}",
            if record.has_lease { "held" } else { "released" }
        );
    }

    Ok(())
}
