//! Implementation of the `leaselock status` command.
//!
//! Displays the lock record of a namespace as another contender would see
//! it, including the steal-wait window it would apply.

use crate::cli::NamespaceArgs;
use crate::context::CommandContext;
use leaselock::error::Result;
use leaselock::store::StoreError;

/// Execute the `leaselock status` command.
pub fn cmd_status(ctx: &CommandContext, args: NamespaceArgs) -> Result<()> {
    ctx.require_namespace(&args.namespace)?;
    let store = ctx.lock_store(&args.namespace);

    let (record, tag) = match store.read() {
        Ok(found) => found,
        Err(StoreError::NotFound(_)) => {
            println!("No lock record for '{}'.", store.name());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let multiplier = ctx.config.lease.steal_wait_multiplier;

    println!("Lock {}", store.name());
    println!("{}", "=".repeat("Lock ".len() + store.name().len()));
    println!();
    println!(
        "  State:            {}",
        if record.has_lease { "held" } else { "released" }
    );
    println!("  Owner:            {}", record.owner_id);
    if let Some(holder) = &record.holder {
        println!("  Holder:           {}", holder);
    }
    if let Some(acquired_at) = record.acquired_at {
        println!(
            "  Acquired:         {}",
            acquired_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    println!("  Age:              {}", record.age_string());
    println!("  Generation:       {}", record.generation);
    println!(
        "  Session timeout:  {} ms",
        record.session_timeout.as_millis()
    );
    println!(
        "  Renew interval:   {} ms",
        record.renew_interval.as_millis()
    );
    println!(
        "  Steal wait:       {} ms ({} x session timeout + renew interval)",
        record.steal_wait(multiplier).as_millis(),
        multiplier
    );
    println!("  Tag:              {}", tag.as_str());

    Ok(())
}
