//! Implementation of the `leaselock init` and `leaselock objects` commands.

use crate::cli::NamespaceArgs;
use crate::context::CommandContext;
use leaselock::error::Result;
use tracing::info;

/// Execute the `leaselock init` command.
///
/// This command is **idempotent**: initializing an existing namespace leaves
/// its objects untouched.
pub fn cmd_init(ctx: &CommandContext, args: NamespaceArgs) -> Result<()> {
    let existed = ctx.backend.namespace_exists(&args.namespace)?;
    ctx.backend.create_namespace(&args.namespace)?;

    if existed {
        println!("Namespace '{}' already exists.", args.namespace);
    } else {
        info!(namespace = %args.namespace, backend = %ctx.backend.describe(), "created namespace");
        println!(
            "Created namespace '{}' in {}.",
            args.namespace,
            ctx.backend.describe()
        );
    }
    Ok(())
}

/// Execute the `leaselock objects` command.
pub fn cmd_objects(ctx: &CommandContext, args: NamespaceArgs) -> Result<()> {
    ctx.require_namespace(&args.namespace)?;

    let objects = ctx.backend.list(&args.namespace)?;
    if objects.is_empty() {
        println!("No objects in namespace '{}'.", args.namespace);
        return Ok(());
    }

    println!("Objects in '{}' ({}):", args.namespace, objects.len());
    for key in &objects {
        let marker = if *key == ctx.config.store.lock_key {
            "  (lock record)"
        } else {
            ""
        };
        println!("  {}{}", key, marker);
    }
    Ok(())
}
