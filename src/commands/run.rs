//! Implementation of the `leaselock run` command.
//!
//! Runs a child process while holding the lock. The child is killed as soon
//! as the lease is lost, so it never keeps working without exclusivity.

use super::guarded_lock;
use crate::cli::RunArgs;
use crate::context::CommandContext;
use leaselock::error::{LockError, Result};
use leaselock::lease::LeaseToken;
use std::process::{Child, Command, ExitStatus};
use std::time::Duration;
use tracing::{info, warn};

/// How often the child is polled for exit between loss checks.
const CHILD_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Execute the `leaselock run` command.
pub fn cmd_run(ctx: &CommandContext, args: RunArgs) -> Result<()> {
    let Some((program, program_args)) = args.program.split_first() else {
        return Err(LockError::UserError("no program given".to_string()));
    };

    let mut guarded = guarded_lock(ctx, &args.namespace);
    let status = guarded.run(|token| {
        let child = Command::new(program)
            .args(program_args)
            .spawn()
            .map_err(|e| LockError::UserError(format!("failed to start '{}': {}", program, e)))?;
        info!(lock = token.name(), program = %program, pid = child.id(), "started child");
        supervise(child, program, token)
    })??;

    if status.success() {
        Ok(())
    } else {
        Err(LockError::UserError(format!(
            "'{}' exited with {}",
            program, status
        )))
    }
}

/// Wait for `child`, killing it if the lease is lost first.
fn supervise(mut child: Child, program: &str, token: &LeaseToken) -> Result<ExitStatus> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {}
            Err(e) => {
                return Err(LockError::UserError(format!(
                    "failed to wait for '{}': {}",
                    program, e
                )));
            }
        }

        if let Err(lost) = token.wait_for(CHILD_POLL_INTERVAL) {
            warn!(lock = token.name(), program, "lease lost, killing child");
            // The child may have exited in the meantime.
            let _ = child.kill();
            let _ = child.wait();
            return Err(lost);
        }
    }
}
