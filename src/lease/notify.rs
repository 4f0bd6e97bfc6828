//! Delivery of lease-ending events to the user callback.

use super::types::LossCallback;
use std::panic::{self, AssertUnwindSafe};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info};

/// One held lease, from acquisition to loss or unlock.
///
/// Reports at most one event: whichever of "lost" (heartbeat thread) and
/// "unlock called" (facade) comes first wins, the other is dropped.
pub(crate) struct LeaseSession {
    name: String,
    callback: LossCallback,
    notified: AtomicBool,
}

impl LeaseSession {
    pub(crate) fn new(name: impl Into<String>, callback: LossCallback) -> Self {
        Self {
            name: name.into(),
            callback,
            notified: AtomicBool::new(false),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Whether this session has already reported its event.
    pub(crate) fn has_notified(&self) -> bool {
        self.notified.load(Ordering::Acquire)
    }

    /// Fire the callback unless an event was already reported.
    /// Returns whether this call fired it.
    pub(crate) fn notify(&self, reason: &str) -> bool {
        if self.notified.swap(true, Ordering::AcqRel) {
            return false;
        }
        invoke_or_abort(&self.callback, &self.name, reason);
        true
    }
}

/// Run the callback; abort the process if it panics.
pub(crate) fn invoke_or_abort(callback: &LossCallback, name: &str, reason: &str) {
    info!(lock = name, reason, "notifying lease callback");

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| callback(reason)));
    if outcome.is_err() {
        error!(
            lock = name,
            reason, "lease callback panicked; continuing could break mutual exclusion, aborting"
        );
        process::abort();
    }
}
