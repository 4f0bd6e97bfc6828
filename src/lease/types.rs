//! Lease settings and outcome types.

use std::sync::Arc;
use std::time::Duration;

/// Reason passed to the loss callback when the holder unlocks.
pub const UNLOCK_REASON: &str = "unlock called";

/// Callback fired when a lease ends: on loss, or with [`UNLOCK_REASON`].
///
/// It has no error channel. A panic escaping it aborts the process.
pub type LossCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Timing and retry parameters of one lease.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaseSettings {
    /// Session timeout recorded in the lock record.
    pub session_timeout: Duration,
    /// How often the heartbeat renews the lease.
    pub renew_interval: Duration,
    /// `steal_wait = steal_wait_multiplier * session_timeout + renew_interval`.
    pub steal_wait_multiplier: u32,
    /// Write attempts per renewal before giving the lease up.
    pub max_renew_retries: u32,
    /// Wall-clock budget of a single renewal.
    pub max_renew_wait: Duration,
    /// Pause between failed re-reads inside a renewal.
    pub reread_pause: Duration,
}

impl Default for LeaseSettings {
    fn default() -> Self {
        Self {
            session_timeout: Duration::from_secs(10),
            renew_interval: Duration::from_secs(5),
            steal_wait_multiplier: 3,
            max_renew_retries: 100,
            max_renew_wait: Duration::from_secs(10),
            reread_pause: Duration::from_secs(1),
        }
    }
}

impl LeaseSettings {
    /// Settings with the given timings and default retry budgets.
    pub fn new(session_timeout: Duration, renew_interval: Duration) -> Self {
        Self {
            session_timeout,
            renew_interval,
            ..Self::default()
        }
    }

    pub fn with_steal_wait_multiplier(mut self, multiplier: u32) -> Self {
        self.steal_wait_multiplier = multiplier;
        self
    }

    pub fn with_max_renew_retries(mut self, retries: u32) -> Self {
        self.max_renew_retries = retries;
        self
    }

    pub fn with_max_renew_wait(mut self, wait: Duration) -> Self {
        self.max_renew_wait = wait;
        self
    }

    pub fn with_reread_pause(mut self, pause: Duration) -> Self {
        self.reread_pause = pause;
        self
    }

    /// Steal-wait window a contender would apply to a lease taken with
    /// these settings.
    pub fn steal_wait(&self) -> Duration {
        self.session_timeout
            .saturating_mul(self.steal_wait_multiplier)
            .saturating_add(self.renew_interval)
    }
}

/// How an acquisition succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquisition {
    /// No record existed; we created it.
    Created,
    /// The previous holder had released cleanly.
    TookReleased,
    /// The previous holder did not release; we overwrote it after the
    /// steal-wait window.
    Stolen,
}

/// Result of [`crate::lease::LockService::lock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockStatus {
    Acquired(Acquisition),
    /// This service already holds the lock; nothing was done.
    AlreadyHeld,
}
