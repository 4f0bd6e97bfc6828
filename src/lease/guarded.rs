//! Run an operation while holding the lock.

use super::service::LockService;
use super::store::LockStore;
use super::types::{LeaseSettings, LockStatus};
use crate::error::{LockError, Result};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Default number of acquisition retries after the first attempt.
pub const DEFAULT_ACQUIRE_RETRIES: u32 = 10;

/// Default pause between acquisition attempts.
pub const DEFAULT_ACQUIRE_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Default)]
struct LossState {
    reason: Mutex<Option<String>>,
    changed: Condvar,
}

impl LossState {
    fn reason(&self) -> MutexGuard<'_, Option<String>> {
        self.reason
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    fn mark_lost(&self, reason: &str) {
        let mut current = self.reason();
        if current.is_none() {
            *current = Some(reason.to_string());
        }
        self.changed.notify_all();
    }

    fn reset(&self) {
        *self.reason() = None;
    }
}

/// Handed to the guarded operation so it can notice a lost lease and stop.
#[derive(Clone)]
pub struct LeaseToken {
    name: String,
    state: Arc<LossState>,
}

impl LeaseToken {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_lost(&self) -> bool {
        self.state.reason().is_some()
    }

    /// Why the lease was lost, if it was.
    pub fn lost_reason(&self) -> Option<String> {
        self.state.reason().clone()
    }

    /// `Err(LockError::Lost)` once the lease is gone.
    pub fn check(&self) -> Result<()> {
        match self.lost_reason() {
            Some(reason) => Err(self.lost(reason)),
            None => Ok(()),
        }
    }

    /// Sleep for `duration`, waking early with `Err(LockError::Lost)` if the
    /// lease is lost meanwhile.
    ///
    /// A `duration` too large to express as a deadline waits until the lease
    /// is lost.
    pub fn wait_for(&self, duration: Duration) -> Result<()> {
        let deadline = Instant::now().checked_add(duration);
        let mut reason = self.state.reason();

        loop {
            if let Some(lost) = reason.as_ref() {
                return Err(self.lost(lost.clone()));
            }
            reason = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Ok(());
                    }
                    self.state
                        .changed
                        .wait_timeout(reason, deadline - now)
                        .map(|(guard, _)| guard)
                        .unwrap_or_else(|poison| poison.into_inner().0)
                }
                None => self
                    .state
                    .changed
                    .wait(reason)
                    .unwrap_or_else(|poison| poison.into_inner()),
            };
        }
    }

    fn lost(&self, reason: String) -> LockError {
        LockError::Lost {
            name: self.name.clone(),
            reason,
        }
    }
}

/// Acquires the lock (with retries), runs an operation while holding it and
/// releases it on every exit path.
///
/// If the lease is lost while the operation runs, the operation's token
/// flips to lost and `run` reports [`LockError::Lost`] even when the
/// operation itself returned normally.
pub struct GuardedLock {
    service: LockService,
    token: LeaseToken,
    retries: u32,
    backoff: Duration,
}

impl GuardedLock {
    pub fn new(store: Arc<dyn LockStore>, settings: LeaseSettings) -> Self {
        Self::with_callback(store, settings, |_| {})
    }

    /// Like [`GuardedLock::new`], also forwarding every lease event to
    /// `on_lease_lost`.
    pub fn with_callback(
        store: Arc<dyn LockStore>,
        settings: LeaseSettings,
        on_lease_lost: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        let state = Arc::new(LossState::default());
        let callback_state = Arc::clone(&state);
        let name = store.name().to_string();

        let service = LockService::new(store, settings, move |reason| {
            callback_state.mark_lost(reason);
            on_lease_lost(reason);
        });

        Self {
            service,
            token: LeaseToken { name, state },
            retries: DEFAULT_ACQUIRE_RETRIES,
            backoff: DEFAULT_ACQUIRE_BACKOFF,
        }
    }

    /// Acquisition attempts after the first one.
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Pause between acquisition attempts.
    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn service(&self) -> &LockService {
        &self.service
    }

    /// Run `op` while holding the lock.
    pub fn run<T>(&mut self, op: impl FnOnce(&LeaseToken) -> T) -> Result<T> {
        self.token.state.reset();
        self.acquire()?;

        let _unlock = UnlockOnDrop(&self.service);
        info!(lock = self.service.name(), "got the lock, running guarded operation");
        let value = op(&self.token);

        // Decide before unlocking: unlock itself reports an event.
        if let Some(reason) = self.token.lost_reason() {
            warn!(lock = self.service.name(), %reason, "lease was lost during the operation");
            return Err(self.token.lost(reason));
        }
        Ok(value)
    }

    fn acquire(&self) -> Result<()> {
        let mut attempt = 0;
        loop {
            match self.service.lock() {
                Ok(LockStatus::Acquired(_)) | Ok(LockStatus::AlreadyHeld) => return Ok(()),
                Err(e @ LockError::NotAcquired { .. }) if attempt < self.retries => {
                    attempt += 1;
                    debug!(
                        lock = self.service.name(),
                        attempt,
                        of = self.retries,
                        error = %e,
                        "could not grab the lock, retrying"
                    );
                    thread::sleep(self.backoff);
                }
                Err(e) => {
                    info!(lock = self.service.name(), error = %e, "could not grab the lock");
                    return Err(e);
                }
            }
        }
    }
}

struct UnlockOnDrop<'a>(&'a LockService);

impl Drop for UnlockOnDrop<'_> {
    fn drop(&mut self) {
        debug!(lock = self.0.name(), "releasing the lock");
        self.0.unlock();
    }
}

/// Acquire the lock on `store`, run `op`, release the lock.
///
/// # Example
///
/// ```no_run
/// use leaselock::lease::{BackendLockStore, LeaseSettings, with_lock};
/// use leaselock::store::MemoryObjectStore;
/// use std::sync::Arc;
///
/// let backend = Arc::new(MemoryObjectStore::new());
/// let store = Arc::new(BackendLockStore::for_namespace(backend, "ns"));
/// let total = with_lock(store, LeaseSettings::default(), |token| {
///     token.check()?;
///     Ok::<_, leaselock::LockError>(40 + 2)
/// })??;
/// assert_eq!(total, 42);
/// # Ok::<(), leaselock::LockError>(())
/// ```
pub fn with_lock<T>(
    store: Arc<dyn LockStore>,
    settings: LeaseSettings,
    op: impl FnOnce(&LeaseToken) -> T,
) -> Result<T> {
    GuardedLock::new(store, settings).run(op)
}
