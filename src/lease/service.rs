//! The lock service facade.

use super::communicator::LockCommunicator;
use super::error::AcquireError;
use super::heartbeat::Heartbeat;
use super::notify::LeaseSession;
use super::store::LockStore;
use super::types::{LeaseSettings, LockStatus, LossCallback, UNLOCK_REASON};
use crate::error::{LockError, Result};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info};

/// Lease-based lock on one [`LockStore`], held by at most one heartbeat at a
/// time.
///
/// `lock()` negotiates ownership on the caller's thread and, on success,
/// starts a heartbeat thread that keeps the lease alive. When the heartbeat
/// can no longer renew it, the loss callback fires from the heartbeat thread
/// and the service stops considering itself the holder. `unlock()` stops the
/// heartbeat, releases the lease, fires the callback with
/// [`UNLOCK_REASON`] and returns only after the heartbeat has stopped.
///
/// The callback runs on the heartbeat thread for losses and on the caller's
/// thread (under the service mutex) for unlocks. It should only record the
/// event: `unlock()` may be waiting on the heartbeat thread while a loss
/// callback runs. A panicking callback aborts the process.
pub struct LockService {
    store: Arc<dyn LockStore>,
    settings: LeaseSettings,
    callback: LossCallback,
    heartbeat: Mutex<Option<Heartbeat>>,
}

impl LockService {
    pub fn new(
        store: Arc<dyn LockStore>,
        settings: LeaseSettings,
        on_lease_lost: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        Self {
            store,
            settings,
            callback: Arc::new(on_lease_lost),
            heartbeat: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        self.store.name()
    }

    pub fn settings(&self) -> &LeaseSettings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<dyn LockStore> {
        &self.store
    }

    /// Whether a heartbeat is currently keeping the lease alive.
    pub fn is_locked(&self) -> bool {
        self.slot().as_ref().is_some_and(Heartbeat::is_running)
    }

    /// Try once to acquire the lock.
    ///
    /// Returns [`LockStatus::AlreadyHeld`] without touching the store if this
    /// service already holds it. Fails with [`LockError::NamespaceMissing`]
    /// if the protected namespace does not exist, and with
    /// [`LockError::NotAcquired`] if the lock is held elsewhere or the store
    /// misbehaved. The service never retries on its own.
    pub fn lock(&self) -> Result<LockStatus> {
        let mut slot = self.slot();

        if slot.as_ref().is_some_and(Heartbeat::is_running) {
            debug!(lock = self.name(), "lock already held");
            return Ok(LockStatus::AlreadyHeld);
        }

        if let Some(finished) = slot.take() {
            let exit = finished.join();
            debug!(lock = self.name(), ?exit, "reaped finished heartbeat");
        }

        let mut communicator = LockCommunicator::new(Arc::clone(&self.store), self.settings);
        let acquisition = communicator.acquire().map_err(|e| match e {
            AcquireError::NamespaceMissing(name) => LockError::NamespaceMissing(name),
            e => self.not_acquired(e.to_string()),
        })?;

        let session = Arc::new(LeaseSession::new(self.name(), Arc::clone(&self.callback)));
        let heartbeat = Heartbeat::spawn(communicator, session).map_err(|e| {
            error!(lock = self.name(), error = %e, "could not start heartbeat");
            self.not_acquired(format!("could not start heartbeat: {}", e))
        })?;

        *slot = Some(heartbeat);
        info!(lock = self.name(), ?acquisition, "lock acquired");
        Ok(LockStatus::Acquired(acquisition))
    }

    /// Release the lock if held. Idempotent.
    ///
    /// Returns after the heartbeat thread has stopped, so no renewal happens
    /// once this returns.
    pub fn unlock(&self) {
        let mut slot = self.slot();

        let Some(heartbeat) = slot.take() else {
            debug!(lock = self.name(), "unlock called while not holding the lock");
            return;
        };

        heartbeat.interrupt();
        heartbeat.session().notify(UNLOCK_REASON);
        let exit = heartbeat.join();
        info!(lock = self.name(), ?exit, "unlocked");
    }

    fn slot(&self) -> MutexGuard<'_, Option<Heartbeat>> {
        self.heartbeat
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    fn not_acquired(&self, reason: String) -> LockError {
        LockError::NotAcquired {
            name: self.name().to_string(),
            reason,
        }
    }
}

impl Drop for LockService {
    fn drop(&mut self) {
        self.unlock();
    }
}

impl std::fmt::Debug for LockService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockService")
            .field("name", &self.name())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
