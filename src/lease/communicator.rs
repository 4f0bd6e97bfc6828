//! Lease state transitions against a [`LockStore`].
//!
//! One communicator serves one acquisition session at a time: it caches the
//! record it is trying to hold and the last tag it observed, and every write
//! it issues is conditional on that tag.

use super::error::{AcquireError, RenewError};
use super::record::LockRecord;
use super::store::LockStore;
use super::types::{Acquisition, LeaseSettings};
use crate::store::{StoreError, Tag};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{debug, error, info, warn};

pub struct LockCommunicator {
    store: Arc<dyn LockStore>,
    settings: LeaseSettings,
    record: LockRecord,
    tag: Option<Tag>,
}

impl LockCommunicator {
    pub fn new(store: Arc<dyn LockStore>, settings: LeaseSettings) -> Self {
        let record = LockRecord::new(settings.session_timeout, settings.renew_interval);
        Self {
            store,
            settings,
            record,
            tag: None,
        }
    }

    pub fn name(&self) -> &str {
        self.store.name()
    }

    pub fn settings(&self) -> &LeaseSettings {
        &self.settings
    }

    /// The record this communicator is holding (or trying to hold).
    pub fn record(&self) -> &LockRecord {
        &self.record
    }

    /// Last tag observed in the store.
    pub fn tag(&self) -> Option<&Tag> {
        self.tag.as_ref()
    }

    pub fn lock_exists(&self) -> Result<bool, StoreError> {
        self.store.exists()
    }

    /// Try once to become the owner of the lease.
    ///
    /// Fails fast with [`AcquireError::NamespaceMissing`] if the protected
    /// namespace does not exist. A held lease is stolen after its steal-wait
    /// window whether or not its holder is actually gone; the holder's
    /// heartbeat notices the theft on its next renewal.
    pub fn acquire(&mut self) -> Result<Acquisition, AcquireError> {
        info!(lock = self.name(), "trying to acquire the lock");

        self.record = LockRecord::new(self.settings.session_timeout, self.settings.renew_interval);
        self.tag = None;

        if !self.store.namespace_exists()? {
            info!(lock = self.name(), "namespace does not exist, not locking");
            return Err(AcquireError::NamespaceMissing(self.name().to_string()));
        }

        if !self.store.exists()? {
            match self.put_lock() {
                Ok(()) => {
                    info!(lock = self.name(), owner = %self.record.owner_id, "created the lock");
                    return Ok(Acquisition::Created);
                }
                Err(StoreError::AlreadyExists(_)) => {
                    debug!(lock = self.name(), "another contender created the lock first");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let current = self.get_lock()?;

        if !current.different_owner(&self.record) {
            // A create that reported failure had landed after all.
            info!(lock = self.name(), "found our own freshly created lock");
            return Ok(Acquisition::Created);
        }

        if !current.has_lease {
            info!(lock = self.name(), previous = %current.owner_id, "lock was released, taking it");
            return match self.overwrite_lock() {
                Ok(()) => Ok(Acquisition::TookReleased),
                Err(e) => self.confirm_failed_write(e, Acquisition::TookReleased),
            };
        }

        let wait = current.steal_wait(self.settings.steal_wait_multiplier);
        info!(
            lock = self.name(),
            holder = %current.owner_id,
            generation = current.generation,
            wait_ms = wait.as_millis() as u64,
            "lock is held, waiting before trying to steal it"
        );
        thread::sleep(wait);

        info!(
            lock = self.name(),
            tag = %self.tag_display(),
            "trying to steal the lock"
        );
        match self.overwrite_lock() {
            Ok(()) => {
                warn!(lock = self.name(), previous = %current.owner_id, "stole the lock");
                Ok(Acquisition::Stolen)
            }
            Err(e) => self.confirm_failed_write(e, Acquisition::Stolen),
        }
    }

    /// A take-over or steal write reported `failed`. The write may still have
    /// landed (a lost response retried into a conflict with itself), so the
    /// record is re-read: if it carries our owner id the lease is ours.
    fn confirm_failed_write(
        &mut self,
        failed: StoreError,
        won: Acquisition,
    ) -> Result<Acquisition, AcquireError> {
        match self.get_lock() {
            Ok(current) if !current.different_owner(&self.record) => {
                info!(
                    lock = self.name(),
                    error = %failed,
                    ?won,
                    "write reported failure but landed, keeping the lock"
                );
                return Ok(won);
            }
            Ok(_) => {}
            Err(e) => {
                debug!(lock = self.name(), error = %e, "could not re-read after failed write");
            }
        }

        match (failed, won) {
            (StoreError::Conflict(_), Acquisition::Stolen) => Err(AcquireError::StealRaced),
            (StoreError::Conflict(_), _) => Err(AcquireError::TakeRaced),
            (e, _) => Err(e.into()),
        }
    }

    /// Extend the lease by writing the record back with a bumped generation.
    ///
    /// A rejected write is followed by a re-read: a different owner means the
    /// lease was stolen, our own record means the rejection was a benign race
    /// and the write is retried with the fresh tag.
    pub fn renew(&mut self) -> Result<(), RenewError> {
        debug!(lock = self.name(), "refreshing the lock");

        self.record.generation += 1;
        let start = Instant::now();

        for attempt in 1..=self.settings.max_renew_retries {
            match self.overwrite_lock() {
                Ok(()) => {
                    debug!(
                        lock = self.name(),
                        generation = self.record.generation,
                        "lock was successfully refreshed"
                    );
                    return Ok(());
                }
                Err(e) => {
                    warn!(lock = self.name(), attempt, error = %e, "failed to refresh lock");
                }
            }

            let current = self.reread(start)?;
            if current.different_owner(&self.record) {
                warn!(lock = self.name(), thief = %current.owner_id, "lost the lock");
                return Err(RenewError::Stolen(current.owner_id));
            }

            if start.elapsed() >= self.settings.max_renew_wait {
                error!(lock = self.name(), "renewal ran out of time");
                return Err(RenewError::TimedOut(self.settings.max_renew_wait));
            }
        }

        error!(lock = self.name(), "ran out of retries");
        Err(RenewError::RetriesExhausted(self.settings.max_renew_retries))
    }

    /// Mark the lease as released so the next contender can skip the
    /// steal-wait. Best-effort: failures are logged and reported as `false`.
    pub fn release(&mut self) -> bool {
        if self.tag.is_none() {
            debug!(lock = self.name(), "nothing to release");
            return false;
        }

        self.record.has_lease = false;
        match self.overwrite_lock() {
            Ok(()) => {
                info!(lock = self.name(), "released the lock");
                true
            }
            Err(e) => {
                warn!(lock = self.name(), error = %e, "failed to release the lock");
                false
            }
        }
    }

    /// Read the stored record and cache its tag.
    fn get_lock(&mut self) -> Result<LockRecord, StoreError> {
        let (record, tag) = self.store.read()?;
        debug!(lock = self.name(), tag = %tag, "read the lock");
        self.tag = Some(tag);
        Ok(record)
    }

    /// Create-if-absent write of our record.
    fn put_lock(&mut self) -> Result<(), StoreError> {
        let tag = self.store.write(&self.record, None)?;
        self.tag = Some(tag);
        Ok(())
    }

    /// Compare-and-swap write of our record against the cached tag.
    fn overwrite_lock(&mut self) -> Result<(), StoreError> {
        let Some(expected) = self.tag.as_ref() else {
            return Err(StoreError::Conflict(self.name().to_string()));
        };
        let tag = self.store.write(&self.record, Some(expected))?;
        self.tag = Some(tag);
        Ok(())
    }

    /// Re-read the record during a renewal, retrying transient failures
    /// until the renewal's time budget runs out.
    fn reread(&mut self, start: Instant) -> Result<LockRecord, RenewError> {
        loop {
            debug!(lock = self.name(), "reading the lock to see whether we still own it");
            match self.get_lock() {
                Ok(record) => return Ok(record),
                Err(StoreError::NotFound(_)) | Err(StoreError::NamespaceNotFound(_)) => {
                    warn!(lock = self.name(), "lock record is gone");
                    return Err(RenewError::Erased);
                }
                Err(e) => {
                    let elapsed = start.elapsed();
                    if elapsed + self.settings.reread_pause > self.settings.max_renew_wait {
                        return Err(RenewError::Store(e));
                    }
                    warn!(
                        lock = self.name(),
                        error = %e,
                        left_ms = (self.settings.max_renew_wait - elapsed).as_millis() as u64,
                        "reading the lock failed"
                    );
                    thread::sleep(self.settings.reread_pause);
                }
            }
        }
    }

    fn tag_display(&self) -> String {
        self.tag
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "none".to_string())
    }
}
