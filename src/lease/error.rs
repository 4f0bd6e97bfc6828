//! Protocol-level outcomes of the lock communicator.

use crate::store::StoreError;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Why an acquisition attempt failed. Every variant but `NamespaceMissing`
/// is retryable by the caller.
#[derive(Error, Debug)]
pub enum AcquireError {
    /// There is nothing to lock.
    #[error("namespace of lock '{0}' does not exist")]
    NamespaceMissing(String),

    /// The record was free but another contender took it first.
    #[error("released lock was taken by another contender first")]
    TakeRaced,

    /// The record changed while we waited to steal it.
    #[error("lock is held and was renewed or taken during the steal-wait")]
    StealRaced,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Why a renewal failed. Every variant means the lease must be considered lost.
#[derive(Error, Debug)]
pub enum RenewError {
    #[error("lease was stolen by {0}")]
    Stolen(Uuid),

    #[error("lock record was erased")]
    Erased,

    #[error("renewal ran out of retries after {0} attempts")]
    RetriesExhausted(u32),

    #[error("renewal exceeded its time budget of {0:?}")]
    TimedOut(Duration),

    #[error("could not confirm ownership: {0}")]
    Store(#[from] StoreError),
}
