//! Lease-based distributed lock.
//!
//! Mutual exclusion between independent processes built only on a
//! compare-and-swap object store. There is no server-side expiry and no
//! session concept: liveness and safety come from client-side timeouts.
//!
//! # Protocol
//!
//! One lock record lives at one key per protected namespace. Its lifecycle is
//! absent → created by the first acquirer → overwritten in place by renewals,
//! releases and steals → erased only administratively.
//!
//! - **acquire**: create the record if absent; take it immediately if the
//!   previous holder released it; otherwise wait
//!   `3 × session_timeout + renew_interval` and overwrite it against the tag
//!   read before waiting. A live holder renews during the wait, so the steal
//!   fails; a dead one does not, so it succeeds.
//! - **renew**: the heartbeat rewrites the record with a bumped generation.
//!   A rejected write followed by a re-read showing another owner means the
//!   lease was stolen.
//! - **release**: write the record back with `has_lease = false` so the next
//!   contender need not wait.
//!
//! The steal is a lease-expiry heuristic, not proof that the holder died:
//! the protocol favours progress and relies on the old holder's heartbeat to
//! detect the theft and report the loss.

mod communicator;
mod error;
mod guarded;
mod heartbeat;
mod notify;
mod record;
mod service;
mod store;
mod types;


// Re-export public API
pub use communicator::LockCommunicator;
pub use error::{AcquireError, RenewError};
pub use guarded::{
    DEFAULT_ACQUIRE_BACKOFF, DEFAULT_ACQUIRE_RETRIES, GuardedLock, LeaseToken, with_lock,
};
pub use heartbeat::HeartbeatExit;
pub use record::{LockRecord, RECORD_FORMAT_VERSION, RecordError};
pub use service::LockService;
pub use store::{BackendLockStore, DEFAULT_LOCK_KEY, LockStore};
pub use types::{Acquisition, LeaseSettings, LockStatus, LossCallback, UNLOCK_REASON};
