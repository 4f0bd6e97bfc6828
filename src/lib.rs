//! Leaselock: lease-based distributed locking on compare-and-swap object
//! stores.
//!
//! Independent processes agree on a single holder of a namespace by
//! reading and conditionally rewriting one lock record. The holder keeps its
//! lease alive from a heartbeat thread; a holder that stops renewing has its
//! lease stolen after a generous steal-wait window, and learns about the
//! theft through its loss callback.
//!
//! - [`store`]: the object-store contract and its backends.
//! - [`lease`]: the lock record, protocol, heartbeat, [`lease::LockService`]
//!   and the guarded call [`lease::with_lock`].
//! - [`config`]: YAML configuration of all of the above.

pub mod config;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod lease;
pub mod logging;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{LockError, Result};
