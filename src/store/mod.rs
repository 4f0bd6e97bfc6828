//! Storage backends for leaselock.
//!
//! Backends expose one uniform, namespaced object-store contract
//! ([`ObjectStore`]): exists / read / conditional write / delete / list, with
//! a version [`Tag`] returned by every read and write. The lease protocol is
//! written once against that contract.
//!
//! # Backends
//!
//! - [`MemoryObjectStore`]: in-process, clones share state.
//! - [`LocalObjectStore`]: one directory per namespace, one file per object,
//!   compare-and-swap serialised through an advisory file lock.
//! - [`RetryingObjectStore`]: wraps another store and retries transient
//!   failures with exponential backoff.

mod error;
mod local;
mod memory;
mod object;
mod retry;
mod tag;


// Re-export public API
pub use error::StoreError;
pub use local::LocalObjectStore;
pub use memory::MemoryObjectStore;
pub use object::{ObjectStore, validate_name};
pub use retry::{RetryPolicy, RetryingObjectStore};
pub use tag::Tag;

pub(crate) use object::object_name;
