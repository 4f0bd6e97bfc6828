//! Filesystem utilities for leaselock.
//!
//! The local object store relies on these so that a reader never observes a
//! half-written lock record.

pub mod atomic;

pub use atomic::atomic_write;
