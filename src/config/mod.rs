//! Configuration model for leaselock.
//!
//! This module defines the Config struct that represents `leaselock.yaml`.
//! It supports forward-compatible YAML parsing (unknown fields are ignored),
//! sensible defaults for optional fields, and validation of config values.

mod model;
mod operations;
pub mod types;


// Re-export public API
pub use model::Config;
pub use operations::DEFAULT_CONFIG_FILE;
pub use types::{AcquireConfig, LeaseConfig, StoreBackend, StoreConfig};
