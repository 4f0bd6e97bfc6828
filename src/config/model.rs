//! Config struct definition.

use super::types::*;
use serde::{Deserialize, Serialize};

/// Configuration for leaselock.
///
/// This struct represents the contents of `leaselock.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Storage settings
    // =========================================================================
    /// Backend selection, location and storage-client retries.
    pub store: StoreConfig,

    // =========================================================================
    // Lease settings
    // =========================================================================
    /// Lease timing and renewal budgets.
    pub lease: LeaseConfig,

    // =========================================================================
    // Guarded-call settings
    // =========================================================================
    /// Acquisition retries for `run`/`hold`.
    pub acquire: AcquireConfig,
}
