//! Configuration sections and defaults for leaselock.

use serde::{Deserialize, Serialize};

/// Which object store backs the locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Directory tree on the local filesystem (default).
    #[default]
    Local,
    /// In-process memory. Only useful within a single process.
    Memory,
}

impl StoreBackend {
    /// Parse a backend name.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "local" => Some(Self::Local),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

// Default value functions for serde
pub(crate) fn default_root() -> String {
    ".leaselock".to_string()
}
pub(crate) fn default_lock_key() -> String {
    crate::lease::DEFAULT_LOCK_KEY.to_string()
}
pub(crate) fn default_retry_attempts() -> u32 {
    3
}
pub(crate) fn default_retry_backoff_ms() -> u64 {
    50
}
pub(crate) fn default_session_timeout_ms() -> u64 {
    10_000
}
pub(crate) fn default_renew_interval_ms() -> u64 {
    5_000
}
pub(crate) fn default_steal_wait_multiplier() -> u32 {
    3
}
pub(crate) fn default_max_renew_retries() -> u32 {
    100
}
pub(crate) fn default_max_renew_wait_ms() -> u64 {
    10_000
}
pub(crate) fn default_reread_pause_ms() -> u64 {
    1_000
}
pub(crate) fn default_acquire_retries() -> u32 {
    10
}
pub(crate) fn default_acquire_backoff_ms() -> u64 {
    100
}

/// Storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend kind.
    pub backend: StoreBackend,

    /// Root directory of the local backend.
    #[serde(default = "default_root")]
    pub root: String,

    /// Object key holding the lock record in each namespace.
    #[serde(default = "default_lock_key")]
    pub lock_key: String,

    /// Retries of transient storage failures.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Initial backoff between storage retries, doubled per retry.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            root: default_root(),
            lock_key: default_lock_key(),
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Lease timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaseConfig {
    /// Session timeout written into the lock record.
    #[serde(default = "default_session_timeout_ms")]
    pub session_timeout_ms: u64,

    /// Heartbeat renewal interval.
    #[serde(default = "default_renew_interval_ms")]
    pub renew_interval_ms: u64,

    /// `steal_wait = steal_wait_multiplier * session_timeout + renew_interval`.
    #[serde(default = "default_steal_wait_multiplier")]
    pub steal_wait_multiplier: u32,

    /// Write attempts per renewal.
    #[serde(default = "default_max_renew_retries")]
    pub max_renew_retries: u32,

    /// Wall-clock budget of one renewal.
    #[serde(default = "default_max_renew_wait_ms")]
    pub max_renew_wait_ms: u64,

    /// Pause between failed re-reads during a renewal.
    #[serde(default = "default_reread_pause_ms")]
    pub reread_pause_ms: u64,
}

impl Default for LeaseConfig {
    fn default() -> Self {
        Self {
            session_timeout_ms: default_session_timeout_ms(),
            renew_interval_ms: default_renew_interval_ms(),
            steal_wait_multiplier: default_steal_wait_multiplier(),
            max_renew_retries: default_max_renew_retries(),
            max_renew_wait_ms: default_max_renew_wait_ms(),
            reread_pause_ms: default_reread_pause_ms(),
        }
    }
}

/// Acquisition retry policy of guarded calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquireConfig {
    /// Attempts after the first one.
    #[serde(default = "default_acquire_retries")]
    pub retries: u32,

    /// Pause between attempts.
    #[serde(default = "default_acquire_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            retries: default_acquire_retries(),
            backoff_ms: default_acquire_backoff_ms(),
        }
    }
}
