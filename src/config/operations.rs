//! Config loading, validation, and conversion into runtime settings.

use super::model::Config;
use super::types::StoreBackend;
use crate::error::{LockError, Result};
use crate::lease::{BackendLockStore, LeaseSettings, LockStore};
use crate::store::{
    LocalObjectStore, MemoryObjectStore, ObjectStore, RetryPolicy, RetryingObjectStore,
    validate_name,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "leaselock.yaml";

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            LockError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load config from `path` if it exists, otherwise use defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| LockError::Config(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| LockError::Config(format!("failed to serialize config to YAML: {}", e)))
    }

    /// Validate config values.
    ///
    /// Validation rules:
    /// - all lease durations and retry budgets must be positive
    /// - `renew_interval_ms` must not exceed `session_timeout_ms`
    /// - `lock_key` must be a valid object name
    /// - the local backend needs a non-empty `root`
    pub fn validate(&self) -> Result<()> {
        let lease = &self.lease;

        let positive = [
            ("lease.session_timeout_ms", lease.session_timeout_ms),
            ("lease.renew_interval_ms", lease.renew_interval_ms),
            ("lease.max_renew_wait_ms", lease.max_renew_wait_ms),
            (
                "lease.steal_wait_multiplier",
                u64::from(lease.steal_wait_multiplier),
            ),
            (
                "lease.max_renew_retries",
                u64::from(lease.max_renew_retries),
            ),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(LockError::Config(format!(
                    "config validation failed: {} must be greater than 0",
                    field
                )));
            }
        }

        if lease.renew_interval_ms > lease.session_timeout_ms {
            return Err(LockError::Config(format!(
                "config validation failed: lease.renew_interval_ms ({}) must not exceed lease.session_timeout_ms ({})",
                lease.renew_interval_ms, lease.session_timeout_ms
            )));
        }

        validate_name("object", &self.store.lock_key).map_err(|_| {
            LockError::Config(format!(
                "config validation failed: store.lock_key '{}' must be non-empty, must not start with '.' and must not contain path separators",
                self.store.lock_key
            ))
        })?;

        if self.store.backend == StoreBackend::Local && self.store.root.trim().is_empty() {
            return Err(LockError::Config(
                "config validation failed: store.root must be set for the local backend"
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// Lease settings described by the `lease` section.
    pub fn lease_settings(&self) -> LeaseSettings {
        let lease = &self.lease;
        LeaseSettings::new(
            Duration::from_millis(lease.session_timeout_ms),
            Duration::from_millis(lease.renew_interval_ms),
        )
        .with_steal_wait_multiplier(lease.steal_wait_multiplier)
        .with_max_renew_retries(lease.max_renew_retries)
        .with_max_renew_wait(Duration::from_millis(lease.max_renew_wait_ms))
        .with_reread_pause(Duration::from_millis(lease.reread_pause_ms))
    }

    /// Storage-client retry policy described by the `store` section.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.store.retry_attempts,
            backoff: Duration::from_millis(self.store.retry_backoff_ms),
        }
    }

    pub fn acquire_backoff(&self) -> Duration {
        Duration::from_millis(self.acquire.backoff_ms)
    }

    /// Open the configured backend, wrapped in the retrying storage client.
    pub fn open_backend(&self) -> Arc<dyn ObjectStore> {
        let policy = self.retry_policy();
        match self.store.backend {
            StoreBackend::Local => Arc::new(RetryingObjectStore::new(
                LocalObjectStore::new(&self.store.root),
                policy,
            )),
            StoreBackend::Memory => {
                Arc::new(RetryingObjectStore::new(MemoryObjectStore::new(), policy))
            }
        }
    }

    /// Lock store for `namespace` on `backend`, using the configured key.
    pub fn lock_store(
        &self,
        backend: Arc<dyn ObjectStore>,
        namespace: &str,
    ) -> Arc<dyn LockStore> {
        Arc::new(BackendLockStore::new(
            backend,
            namespace,
            self.store.lock_key.as_str(),
        ))
    }
}
