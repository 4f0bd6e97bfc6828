//! The storage contract the lease protocol needs, and its binding onto an
//! object store.

use super::record::LockRecord;
use crate::store::{ObjectStore, StoreError, Tag, object_name};
use std::sync::Arc;

/// Default object key holding the lock record inside a namespace.
pub const DEFAULT_LOCK_KEY: &str = "global_lock";

/// Minimal storage contract of the lease protocol: one lock record at one
/// well-known location.
///
/// `write` with `expected: None` creates the record only if it is absent
/// ([`StoreError::AlreadyExists`] otherwise); with `Some(tag)` it replaces
/// the record only if its current tag is still `tag`
/// ([`StoreError::Conflict`] otherwise).
pub trait LockStore: Send + Sync {
    /// Name used in log lines and errors.
    fn name(&self) -> &str;

    /// Whether the protected resource exists at all.
    fn namespace_exists(&self) -> Result<bool, StoreError>;

    fn exists(&self) -> Result<bool, StoreError>;

    fn read(&self) -> Result<(LockRecord, Tag), StoreError>;

    fn write(&self, record: &LockRecord, expected: Option<&Tag>) -> Result<Tag, StoreError>;

    /// Remove the record. Administrative only; unlocking never erases.
    fn erase(&self) -> Result<(), StoreError>;
}

/// [`LockStore`] for one `(namespace, key)` of any [`ObjectStore`].
#[derive(Clone)]
pub struct BackendLockStore {
    backend: Arc<dyn ObjectStore>,
    namespace: String,
    key: String,
    name: String,
}

impl BackendLockStore {
    pub fn new(
        backend: Arc<dyn ObjectStore>,
        namespace: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        let namespace = namespace.into();
        let key = key.into();
        let name = object_name(&namespace, &key);
        Self {
            backend,
            namespace,
            key,
            name,
        }
    }

    /// Lock store for the default key of `namespace`.
    pub fn for_namespace(backend: Arc<dyn ObjectStore>, namespace: impl Into<String>) -> Self {
        Self::new(backend, namespace, DEFAULT_LOCK_KEY)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &Arc<dyn ObjectStore> {
        &self.backend
    }

    fn corrupt(&self, err: impl std::fmt::Display) -> StoreError {
        StoreError::Corrupt {
            name: self.name.clone(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Debug for BackendLockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendLockStore")
            .field("backend", &self.backend.describe())
            .field("namespace", &self.namespace)
            .field("key", &self.key)
            .finish()
    }
}

impl LockStore for BackendLockStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn namespace_exists(&self) -> Result<bool, StoreError> {
        self.backend.namespace_exists(&self.namespace)
    }

    fn exists(&self) -> Result<bool, StoreError> {
        self.backend.object_exists(&self.namespace, &self.key)
    }

    fn read(&self) -> Result<(LockRecord, Tag), StoreError> {
        let (bytes, tag) = self.backend.read(&self.namespace, &self.key)?;
        let record = LockRecord::decode(&bytes).map_err(|e| self.corrupt(e))?;
        Ok((record, tag))
    }

    fn write(&self, record: &LockRecord, expected: Option<&Tag>) -> Result<Tag, StoreError> {
        let bytes = record.encode().map_err(|e| self.corrupt(e))?;
        self.backend.write(&self.namespace, &self.key, &bytes, expected)
    }

    fn erase(&self) -> Result<(), StoreError> {
        self.backend.delete(&self.namespace, &self.key)
    }
}
