//! Storage error taxonomy.

use thiserror::Error;

/// Errors returned by object stores.
///
/// The set is closed on purpose: the lease protocol matches on every variant
/// to decide between create, steal, retry and "ownership lost".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The object does not exist.
    #[error("object '{0}' not found")]
    NotFound(String),

    /// The namespace holding the object does not exist.
    #[error("namespace '{0}' not found")]
    NamespaceNotFound(String),

    /// A conditional write was rejected because the stored version changed.
    #[error("object '{0}' was modified concurrently")]
    Conflict(String),

    /// A create-if-absent write found an existing object.
    #[error("object '{0}' already exists")]
    AlreadyExists(String),

    /// I/O or timeout failure that survived the storage client's retries.
    #[error("storage error on '{name}': {message}")]
    Transient { name: String, message: String },

    /// The stored payload could not be decoded.
    #[error("corrupt object '{name}': {message}")]
    Corrupt { name: String, message: String },

    /// A namespace or object name is not acceptable to the backend.
    #[error("invalid {kind} name '{name}'")]
    InvalidName { kind: &'static str, name: String },
}

impl StoreError {
    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Transient { .. })
    }

    pub(crate) fn transient(name: impl Into<String>, err: impl std::fmt::Display) -> Self {
        StoreError::Transient {
            name: name.into(),
            message: err.to_string(),
        }
    }
}
