//! The uniform object-store contract shared by all backends.

use super::error::StoreError;
use super::tag::Tag;
use std::sync::Arc;

/// A namespaced blob store with per-object compare-and-swap.
///
/// Every successful `read` and `write` returns the object's current [`Tag`].
/// `write` with `expected: None` only succeeds if the object does not exist
/// yet; with `expected: Some(tag)` it only succeeds if the stored tag still
/// equals `tag`. Both checks and the write itself must be atomic per object.
pub trait ObjectStore: Send + Sync {
    /// Short human-readable backend description for logs.
    fn describe(&self) -> String;

    fn namespace_exists(&self, namespace: &str) -> Result<bool, StoreError>;

    /// Create a namespace. Creating an existing namespace is not an error.
    fn create_namespace(&self, namespace: &str) -> Result<(), StoreError>;

    fn object_exists(&self, namespace: &str, key: &str) -> Result<bool, StoreError>;

    fn read(&self, namespace: &str, key: &str) -> Result<(Vec<u8>, Tag), StoreError>;

    fn write(
        &self,
        namespace: &str,
        key: &str,
        bytes: &[u8],
        expected: Option<&Tag>,
    ) -> Result<Tag, StoreError>;

    fn delete(&self, namespace: &str, key: &str) -> Result<(), StoreError>;

    /// Object keys in a namespace, sorted.
    fn list(&self, namespace: &str) -> Result<Vec<String>, StoreError>;
}

impl<T: ObjectStore + ?Sized> ObjectStore for Arc<T> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn namespace_exists(&self, namespace: &str) -> Result<bool, StoreError> {
        (**self).namespace_exists(namespace)
    }

    fn create_namespace(&self, namespace: &str) -> Result<(), StoreError> {
        (**self).create_namespace(namespace)
    }

    fn object_exists(&self, namespace: &str, key: &str) -> Result<bool, StoreError> {
        (**self).object_exists(namespace, key)
    }

    fn read(&self, namespace: &str, key: &str) -> Result<(Vec<u8>, Tag), StoreError> {
        (**self).read(namespace, key)
    }

    fn write(
        &self,
        namespace: &str,
        key: &str,
        bytes: &[u8],
        expected: Option<&Tag>,
    ) -> Result<Tag, StoreError> {
        (**self).write(namespace, key, bytes, expected)
    }

    fn delete(&self, namespace: &str, key: &str) -> Result<(), StoreError> {
        (**self).delete(namespace, key)
    }

    fn list(&self, namespace: &str) -> Result<Vec<String>, StoreError> {
        (**self).list(namespace)
    }
}

/// Reject names that cannot be mapped safely onto every backend.
///
/// Names must be non-empty, must not start with `.` (reserved for backend
/// bookkeeping) and must not contain path separators.
pub fn validate_name(kind: &'static str, name: &str) -> Result<(), StoreError> {
    let invalid = name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\'])
        || name.chars().any(char::is_control);

    if invalid {
        return Err(StoreError::InvalidName {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Display name of an object, used in errors and logs.
pub(crate) fn object_name(namespace: &str, key: &str) -> String {
    format!("{}/{}", namespace, key)
}

/// Check a conditional write against the current state of the object.
///
/// Shared by backends so they agree on which error a rejected write yields.
pub(crate) fn check_precondition(
    name: &str,
    current: Option<&[u8]>,
    expected: Option<&Tag>,
) -> Result<(), StoreError> {
    match (current, expected) {
        (Some(_), None) => Err(StoreError::AlreadyExists(name.to_string())),
        (None, Some(_)) => Err(StoreError::Conflict(name.to_string())),
        (Some(bytes), Some(tag)) if Tag::of(bytes) != *tag => {
            Err(StoreError::Conflict(name.to_string()))
        }
        _ => Ok(()),
    }
}
