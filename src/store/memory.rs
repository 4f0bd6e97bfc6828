//! In-process object store.

use super::error::StoreError;
use super::object::{ObjectStore, check_precondition, object_name, validate_name};
use super::tag::Tag;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

type Namespaces = BTreeMap<String, BTreeMap<String, Vec<u8>>>;

/// Object store held entirely in memory.
///
/// Clones share the same state, so handing a clone to each of several lock
/// services models independent processes contending on one backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    namespaces: Arc<Mutex<Namespaces>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a namespace and everything in it.
    pub fn delete_namespace(&self, namespace: &str) {
        self.state().remove(namespace);
    }

    fn state(&self) -> MutexGuard<'_, Namespaces> {
        self.namespaces
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }
}

impl ObjectStore for MemoryObjectStore {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn namespace_exists(&self, namespace: &str) -> Result<bool, StoreError> {
        Ok(self.state().contains_key(namespace))
    }

    fn create_namespace(&self, namespace: &str) -> Result<(), StoreError> {
        validate_name("namespace", namespace)?;
        self.state().entry(namespace.to_string()).or_default();
        Ok(())
    }

    fn object_exists(&self, namespace: &str, key: &str) -> Result<bool, StoreError> {
        let state = self.state();
        let objects = state
            .get(namespace)
            .ok_or_else(|| StoreError::NamespaceNotFound(namespace.to_string()))?;
        Ok(objects.contains_key(key))
    }

    fn read(&self, namespace: &str, key: &str) -> Result<(Vec<u8>, Tag), StoreError> {
        let state = self.state();
        let objects = state
            .get(namespace)
            .ok_or_else(|| StoreError::NamespaceNotFound(namespace.to_string()))?;
        let bytes = objects
            .get(key)
            .ok_or_else(|| StoreError::NotFound(object_name(namespace, key)))?;
        Ok((bytes.clone(), Tag::of(bytes)))
    }

    fn write(
        &self,
        namespace: &str,
        key: &str,
        bytes: &[u8],
        expected: Option<&Tag>,
    ) -> Result<Tag, StoreError> {
        validate_name("object", key)?;
        let mut state = self.state();
        let objects = state
            .get_mut(namespace)
            .ok_or_else(|| StoreError::NamespaceNotFound(namespace.to_string()))?;

        check_precondition(
            &object_name(namespace, key),
            objects.get(key).map(Vec::as_slice),
            expected,
        )?;

        objects.insert(key.to_string(), bytes.to_vec());
        Ok(Tag::of(bytes))
    }

    fn delete(&self, namespace: &str, key: &str) -> Result<(), StoreError> {
        let mut state = self.state();
        let objects = state
            .get_mut(namespace)
            .ok_or_else(|| StoreError::NamespaceNotFound(namespace.to_string()))?;
        objects
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(object_name(namespace, key)))
    }

    fn list(&self, namespace: &str) -> Result<Vec<String>, StoreError> {
        let state = self.state();
        let objects = state
            .get(namespace)
            .ok_or_else(|| StoreError::NamespaceNotFound(namespace.to_string()))?;
        Ok(objects.keys().cloned().collect())
    }
}
