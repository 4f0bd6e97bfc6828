//! Object store on the local filesystem.
//!
//! Layout: `<root>/<namespace>/<key>`, one file per object. Conditional
//! writes and deletes take an exclusive advisory lock on
//! `<root>/<namespace>/.guard`, which makes the compare-and-swap atomic for
//! every process on the host that goes through this store.

use super::error::StoreError;
use super::object::{ObjectStore, check_precondition, object_name, validate_name};
use super::tag::Tag;
use crate::fs::atomic_write;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::trace;

const GUARD_FILE: &str = ".guard";

/// Filesystem-backed object store.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    /// Create a store rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn namespace_dir(&self, namespace: &str) -> Result<PathBuf, StoreError> {
        validate_name("namespace", namespace)?;
        Ok(self.root.join(namespace))
    }

    fn existing_namespace_dir(&self, namespace: &str) -> Result<PathBuf, StoreError> {
        let dir = self.namespace_dir(namespace)?;
        if !dir.is_dir() {
            return Err(StoreError::NamespaceNotFound(namespace.to_string()));
        }
        Ok(dir)
    }

    /// Run `f` while holding the namespace's exclusive guard lock.
    fn guarded<T>(
        &self,
        namespace: &str,
        f: impl FnOnce(&Path) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let dir = self.existing_namespace_dir(namespace)?;
        let guard_path = dir.join(GUARD_FILE);

        let guard = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&guard_path)
            .map_err(|e| StoreError::transient(namespace, e))?;
        FileExt::lock_exclusive(&guard).map_err(|e| StoreError::transient(namespace, e))?;
        trace!(namespace, "took namespace guard");

        let result = f(&dir);

        // Closing the file releases the lock too; unlock explicitly so the
        // guard is dropped promptly even if the handle lingers.
        let _ = FileExt::unlock(&guard);
        result
    }
}

fn read_object(path: &Path, name: &str) -> Result<Option<Vec<u8>>, StoreError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::transient(name, e)),
    }
}

impl ObjectStore for LocalObjectStore {
    fn describe(&self) -> String {
        format!("local:{}", self.root.display())
    }

    fn namespace_exists(&self, namespace: &str) -> Result<bool, StoreError> {
        Ok(self.namespace_dir(namespace)?.is_dir())
    }

    fn create_namespace(&self, namespace: &str) -> Result<(), StoreError> {
        let dir = self.namespace_dir(namespace)?;
        fs::create_dir_all(&dir).map_err(|e| StoreError::transient(namespace, e))?;
        // Make sure the guard exists before the first conditional write.
        File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(dir.join(GUARD_FILE))
            .map_err(|e| StoreError::transient(namespace, e))?;
        Ok(())
    }

    fn object_exists(&self, namespace: &str, key: &str) -> Result<bool, StoreError> {
        validate_name("object", key)?;
        let dir = self.existing_namespace_dir(namespace)?;
        Ok(dir.join(key).is_file())
    }

    fn read(&self, namespace: &str, key: &str) -> Result<(Vec<u8>, Tag), StoreError> {
        validate_name("object", key)?;
        let dir = self.existing_namespace_dir(namespace)?;
        let name = object_name(namespace, key);

        let bytes = read_object(&dir.join(key), &name)?.ok_or(StoreError::NotFound(name))?;
        let tag = Tag::of(&bytes);
        Ok((bytes, tag))
    }

    fn write(
        &self,
        namespace: &str,
        key: &str,
        bytes: &[u8],
        expected: Option<&Tag>,
    ) -> Result<Tag, StoreError> {
        validate_name("object", key)?;
        let name = object_name(namespace, key);

        self.guarded(namespace, |dir| {
            let path = dir.join(key);
            let current = read_object(&path, &name)?;
            check_precondition(&name, current.as_deref(), expected)?;

            atomic_write(&path, bytes).map_err(|e| StoreError::transient(&name, e))?;
            Ok(Tag::of(bytes))
        })
    }

    fn delete(&self, namespace: &str, key: &str) -> Result<(), StoreError> {
        validate_name("object", key)?;
        let name = object_name(namespace, key);

        self.guarded(namespace, |dir| match fs::remove_file(dir.join(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound(name)),
            Err(e) => Err(StoreError::transient(&name, e)),
        })
    }

    fn list(&self, namespace: &str) -> Result<Vec<String>, StoreError> {
        let dir = self.existing_namespace_dir(namespace)?;
        let entries = fs::read_dir(&dir).map_err(|e| StoreError::transient(namespace, e))?;

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::transient(namespace, e))?;
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            // Guard and temp files are bookkeeping, not objects.
            if name.starts_with('.') || !entry.path().is_file() {
                continue;
            }
            keys.push(name);
        }

        keys.sort();
        Ok(keys)
    }
}
