use crate::lease::{BackendLockStore, LeaseSettings, LockStore};
use crate::store::{LocalObjectStore, MemoryObjectStore, ObjectStore, StoreError, Tag};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tempfile::TempDir;

pub(crate) const TEST_NAMESPACE: &str = "volume";

/// Short timings so lease tests finish in well under a second each:
/// steal-wait is `3 * 100ms + 50ms`.
pub(crate) fn fast_settings() -> LeaseSettings {
    LeaseSettings::new(Duration::from_millis(100), Duration::from_millis(50))
        .with_max_renew_wait(Duration::from_millis(500))
        .with_reread_pause(Duration::from_millis(10))
}

/// A memory backend with [`TEST_NAMESPACE`] already created.
pub(crate) fn memory_backend() -> MemoryObjectStore {
    let backend = MemoryObjectStore::new();
    backend.create_namespace(TEST_NAMESPACE).unwrap();
    backend
}

/// Lock store on [`TEST_NAMESPACE`] of `backend`.
pub(crate) fn lock_store<S: ObjectStore + 'static>(backend: S) -> Arc<dyn LockStore> {
    Arc::new(BackendLockStore::for_namespace(Arc::new(backend), TEST_NAMESPACE))
}

/// A local backend rooted in a fresh temp dir.
pub(crate) fn local_backend() -> (TempDir, LocalObjectStore) {
    let temp_dir = TempDir::new().unwrap();
    let store = LocalObjectStore::new(temp_dir.path().join("locks"));
    (temp_dir, store)
}

#[derive(Debug, Default)]
struct Faults {
    /// Fail this many upcoming calls, whatever they are.
    fail_next: usize,
    fail_reads: bool,
    fail_writes: bool,
    /// Apply the next write but report it as failed.
    land_next_write_then_fail: bool,
}

type WriteHook = Box<dyn FnOnce() + Send>;

/// Wraps an object store and injects transient failures on demand.
///
/// Clones share the fault switches, hooks and counters.
#[derive(Clone)]
pub(crate) struct FaultyObjectStore<S> {
    inner: S,
    faults: Arc<Mutex<Faults>>,
    before_next_write: Arc<Mutex<Option<WriteHook>>>,
    reads: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
}

impl<S: ObjectStore> FaultyObjectStore<S> {
    pub(crate) fn new(inner: S) -> Self {
        Self {
            inner,
            faults: Arc::default(),
            before_next_write: Arc::default(),
            reads: Arc::default(),
            writes: Arc::default(),
        }
    }

    pub(crate) fn inner(&self) -> &S {
        &self.inner
    }

    pub(crate) fn fail_next(&self, calls: usize) {
        self.faults().fail_next = calls;
    }

    pub(crate) fn fail_reads(&self, fail: bool) {
        self.faults().fail_reads = fail;
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.faults().fail_writes = fail;
    }

    pub(crate) fn land_next_write_then_fail(&self) {
        self.faults().land_next_write_then_fail = true;
    }

    /// Run `hook` just before the next write reaches the inner store, so a
    /// competing writer can slip in between a read and the write behind it.
    pub(crate) fn before_next_write(&self, hook: impl FnOnce() + Send + 'static) {
        *self.before_next_write.lock().unwrap() = Some(Box::new(hook));
    }

    /// Read calls seen, failed ones included.
    pub(crate) fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Write calls seen, failed ones included.
    pub(crate) fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn faults(&self) -> MutexGuard<'_, Faults> {
        self.faults
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    fn injected(&self, op: &str) -> Result<(), StoreError> {
        let mut faults = self.faults();
        if faults.fail_next > 0 {
            faults.fail_next -= 1;
            return Err(StoreError::transient(op, "injected failure"));
        }
        Ok(())
    }
}

impl<S: ObjectStore> ObjectStore for FaultyObjectStore<S> {
    fn describe(&self) -> String {
        format!("faulty:{}", self.inner.describe())
    }

    fn namespace_exists(&self, namespace: &str) -> Result<bool, StoreError> {
        self.injected("namespace_exists")?;
        self.inner.namespace_exists(namespace)
    }

    fn create_namespace(&self, namespace: &str) -> Result<(), StoreError> {
        self.injected("create_namespace")?;
        self.inner.create_namespace(namespace)
    }

    fn object_exists(&self, namespace: &str, key: &str) -> Result<bool, StoreError> {
        self.injected("object_exists")?;
        self.inner.object_exists(namespace, key)
    }

    fn read(&self, namespace: &str, key: &str) -> Result<(Vec<u8>, Tag), StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.injected("read")?;
        if self.faults().fail_reads {
            return Err(StoreError::transient("read", "injected read failure"));
        }
        self.inner.read(namespace, key)
    }

    fn write(
        &self,
        namespace: &str,
        key: &str,
        bytes: &[u8],
        expected: Option<&Tag>,
    ) -> Result<Tag, StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let hook = self.before_next_write.lock().unwrap().take();
        if let Some(hook) = hook {
            hook();
        }
        self.injected("write")?;
        if self.faults().fail_writes {
            return Err(StoreError::transient("write", "injected write failure"));
        }

        let land_then_fail = std::mem::take(&mut self.faults().land_next_write_then_fail);
        let tag = self.inner.write(namespace, key, bytes, expected)?;
        if land_then_fail {
            return Err(StoreError::transient("write", "response lost after write"));
        }
        Ok(tag)
    }

    fn delete(&self, namespace: &str, key: &str) -> Result<(), StoreError> {
        self.injected("delete")?;
        self.inner.delete(namespace, key)
    }

    fn list(&self, namespace: &str) -> Result<Vec<String>, StoreError> {
        self.injected("list")?;
        self.inner.list(namespace)
    }
}

/// Collects lease callback reasons.
#[derive(Clone, Default)]
pub(crate) struct Recorder {
    events: Arc<(Mutex<Vec<String>>, Condvar)>,
}

impl Recorder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A callback that records into this recorder.
    pub(crate) fn callback(&self) -> impl Fn(&str) + Send + Sync + 'static {
        let events = Arc::clone(&self.events);
        move |reason: &str| {
            let (list, changed) = &*events;
            list.lock().unwrap().push(reason.to_string());
            changed.notify_all();
        }
    }

    pub(crate) fn events(&self) -> Vec<String> {
        self.events.0.lock().unwrap().clone()
    }

    /// Wait until at least `count` events arrived or `timeout` passed.
    pub(crate) fn wait_for(&self, count: usize, timeout: Duration) -> Vec<String> {
        let (list, changed) = &*self.events;
        let deadline = Instant::now() + timeout;
        let mut events = list.lock().unwrap();
        while events.len() < count {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            events = changed.wait_timeout(events, deadline - now).unwrap().0;
        }
        events.clone()
    }
}
