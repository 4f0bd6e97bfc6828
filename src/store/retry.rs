//! Storage client that retries transient failures with backoff.

use super::error::StoreError;
use super::object::ObjectStore;
use super::tag::Tag;
use std::thread;
use std::time::Duration;
use tracing::warn;

/// How often and how patiently transient failures are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub attempts: u32,
    /// Pause before the first retry; doubled for each further retry.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_millis(50),
        }
    }
}

/// Wraps an [`ObjectStore`] and retries calls that fail with
/// [`StoreError::Transient`].
///
/// Every other error is returned untouched: conflicts, missing objects and
/// the like are protocol signals, not outages. Once the retries are spent the
/// last transient error is surfaced and the caller treats it as a hard
/// failure for that call.
#[derive(Debug, Clone)]
pub struct RetryingObjectStore<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: ObjectStore> RetryingObjectStore<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn retry<T>(&self, op: &str, f: impl Fn() -> Result<T, StoreError>) -> Result<T, StoreError> {
        let mut backoff = self.policy.backoff;
        let mut retries = 0;

        loop {
            match f() {
                Err(e) if e.is_transient() && retries < self.policy.attempts => {
                    retries += 1;
                    warn!(
                        backend = %self.inner.describe(),
                        op,
                        retry = retries,
                        of = self.policy.attempts,
                        error = %e,
                        "transient storage failure, retrying"
                    );
                    thread::sleep(backoff);
                    backoff = backoff.saturating_mul(2);
                }
                result => return result,
            }
        }
    }
}

impl<S: ObjectStore> ObjectStore for RetryingObjectStore<S> {
    fn describe(&self) -> String {
        self.inner.describe()
    }

    fn namespace_exists(&self, namespace: &str) -> Result<bool, StoreError> {
        self.retry("namespace_exists", || self.inner.namespace_exists(namespace))
    }

    fn create_namespace(&self, namespace: &str) -> Result<(), StoreError> {
        self.retry("create_namespace", || self.inner.create_namespace(namespace))
    }

    fn object_exists(&self, namespace: &str, key: &str) -> Result<bool, StoreError> {
        self.retry("object_exists", || self.inner.object_exists(namespace, key))
    }

    fn read(&self, namespace: &str, key: &str) -> Result<(Vec<u8>, Tag), StoreError> {
        self.retry("read", || self.inner.read(namespace, key))
    }

    fn write(
        &self,
        namespace: &str,
        key: &str,
        bytes: &[u8],
        expected: Option<&Tag>,
    ) -> Result<Tag, StoreError> {
        self.retry("write", || self.inner.write(namespace, key, bytes, expected))
    }

    fn delete(&self, namespace: &str, key: &str) -> Result<(), StoreError> {
        self.retry("delete", || self.inner.delete(namespace, key))
    }

    fn list(&self, namespace: &str) -> Result<Vec<String>, StoreError> {
        self.retry("list", || self.inner.list(namespace))
    }
}
