//! Command context resolution for leaselock.
//!
//! Every command needs the same things: the effective configuration (file
//! plus command-line overrides) and an opened backend. This module builds
//! them once from the global CLI flags.

use leaselock::config::{Config, DEFAULT_CONFIG_FILE};
use leaselock::error::{LockError, Result};
use leaselock::lease::LockStore;
use leaselock::store::ObjectStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Resolved configuration and backend for one CLI invocation.
pub struct CommandContext {
    /// Config file that was loaded, if any.
    pub config_path: Option<PathBuf>,

    /// Effective configuration after overrides.
    pub config: Config,

    /// The opened object store, wrapped in the retrying storage client.
    pub backend: Arc<dyn ObjectStore>,
}

impl CommandContext {
    /// Resolve the context from the global flags.
    ///
    /// An explicitly named config file must exist; the default
    /// `leaselock.yaml` in the working directory is optional.
    pub fn resolve(config: Option<&Path>, root: Option<&str>) -> Result<Self> {
        let (config_path, mut config) = match config {
            Some(path) => (Some(path.to_path_buf()), Config::load(path)?),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                let found = default.exists().then_some(default.clone());
                (found, Config::load_or_default(&default)?)
            }
        };

        if let Some(root) = root {
            config.store.root = root.to_string();
            config.validate()?;
        }

        let backend = config.open_backend();
        Ok(Self {
            config_path,
            config,
            backend,
        })
    }

    /// Lock store for `namespace` with the configured key.
    pub fn lock_store(&self, namespace: &str) -> Arc<dyn LockStore> {
        self.config.lock_store(Arc::clone(&self.backend), namespace)
    }

    /// Fail with a user error unless `namespace` exists.
    pub fn require_namespace(&self, namespace: &str) -> Result<()> {
        if self.backend.namespace_exists(namespace)? {
            Ok(())
        } else {
            Err(LockError::NamespaceMissing(namespace.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn resolve_with_explicit_config_and_root_override() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("custom.yaml");
        std::fs::write(&config_path, "store:\n  lock_key: custom_lock\n").unwrap();
        let root = temp_dir.path().join("store");

        let ctx =
            CommandContext::resolve(Some(&config_path), Some(root.to_str().unwrap())).unwrap();

        assert_eq!(ctx.config_path.as_deref(), Some(config_path.as_path()));
        assert_eq!(ctx.config.store.lock_key, "custom_lock");
        assert_eq!(ctx.config.store.root, root.to_str().unwrap());

        ctx.backend.create_namespace("ns").unwrap();
        assert!(root.join("ns").is_dir());
        assert_eq!(ctx.lock_store("ns").name(), "ns/custom_lock");
    }

    #[test]
    fn resolve_with_missing_explicit_config_fails() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.yaml");

        let result = CommandContext::resolve(Some(&missing), None);
        assert!(matches!(result, Err(LockError::Config(_))));
    }

    #[test]
    fn require_namespace_reports_missing() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("leaselock.yaml");
        std::fs::write(&config_path, "").unwrap();
        let root = temp_dir.path().join("store");

        let ctx =
            CommandContext::resolve(Some(&config_path), Some(root.to_str().unwrap())).unwrap();

        assert!(matches!(
            ctx.require_namespace("absent"),
            Err(LockError::NamespaceMissing(_))
        ));
        ctx.backend.create_namespace("present").unwrap();
        assert!(ctx.require_namespace("present").is_ok());
    }
}
