//! Error types for leaselock.
//!
//! Storage-level failures live in [`crate::store::StoreError`]; this module
//! holds the crate-level error surfaced to library callers and the CLI.

use crate::exit_codes;
use crate::store::StoreError;
use thiserror::Error;

/// Main error type for leaselock operations.
///
/// Each variant maps to a CLI exit code.
#[derive(Error, Debug)]
pub enum LockError {
    /// User provided invalid arguments or the system is in an invalid state.
    #[error("{0}")]
    UserError(String),

    /// Configuration could not be loaded or is invalid.
    #[error("config error: {0}")]
    Config(String),

    /// The protected namespace does not exist, so there is nothing to lock.
    #[error("namespace '{0}' does not exist")]
    NamespaceMissing(String),

    /// The lock could not be acquired. Callers may retry.
    #[error("could not acquire lock '{name}': {reason}")]
    NotAcquired { name: String, reason: String },

    /// The lease was lost while the lock was held.
    #[error("lost lock '{name}': {reason}")]
    Lost { name: String, reason: String },

    /// A storage operation failed outside the lease protocol.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LockError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LockError::UserError(_) => exit_codes::USER_ERROR,
            LockError::Config(_) => exit_codes::CONFIG_ERROR,
            LockError::NamespaceMissing(_) => exit_codes::LOCK_FAILURE,
            LockError::NotAcquired { .. } => exit_codes::LOCK_FAILURE,
            LockError::Lost { .. } => exit_codes::LEASE_LOST,
            LockError::Store(_) => exit_codes::STORE_FAILURE,
        }
    }
}

/// Result type alias for leaselock operations.
pub type Result<T> = std::result::Result<T, LockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_error_has_correct_exit_code() {
        let err = LockError::UserError("bad argument".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn config_error_has_correct_exit_code() {
        let err = LockError::Config("renew_interval_ms must be greater than 0".to_string());
        assert_eq!(err.exit_code(), exit_codes::CONFIG_ERROR);
    }

    #[test]
    fn acquisition_errors_share_lock_failure_code() {
        let missing = LockError::NamespaceMissing("ns".to_string());
        let held = LockError::NotAcquired {
            name: "ns/global_lock".to_string(),
            reason: "held elsewhere".to_string(),
        };
        assert_eq!(missing.exit_code(), exit_codes::LOCK_FAILURE);
        assert_eq!(held.exit_code(), exit_codes::LOCK_FAILURE);
    }

    #[test]
    fn lost_lease_has_its_own_exit_code() {
        let err = LockError::Lost {
            name: "ns/global_lock".to_string(),
            reason: "stolen".to_string(),
        };
        assert_eq!(err.exit_code(), exit_codes::LEASE_LOST);
    }

    #[test]
    fn store_errors_convert_and_map_to_store_failure() {
        let err: LockError = StoreError::Transient {
            name: "ns/global_lock".to_string(),
            message: "timed out".to_string(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_codes::STORE_FAILURE);
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = LockError::NotAcquired {
            name: "ns/global_lock".to_string(),
            reason: "steal attempt raced".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "could not acquire lock 'ns/global_lock': steal attempt raced"
        );

        let err = LockError::NamespaceMissing("ns".to_string());
        assert_eq!(err.to_string(), "namespace 'ns' does not exist");
    }
}
