//! Exit code constants for the leaselock CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid state)
//! - 2: Configuration error
//! - 3: Storage failure
//! - 4: Lock acquisition failure
//! - 5: Lease lost while the lock was held

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid state, or a failing child process.
pub const USER_ERROR: i32 = 1;

/// Configuration file could not be read or failed validation.
pub const CONFIG_ERROR: i32 = 2;

/// Storage failure that survived the storage client's retries.
pub const STORE_FAILURE: i32 = 3;

/// Lock acquisition failure: the lock is held elsewhere or the namespace is missing.
pub const LOCK_FAILURE: i32 = 4;

/// The lease was lost (stolen, erased, or unrenewable) while work was in progress.
pub const LEASE_LOST: i32 = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            SUCCESS,
            USER_ERROR,
            CONFIG_ERROR,
            STORE_FAILURE,
            LOCK_FAILURE,
            LEASE_LOST,
        ];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }

    #[test]
    fn exit_codes_fit_in_a_byte() {
        for code in [SUCCESS, USER_ERROR, CONFIG_ERROR, STORE_FAILURE, LOCK_FAILURE, LEASE_LOST] {
            assert!((0..=255).contains(&code));
        }
    }
}
