//! The lock record stored in the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Wire format version written by this crate.
pub const RECORD_FORMAT_VERSION: u32 = 1;

/// Errors decoding or encoding a lock record.
#[derive(Error, Debug)]
pub enum RecordError {
    /// The payload is not a lock record at all.
    #[error("malformed lock record: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The payload was written by a newer (or unknown) format.
    #[error("unsupported lock record version {0} (supported: {RECORD_FORMAT_VERSION})")]
    UnsupportedVersion(u32),
}

/// Lease state of one protected resource.
///
/// `owner_id` identifies who currently believes they hold the lease and is
/// fixed for the lifetime of one lease instance. `generation` only grows
/// while the same owner renews. A record with `has_lease == false` may be
/// taken over immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockRecord {
    pub owner_id: Uuid,
    pub has_lease: bool,
    pub generation: u64,
    /// Session timeout of the owner, recorded so contenders can derive the
    /// steal-wait window without sharing configuration.
    pub session_timeout: Duration,
    /// Renewal cadence of the owner.
    pub renew_interval: Duration,
    /// Who created this lease instance (`user@host`). Diagnostic only.
    pub holder: Option<String>,
    /// When this lease instance was created or stolen. Diagnostic only.
    pub acquired_at: Option<DateTime<Utc>>,
}

impl LockRecord {
    /// A fresh, held record with a new owner id.
    pub fn new(session_timeout: Duration, renew_interval: Duration) -> Self {
        Self {
            owner_id: Uuid::new_v4(),
            has_lease: true,
            generation: 0,
            session_timeout,
            renew_interval,
            holder: Some(owner_string()),
            acquired_at: Some(Utc::now()),
        }
    }

    /// How long a contender waits before stealing this lease:
    /// `multiplier * session_timeout + renew_interval`.
    pub fn steal_wait(&self, multiplier: u32) -> Duration {
        self.session_timeout
            .saturating_mul(multiplier)
            .saturating_add(self.renew_interval)
    }

    pub fn different_owner(&self, other: &LockRecord) -> bool {
        self.owner_id != other.owner_id
    }

    /// Time since this lease instance was created, if recorded.
    pub fn age(&self) -> Option<chrono::Duration> {
        self.acquired_at.map(|at| Utc::now().signed_duration_since(at))
    }

    /// Format the age as a human-readable string.
    pub fn age_string(&self) -> String {
        let Some(age) = self.age() else {
            return "unknown".to_string();
        };
        let seconds = age.num_seconds();
        let minutes = age.num_minutes();
        let hours = age.num_hours();
        let days = age.num_days();

        if days > 0 {
            format!("{}d {}h", days, hours % 24)
        } else if hours > 0 {
            format!("{}h {}m", hours, minutes % 60)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds % 60)
        } else {
            format!("{}s", seconds.max(0))
        }
    }

    /// Serialize to the versioned JSON wire format.
    pub fn encode(&self) -> Result<Vec<u8>, RecordError> {
        let wire = WireRecordV1 {
            version: RECORD_FORMAT_VERSION,
            owner_id: self.owner_id,
            has_lease: self.has_lease,
            generation: self.generation,
            session_timeout_ms: duration_to_millis(self.session_timeout),
            renew_interval_ms: duration_to_millis(self.renew_interval),
            holder: self.holder.clone(),
            acquired_at: self.acquired_at,
        };
        Ok(serde_json::to_vec(&wire)?)
    }

    /// Parse the versioned JSON wire format.
    ///
    /// The version is checked before any other field is interpreted, so a
    /// payload from an unknown format is rejected instead of misread.
    pub fn decode(bytes: &[u8]) -> Result<Self, RecordError> {
        let probe: VersionProbe = serde_json::from_slice(bytes)?;
        if probe.version != RECORD_FORMAT_VERSION {
            return Err(RecordError::UnsupportedVersion(probe.version));
        }

        let wire: WireRecordV1 = serde_json::from_slice(bytes)?;
        Ok(Self {
            owner_id: wire.owner_id,
            has_lease: wire.has_lease,
            generation: wire.generation,
            session_timeout: Duration::from_millis(wire.session_timeout_ms),
            renew_interval: Duration::from_millis(wire.renew_interval_ms),
            holder: wire.holder,
            acquired_at: wire.acquired_at,
        })
    }
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

/// Version 1 of the stored representation. Unknown fields are ignored.
#[derive(Serialize, Deserialize)]
struct WireRecordV1 {
    version: u32,
    owner_id: Uuid,
    has_lease: bool,
    generation: u64,
    session_timeout_ms: u64,
    renew_interval_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    holder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    acquired_at: Option<DateTime<Utc>>,
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Owner string for diagnostics (`user@host`).
pub(crate) fn owner_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}
