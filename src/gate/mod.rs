//! Decides whether a visitor may send a new intention.
//!
//! The gate keeps a single value in the visitor's local storage: the epoch
//! milliseconds at which the next submission becomes possible. When a
//! countdown finishes the value is overwritten with [`UNSET_SENTINEL`]
//! instead of being removed.

mod schedule;

use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use tracing::warn;

pub use schedule::CooldownSchedule;

pub const LAST_RECORDED_AT_KEY: &str = "lastRecordedAt";
pub const UNSET_SENTINEL: &str = "null";
pub const COOLDOWN: Duration = Duration::minutes(5);

/// Key/value storage that belongs to a single visitor.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, anyhow::Error>;

    async fn set(&self, key: &str, value: &str) -> Result<(), anyhow::Error>;

    async fn clear(&self, key: &str) -> Result<(), anyhow::Error>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GateStatus {
    pub allowed: bool,
    pub unlock_at: Option<OffsetDateTime>,
}

impl GateStatus {
    const OPEN: GateStatus = GateStatus {
        allowed: true,
        unlock_at: None,
    };
}

pub struct SubmissionGate<S> {
    store: S,
}

impl<S: LocalStore> SubmissionGate<S> {
    pub fn new(store: S) -> SubmissionGate<S> {
        SubmissionGate { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Never writes to the store.
    pub async fn check_gate(&self, now: OffsetDateTime) -> GateStatus {
        let stored = match self.store.get(LAST_RECORDED_AT_KEY).await {
            Ok(stored) => stored,
            Err(err) => {
                warn!("Could not read the cooldown, treating the gate as open: {err}");
                return GateStatus::OPEN;
            }
        };

        match stored.as_deref().and_then(parse_boundary) {
            Some(unlock_at) => GateStatus {
                allowed: now >= unlock_at,
                unlock_at: Some(unlock_at),
            },
            None => GateStatus::OPEN,
        }
    }

    /// Returns the moment the next submission becomes possible.
    pub async fn record_submission(
        &self,
        now: OffsetDateTime,
    ) -> Result<OffsetDateTime, anyhow::Error> {
        let unlock_at = now + COOLDOWN;
        self.store
            .set(LAST_RECORDED_AT_KEY, &format_boundary(unlock_at))
            .await?;
        Ok(unlock_at)
    }

    pub async fn on_cooldown_elapsed(&self) -> Result<(), anyhow::Error> {
        self.store.set(LAST_RECORDED_AT_KEY, UNSET_SENTINEL).await
    }
}

pub fn format_boundary(datetime: OffsetDateTime) -> String {
    (datetime.unix_timestamp_nanos() / 1_000_000).to_string()
}

/// `None` for the sentinel and for anything that is not epoch milliseconds.
pub fn parse_boundary(value: &str) -> Option<OffsetDateTime> {
    let millis: i128 = value.trim().parse().ok()?;
    OffsetDateTime::from_unix_timestamp_nanos(millis.checked_mul(1_000_000)?).ok()
}
