//! Time and identifier sources consumed by the checkpoint and the ledger.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Supplies timestamps for sign-in, sign-out and cargo transitions.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// Host time, never running backwards.
///
/// Readings are kept at microsecond precision, matching what the stores
/// persist. If the host clock steps back, the last reading is repeated until
/// the host catches up.
#[derive(Debug, Default)]
pub struct SystemClock {
  high_water: AtomicI64,
}

impl SystemClock {
  pub fn new() -> Self { Self::default() }
}

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    let host = Utc::now().timestamp_micros();
    let latest = self.high_water.fetch_max(host, Ordering::AcqRel).max(host);
    DateTime::from_timestamp_micros(latest).unwrap_or_else(Utc::now)
  }
}

/// Supplies identifiers for new visitor entries and cargo records.
pub trait IdGenerator: Send + Sync {
  fn next_id(&self) -> Uuid;
}

/// Random (v4) UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
  fn next_id(&self) -> Uuid { Uuid::new_v4() }
}
