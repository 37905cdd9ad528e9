//! Badge-number issuance.
//!
//! Badges are issued from a single process-wide counter. Serials are never
//! reused; a sign-in that fails after issuance leaves a gap.

use std::sync::atomic::{AtomicU64, Ordering};

/// The prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "V-";

/// A freshly issued badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
  pub serial: u64,
  pub number: String,
}

/// Atomic, monotonically increasing badge allocator.
#[derive(Debug)]
pub struct BadgeIssuer {
  last:   AtomicU64,
  prefix: String,
}

impl BadgeIssuer {
  /// Start issuing at serial 1.
  pub fn new() -> Self { Self::resume_after(0) }

  /// Continue after the highest serial already handed out, e.g. the value
  /// returned by [`crate::store::LogbookStore::max_badge_serial`].
  pub fn resume_after(serial: u64) -> Self {
    Self {
      last:   AtomicU64::new(serial),
      prefix: DEFAULT_PREFIX.to_owned(),
    }
  }

  pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.prefix = prefix.into();
    self
  }

  /// Allocate the next badge.
  pub fn issue(&self) -> Badge {
    let serial = self.last.fetch_add(1, Ordering::SeqCst) + 1;
    Badge {
      serial,
      number: format!("{}{serial:05}", self.prefix),
    }
  }

  /// The most recently issued serial (0 if none).
  pub fn last_serial(&self) -> u64 { self.last.load(Ordering::SeqCst) }
}

impl Default for BadgeIssuer {
  fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
  use std::{collections::HashSet, sync::Arc, thread};

  use super::*;

  #[test]
  fn issues_sequential_formatted_numbers() {
    let issuer = BadgeIssuer::new();
    assert_eq!(issuer.issue().number, "V-00001");
    assert_eq!(issuer.issue().number, "V-00002");
    assert_eq!(issuer.last_serial(), 2);
  }

  #[test]
  fn resumes_after_persisted_serial() {
    let issuer = BadgeIssuer::resume_after(41).with_prefix("GATE-");
    let badge = issuer.issue();
    assert_eq!(badge.serial, 42);
    assert_eq!(badge.number, "GATE-00042");
  }

  #[test]
  fn concurrent_issuance_is_unique() {
    let issuer = Arc::new(BadgeIssuer::new());
    let handles: Vec<_> = (0..8)
      .map(|_| {
        let issuer = issuer.clone();
        thread::spawn(move || {
          (0..250).map(|_| issuer.issue().serial).collect::<Vec<_>>()
        })
      })
      .collect();

    let mut seen = HashSet::new();
    for h in handles {
      for serial in h.join().unwrap() {
        assert!(seen.insert(serial), "duplicate serial {serial}");
      }
    }
    assert_eq!(seen.len(), 2000);
    assert_eq!(issuer.last_serial(), 2000);
  }
}
