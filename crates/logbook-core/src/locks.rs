//! Per-key exclusive sections.
//!
//! Each visitor entry and cargo record is its own unit of mutation. A
//! [`KeyedLocks`] hands out one async mutex per key, so the
//! read-validate-write sequence on one record is serialized while different
//! records proceed independently.

use std::{
  collections::HashMap,
  hash::Hash,
  sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Debug)]
pub struct KeyedLocks<K> {
  slots: Mutex<HashMap<K, Arc<AsyncMutex<()>>>>,
}

impl<K: Eq + Hash> KeyedLocks<K> {
  pub fn new() -> Self {
    Self { slots: Mutex::new(HashMap::new()) }
  }

  /// Wait for exclusive access to `key`. The section ends when the guard is
  /// dropped.
  pub async fn lock(&self, key: K) -> OwnedMutexGuard<()> {
    let slot = {
      let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
      // Only the map holds slots nobody is using or waiting on.
      slots.retain(|_, slot| Arc::strong_count(slot) > 1);
      slots.entry(key).or_default().clone()
    };
    slot.lock_owned().await
  }

  /// Number of keys currently held or awaited.
  pub fn contended(&self) -> usize {
    let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
    slots.values().filter(|s| Arc::strong_count(s) > 1).count()
  }
}

impl<K: Eq + Hash> Default for KeyedLocks<K> {
  fn default() -> Self { Self::new() }
}
