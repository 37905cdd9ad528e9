//! The `LogbookStore` persistence contract.
//!
//! The checkpoint and ledger treat storage as a transactional key-value
//! store: whole entities are saved and loaded by id. Every core operation
//! performs at most one save, after all validation has passed, so a rejected
//! call never leaves a partial write behind.
//!
//! Implemented by [`crate::memory::MemoryStore`] and by
//! `logbook-store-sqlite`.

use std::future::Future;

use uuid::Uuid;

use crate::{
  cargo::{CargoFilter, CargoRecord},
  visitor::{VisitorEntry, VisitorFilter},
};

/// Abstraction over a logbook storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait LogbookStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Visitors ──────────────────────────────────────────────────────────

  /// Insert or replace a visitor entry, keyed by `entry_id`.
  fn save_visitor(
    &self,
    entry: VisitorEntry,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Load a visitor entry by id, erased or not. `None` if never saved.
  fn load_visitor(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<VisitorEntry>, Self::Error>> + Send + '_;

  /// The signed-in entry for `id_number`, if any. `id_number` arrives in
  /// stored form and is compared exactly.
  fn find_active_by_id_number<'a>(
    &'a self,
    id_number: &'a str,
  ) -> impl Future<Output = Result<Option<VisitorEntry>, Self::Error>> + Send + 'a;

  /// Non-erased entries matching `filter`, most recent sign-in first. The
  /// filter arrives [normalized](VisitorFilter::normalized).
  fn list_visitors<'a>(
    &'a self,
    filter: &'a VisitorFilter,
  ) -> impl Future<Output = Result<Vec<VisitorEntry>, Self::Error>> + Send + 'a;

  /// Highest badge serial ever persisted, used to resume the badge issuer.
  fn max_badge_serial(
    &self,
  ) -> impl Future<Output = Result<Option<u64>, Self::Error>> + Send + '_;

  // ── Cargo ─────────────────────────────────────────────────────────────

  /// Insert or replace a cargo record, keyed by `cargo_id`.
  fn save_cargo(
    &self,
    record: CargoRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Load a cargo record by id, erased or not.
  fn load_cargo(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<CargoRecord>, Self::Error>> + Send + '_;

  /// Non-erased records matching `filter`, most recent receipt first. The
  /// filter arrives [normalized](CargoFilter::normalized).
  fn list_cargo<'a>(
    &'a self,
    filter: &'a CargoFilter,
  ) -> impl Future<Output = Result<Vec<CargoRecord>, Self::Error>> + Send + 'a;
}
