//! [`MemoryStore`], a process-local [`LogbookStore`].
//!
//! Backs the core's own tests and any deployment that does not need records
//! to outlive the process.

use std::{collections::HashMap, convert::Infallible, sync::Arc};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
  cargo::{CargoFilter, CargoRecord},
  store::LogbookStore,
  visitor::{VisitorEntry, VisitorFilter},
};

#[derive(Debug, Default)]
struct Tables {
  visitors: HashMap<Uuid, VisitorEntry>,
  cargo:    HashMap<Uuid, CargoRecord>,
}

/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }
}

impl LogbookStore for MemoryStore {
  type Error = Infallible;

  async fn save_visitor(&self, entry: VisitorEntry) -> Result<(), Infallible> {
    self.tables.write().await.visitors.insert(entry.entry_id, entry);
    Ok(())
  }

  async fn load_visitor(&self, id: Uuid) -> Result<Option<VisitorEntry>, Infallible> {
    Ok(self.tables.read().await.visitors.get(&id).cloned())
  }

  async fn find_active_by_id_number(
    &self,
    id_number: &str,
  ) -> Result<Option<VisitorEntry>, Infallible> {
    Ok(
      self
        .tables
        .read()
        .await
        .visitors
        .values()
        .find(|e| e.is_signed_in() && e.id_number == id_number)
        .cloned(),
    )
  }

  async fn list_visitors(
    &self,
    filter: &VisitorFilter,
  ) -> Result<Vec<VisitorEntry>, Infallible> {
    let mut entries: Vec<_> = self
      .tables
      .read()
      .await
      .visitors
      .values()
      .filter(|e| filter.matches(e))
      .cloned()
      .collect();
    entries.sort_by(|a, b| b.signed_in_at.cmp(&a.signed_in_at));
    Ok(entries)
  }

  async fn max_badge_serial(&self) -> Result<Option<u64>, Infallible> {
    Ok(
      self
        .tables
        .read()
        .await
        .visitors
        .values()
        .map(|e| e.badge_serial)
        .max(),
    )
  }

  async fn save_cargo(&self, record: CargoRecord) -> Result<(), Infallible> {
    self.tables.write().await.cargo.insert(record.cargo_id, record);
    Ok(())
  }

  async fn load_cargo(&self, id: Uuid) -> Result<Option<CargoRecord>, Infallible> {
    Ok(self.tables.read().await.cargo.get(&id).cloned())
  }

  async fn list_cargo(&self, filter: &CargoFilter) -> Result<Vec<CargoRecord>, Infallible> {
    let mut records: Vec<_> = self
      .tables
      .read()
      .await
      .cargo
      .values()
      .filter(|r| filter.matches(r))
      .cloned()
      .collect();
    records.sort_by(|a, b| b.received_at.cmp(&a.received_at));
    Ok(records)
  }
}
