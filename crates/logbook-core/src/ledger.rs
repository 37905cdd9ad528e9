//! [`CargoLedger`]: role-gated cargo receipt and lifecycle.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
  Error, Result,
  cargo::{CargoFilter, CargoRecord, CargoState, CargoUpdate, NewCargo},
  clock::{Clock, IdGenerator, RandomIds, SystemClock},
  guard,
  locks::KeyedLocks,
  role::{Operation, OperatorContext, ResourceKind},
  store::LogbookStore,
};

/// Owns cargo records and their `Received → Cleared → Dispatched` lifecycle.
pub struct CargoLedger<S> {
  store: Arc<S>,
  clock: Arc<dyn Clock>,
  ids:   Arc<dyn IdGenerator>,
  locks: KeyedLocks<Uuid>,
}

impl<S: LogbookStore> CargoLedger<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self {
      store,
      clock: Arc::new(SystemClock::new()),
      ids: Arc::new(RandomIds),
      locks: KeyedLocks::new(),
    }
  }

  pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }

  pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
    self.ids = ids;
    self
  }

  async fn load(&self, id: Uuid) -> Result<CargoRecord> {
    self
      .store
      .load_cargo(id)
      .await
      .map_err(Error::store)?
      .filter(|r| !r.is_erased())
      .ok_or(Error::NotFound { resource: ResourceKind::Cargo, id })
  }

  async fn save(&self, record: &CargoRecord) -> Result<()> {
    self.store.save_cargo(record.clone()).await.map_err(Error::store)
  }

  /// Record cargo arriving at the gate.
  pub async fn receive(&self, ctx: &OperatorContext, cargo: NewCargo) -> Result<CargoRecord> {
    guard::require(ctx, Operation::Create, ResourceKind::Cargo)?;
    let cargo_id = self.ids.next_id();
    let _record = self.locks.lock(cargo_id).await;
    if self.store.load_cargo(cargo_id).await.map_err(Error::store)?.is_some() {
      return Err(Error::Configuration(format!(
        "id generator reissued cargo id {cargo_id}"
      )));
    }

    let record = CargoRecord::received(cargo_id, cargo, self.clock.now(), &ctx.operator)?;
    self.save(&record).await?;

    tracing::info!(
      cargo_id = %record.cargo_id,
      awb = %record.awb_number,
      category = %record.category,
      operator = %ctx.operator,
      "cargo received"
    );
    Ok(record)
  }

  /// Move a record to `target`, which must directly follow its current state.
  pub async fn advance(
    &self,
    ctx: &OperatorContext,
    id: Uuid,
    target: CargoState,
  ) -> Result<CargoRecord> {
    guard::require(ctx, Operation::AdvanceState, ResourceKind::Cargo)?;
    let _record = self.locks.lock(id).await;

    let mut record = self.load(id).await?;
    let from = record.state;
    record.advance(target, self.clock.now(), &ctx.operator)?;
    self.save(&record).await?;

    tracing::info!(cargo_id = %id, %from, to = %target, operator = %ctx.operator, "cargo advanced");
    Ok(record)
  }

  /// Edit descriptive fields before clearance.
  pub async fn update(
    &self,
    ctx: &OperatorContext,
    id: Uuid,
    update: CargoUpdate,
  ) -> Result<CargoRecord> {
    guard::require(ctx, Operation::Update, ResourceKind::Cargo)?;
    let _record = self.locks.lock(id).await;

    let mut record = self.load(id).await?;
    record.apply(&update)?;
    self.save(&record).await?;

    tracing::info!(cargo_id = %id, operator = %ctx.operator, "cargo updated");
    Ok(record)
  }

  /// Append ULD numbers to a record that has not been dispatched.
  pub async fn append_ulds(
    &self,
    ctx: &OperatorContext,
    id: Uuid,
    ulds: Vec<String>,
  ) -> Result<CargoRecord> {
    guard::require(ctx, Operation::Update, ResourceKind::Cargo)?;
    let _record = self.locks.lock(id).await;

    let mut record = self.load(id).await?;
    record.append_ulds(&ulds)?;
    self.save(&record).await?;

    tracing::info!(cargo_id = %id, added = ulds.len(), operator = %ctx.operator, "ULDs appended");
    Ok(record)
  }

  pub async fn get(&self, ctx: &OperatorContext, id: Uuid) -> Result<CargoRecord> {
    guard::require(ctx, Operation::Read, ResourceKind::Cargo)?;
    self.load(id).await
  }

  pub async fn list(
    &self,
    ctx: &OperatorContext,
    filter: &CargoFilter,
  ) -> Result<Vec<CargoRecord>> {
    guard::require(ctx, Operation::Read, ResourceKind::Cargo)?;
    self
      .store
      .list_cargo(&filter.normalized())
      .await
      .map_err(Error::store)
  }

  /// Admin-only soft delete.
  pub async fn erase(&self, ctx: &OperatorContext, id: Uuid) -> Result<CargoRecord> {
    guard::require(ctx, Operation::Delete, ResourceKind::Cargo)?;
    let _record = self.locks.lock(id).await;

    let mut record = self.load(id).await?;
    record.erase(self.clock.now(), &ctx.operator);
    self.save(&record).await?;

    tracing::info!(cargo_id = %id, operator = %ctx.operator, "cargo record erased");
    Ok(record)
  }
}
