//! [`VisitorCheckpoint`]: role-gated visitor sign-in and sign-out.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
  Error, Result,
  badge::BadgeIssuer,
  clock::{Clock, IdGenerator, RandomIds, SystemClock},
  custody::{CustodyInstruction, CustodySink, TracingCustodySink},
  guard,
  locks::KeyedLocks,
  role::{Operation, OperatorContext, ResourceKind},
  store::LogbookStore,
  visitor::{NewVisit, VisitorEntry, VisitorFilter, VisitorUpdate},
};

/// Owns the visitor custody state machine.
///
/// Every call checks the operator's role first, then runs its
/// read-validate-write sequence inside the exclusive section for the entry it
/// touches. Sign-ins are serialized per ID number so that two terminals
/// cannot both admit the same card.
pub struct VisitorCheckpoint<S> {
  store:       Arc<S>,
  badges:      Arc<BadgeIssuer>,
  clock:       Arc<dyn Clock>,
  ids:         Arc<dyn IdGenerator>,
  custody:     Arc<dyn CustodySink>,
  entry_locks: KeyedLocks<Uuid>,
  card_locks:  KeyedLocks<String>,
}

impl<S: LogbookStore> VisitorCheckpoint<S> {
  pub fn new(store: Arc<S>, badges: Arc<BadgeIssuer>) -> Self {
    Self {
      store,
      badges,
      clock: Arc::new(SystemClock::new()),
      ids: Arc::new(RandomIds),
      custody: Arc::new(TracingCustodySink),
      entry_locks: KeyedLocks::new(),
      card_locks: KeyedLocks::new(),
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

  pub fn with_custody_sink(mut self, custody: Arc<dyn CustodySink>) -> Self {
    self.custody = custody;
    self
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  /// Load a non-erased entry or fail with `NotFound`.
  async fn load(&self, id: Uuid) -> Result<VisitorEntry> {
    self
      .store
      .load_visitor(id)
      .await
      .map_err(Error::store)?
      .filter(|e| !e.is_erased())
      .ok_or(Error::NotFound { resource: ResourceKind::Visitor, id })
  }

  async fn save(&self, entry: &VisitorEntry) -> Result<()> {
    debug_assert!(entry.custody_consistent(), "custody invariant broken");
    self.store.save_visitor(entry.clone()).await.map_err(Error::store)
  }

  /// Admit a visitor: retain their ID card and issue a badge.
  pub async fn sign_in(
    &self,
    ctx: &OperatorContext,
    visit: NewVisit,
  ) -> Result<VisitorEntry> {
    guard::require(ctx, Operation::SignIn, ResourceKind::Visitor)?;
    let visit = visit.validated()?;

    let _card = self.card_locks.lock(visit.id_number.clone()).await;

    if let Some(existing) = self
      .store
      .find_active_by_id_number(&visit.id_number)
      .await
      .map_err(Error::store)?
    {
      tracing::warn!(
        id_number = %visit.id_number,
        existing = %existing.entry_id,
        "rejected sign-in: card already held"
      );
      return Err(Error::DuplicateActiveVisit {
        id_number:    visit.id_number,
        entry_id:     existing.entry_id,
        badge_number: existing.badge_number,
      });
    }

    let entry_id = self.ids.next_id();
    let _entry = self.entry_locks.lock(entry_id).await;
    if self.store.load_visitor(entry_id).await.map_err(Error::store)?.is_some() {
      return Err(Error::Configuration(format!(
        "id generator reissued visitor entry id {entry_id}"
      )));
    }

    let badge = self.badges.issue();
    let entry = VisitorEntry::signed_in(
      entry_id,
      visit,
      badge,
      self.clock.now(),
      &ctx.operator,
    );
    self.save(&entry).await?;

    let badge_number = entry.badge_number.clone().unwrap_or_default();
    tracing::info!(
      entry_id = %entry.entry_id,
      badge = %badge_number,
      operator = %ctx.operator,
      "visitor signed in"
    );
    self.custody.instruct(&CustodyInstruction::RetainIdIssueBadge {
      entry_id: entry.entry_id,
      id_number: entry.id_number.clone(),
      badge_number,
    });
    Ok(entry)
  }

  /// Release a visitor: return their ID card and reclaim the badge.
  pub async fn sign_out(&self, ctx: &OperatorContext, id: Uuid) -> Result<VisitorEntry> {
    guard::require(ctx, Operation::SignOut, ResourceKind::Visitor)?;
    let _entry = self.entry_locks.lock(id).await;

    let mut entry = self.load(id).await?;
    let badge_number = entry.sign_out(self.clock.now(), &ctx.operator)?;
    self.save(&entry).await?;

    tracing::info!(
      entry_id = %id,
      badge = %badge_number,
      operator = %ctx.operator,
      "visitor signed out"
    );
    self.custody.instruct(&CustodyInstruction::ReturnIdReclaimBadge {
      entry_id: id,
      id_number: entry.id_number.clone(),
      badge_number,
    });
    Ok(entry)
  }

  pub async fn get(&self, ctx: &OperatorContext, id: Uuid) -> Result<VisitorEntry> {
    guard::require(ctx, Operation::Read, ResourceKind::Visitor)?;
    self.load(id).await
  }

  pub async fn list(
    &self,
    ctx: &OperatorContext,
    filter: &VisitorFilter,
  ) -> Result<Vec<VisitorEntry>> {
    guard::require(ctx, Operation::Read, ResourceKind::Visitor)?;
    self
      .store
      .list_visitors(&filter.normalized())
      .await
      .map_err(Error::store)
  }

  /// Correct the metadata of an open visit.
  pub async fn update(
    &self,
    ctx: &OperatorContext,
    id: Uuid,
    update: VisitorUpdate,
  ) -> Result<VisitorEntry> {
    guard::require(ctx, Operation::Update, ResourceKind::Visitor)?;
    let _entry = self.entry_locks.lock(id).await;

    let mut entry = self.load(id).await?;
    entry.apply(&update)?;
    self.save(&entry).await?;

    tracing::info!(entry_id = %id, operator = %ctx.operator, "visitor entry updated");
    Ok(entry)
  }

  /// Admin-only soft delete of a closed visit.
  pub async fn erase(&self, ctx: &OperatorContext, id: Uuid) -> Result<VisitorEntry> {
    guard::require(ctx, Operation::Delete, ResourceKind::Visitor)?;
    let _entry = self.entry_locks.lock(id).await;

    let mut entry = self.load(id).await?;
    entry.erase(self.clock.now(), &ctx.operator)?;
    self.save(&entry).await?;

    tracing::info!(entry_id = %id, operator = %ctx.operator, "visitor entry erased");
    Ok(entry)
  }
}
