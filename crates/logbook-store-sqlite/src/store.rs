//! [`SqliteStore`], the SQLite implementation of [`LogbookStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use logbook_core::{
  cargo::{CargoFilter, CargoRecord},
  store::LogbookStore,
  visitor::{VisitorEntry, VisitorFilter},
};

use crate::{
  Error, Result,
  encode::{
    CARGO_COLUMNS, RawCargo, RawVisitor, VISITOR_COLUMNS, decode_serial, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A logbook store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store. Used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!("sqlite schema ready");
    Ok(())
  }

  async fn query_visitor(&self, sql: String, key: String) -> Result<Option<VisitorEntry>> {
    let raw: Option<RawVisitor> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![key], RawVisitor::from_row)
            .optional()?,
        )
      })
      .await?;
    raw.map(RawVisitor::into_entry).transpose()
  }
}

// ─── LogbookStore impl ───────────────────────────────────────────────────────

impl LogbookStore for SqliteStore {
  type Error = Error;

  // ── Visitors ──────────────────────────────────────────────────────────────

  async fn save_visitor(&self, entry: VisitorEntry) -> Result<()> {
    let r = RawVisitor::from_entry(&entry)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO visitors ({VISITOR_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
             ON CONFLICT(entry_id) DO UPDATE SET
               name          = excluded.name,
               id_number     = excluded.id_number,
               area_of_visit = excluded.area_of_visit,
               company       = excluded.company,
               purpose       = excluded.purpose,
               id_card_held  = excluded.id_card_held,
               badge_issued  = excluded.badge_issued,
               badge_number  = excluded.badge_number,
               badge_serial  = excluded.badge_serial,
               state         = excluded.state,
               signed_in_at  = excluded.signed_in_at,
               signed_in_by  = excluded.signed_in_by,
               signed_out_at = excluded.signed_out_at,
               signed_out_by = excluded.signed_out_by,
               erased_at     = excluded.erased_at,
               erased_by     = excluded.erased_by"
          ),
          rusqlite::params![
            r.entry_id,
            r.name,
            r.id_number,
            r.area_of_visit,
            r.company,
            r.purpose,
            r.id_card_held,
            r.badge_issued,
            r.badge_number,
            r.badge_serial,
            r.state,
            r.signed_in_at,
            r.signed_in_by,
            r.signed_out_at,
            r.signed_out_by,
            r.erased_at,
            r.erased_by,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn load_visitor(&self, id: Uuid) -> Result<Option<VisitorEntry>> {
    self
      .query_visitor(
        format!("SELECT {VISITOR_COLUMNS} FROM visitors WHERE entry_id = ?1"),
        encode_uuid(id),
      )
      .await
  }

  async fn find_active_by_id_number(&self, id_number: &str) -> Result<Option<VisitorEntry>> {
    self
      .query_visitor(
        format!(
          "SELECT {VISITOR_COLUMNS} FROM visitors
           WHERE id_number = ?1 AND state = 'signed_in'"
        ),
        id_number.to_owned(),
      )
      .await
  }

  async fn list_visitors(&self, filter: &VisitorFilter) -> Result<Vec<VisitorEntry>> {
    let state = filter.state.map(|s| s.as_ref().to_owned());
    let id_number = filter.id_number.clone();

    let raws: Vec<RawVisitor> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {VISITOR_COLUMNS} FROM visitors
           WHERE erased_at IS NULL
             AND (?1 IS NULL OR state = ?1)
             AND (?2 IS NULL OR id_number = ?2)
           ORDER BY signed_in_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![state, id_number], RawVisitor::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVisitor::into_entry).collect()
  }

  async fn max_badge_serial(&self) -> Result<Option<u64>> {
    let max: Option<i64> = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT MAX(badge_serial) FROM visitors", [], |r| r.get(0))?)
      })
      .await?;
    max.map(decode_serial).transpose()
  }

  // ── Cargo ─────────────────────────────────────────────────────────────────

  async fn save_cargo(&self, record: CargoRecord) -> Result<()> {
    let r = RawCargo::from_record(&record)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO cargo ({CARGO_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
             ON CONFLICT(cargo_id) DO UPDATE SET
               seal_number          = excluded.seal_number,
               description          = excluded.description,
               awb_number           = excluded.awb_number,
               uld_numbers          = excluded.uld_numbers,
               driver_name          = excluded.driver_name,
               company              = excluded.company,
               vehicle_registration = excluded.vehicle_registration,
               state                = excluded.state,
               history              = excluded.history,
               ulds_frozen_at       = excluded.ulds_frozen_at,
               erased_at            = excluded.erased_at,
               erased_by            = excluded.erased_by"
          ),
          rusqlite::params![
            r.cargo_id,
            r.category,
            r.seal_number,
            r.description,
            r.awb_number,
            r.uld_numbers,
            r.driver_name,
            r.company,
            r.vehicle_registration,
            r.state,
            r.received_at,
            r.received_by,
            r.history,
            r.ulds_frozen_at,
            r.erased_at,
            r.erased_by,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn load_cargo(&self, id: Uuid) -> Result<Option<CargoRecord>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawCargo> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CARGO_COLUMNS} FROM cargo WHERE cargo_id = ?1"),
              rusqlite::params![id_str],
              RawCargo::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCargo::into_record).transpose()
  }

  async fn list_cargo(&self, filter: &CargoFilter) -> Result<Vec<CargoRecord>> {
    let category = filter.category.map(|c| c.as_ref().to_owned());
    let state = filter.state.map(|s| s.as_ref().to_owned());
    let awb = filter.awb_number.clone();

    let raws: Vec<RawCargo> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CARGO_COLUMNS} FROM cargo
           WHERE erased_at IS NULL
             AND (?1 IS NULL OR category = ?1)
             AND (?2 IS NULL OR state = ?2)
             AND (?3 IS NULL OR awb_number = ?3)
           ORDER BY received_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![category, state, awb], RawCargo::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCargo::into_record).collect()
  }
}
