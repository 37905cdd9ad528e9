//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings at microsecond precision. Enums use their
//! `snake_case` names. The ULD set and transition history are compact JSON.
//! UUIDs are hyphenated lowercase strings.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use logbook_core::{
  cargo::{CargoRecord, CargoTransition, DeliveryParty},
  visitor::VisitorEntry,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

/// Fixed-width so that text ordering matches time ordering.
pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

/// Parse a `snake_case` enum column.
pub fn decode_enum<T: FromStr>(column: &'static str, s: &str) -> Result<T> {
  s.parse()
    .map_err(|_| Error::UnknownVariant { column, value: s.to_owned() })
}

/// SQLite integers are signed; serials past `i64::MAX` cannot be stored.
pub fn encode_serial(serial: u64) -> Result<i64> {
  i64::try_from(serial).map_err(|_| Error::BadgeSerial(serial.to_string()))
}

pub fn decode_serial(raw: i64) -> Result<u64> {
  u64::try_from(raw).map_err(|_| Error::BadgeSerial(raw.to_string()))
}

// ─── Visitors ────────────────────────────────────────────────────────────────

pub const VISITOR_COLUMNS: &str = "entry_id, name, id_number, area_of_visit, company, \
   purpose, id_card_held, badge_issued, badge_number, badge_serial, state, \
   signed_in_at, signed_in_by, signed_out_at, signed_out_by, erased_at, erased_by";

/// Raw values read directly from a `visitors` row, in [`VISITOR_COLUMNS`]
/// order.
pub struct RawVisitor {
  pub entry_id:      String,
  pub name:          String,
  pub id_number:     String,
  pub area_of_visit: String,
  pub company:       Option<String>,
  pub purpose:       String,
  pub id_card_held:  bool,
  pub badge_issued:  bool,
  pub badge_number:  Option<String>,
  pub badge_serial:  i64,
  pub state:         String,
  pub signed_in_at:  String,
  pub signed_in_by:  String,
  pub signed_out_at: Option<String>,
  pub signed_out_by: Option<String>,
  pub erased_at:     Option<String>,
  pub erased_by:     Option<String>,
}

impl RawVisitor {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      entry_id:      row.get(0)?,
      name:          row.get(1)?,
      id_number:     row.get(2)?,
      area_of_visit: row.get(3)?,
      company:       row.get(4)?,
      purpose:       row.get(5)?,
      id_card_held:  row.get(6)?,
      badge_issued:  row.get(7)?,
      badge_number:  row.get(8)?,
      badge_serial:  row.get(9)?,
      state:         row.get(10)?,
      signed_in_at:  row.get(11)?,
      signed_in_by:  row.get(12)?,
      signed_out_at: row.get(13)?,
      signed_out_by: row.get(14)?,
      erased_at:     row.get(15)?,
      erased_by:     row.get(16)?,
    })
  }

  pub fn from_entry(e: &VisitorEntry) -> Result<Self> {
    Ok(Self {
      entry_id:      encode_uuid(e.entry_id),
      name:          e.name.clone(),
      id_number:     e.id_number.clone(),
      area_of_visit: e.area_of_visit.clone(),
      company:       e.company.clone(),
      purpose:       e.purpose.clone(),
      id_card_held:  e.id_card_held_by_facility,
      badge_issued:  e.badge_issued,
      badge_number:  e.badge_number.clone(),
      badge_serial:  encode_serial(e.badge_serial)?,
      state:         e.state.as_ref().to_owned(),
      signed_in_at:  encode_dt(e.signed_in_at),
      signed_in_by:  e.signed_in_by.clone(),
      signed_out_at: e.signed_out_at.map(encode_dt),
      signed_out_by: e.signed_out_by.clone(),
      erased_at:     e.erased_at.map(encode_dt),
      erased_by:     e.erased_by.clone(),
    })
  }

  pub fn into_entry(self) -> Result<VisitorEntry> {
    Ok(VisitorEntry {
      entry_id:                 decode_uuid(&self.entry_id)?,
      name:                     self.name,
      id_number:                self.id_number,
      area_of_visit:            self.area_of_visit,
      company:                  self.company,
      purpose:                  self.purpose,
      id_card_held_by_facility: self.id_card_held,
      badge_issued:             self.badge_issued,
      badge_number:             self.badge_number,
      badge_serial:             decode_serial(self.badge_serial)?,
      state:                    decode_enum("visitors.state", &self.state)?,
      signed_in_at:             decode_dt(&self.signed_in_at)?,
      signed_in_by:             self.signed_in_by,
      signed_out_at:            decode_opt_dt(self.signed_out_at)?,
      signed_out_by:            self.signed_out_by,
      erased_at:                decode_opt_dt(self.erased_at)?,
      erased_by:                self.erased_by,
    })
  }
}

// ─── Cargo ───────────────────────────────────────────────────────────────────

pub const CARGO_COLUMNS: &str = "cargo_id, category, seal_number, description, \
   awb_number, uld_numbers, driver_name, company, vehicle_registration, state, \
   received_at, received_by, history, ulds_frozen_at, erased_at, erased_by";

/// Raw values read directly from a `cargo` row, in [`CARGO_COLUMNS`] order.
pub struct RawCargo {
  pub cargo_id:             String,
  pub category:             String,
  pub seal_number:          Option<String>,
  pub description:          String,
  pub awb_number:           String,
  pub uld_numbers:          String,
  pub driver_name:          String,
  pub company:              String,
  pub vehicle_registration: String,
  pub state:                String,
  pub received_at:          String,
  pub received_by:          String,
  pub history:              String,
  pub ulds_frozen_at:       Option<String>,
  pub erased_at:            Option<String>,
  pub erased_by:            Option<String>,
}

impl RawCargo {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      cargo_id:             row.get(0)?,
      category:             row.get(1)?,
      seal_number:          row.get(2)?,
      description:          row.get(3)?,
      awb_number:           row.get(4)?,
      uld_numbers:          row.get(5)?,
      driver_name:          row.get(6)?,
      company:              row.get(7)?,
      vehicle_registration: row.get(8)?,
      state:                row.get(9)?,
      received_at:          row.get(10)?,
      received_by:          row.get(11)?,
      history:              row.get(12)?,
      ulds_frozen_at:       row.get(13)?,
      erased_at:            row.get(14)?,
      erased_by:            row.get(15)?,
    })
  }

  pub fn from_record(r: &CargoRecord) -> Result<Self> {
    Ok(Self {
      cargo_id:             encode_uuid(r.cargo_id),
      category:             r.category.as_ref().to_owned(),
      seal_number:          r.seal_number.clone(),
      description:          r.description.clone(),
      awb_number:           r.awb_number.clone(),
      uld_numbers:          serde_json::to_string(&r.uld_numbers)?,
      driver_name:          r.delivered_by.driver_name.clone(),
      company:              r.delivered_by.company.clone(),
      vehicle_registration: r.delivered_by.vehicle_registration.clone(),
      state:                r.state.as_ref().to_owned(),
      received_at:          encode_dt(r.received_at),
      received_by:          r.received_by.clone(),
      history:              serde_json::to_string(&r.history)?,
      ulds_frozen_at:       r.ulds_frozen_at.map(encode_dt),
      erased_at:            r.erased_at.map(encode_dt),
      erased_by:            r.erased_by.clone(),
    })
  }

  pub fn into_record(self) -> Result<CargoRecord> {
    let history: Vec<CargoTransition> = serde_json::from_str(&self.history)?;
    Ok(CargoRecord {
      cargo_id: decode_uuid(&self.cargo_id)?,
      category: decode_enum("cargo.category", &self.category)?,
      seal_number: self.seal_number,
      description: self.description,
      awb_number: self.awb_number,
      uld_numbers: serde_json::from_str(&self.uld_numbers)?,
      delivered_by: DeliveryParty {
        driver_name:          self.driver_name,
        company:              self.company,
        vehicle_registration: self.vehicle_registration,
      },
      state: decode_enum("cargo.state", &self.state)?,
      received_at: decode_dt(&self.received_at)?,
      received_by: self.received_by,
      history,
      ulds_frozen_at: decode_opt_dt(self.ulds_frozen_at)?,
      erased_at: decode_opt_dt(self.erased_at)?,
      erased_by: self.erased_by,
    })
  }
}
