//! Cargo records and their linear lifecycle.
//!
//! ```text
//!   Received ──▶ Cleared ──▶ Dispatched
//! ```
//!
//! No state may be skipped and none revisited. Descriptive fields are
//! editable only while `Received`; ULD numbers may be appended until
//! dispatch and are frozen from then on.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::{
  Error, Result,
  role::ResourceKind,
  validate::{normalized_key, optional, required, uld_numbers},
};

// ─── Category & state ────────────────────────────────────────────────────────

/// Whether the shipper is a known consignor. Fixed at receipt.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CargoCategory {
  Unknown,
  Known,
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CargoState {
  Received,
  Cleared,
  Dispatched,
}

impl CargoState {
  /// The only state this one may advance to.
  pub fn successor(self) -> Option<Self> {
    match self {
      Self::Received => Some(Self::Cleared),
      Self::Cleared => Some(Self::Dispatched),
      Self::Dispatched => None,
    }
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// Who brought the cargo to the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryParty {
  pub driver_name:          String,
  pub company:              String,
  pub vehicle_registration: String,
}

impl DeliveryParty {
  fn validated(&self) -> Result<Self> {
    Ok(Self {
      driver_name:          required("driver name", &self.driver_name)?,
      company:              required("delivery company", &self.company)?,
      vehicle_registration: required(
        "vehicle registration",
        &self.vehicle_registration,
      )?
      .to_uppercase(),
    })
  }
}

/// An entry in a record's transition history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CargoTransition {
  pub from: CargoState,
  pub to:   CargoState,
  pub at:   DateTime<Utc>,
  /// Acting operator.
  pub by:   String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CargoRecord {
  pub cargo_id:       Uuid,
  pub category:       CargoCategory,
  pub seal_number:    Option<String>,
  pub description:    String,
  /// Air waybill number.
  pub awb_number:     String,
  /// Unit load device numbers. Append-only until dispatch.
  pub uld_numbers:    BTreeSet<String>,
  pub delivered_by:   DeliveryParty,
  pub state:          CargoState,
  pub received_at:    DateTime<Utc>,
  pub received_by:    String,
  pub history:        Vec<CargoTransition>,
  pub ulds_frozen_at: Option<DateTime<Utc>>,
  pub erased_at:      Option<DateTime<Utc>>,
  pub erased_by:      Option<String>,
}

impl CargoRecord {
  pub(crate) fn received(
    cargo_id: Uuid,
    cargo: NewCargo,
    at: DateTime<Utc>,
    by: &str,
  ) -> Result<Self> {
    let cargo = cargo.validated()?;
    Ok(Self {
      cargo_id,
      category: cargo.category,
      seal_number: cargo.seal_number,
      description: cargo.description,
      awb_number: cargo.awb_number,
      uld_numbers: uld_numbers(&cargo.uld_numbers)?,
      delivered_by: cargo.delivered_by,
      state: CargoState::Received,
      received_at: at,
      received_by: by.to_owned(),
      history: Vec::new(),
      ulds_frozen_at: None,
      erased_at: None,
      erased_by: None,
    })
  }

  pub fn is_erased(&self) -> bool { self.erased_at.is_some() }

  /// The most recent timestamp recorded on the record.
  pub fn last_recorded_at(&self) -> DateTime<Utc> {
    self
      .history
      .iter()
      .map(|t| t.at)
      .chain(self.erased_at)
      .fold(self.received_at, Ord::max)
  }

  fn invalid(&self, detail: impl Into<String>) -> Error {
    Error::InvalidTransition {
      resource: ResourceKind::Cargo,
      id:       self.cargo_id,
      detail:   detail.into(),
    }
  }

  /// Move to `target`, which must be the immediate successor of the current
  /// state. `at` is clamped to the last recorded timestamp.
  pub(crate) fn advance(
    &mut self,
    target: CargoState,
    at: DateTime<Utc>,
    by: &str,
  ) -> Result<()> {
    if self.state.successor() != Some(target) {
      return Err(self.invalid(format!(
        "cannot advance from {} to {target}",
        self.state
      )));
    }
    let at = at.max(self.last_recorded_at());
    self.history.push(CargoTransition {
      from: self.state,
      to: target,
      at,
      by: by.to_owned(),
    });
    self.state = target;
    if target == CargoState::Dispatched {
      self.ulds_frozen_at = Some(at);
    }
    Ok(())
  }

  /// Add ULD numbers. Allowed until dispatch.
  pub(crate) fn append_ulds(&mut self, ulds: &[String]) -> Result<()> {
    if self.state == CargoState::Dispatched {
      return Err(self.invalid("ULD numbers are frozen after dispatch"));
    }
    let ulds = uld_numbers(ulds)?;
    self.uld_numbers.extend(ulds);
    Ok(())
  }

  /// Edit descriptive fields. Only allowed before clearance.
  pub(crate) fn apply(&mut self, update: &CargoUpdate) -> Result<()> {
    if self.state != CargoState::Received {
      return Err(self.invalid(format!("cannot edit cargo once {}", self.state)));
    }
    let description = update
      .description
      .as_deref()
      .map(|d| required("description", d))
      .transpose()?;
    let awb = update
      .awb_number
      .as_deref()
      .map(|a| required("AWB number", a).map(|a| a.to_uppercase()))
      .transpose()?;
    let party = update
      .delivered_by
      .as_ref()
      .map(DeliveryParty::validated)
      .transpose()?;
    let ulds = uld_numbers(&update.add_ulds)?;

    if let Some(description) = description {
      self.description = description;
    }
    if let Some(awb) = awb {
      self.awb_number = awb;
    }
    if let Some(party) = party {
      self.delivered_by = party;
    }
    if update.seal_number.is_some() {
      self.seal_number = optional(update.seal_number.as_deref());
    }
    self.uld_numbers.extend(ulds);
    Ok(())
  }

  /// Soft-delete.
  pub(crate) fn erase(&mut self, at: DateTime<Utc>, by: &str) {
    self.erased_at = Some(at.max(self.last_recorded_at()));
    self.erased_by = Some(by.to_owned());
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::CargoLedger::receive`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCargo {
  pub category:     CargoCategory,
  pub description:  String,
  pub awb_number:   String,
  #[serde(default)]
  pub seal_number:  Option<String>,
  #[serde(default)]
  pub uld_numbers:  Vec<String>,
  pub delivered_by: DeliveryParty,
}

impl NewCargo {
  fn validated(self) -> Result<Self> {
    if self.category == CargoCategory::Known
      && self.uld_numbers.iter().all(|u| u.trim().is_empty())
    {
      return Err(Error::Validation(
        "known cargo must list at least one ULD number".into(),
      ));
    }
    Ok(Self {
      category:     self.category,
      description:  required("description", &self.description)?,
      awb_number:   required("AWB number", &self.awb_number)?.to_uppercase(),
      seal_number:  optional(self.seal_number.as_deref()),
      delivered_by: self.delivered_by.validated()?,
      uld_numbers:  self.uld_numbers,
    })
  }
}

/// Edits accepted by [`crate::CargoLedger::update`]. Absent fields are left
/// alone; a blank `seal_number` clears it. `add_ulds` is appended, never
/// replacing what is recorded. `category` is fixed at receipt and is not
/// accepted here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CargoUpdate {
  pub description:  Option<String>,
  pub awb_number:   Option<String>,
  pub seal_number:  Option<String>,
  pub delivered_by: Option<DeliveryParty>,
  pub add_ulds:     Vec<String>,
}

/// Parameters for [`crate::store::LogbookStore::list_cargo`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CargoFilter {
  pub category:   Option<CargoCategory>,
  pub state:      Option<CargoState>,
  pub awb_number: Option<String>,
}

impl CargoFilter {
  /// Bring `awb_number` into the stored form, so stores can compare exactly.
  pub fn normalized(&self) -> Self {
    Self {
      category:   self.category,
      state:      self.state,
      awb_number: normalized_key(self.awb_number.as_deref()),
    }
  }

  /// Whether `record` passes the filter. Erased records never do.
  ///
  /// Expects a [`normalized`](Self::normalized) filter.
  pub fn matches(&self, record: &CargoRecord) -> bool {
    !record.is_erased()
      && self.category.is_none_or(|c| c == record.category)
      && self.state.is_none_or(|s| s == record.state)
      && self.awb_number.as_deref().is_none_or(|a| a == record.awb_number)
  }
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator;

  use super::*;

  fn party() -> DeliveryParty {
    DeliveryParty {
      driver_name:          "Sam Kariuki".into(),
      company:              "Swift Haulage".into(),
      vehicle_registration: "kcd 123a".into(),
    }
  }

  fn new_cargo(category: CargoCategory, ulds: &[&str]) -> NewCargo {
    NewCargo {
      category,
      description: "Flowers".into(),
      awb_number: "awb-001".into(),
      seal_number: None,
      uld_numbers: ulds.iter().map(|u| u.to_string()).collect(),
      delivered_by: party(),
    }
  }

  fn record(category: CargoCategory, ulds: &[&str]) -> CargoRecord {
    CargoRecord::received(Uuid::new_v4(), new_cargo(category, ulds), Utc::now(), "dock")
      .unwrap()
  }

  #[test]
  fn known_cargo_needs_ulds() {
    let err = CargoRecord::received(
      Uuid::new_v4(),
      new_cargo(CargoCategory::Known, &[]),
      Utc::now(),
      "dock",
    )
    .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let rec = record(CargoCategory::Known, &["AKE1"]);
    assert_eq!(rec.uld_numbers.len(), 1);
  }

  #[test]
  fn unknown_cargo_may_have_no_ulds() {
    let rec = record(CargoCategory::Unknown, &[]);
    assert!(rec.uld_numbers.is_empty());
    assert_eq!(rec.awb_number, "AWB-001");
    assert_eq!(rec.delivered_by.vehicle_registration, "KCD 123A");
  }

  #[test]
  fn advance_only_to_successor() {
    for from in CargoState::iter() {
      for to in CargoState::iter() {
        let mut rec = record(CargoCategory::Unknown, &[]);
        rec.state = from;
        let result = rec.advance(to, Utc::now(), "dock");
        assert_eq!(result.is_ok(), from.successor() == Some(to), "{from} -> {to}");
        if result.is_err() {
          assert_eq!(rec.state, from);
          assert!(rec.history.is_empty());
        }
      }
    }
  }

  #[test]
  fn dispatch_freezes_ulds() {
    let mut rec = record(CargoCategory::Known, &["PMC1"]);
    rec.advance(CargoState::Cleared, Utc::now(), "dock").unwrap();
    rec.append_ulds(&["pmc2".to_string()]).unwrap();
    rec.advance(CargoState::Dispatched, Utc::now(), "dock").unwrap();

    assert!(rec.ulds_frozen_at.is_some());
    assert_eq!(rec.history.len(), 2);
    let err = rec.append_ulds(&["PMC3".to_string()]).unwrap_err();
    assert!(matches!(err, Error::InvalidTransition { .. }));
    assert_eq!(
      rec.uld_numbers.iter().collect::<Vec<_>>(),
      vec!["PMC1", "PMC2"]
    );
  }

  #[test]
  fn update_only_while_received() {
    let mut rec = record(CargoCategory::Unknown, &[]);
    rec
      .apply(&CargoUpdate {
        seal_number: Some("S-9".into()),
        add_ulds: vec!["AKE7".into()],
        ..Default::default()
      })
      .unwrap();
    assert_eq!(rec.seal_number.as_deref(), Some("S-9"));
    assert!(rec.uld_numbers.contains("AKE7"));

    rec.advance(CargoState::Cleared, Utc::now(), "dock").unwrap();
    let err = rec.apply(&CargoUpdate::default()).unwrap_err();
    assert!(matches!(err, Error::InvalidTransition { .. }));
  }

  #[test]
  fn filter_matches_fields() {
    let rec = record(CargoCategory::Known, &["X1"]);
    assert!(CargoFilter::default().matches(&rec));
    assert!(
      CargoFilter { awb_number: Some(" awb-001".into()), ..Default::default() }
        .normalized()
        .matches(&rec)
    );
    assert!(
      !CargoFilter { category: Some(CargoCategory::Unknown), ..Default::default() }
        .matches(&rec)
    );
  }
}
