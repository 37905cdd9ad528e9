//! Visitor entries and their custody state machine.
//!
//! ```text
//!   ∅ ──sign_in──▶ SignedIn ──sign_out──▶ SignedOut (terminal)
//! ```
//!
//! While an entry is `SignedIn` the facility holds the visitor's ID card and
//! the visitor holds a badge. Signing out returns the card and reclaims the
//! badge. Both custody fields are derived from the state and are only ever
//! changed together with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{
  Error, Result,
  badge::Badge,
  role::ResourceKind,
  validate::{normalized_key, optional, required},
};

// ─── State ───────────────────────────────────────────────────────────────────

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
pub enum VisitorState {
  SignedIn,
  SignedOut,
}

// ─── Entry ───────────────────────────────────────────────────────────────────

/// One visit, from sign-in to sign-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitorEntry {
  pub entry_id:                 Uuid,
  /// Copied from the ID card at sign-in; never edited.
  pub name:                     String,
  /// National ID number from the card; never edited.
  pub id_number:                String,
  pub area_of_visit:            String,
  pub company:                  Option<String>,
  pub purpose:                  String,
  pub id_card_held_by_facility: bool,
  pub badge_issued:             bool,
  /// The badge currently outstanding; cleared at sign-out.
  pub badge_number:             Option<String>,
  /// Serial the badge number was formatted from. Kept after sign-out so the
  /// issuer can resume past it.
  pub badge_serial:             u64,
  pub state:                    VisitorState,
  pub signed_in_at:             DateTime<Utc>,
  pub signed_in_by:             String,
  pub signed_out_at:            Option<DateTime<Utc>>,
  pub signed_out_by:            Option<String>,
  /// Set by the admin erase; erased entries are retained but hidden.
  pub erased_at:                Option<DateTime<Utc>>,
  pub erased_by:                Option<String>,
}

impl VisitorEntry {
  /// Build a freshly signed-in entry from a validated [`NewVisit`].
  pub(crate) fn signed_in(
    entry_id: Uuid,
    visit: NewVisit,
    badge: Badge,
    at: DateTime<Utc>,
    by: &str,
  ) -> Self {
    Self {
      entry_id,
      name: visit.name,
      id_number: visit.id_number,
      area_of_visit: visit.area_of_visit,
      company: visit.company,
      purpose: visit.purpose,
      id_card_held_by_facility: true,
      badge_issued: true,
      badge_number: Some(badge.number),
      badge_serial: badge.serial,
      state: VisitorState::SignedIn,
      signed_in_at: at,
      signed_in_by: by.to_owned(),
      signed_out_at: None,
      signed_out_by: None,
      erased_at: None,
      erased_by: None,
    }
  }

  pub fn is_signed_in(&self) -> bool { self.state == VisitorState::SignedIn }

  pub fn is_erased(&self) -> bool { self.erased_at.is_some() }

  /// The custody invariant: card held, badge issued and badge number present
  /// exactly when the entry is signed in.
  pub fn custody_consistent(&self) -> bool {
    let active = self.is_signed_in();
    self.id_card_held_by_facility == active
      && self.badge_issued == active
      && self.badge_number.is_some() == active
  }

  fn invalid(&self, detail: impl Into<String>) -> Error {
    Error::InvalidTransition {
      resource: ResourceKind::Visitor,
      id:       self.entry_id,
      detail:   detail.into(),
    }
  }

  /// The most recent timestamp recorded on the entry.
  pub fn last_recorded_at(&self) -> DateTime<Utc> {
    [self.signed_out_at, self.erased_at]
      .into_iter()
      .flatten()
      .fold(self.signed_in_at, Ord::max)
  }

  /// `SignedIn → SignedOut`. Returns the reclaimed badge number.
  ///
  /// `at` is clamped so the entry's timestamps never run backwards.
  pub(crate) fn sign_out(&mut self, at: DateTime<Utc>, by: &str) -> Result<String> {
    if !self.is_signed_in() {
      return Err(self.invalid("visitor is already signed out"));
    }
    let at = at.max(self.last_recorded_at());
    let badge = self.badge_number.take().unwrap_or_default();
    self.id_card_held_by_facility = false;
    self.badge_issued = false;
    self.state = VisitorState::SignedOut;
    self.signed_out_at = Some(at);
    self.signed_out_by = Some(by.to_owned());
    Ok(badge)
  }

  /// Correct visit metadata. Only open visits may be edited.
  pub(crate) fn apply(&mut self, update: &VisitorUpdate) -> Result<()> {
    if !self.is_signed_in() {
      return Err(self.invalid("cannot edit a signed-out visit"));
    }
    let area = update
      .area_of_visit
      .as_deref()
      .map(|a| required("area of visit", a))
      .transpose()?;
    let purpose = update
      .purpose
      .as_deref()
      .map(|p| required("purpose", p))
      .transpose()?;

    if let Some(area) = area {
      self.area_of_visit = area;
    }
    if let Some(purpose) = purpose {
      self.purpose = purpose;
    }
    if update.company.is_some() {
      self.company = optional(update.company.as_deref());
    }
    Ok(())
  }

  /// Soft-delete. A visitor whose card is still held cannot be erased.
  pub(crate) fn erase(&mut self, at: DateTime<Utc>, by: &str) -> Result<()> {
    if self.is_signed_in() {
      return Err(self.invalid("sign the visitor out before erasing the entry"));
    }
    self.erased_at = Some(at.max(self.last_recorded_at()));
    self.erased_by = Some(by.to_owned());
    Ok(())
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::VisitorCheckpoint::sign_in`], as read off the ID card
/// and the visitor form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVisit {
  pub name:          String,
  pub id_number:     String,
  pub area_of_visit: String,
  #[serde(default)]
  pub company:       Option<String>,
  pub purpose:       String,
}

impl NewVisit {
  pub fn new(
    name: impl Into<String>,
    id_number: impl Into<String>,
    area_of_visit: impl Into<String>,
    purpose: impl Into<String>,
  ) -> Self {
    Self {
      name:          name.into(),
      id_number:     id_number.into(),
      area_of_visit: area_of_visit.into(),
      company:       None,
      purpose:       purpose.into(),
    }
  }

  pub fn with_company(mut self, company: impl Into<String>) -> Self {
    self.company = Some(company.into());
    self
  }

  /// Trim every field and reject blanks. ID numbers are compared
  /// case-insensitively, so they are stored upper-cased.
  pub(crate) fn validated(self) -> Result<Self> {
    Ok(Self {
      name:          required("name", &self.name)?,
      id_number:     required("ID number", &self.id_number)?.to_uppercase(),
      area_of_visit: required("area of visit", &self.area_of_visit)?,
      company:       optional(self.company.as_deref()),
      purpose:       required("purpose", &self.purpose)?,
    })
  }
}

/// Field corrections accepted by [`crate::VisitorCheckpoint::update`]. Absent
/// fields are left alone; a blank `company` clears it. Naming any other
/// field, such as the immutable `name` or `id_number`, fails to deserialize.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VisitorUpdate {
  pub area_of_visit: Option<String>,
  pub company:       Option<String>,
  pub purpose:       Option<String>,
}

/// Parameters for [`crate::store::LogbookStore::list_visitors`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VisitorFilter {
  pub state:     Option<VisitorState>,
  pub id_number: Option<String>,
}

impl VisitorFilter {
  /// Bring `id_number` into the stored form, so stores can compare exactly.
  pub fn normalized(&self) -> Self {
    Self {
      state:     self.state,
      id_number: normalized_key(self.id_number.as_deref()),
    }
  }

  /// Whether `entry` passes the filter. Erased entries never do.
  ///
  /// Expects a [`normalized`](Self::normalized) filter.
  pub fn matches(&self, entry: &VisitorEntry) -> bool {
    !entry.is_erased()
      && self.state.is_none_or(|s| s == entry.state)
      && self.id_number.as_deref().is_none_or(|n| n == entry.id_number)
  }
}
