//! Roles, operations and the operator context supplied by the auth layer.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::{Error, Result};

/// The closed set of operator roles. Each role maps to a fixed row in the
/// permission table in [`crate::guard`].
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
  DataEntry,
  VisitorViewer,
  CargoViewer,
  Admin,
}

impl Role {
  /// Parse a role name handed over by the authentication layer.
  ///
  /// An unknown name means the auth layer and this crate disagree about the
  /// role set, so it surfaces as [`Error::Configuration`].
  pub fn from_name(name: &str) -> Result<Self> { parse_name("role", name) }
}

fn parse_name<T: FromStr>(kind: &str, name: &str) -> Result<T> {
  name
    .parse()
    .map_err(|_| Error::Configuration(format!("unrecognized {kind} {name:?}")))
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
  Create,
  Read,
  SignIn,
  SignOut,
  Update,
  Delete,
  AdvanceState,
}

impl Operation {
  pub fn from_name(name: &str) -> Result<Self> { parse_name("operation", name) }
}

/// The kind of record an operation targets.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResourceKind {
  Visitor,
  Cargo,
}

impl ResourceKind {
  pub fn from_name(name: &str) -> Result<Self> { parse_name("resource kind", name) }
}

/// The already-authenticated caller of every checkpoint and ledger operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorContext {
  /// Login name, stamped onto the records this operator touches.
  pub operator: String,
  pub role:     Role,
}

impl OperatorContext {
  pub fn new(operator: impl Into<String>, role: Role) -> Self {
    Self { operator: operator.into(), role }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn role_names_roundtrip() {
    assert_eq!(Role::from_name("data_entry").unwrap(), Role::DataEntry);
    assert_eq!(Role::from_name("cargo_viewer").unwrap(), Role::CargoViewer);
    assert_eq!(Role::Admin.as_ref(), "admin");
  }

  #[test]
  fn unknown_role_is_configuration_error() {
    let err = Role::from_name("superuser").unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
  }

  #[test]
  fn operation_and_resource_names() {
    assert_eq!(Operation::from_name("advance_state").unwrap(), Operation::AdvanceState);
    assert_eq!(ResourceKind::from_name("cargo").unwrap(), ResourceKind::Cargo);
    assert!(matches!(Operation::from_name("launch"), Err(Error::Configuration(_))));
    assert!(matches!(ResourceKind::from_name("truck"), Err(Error::Configuration(_))));
  }
}
