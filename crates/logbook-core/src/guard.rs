//! Role guard: the fixed permission table and a pure lookup over it.
//!
//! Roles are rows in a closed capability table, not a class hierarchy. Adding
//! a role means adding a row to [`PERMISSIONS`].

use serde::Serialize;

use crate::{
  Error, Result,
  role::{Operation, OperatorContext, ResourceKind, Role},
};

use Operation::*;

const ALL: &[Operation] =
  &[Create, Read, SignIn, SignOut, Update, Delete, AdvanceState];

/// One row of the permission table.
struct Grant {
  role:    Role,
  visitor: &'static [Operation],
  cargo:   &'static [Operation],
}

const PERMISSIONS: &[Grant] = &[
  Grant {
    role:    Role::DataEntry,
    visitor: &[Create, SignIn, SignOut, Read, Update],
    cargo:   &[Create, AdvanceState, Read, Update],
  },
  Grant {
    role:    Role::VisitorViewer,
    visitor: &[SignIn, SignOut, Read],
    cargo:   &[],
  },
  Grant {
    role:    Role::CargoViewer,
    visitor: &[],
    cargo:   &[Read],
  },
  Grant {
    role:    Role::Admin,
    visitor: ALL,
    cargo:   ALL,
  },
];

// ─── Decision ────────────────────────────────────────────────────────────────

/// Outcome of [`authorize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
  Allowed,
  Denied(Denial),
}

impl Decision {
  pub fn is_allowed(&self) -> bool { matches!(self, Self::Allowed) }
}

/// Why a request was denied. Carries nothing beyond the triple that was
/// asked about, so a denial never reveals more of the table than the caller
/// already knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Denial {
  pub role:      Role,
  pub operation: Operation,
  pub resource:  ResourceKind,
}

impl From<Denial> for Error {
  fn from(d: Denial) -> Self {
    Error::PermissionDenied {
      role:      d.role,
      operation: d.operation,
      resource:  d.resource,
    }
  }
}

// ─── Lookup ──────────────────────────────────────────────────────────────────

/// The operations `role` may perform on `resource`.
///
/// Fails with [`Error::Configuration`] only if `role` has no row in the
/// table.
pub fn permitted(role: Role, resource: ResourceKind) -> Result<&'static [Operation]> {
  let grant = PERMISSIONS
    .iter()
    .find(|g| g.role == role)
    .ok_or_else(|| {
      Error::Configuration(format!("role {role} has no permission table entry"))
    })?;
  Ok(match resource {
    ResourceKind::Visitor => grant.visitor,
    ResourceKind::Cargo => grant.cargo,
  })
}

/// Decide whether `role` may perform `operation` on `resource`. Pure; touches
/// no shared state.
pub fn authorize(
  role: Role,
  operation: Operation,
  resource: ResourceKind,
) -> Result<Decision> {
  if permitted(role, resource)?.contains(&operation) {
    Ok(Decision::Allowed)
  } else {
    Ok(Decision::Denied(Denial { role, operation, resource }))
  }
}

/// [`authorize`] over names supplied from outside the process, such as a
/// role claim from the auth layer. Unknown names are [`Error::Configuration`].
pub fn authorize_named(role: &str, operation: &str, resource: &str) -> Result<Decision> {
  authorize(
    Role::from_name(role)?,
    Operation::from_name(operation)?,
    ResourceKind::from_name(resource)?,
  )
}

/// Authorize `ctx` or fail with [`Error::PermissionDenied`].
pub fn require(
  ctx: &OperatorContext,
  operation: Operation,
  resource: ResourceKind,
) -> Result<()> {
  match authorize(ctx.role, operation, resource)? {
    Decision::Allowed => Ok(()),
    Decision::Denied(denial) => {
      tracing::warn!(
        operator = %ctx.operator,
        role = %ctx.role,
        %operation,
        %resource,
        "permission denied"
      );
      Err(denial.into())
    }
  }
}
