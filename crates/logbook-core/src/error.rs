//! Error types for `logbook-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::role::{Operation, ResourceKind, Role};

#[derive(Debug, Error)]
pub enum Error {
  /// The operator's role does not carry the requested capability. Only the
  /// role, operation and resource kind are reported.
  #[error("{role} is not permitted to {operation} {resource} records")]
  PermissionDenied {
    role:      Role,
    operation: Operation,
    resource:  ResourceKind,
  },

  #[error("{resource} {id} not found")]
  NotFound { resource: ResourceKind, id: Uuid },

  #[error(
    "ID number {id_number} is already signed in as entry {entry_id} \
     (badge {})",
    badge_number.as_deref().unwrap_or("none")
  )]
  DuplicateActiveVisit {
    id_number:    String,
    entry_id:     Uuid,
    badge_number: Option<String>,
  },

  #[error("invalid transition for {resource} {id}: {detail}")]
  InvalidTransition {
    resource: ResourceKind,
    id:       Uuid,
    detail:   String,
  },

  #[error("validation failed: {0}")]
  Validation(String),

  /// A programming-integrity fault: the permission table or an externally
  /// supplied enum name does not line up with the closed enums.
  #[error("configuration error: {0}")]
  Configuration(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error. Used as `.map_err(Error::store)`.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
