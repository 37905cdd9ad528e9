//! JSON REST API for the checkpoint logbook.
//!
//! Exposes an axum [`Router`] backed by any [`LogbookStore`]. Every request
//! carries the operator's identity in the `x-operator` and `x-operator-role`
//! headers, set by the authenticating proxy in front of this service. TLS
//! and authentication themselves are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", logbook_api::api_router(logbook.clone()))
//! ```

pub mod authorize;
pub mod cargo;
pub mod error;
pub mod operator;
pub mod visitors;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, post},
};
use logbook_core::{CargoLedger, VisitorCheckpoint, store::LogbookStore};
use serde_json::{Value, json};

pub use error::ApiError;
pub use operator::Operator;


/// The two record keepers served by the API, sharing one store.
pub struct Logbook<S> {
  pub checkpoint: VisitorCheckpoint<S>,
  pub ledger:     CargoLedger<S>,
}

impl<S: LogbookStore> Logbook<S> {
  pub fn new(checkpoint: VisitorCheckpoint<S>, ledger: CargoLedger<S>) -> Self {
    Self { checkpoint, ledger }
  }
}

/// Build a fully-materialised API router for `logbook`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(logbook: Arc<Logbook<S>>) -> Router<()>
where
  S: LogbookStore + 'static,
{
  Router::new()
    .route("/health", get(health))
    .route("/authorize", get(authorize::handler))
    // Visitors
    .route(
      "/visitors",
      get(visitors::list::<S>).post(visitors::sign_in::<S>),
    )
    .route(
      "/visitors/{id}",
      get(visitors::get_one::<S>)
        .patch(visitors::update::<S>)
        .delete(visitors::erase::<S>),
    )
    .route("/visitors/{id}/sign-out", post(visitors::sign_out::<S>))
    // Cargo
    .route("/cargo", get(cargo::list::<S>).post(cargo::receive::<S>))
    .route(
      "/cargo/{id}",
      get(cargo::get_one::<S>)
        .patch(cargo::update::<S>)
        .delete(cargo::erase::<S>),
    )
    .route("/cargo/{id}/advance", post(cargo::advance::<S>))
    .route("/cargo/{id}/ulds", post(cargo::append_ulds::<S>))
    .with_state(logbook)
}

/// `GET /health`
async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }
