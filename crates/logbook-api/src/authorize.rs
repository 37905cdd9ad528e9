//! Handler for `GET /authorize`.
//!
//! Lets a front end ask whether the calling operator may perform an
//! operation before offering it, e.g.
//! `/authorize?operation=advance_state&resource=cargo`.

use axum::{Json, extract::Query};
use logbook_core::{Operation, ResourceKind, guard::{self, Decision}};
use serde::Deserialize;

use crate::{error::ApiError, operator::Operator};

#[derive(Debug, Deserialize)]
pub struct AuthorizeParams {
  pub operation: Operation,
  pub resource:  ResourceKind,
}

/// `GET /authorize?operation=<op>&resource=<kind>`
pub async fn handler(
  Operator(ctx): Operator,
  Query(params): Query<AuthorizeParams>,
) -> Result<Json<Decision>, ApiError> {
  let decision = guard::authorize(ctx.role, params.operation, params.resource)?;
  Ok(Json(decision))
}
