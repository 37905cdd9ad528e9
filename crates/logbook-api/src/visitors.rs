//! Handlers for `/visitors` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/visitors` | Optional `?state=signed_in\|signed_out`, `?id_number=` |
//! | `POST`   | `/visitors` | Sign in. Body: [`NewVisit`]; returns 201 + entry |
//! | `GET`    | `/visitors/:id` | 404 if unknown or erased |
//! | `PATCH`  | `/visitors/:id` | Body: [`VisitorUpdate`]; open visits only |
//! | `DELETE` | `/visitors/:id` | Admin soft delete of a closed visit |
//! | `POST`   | `/visitors/:id/sign-out` | Returns the closed entry |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use logbook_core::{
  store::LogbookStore,
  visitor::{NewVisit, VisitorEntry, VisitorFilter, VisitorUpdate},
};
use uuid::Uuid;

use crate::{Logbook, error::ApiError, operator::Operator};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /visitors[?state=<state>][&id_number=<id>]`
pub async fn list<S: LogbookStore>(
  State(logbook): State<Arc<Logbook<S>>>,
  Operator(ctx): Operator,
  Query(filter): Query<VisitorFilter>,
) -> Result<Json<Vec<VisitorEntry>>, ApiError> {
  let entries = logbook.checkpoint.list(&ctx, &filter).await?;
  Ok(Json(entries))
}

// ─── Sign in ──────────────────────────────────────────────────────────────────

/// `POST /visitors`
pub async fn sign_in<S: LogbookStore>(
  State(logbook): State<Arc<Logbook<S>>>,
  Operator(ctx): Operator,
  Json(body): Json<NewVisit>,
) -> Result<impl IntoResponse, ApiError> {
  let entry = logbook.checkpoint.sign_in(&ctx, body).await?;
  Ok((StatusCode::CREATED, Json(entry)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /visitors/:id`
pub async fn get_one<S: LogbookStore>(
  State(logbook): State<Arc<Logbook<S>>>,
  Operator(ctx): Operator,
  Path(id): Path<Uuid>,
) -> Result<Json<VisitorEntry>, ApiError> {
  Ok(Json(logbook.checkpoint.get(&ctx, id).await?))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /visitors/:id`
pub async fn update<S: LogbookStore>(
  State(logbook): State<Arc<Logbook<S>>>,
  Operator(ctx): Operator,
  Path(id): Path<Uuid>,
  Json(body): Json<VisitorUpdate>,
) -> Result<Json<VisitorEntry>, ApiError> {
  Ok(Json(logbook.checkpoint.update(&ctx, id, body).await?))
}

// ─── Erase ────────────────────────────────────────────────────────────────────

/// `DELETE /visitors/:id`
pub async fn erase<S: LogbookStore>(
  State(logbook): State<Arc<Logbook<S>>>,
  Operator(ctx): Operator,
  Path(id): Path<Uuid>,
) -> Result<Json<VisitorEntry>, ApiError> {
  Ok(Json(logbook.checkpoint.erase(&ctx, id).await?))
}

// ─── Sign out ─────────────────────────────────────────────────────────────────

/// `POST /visitors/:id/sign-out`
pub async fn sign_out<S: LogbookStore>(
  State(logbook): State<Arc<Logbook<S>>>,
  Operator(ctx): Operator,
  Path(id): Path<Uuid>,
) -> Result<Json<VisitorEntry>, ApiError> {
  Ok(Json(logbook.checkpoint.sign_out(&ctx, id).await?))
}
