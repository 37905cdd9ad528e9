//! Handlers for `/cargo` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/cargo` | Optional `?category=`, `?state=`, `?awb_number=` |
//! | `POST`   | `/cargo` | Receive. Body: [`NewCargo`]; returns 201 + record |
//! | `GET`    | `/cargo/:id` | 404 if unknown or erased |
//! | `PATCH`  | `/cargo/:id` | Body: [`CargoUpdate`]; only while received |
//! | `DELETE` | `/cargo/:id` | Admin soft delete |
//! | `POST`   | `/cargo/:id/advance` | Body: `{"target":"cleared"}` |
//! | `POST`   | `/cargo/:id/ulds` | Body: `{"uld_numbers":["AKE1234"]}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use logbook_core::{
  cargo::{CargoFilter, CargoRecord, CargoState, CargoUpdate, NewCargo},
  store::LogbookStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{Logbook, error::ApiError, operator::Operator};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /cargo[?category=<c>][&state=<s>][&awb_number=<awb>]`
pub async fn list<S: LogbookStore>(
  State(logbook): State<Arc<Logbook<S>>>,
  Operator(ctx): Operator,
  Query(filter): Query<CargoFilter>,
) -> Result<Json<Vec<CargoRecord>>, ApiError> {
  Ok(Json(logbook.ledger.list(&ctx, &filter).await?))
}

// ─── Receive ──────────────────────────────────────────────────────────────────

/// `POST /cargo`
pub async fn receive<S: LogbookStore>(
  State(logbook): State<Arc<Logbook<S>>>,
  Operator(ctx): Operator,
  Json(body): Json<NewCargo>,
) -> Result<impl IntoResponse, ApiError> {
  let record = logbook.ledger.receive(&ctx, body).await?;
  Ok((StatusCode::CREATED, Json(record)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /cargo/:id`
pub async fn get_one<S: LogbookStore>(
  State(logbook): State<Arc<Logbook<S>>>,
  Operator(ctx): Operator,
  Path(id): Path<Uuid>,
) -> Result<Json<CargoRecord>, ApiError> {
  Ok(Json(logbook.ledger.get(&ctx, id).await?))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /cargo/:id`
pub async fn update<S: LogbookStore>(
  State(logbook): State<Arc<Logbook<S>>>,
  Operator(ctx): Operator,
  Path(id): Path<Uuid>,
  Json(body): Json<CargoUpdate>,
) -> Result<Json<CargoRecord>, ApiError> {
  Ok(Json(logbook.ledger.update(&ctx, id, body).await?))
}

// ─── Erase ────────────────────────────────────────────────────────────────────

/// `DELETE /cargo/:id`
pub async fn erase<S: LogbookStore>(
  State(logbook): State<Arc<Logbook<S>>>,
  Operator(ctx): Operator,
  Path(id): Path<Uuid>,
) -> Result<Json<CargoRecord>, ApiError> {
  Ok(Json(logbook.ledger.erase(&ctx, id).await?))
}

// ─── Advance ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AdvanceBody {
  pub target: CargoState,
}

/// `POST /cargo/:id/advance` with body `{"target":"cleared"}`
pub async fn advance<S: LogbookStore>(
  State(logbook): State<Arc<Logbook<S>>>,
  Operator(ctx): Operator,
  Path(id): Path<Uuid>,
  Json(body): Json<AdvanceBody>,
) -> Result<Json<CargoRecord>, ApiError> {
  Ok(Json(logbook.ledger.advance(&ctx, id, body.target).await?))
}

// ─── Append ULDs ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UldsBody {
  pub uld_numbers: Vec<String>,
}

/// `POST /cargo/:id/ulds`
pub async fn append_ulds<S: LogbookStore>(
  State(logbook): State<Arc<Logbook<S>>>,
  Operator(ctx): Operator,
  Path(id): Path<Uuid>,
  Json(body): Json<UldsBody>,
) -> Result<Json<CargoRecord>, ApiError> {
  Ok(Json(logbook.ledger.append_ulds(&ctx, id, body.uld_numbers).await?))
}
