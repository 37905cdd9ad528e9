//! HTTP server wiring for the checkpoint logbook.
//!
//! Loads [`ServerConfig`], resumes the badge counter from the store and
//! serves [`logbook_api::api_router`] behind a request-tracing layer.

use std::{path::Path, sync::Arc};

use axum::Router;
use logbook_api::{Logbook, api_router};
use logbook_core::{
  CargoLedger, VisitorCheckpoint,
  badge::{BadgeIssuer, DEFAULT_PREFIX},
  store::LogbookStore,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `LOGBOOK_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:         String,
  pub port:         u16,
  pub store_path:   std::path::PathBuf,
  /// Printed in front of every badge serial, e.g. `V-00042`.
  pub badge_prefix: String,
}

/// Layer the optional TOML file at `path` under the environment.
pub fn load_config(path: &Path) -> Result<ServerConfig, config::ConfigError> {
  config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 8080)?
    .set_default("store_path", "logbook.db")?
    .set_default("badge_prefix", DEFAULT_PREFIX)?
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("LOGBOOK"))
    .build()?
    .try_deserialize()
}

// ─── Application ──────────────────────────────────────────────────────────────

/// Build the checkpoint and ledger over `store`, continuing badge numbering
/// after the highest serial already persisted.
pub async fn open_logbook<S: LogbookStore>(
  store: Arc<S>,
  config: &ServerConfig,
) -> Result<Logbook<S>, S::Error> {
  let last = store.max_badge_serial().await?.unwrap_or(0);
  tracing::info!(last_serial = last, "resuming badge numbering");

  let badges =
    Arc::new(BadgeIssuer::resume_after(last).with_prefix(config.badge_prefix.clone()));
  Ok(Logbook::new(
    VisitorCheckpoint::new(store.clone(), badges),
    CargoLedger::new(store),
  ))
}

/// The full application router.
pub fn router<S: LogbookStore + 'static>(logbook: Arc<Logbook<S>>) -> Router {
  Router::new()
    .merge(api_router(logbook))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use logbook_core::{OperatorContext, Role, visitor::NewVisit};
  use logbook_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  fn config() -> ServerConfig {
    ServerConfig {
      host:         "127.0.0.1".to_string(),
      port:         8080,
      store_path:   PathBuf::from(":memory:"),
      badge_prefix: "GATE-".to_string(),
    }
  }

  #[tokio::test]
  async fn badge_numbering_resumes_from_store() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let ctx = OperatorContext::new("clerk", Role::DataEntry);

    let first = open_logbook(store.clone(), &config()).await.unwrap();
    let a = first
      .checkpoint
      .sign_in(&ctx, NewVisit::new("Jane Doe", "A123", "Warehouse 2", "Delivery"))
      .await
      .unwrap();
    assert_eq!(a.badge_number.as_deref(), Some("GATE-00001"));

    // Simulated restart over the same database.
    let second = open_logbook(store, &config()).await.unwrap();
    let b = second
      .checkpoint
      .sign_in(&ctx, NewVisit::new("John Roe", "B456", "Lobby", "Interview"))
      .await
      .unwrap();
    assert_eq!(b.badge_number.as_deref(), Some("GATE-00002"));
  }

  #[tokio::test]
  async fn router_serves_health() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let logbook = open_logbook(store, &config()).await.unwrap();
    let resp = router(Arc::new(logbook))
      .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[test]
  fn config_defaults_apply_without_file() {
    let cfg = load_config(Path::new("/nonexistent/logbook.toml")).unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.badge_prefix, DEFAULT_PREFIX);
  }
}
