//! Integration tests for `SqliteStore` against an in-memory database.

use std::{collections::BTreeSet, sync::Arc};

use chrono::{DateTime, Duration, TimeZone as _, Utc};
use logbook_core::{
  Error as CoreError, OperatorContext, Role, VisitorCheckpoint,
  badge::BadgeIssuer,
  cargo::{
    CargoCategory, CargoFilter, CargoRecord, CargoState, CargoTransition,
    DeliveryParty,
  },
  store::LogbookStore,
  visitor::{NewVisit, VisitorEntry, VisitorFilter, VisitorState},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn at(minute: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2026, 5, 4, 9, minute, 0).unwrap()
}

fn visitor(id_number: &str, serial: u64, signed_in_at: DateTime<Utc>) -> VisitorEntry {
  VisitorEntry {
    entry_id: Uuid::new_v4(),
    name: "Jane Doe".into(),
    id_number: id_number.into(),
    area_of_visit: "Warehouse 2".into(),
    company: Some("Acme".into()),
    purpose: "Delivery".into(),
    id_card_held_by_facility: true,
    badge_issued: true,
    badge_number: Some(format!("V-{serial:05}")),
    badge_serial: serial,
    state: VisitorState::SignedIn,
    signed_in_at,
    signed_in_by: "clerk".into(),
    signed_out_at: None,
    signed_out_by: None,
    erased_at: None,
    erased_by: None,
  }
}

fn signed_out(mut e: VisitorEntry, when: DateTime<Utc>) -> VisitorEntry {
  e.state = VisitorState::SignedOut;
  e.id_card_held_by_facility = false;
  e.badge_issued = false;
  e.badge_number = None;
  e.signed_out_at = Some(when);
  e.signed_out_by = Some("gate".into());
  e
}

fn cargo(awb: &str, category: CargoCategory, received_at: DateTime<Utc>) -> CargoRecord {
  CargoRecord {
    cargo_id: Uuid::new_v4(),
    category,
    seal_number: None,
    description: "Machine parts".into(),
    awb_number: awb.into(),
    uld_numbers: BTreeSet::from(["AKE1001".to_string()]),
    delivered_by: DeliveryParty {
      driver_name:          "Omar Said".into(),
      company:              "Coast Movers".into(),
      vehicle_registration: "KCA 555B".into(),
    },
    state: CargoState::Received,
    received_at,
    received_by: "clerk".into(),
    history: Vec::new(),
    ulds_frozen_at: None,
    erased_at: None,
    erased_by: None,
  }
}

// ─── Visitors ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn save_and_load_visitor() {
  let s = store().await;
  let entry = visitor("A123", 1, at(0));

  s.save_visitor(entry.clone()).await.unwrap();
  let loaded = s.load_visitor(entry.entry_id).await.unwrap().unwrap();
  assert_eq!(loaded, entry);
}

#[tokio::test]
async fn load_missing_visitor_returns_none() {
  let s = store().await;
  assert!(s.load_visitor(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn save_replaces_existing_row() {
  let s = store().await;
  let entry = visitor("A123", 1, at(0));
  s.save_visitor(entry.clone()).await.unwrap();

  let out = signed_out(entry.clone(), at(30));
  s.save_visitor(out.clone()).await.unwrap();

  let loaded = s.load_visitor(entry.entry_id).await.unwrap().unwrap();
  assert_eq!(loaded, out);
  assert!(loaded.custody_consistent());
  assert_eq!(s.list_visitors(&VisitorFilter::default()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn find_active_ignores_signed_out() {
  let s = store().await;
  let old = signed_out(visitor("A123", 1, at(0)), at(5));
  s.save_visitor(old).await.unwrap();
  assert!(s.find_active_by_id_number("A123").await.unwrap().is_none());

  let open = visitor("A123", 2, at(10));
  s.save_visitor(open.clone()).await.unwrap();
  let found = s.find_active_by_id_number("A123").await.unwrap().unwrap();
  assert_eq!(found.entry_id, open.entry_id);
}

#[tokio::test]
async fn second_open_visit_for_card_violates_index() {
  let s = store().await;
  s.save_visitor(visitor("A123", 1, at(0))).await.unwrap();
  let err = s.save_visitor(visitor("A123", 2, at(1))).await.unwrap_err();
  assert!(matches!(err, crate::Error::Database(_)));
}

#[tokio::test]
async fn list_visitors_filters_and_orders() {
  let s = store().await;
  let a = signed_out(visitor("A1", 1, at(0)), at(3));
  let b = visitor("B2", 2, at(5));
  let mut c = signed_out(visitor("C3", 3, at(10)), at(12));
  c.erased_at = Some(at(20));
  c.erased_by = Some("root".into());
  for e in [&a, &b, &c] {
    s.save_visitor(e.clone()).await.unwrap();
  }

  let all = s.list_visitors(&VisitorFilter::default()).await.unwrap();
  let ids: Vec<_> = all.iter().map(|e| e.id_number.as_str()).collect();
  assert_eq!(ids, ["B2", "A1"]);

  let open = s
    .list_visitors(&VisitorFilter {
      state: Some(VisitorState::SignedIn),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(open.len(), 1);
  assert_eq!(open[0].entry_id, b.entry_id);

  let by_card = s
    .list_visitors(
      &VisitorFilter { id_number: Some("a1".into()), ..Default::default() }.normalized(),
    )
    .await
    .unwrap();
  assert_eq!(by_card.len(), 1);
  assert_eq!(by_card[0].entry_id, a.entry_id);
}

#[tokio::test]
async fn max_badge_serial_survives_sign_out() {
  let s = store().await;
  assert_eq!(s.max_badge_serial().await.unwrap(), None);

  s.save_visitor(signed_out(visitor("A1", 41, at(0)), at(1)))
    .await
    .unwrap();
  s.save_visitor(visitor("B2", 7, at(2))).await.unwrap();
  assert_eq!(s.max_badge_serial().await.unwrap(), Some(41));
}

#[tokio::test]
async fn oversized_badge_serial_is_rejected() {
  let s = store().await;
  let entry = visitor("A123", u64::MAX, at(0));
  let err = s.save_visitor(entry.clone()).await.unwrap_err();
  assert!(matches!(err, crate::Error::BadgeSerial(_)));
  assert!(s.load_visitor(entry.entry_id).await.unwrap().is_none());
  assert_eq!(s.max_badge_serial().await.unwrap(), None);
}

// ─── Cargo ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn cargo_roundtrip_with_history() {
  let s = store().await;
  let mut rec = cargo("AWB-001", CargoCategory::Known, at(0));
  s.save_cargo(rec.clone()).await.unwrap();

  rec.state = CargoState::Cleared;
  rec.seal_number = Some("S-42".into());
  rec.uld_numbers.insert("PMC2002".into());
  rec.history.push(CargoTransition {
    from: CargoState::Received,
    to:   CargoState::Cleared,
    at:   at(15),
    by:   "clerk".into(),
  });
  s.save_cargo(rec.clone()).await.unwrap();

  let loaded = s.load_cargo(rec.cargo_id).await.unwrap().unwrap();
  assert_eq!(loaded, rec);
}

#[tokio::test]
async fn list_cargo_filters() {
  let s = store().await;
  let known = cargo("AWB-1", CargoCategory::Known, at(0));
  let mut unknown = cargo("AWB-2", CargoCategory::Unknown, at(1));
  unknown.uld_numbers.clear();
  unknown.state = CargoState::Cleared;
  let mut erased = cargo("AWB-3", CargoCategory::Known, at(2));
  erased.erased_at = Some(at(3));
  for r in [&known, &unknown, &erased] {
    s.save_cargo(r.clone()).await.unwrap();
  }

  let all = s.list_cargo(&CargoFilter::default()).await.unwrap();
  assert_eq!(all.len(), 2);
  assert_eq!(all[0].awb_number, "AWB-2");

  let cleared = s
    .list_cargo(&CargoFilter { state: Some(CargoState::Cleared), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(cleared.len(), 1);
  assert!(cleared[0].uld_numbers.is_empty());

  let by_awb = s
    .list_cargo(
      &CargoFilter { awb_number: Some("awb-1".into()), ..Default::default() }.normalized(),
    )
    .await
    .unwrap();
  assert_eq!(by_awb.len(), 1);
  assert_eq!(by_awb[0].cargo_id, known.cargo_id);

  let known_only = s
    .list_cargo(&CargoFilter {
      category: Some(CargoCategory::Known),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(known_only.len(), 1);
}

// ─── Through the checkpoint ──────────────────────────────────────────────────

#[tokio::test]
async fn checkpoint_over_sqlite_resumes_badges() {
  let s = Arc::new(store().await);
  let ctx = OperatorContext::new("clerk", Role::DataEntry);

  let cp = VisitorCheckpoint::new(s.clone(), Arc::new(BadgeIssuer::new()));
  let first = cp
    .sign_in(&ctx, NewVisit::new("Jane Doe", "A123", "Warehouse 2", "Delivery"))
    .await
    .unwrap();
  cp.sign_out(&ctx, first.entry_id).await.unwrap();

  let err = cp.sign_out(&ctx, first.entry_id).await.unwrap_err();
  assert!(matches!(err, CoreError::InvalidTransition { .. }));

  // A restarted process picks the counter up where it left off.
  let resumed = s.max_badge_serial().await.unwrap().unwrap_or(0);
  let cp = VisitorCheckpoint::new(s.clone(), Arc::new(BadgeIssuer::resume_after(resumed)));
  let second = cp
    .sign_in(&ctx, NewVisit::new("John Roe", "B456", "Lobby", "Interview"))
    .await
    .unwrap();
  assert_eq!(second.badge_number.as_deref(), Some("V-00002"));

  let dup = cp
    .sign_in(&ctx, NewVisit::new("John Roe", "b456", "Lobby", "Interview"))
    .await
    .unwrap_err();
  assert!(matches!(dup, CoreError::DuplicateActiveVisit { entry_id, .. } if entry_id == second.entry_id));

  let stored = s.load_visitor(first.entry_id).await.unwrap().unwrap();
  assert!(stored.signed_out_at.unwrap() - stored.signed_in_at >= Duration::zero());
}

#[tokio::test]
async fn checkpoint_over_sqlite_matches_non_ascii_ids() {
  let s = Arc::new(store().await);
  let ctx = OperatorContext::new("clerk", Role::DataEntry);
  let cp = VisitorCheckpoint::new(s.clone(), Arc::new(BadgeIssuer::new()));

  let entry = cp
    .sign_in(&ctx, NewVisit::new("Jörg Ähm", "ä12", "Lobby", "Meeting"))
    .await
    .unwrap();
  assert_eq!(entry.id_number, "Ä12");

  let listed = cp
    .list(&ctx, &VisitorFilter { id_number: Some("ä12".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].entry_id, entry.entry_id);

  let dup = cp
    .sign_in(&ctx, NewVisit::new("Jörg Ähm", "ä12", "Dock", "Pickup"))
    .await
    .unwrap_err();
  assert!(matches!(dup, CoreError::DuplicateActiveVisit { .. }));
}
