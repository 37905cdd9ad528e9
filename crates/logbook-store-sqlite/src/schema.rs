//! SQL schema for the logbook SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per visit. Rows are only ever soft-deleted (erased_at).
CREATE TABLE IF NOT EXISTS visitors (
    entry_id       TEXT PRIMARY KEY,
    name           TEXT NOT NULL,
    id_number      TEXT NOT NULL,
    area_of_visit  TEXT NOT NULL,
    company        TEXT,
    purpose        TEXT NOT NULL,
    id_card_held   INTEGER NOT NULL,
    badge_issued   INTEGER NOT NULL,
    badge_number   TEXT,
    badge_serial   INTEGER NOT NULL,
    state          TEXT NOT NULL,     -- 'signed_in' | 'signed_out'
    signed_in_at   TEXT NOT NULL,     -- RFC 3339 UTC
    signed_in_by   TEXT NOT NULL,
    signed_out_at  TEXT,
    signed_out_by  TEXT,
    erased_at      TEXT,
    erased_by      TEXT,
    CHECK (id_card_held = (state = 'signed_in')),
    CHECK ((badge_number IS NOT NULL) = (state = 'signed_in'))
);

-- At most one open visit per ID card.
CREATE UNIQUE INDEX IF NOT EXISTS visitors_active_card_idx
    ON visitors(id_number) WHERE state = 'signed_in';
CREATE INDEX IF NOT EXISTS visitors_signed_in_idx ON visitors(signed_in_at);

CREATE TABLE IF NOT EXISTS cargo (
    cargo_id             TEXT PRIMARY KEY,
    category             TEXT NOT NULL,   -- 'unknown' | 'known'
    seal_number          TEXT,
    description          TEXT NOT NULL,
    awb_number           TEXT NOT NULL,
    uld_numbers          TEXT NOT NULL DEFAULT '[]',  -- JSON array
    driver_name          TEXT NOT NULL,
    company              TEXT NOT NULL,
    vehicle_registration TEXT NOT NULL,
    state                TEXT NOT NULL,   -- 'received' | 'cleared' | 'dispatched'
    received_at          TEXT NOT NULL,
    received_by          TEXT NOT NULL,
    history              TEXT NOT NULL DEFAULT '[]',  -- JSON array of transitions
    ulds_frozen_at       TEXT,
    erased_at            TEXT,
    erased_by            TEXT
);

CREATE INDEX IF NOT EXISTS cargo_awb_idx      ON cargo(awb_number);
CREATE INDEX IF NOT EXISTS cargo_received_idx ON cargo(received_at);

PRAGMA user_version = 1;
";
