//! SQL schema for the registry's SQLite store.
//!
//! Executed at every connection startup; `PRAGMA user_version` records the
//! schema revision for future migrations.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per CRS definition. Rows are inserted once, at load time, and
-- never updated or deleted.
CREATE TABLE IF NOT EXISTS wkts (
    id              TEXT PRIMARY KEY,            -- 'IAU:<version>:<code>'
    version         INTEGER NOT NULL CHECK (version > 2014),
    code            INTEGER NOT NULL,
    solar_body      TEXT NOT NULL,
    datum_name      TEXT NOT NULL DEFAULT '',
    ellipsoid_name  TEXT NOT NULL DEFAULT '',
    projection_name TEXT NOT NULL DEFAULT '',
    wkt             TEXT NOT NULL,
    CHECK (id = 'IAU:' || version || ':' || code)
);

CREATE INDEX IF NOT EXISTS wkts_version_idx    ON wkts(version);
CREATE INDEX IF NOT EXISTS wkts_solar_body_idx ON wkts(lower(solar_body));

-- Completeness sentinel, written in the same transaction as the rows.
CREATE TABLE IF NOT EXISTS catalog_meta (
    singleton      INTEGER PRIMARY KEY CHECK (singleton = 1),
    dataset_digest TEXT NOT NULL,
    record_count   INTEGER NOT NULL,
    loaded_at      TEXT NOT NULL      -- RFC 3339 UTC
);

PRAGMA user_version = 1;
";
