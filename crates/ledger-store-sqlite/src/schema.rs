//! SQL schema for the ledger SQLite store.
//!
//! Executed on every connection startup. Every statement is
//! `CREATE ... IF NOT EXISTS`, so running it against an initialised store
//! changes nothing. Tables are never dropped or altered here.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS phases (
    id          TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    status      TEXT NOT NULL DEFAULT 'Pending',  -- free-form
    description TEXT NOT NULL DEFAULT '',
    started_at  TEXT NOT NULL,                     -- RFC 3339 UTC; store-assigned
    ended_at    TEXT,
    conclusion  TEXT
);

-- Everything below is append-only and refers to phases(id) without a
-- foreign key: orphaned phase ids are accepted.
CREATE TABLE IF NOT EXISTS execution_logs (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    phase_id    TEXT NOT NULL,
    recorded_at TEXT NOT NULL,
    action      TEXT NOT NULL,
    outcome     TEXT NOT NULL
);

-- Ordered artifact list of one execution log entry.
CREATE TABLE IF NOT EXISTS log_artifacts (
    entry_id INTEGER NOT NULL REFERENCES execution_logs(id),
    position INTEGER NOT NULL,
    artifact TEXT NOT NULL,
    PRIMARY KEY (entry_id, position)
);

CREATE TABLE IF NOT EXISTS objectives (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    phase_id TEXT NOT NULL,
    text     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS findings (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    phase_id TEXT NOT NULL,
    text     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS next_steps (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    phase_id TEXT NOT NULL,
    text     TEXT NOT NULL
);

-- One value per (phase, key); replaced on write.
CREATE TABLE IF NOT EXISTS phase_metrics (
    phase_id TEXT NOT NULL,
    key      TEXT NOT NULL,
    value    TEXT NOT NULL,
    PRIMARY KEY (phase_id, key)
);

CREATE TABLE IF NOT EXISTS usage_examples (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    phase_id    TEXT NOT NULL,
    title       TEXT NOT NULL,
    code        TEXT NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS plans (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    phase_id    TEXT NOT NULL,
    step        TEXT NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS lessons (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    phase_id    TEXT NOT NULL,
    text        TEXT NOT NULL,
    recorded_at TEXT NOT NULL
);

-- Upserted by path.
CREATE TABLE IF NOT EXISTS inventory (
    path        TEXT PRIMARY KEY,
    description TEXT NOT NULL,
    category    TEXT NOT NULL DEFAULT 'Uncategorized',
    status      TEXT NOT NULL DEFAULT 'Active',
    usage       TEXT
);

-- One row per key ('mission' | 'architecture'); replaced on write.
CREATE TABLE IF NOT EXISTS overview (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS faqs (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    question TEXT NOT NULL,
    answer   TEXT NOT NULL,
    phase_id TEXT                                  -- NULL = global
);
";
