//! SQL schema for the Rollcall SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS subjects (
    id          TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL,
    name        TEXT NOT NULL,
    short_name  TEXT,
    color       TEXT NOT NULL,
    day_of_week INTEGER NOT NULL CHECK (day_of_week BETWEEN 0 AND 6),
    start_time  TEXT NOT NULL,          -- HH:MM:SS
    end_time    TEXT NOT NULL,          -- HH:MM:SS
    room        TEXT,
    is_extra    INTEGER NOT NULL DEFAULT 0,
    extra_date  TEXT,                   -- YYYY-MM-DD; set iff is_extra
    UNIQUE (id, user_id)
);

-- No UNIQUE (user_id, subject_id, date): the ledger owns that invariant.
CREATE TABLE IF NOT EXISTS attendance_records (
    id         TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL,
    subject_id TEXT NOT NULL,
    date       TEXT NOT NULL,           -- YYYY-MM-DD
    status     TEXT NOT NULL CHECK (status IN ('present', 'absent', 'cancelled')),
    -- A record may only point at a subject of the same user.
    FOREIGN KEY (subject_id, user_id) REFERENCES subjects(id, user_id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS profiles (
    user_id     TEXT PRIMARY KEY,
    full_name   TEXT,
    roll_number TEXT,
    semester    TEXT,
    department  TEXT
);

CREATE INDEX IF NOT EXISTS subjects_user_idx   ON subjects(user_id);
CREATE INDEX IF NOT EXISTS attendance_key_idx  ON attendance_records(user_id, subject_id, date);
CREATE INDEX IF NOT EXISTS attendance_date_idx ON attendance_records(user_id, date);

PRAGMA user_version = 1;
";
