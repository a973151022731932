//! SQL schema for the Rollbook SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS students (
    id              INTEGER PRIMARY KEY,   -- application-assigned
    document_number TEXT NOT NULL,
    document_type   TEXT NOT NULL,
    name            TEXT NOT NULL,
    surname         TEXT NOT NULL,
    student_code    TEXT NOT NULL UNIQUE,
    email           TEXT NOT NULL,
    state           INTEGER NOT NULL DEFAULT 1,
    UNIQUE (document_type, document_number)
);

CREATE TABLE IF NOT EXISTS subjects (
    id              INTEGER PRIMARY KEY,   -- application-assigned
    name            TEXT NOT NULL,
    code            TEXT NOT NULL UNIQUE,
    credits         INTEGER NOT NULL,
    slots           INTEGER NOT NULL,
    available_slots INTEGER NOT NULL,
    status          INTEGER NOT NULL DEFAULT 1,
    CHECK (available_slots >= 0 AND available_slots <= slots)
);

-- Registrations hold plain id references; the referential checks live in
-- the service layer, not in the schema.
CREATE TABLE IF NOT EXISTS registrations (
    id_student    INTEGER NOT NULL,
    id_subject    INTEGER NOT NULL,
    date_register TEXT NOT NULL,           -- ISO 8601 UTC
    PRIMARY KEY (id_student, id_subject)
);

CREATE INDEX IF NOT EXISTS registrations_subject_idx ON registrations(id_subject);

PRAGMA user_version = 1;
";
