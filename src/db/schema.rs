//! Database schema and migrations for SCloud.
//!
//! Migrations are applied sequentially when the database is first opened
//! or upgraded.

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: Accounts keyed by email
    r#"
CREATE TABLE users (
    email           TEXT PRIMARY KEY,
    username        TEXT NOT NULL,
    password_hash   TEXT NOT NULL,           -- Argon2id PHC string
    gender          TEXT,
    date_of_birth   TEXT,                    -- YYYY-MM-DD
    created_at      TEXT NOT NULL,           -- RFC 3339 UTC
    updated_at      TEXT NOT NULL
);
"#,
    // v2: File metadata partitioned by owner
    r#"
CREATE TABLE files (
    owner_id        TEXT NOT NULL,
    file_id         TEXT NOT NULL,           -- UUIDv7, time ordered
    file_name       TEXT NOT NULL,
    file_size       INTEGER NOT NULL,
    content_type    TEXT NOT NULL,
    object_key      TEXT NOT NULL,
    uploaded_at     TEXT NOT NULL,
    PRIMARY KEY (owner_id, file_id)
);
"#,
];
