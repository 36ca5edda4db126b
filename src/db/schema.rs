//! SQL DDL for initializing the membership store.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema with:
/// - surrogate TEXT (uuid) primary keys throughout
/// - `discord_id` UNIQUE on members and events
/// - screenshots and event links cascade when their owner is removed
/// - timestamps stored as RFC3339 TEXT
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS user (
    id TEXT PRIMARY KEY,
    age INTEGER NULL,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS session (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES user(id),
    expires_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS published_members (
    id TEXT PRIMARY KEY,
    discord_id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS member_screenshots (
    id TEXT PRIMARY KEY,
    url TEXT NOT NULL,
    member_id TEXT NOT NULL REFERENCES published_members(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS published_events (
    id TEXT PRIMARY KEY,
    discord_id TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    description TEXT NULL,
    start_time TEXT NOT NULL,
    end_time TEXT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS member_events (
    member_id TEXT NOT NULL REFERENCES published_members(id) ON DELETE CASCADE,
    event_id TEXT NOT NULL REFERENCES published_events(id) ON DELETE CASCADE,
    PRIMARY KEY (member_id, event_id)
);

CREATE INDEX IF NOT EXISTS idx_member_screenshots_member_id ON member_screenshots(member_id);
CREATE INDEX IF NOT EXISTS idx_session_user_id ON session(user_id);
"#;
