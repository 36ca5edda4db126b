//! Database module: models, schema, and query layer for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and aggregates
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `group.rs`: fold from joined rows into nested per-parent groups
//! - `sqlite.rs`: the pooled storage handle and its queries

pub mod group;
pub mod models;
pub mod schema;
pub mod sqlite;

pub use group::group_one_to_many;
pub use models::{
    MemberEvent, MemberProfile, MemberScreenshot, PublishedEvent, PublishedMember, Session,
    SessionWithUser, User,
};
pub use schema::SQLITE_INIT;
pub use sqlite::{GuildhallStorage, SqlitePool};
