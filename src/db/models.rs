use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account row backing session authentication. Not serialized into any
/// page payload; `password_hash` never leaves the server.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub age: Option<i64>,
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

/// A session joined with its owning user, as resolved on each request.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionWithUser {
    pub session: Session,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedMember {
    pub id: String,
    pub discord_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberScreenshot {
    pub id: String,
    pub url: String,
    pub member_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedEvent {
    pub id: String,
    pub discord_id: String,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Many-to-many link between a member and an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberEvent {
    pub member_id: String,
    pub event_id: String,
}

/// A member with its screenshots, as rendered on the member pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberProfile {
    pub member: PublishedMember,
    pub screenshots: Vec<MemberScreenshot>,
}
