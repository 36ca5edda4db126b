use crate::db::group::group_one_to_many;
use crate::db::models::{
    MemberProfile, MemberScreenshot, PublishedEvent, PublishedMember, Session, SessionWithUser,
    User,
};
use crate::db::schema::SQLITE_INIT;
use crate::error::GuildhallError;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use uuid::Uuid;

pub type SqlitePool = Pool<Sqlite>;

/// Member columns plus left-joined screenshot columns; one row per
/// (member, screenshot) pair, screenshot columns all NULL when a member
/// has none.
const MEMBER_WITH_SCREENSHOTS: &str = r#"SELECT
    m.id, m.discord_id, m.name, m.created_at, m.updated_at,
    s.id AS screenshot_id, s.url AS screenshot_url, s.member_id AS screenshot_member_id,
    s.created_at AS screenshot_created_at, s.updated_at AS screenshot_updated_at
FROM published_members m
LEFT JOIN member_screenshots s ON s.member_id = m.id"#;

const EVENT_COLUMNS: &str =
    "id, discord_id, title, description, start_time, end_time, created_at, updated_at";

/// The long-lived store handle. Cheap to clone; constructed once at
/// process start and injected into the router state.
#[derive(Clone)]
pub struct GuildhallStorage {
    pool: SqlitePool,
}

impl GuildhallStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open `database_url`, creating the file on first use. Foreign keys
    /// are enforced on every connection; cascades depend on it.
    pub async fn connect(database_url: &str) -> Result<Self, GuildhallError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), GuildhallError> {
        // execute multiple statements safely (SQLite supports multi-commands but sqlx::query doesn't)
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    // ----- members -----

    /// Point lookup by the unique Discord id. No side effects.
    pub async fn member_by_discord_id(
        &self,
        discord_id: &str,
    ) -> Result<Option<PublishedMember>, GuildhallError> {
        let row = sqlx::query(
            "SELECT id, discord_id, name, created_at, updated_at
             FROM published_members WHERE discord_id = ?",
        )
        .bind(discord_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_member).transpose()
    }

    /// Member matching `name`, with its screenshots in insertion order,
    /// or `None` when no row matched.
    ///
    /// `name` carries no UNIQUE constraint. Should two members ever
    /// share one, the first matched row decides the member while every
    /// joined screenshot row is collected under it.
    pub async fn member_by_name(
        &self,
        name: &str,
    ) -> Result<Option<MemberProfile>, GuildhallError> {
        let sql = format!(
            "{MEMBER_WITH_SCREENSHOTS} WHERE m.name = ? ORDER BY m.created_at, s.created_at"
        );
        let rows = sqlx::query(&sql).bind(name).fetch_all(&self.pool).await?;

        let pairs = rows
            .into_iter()
            .map(Self::row_to_member_pair)
            .collect::<Result<Vec<_>, GuildhallError>>()?;
        let Some((member, _)) = pairs.first().cloned() else {
            return Ok(None);
        };
        let screenshots = pairs.into_iter().filter_map(|(_, shot)| shot).collect();

        Ok(Some(MemberProfile {
            member,
            screenshots,
        }))
    }

    /// Every member with its screenshots; members without any appear
    /// with an empty list. Ordered by member creation time, screenshots
    /// by insertion.
    pub async fn published_members(&self) -> Result<Vec<MemberProfile>, GuildhallError> {
        let sql = format!("{MEMBER_WITH_SCREENSHOTS} ORDER BY m.created_at, s.created_at");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let pairs = rows
            .into_iter()
            .map(Self::row_to_member_pair)
            .collect::<Result<Vec<_>, GuildhallError>>()?;

        Ok(group_one_to_many(pairs, |member| member.id.clone())
            .into_iter()
            .map(|(member, screenshots)| MemberProfile {
                member,
                screenshots,
            })
            .collect())
    }

    /// Upsert by unique discord id; an existing member keeps its
    /// surrogate id and `created_at`. Returns the stored row.
    pub async fn upsert_member(
        &self,
        discord_id: &str,
        name: &str,
    ) -> Result<PublishedMember, GuildhallError> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO published_members (id, discord_id, name, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(discord_id) DO UPDATE SET
                name=excluded.name,
                updated_at=excluded.updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(discord_id)
        .bind(name)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query(
            "SELECT id, discord_id, name, created_at, updated_at
             FROM published_members WHERE discord_id = ?",
        )
        .bind(discord_id)
        .fetch_one(&self.pool)
        .await?;
        Self::row_to_member(row)
    }

    /// Attach a screenshot to an existing member.
    pub async fn insert_screenshot(
        &self,
        member_id: &str,
        url: &str,
    ) -> Result<MemberScreenshot, GuildhallError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO member_screenshots (id, url, member_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(url)
        .bind(member_id)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(MemberScreenshot {
            id,
            url: url.to_string(),
            member_id: member_id.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Remove a member; screenshots and event links cascade.
    pub async fn delete_member(&self, member_id: &str) -> Result<(), GuildhallError> {
        sqlx::query("DELETE FROM published_members WHERE id = ?")
            .bind(member_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ----- events -----

    /// All published events, start-time order; an empty table yields an
    /// empty list, never an absent value.
    pub async fn scheduled_events(&self) -> Result<Vec<PublishedEvent>, GuildhallError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM published_events ORDER BY start_time");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_event).collect()
    }

    /// Upsert by unique discord id. Returns the stored row.
    pub async fn upsert_event(
        &self,
        discord_id: &str,
        title: &str,
        description: Option<&str>,
        start_time: DateTime<Utc>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<PublishedEvent, GuildhallError> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO published_events (
                id, discord_id, title, description, start_time, end_time,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(discord_id) DO UPDATE SET
                title=excluded.title,
                description=excluded.description,
                start_time=excluded.start_time,
                end_time=excluded.end_time,
                updated_at=excluded.updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(discord_id)
        .bind(title)
        .bind(description)
        .bind(start_time.to_rfc3339())
        .bind(end_time.map(|t| t.to_rfc3339()))
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        let sql = format!("SELECT {EVENT_COLUMNS} FROM published_events WHERE discord_id = ?");
        let row = sqlx::query(&sql)
            .bind(discord_id)
            .fetch_one(&self.pool)
            .await?;
        Self::row_to_event(row)
    }

    /// Idempotently link a member to an event.
    pub async fn link_member_to_event(
        &self,
        member_id: &str,
        event_id: &str,
    ) -> Result<(), GuildhallError> {
        sqlx::query(
            "INSERT INTO member_events (member_id, event_id) VALUES (?, ?)
             ON CONFLICT(member_id, event_id) DO NOTHING",
        )
        .bind(member_id)
        .bind(event_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Events a member is linked to, start-time order.
    pub async fn events_for_member(
        &self,
        member_id: &str,
    ) -> Result<Vec<PublishedEvent>, GuildhallError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM published_events
             INNER JOIN member_events ON member_events.event_id = published_events.id
             WHERE member_events.member_id = ?
             ORDER BY start_time"
        );
        let rows = sqlx::query(&sql).bind(member_id).fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_event).collect()
    }

    // ----- users and sessions -----

    /// Create an account row. The signup flow itself lives outside this
    /// service; this is its storage boundary.
    pub async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        age: Option<i64>,
    ) -> Result<User, GuildhallError> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            age,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        sqlx::query("INSERT INTO user (id, age, username, password_hash) VALUES (?, ?, ?, ?)")
            .bind(&user.id)
            .bind(user.age)
            .bind(&user.username)
            .bind(&user.password_hash)
            .execute(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn insert_session(&self, session: &Session) -> Result<(), GuildhallError> {
        sqlx::query("INSERT INTO session (id, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(&session.id)
            .bind(&session.user_id)
            .bind(session.expires_at.to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// A session joined with its owning user, or `None` for an unknown id.
    pub async fn session_with_user(
        &self,
        session_id: &str,
    ) -> Result<Option<SessionWithUser>, GuildhallError> {
        let row = sqlx::query(
            r#"SELECT s.id AS session_id, s.expires_at,
                      u.id AS user_id, u.age, u.username, u.password_hash
               FROM session s
               INNER JOIN user u ON u.id = s.user_id
               WHERE s.id = ?"#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_session_with_user).transpose()
    }

    pub async fn update_session_expiry(
        &self,
        session_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), GuildhallError> {
        sqlx::query("UPDATE session SET expires_at = ? WHERE id = ?")
            .bind(expires_at.to_rfc3339())
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<(), GuildhallError> {
        sqlx::query("DELETE FROM session WHERE id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ----- row mapping -----

    fn row_to_member(row: SqliteRow) -> Result<PublishedMember, GuildhallError> {
        Ok(PublishedMember {
            id: row.try_get("id")?,
            discord_id: row.try_get("discord_id")?,
            name: row.try_get("name")?,
            created_at: Self::parse_timestamp(row.try_get("created_at")?)?,
            updated_at: Self::parse_timestamp(row.try_get("updated_at")?)?,
        })
    }

    /// One left-join result row: the member, plus its screenshot when
    /// the right side matched.
    fn row_to_member_pair(
        row: SqliteRow,
    ) -> Result<(PublishedMember, Option<MemberScreenshot>), GuildhallError> {
        let member = PublishedMember {
            id: row.try_get("id")?,
            discord_id: row.try_get("discord_id")?,
            name: row.try_get("name")?,
            created_at: Self::parse_timestamp(row.try_get("created_at")?)?,
            updated_at: Self::parse_timestamp(row.try_get("updated_at")?)?,
        };

        let screenshot_id: Option<String> = row.try_get("screenshot_id")?;
        let screenshot = match screenshot_id {
            Some(id) => Some(MemberScreenshot {
                id,
                url: row.try_get("screenshot_url")?,
                member_id: row.try_get("screenshot_member_id")?,
                created_at: Self::parse_timestamp(row.try_get("screenshot_created_at")?)?,
                updated_at: Self::parse_timestamp(row.try_get("screenshot_updated_at")?)?,
            }),
            None => None,
        };

        Ok((member, screenshot))
    }

    fn row_to_event(row: SqliteRow) -> Result<PublishedEvent, GuildhallError> {
        let end_time: Option<String> = row.try_get("end_time")?;
        Ok(PublishedEvent {
            id: row.try_get("id")?,
            discord_id: row.try_get("discord_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            start_time: Self::parse_timestamp(row.try_get("start_time")?)?,
            end_time: end_time.map(Self::parse_timestamp).transpose()?,
            created_at: Self::parse_timestamp(row.try_get("created_at")?)?,
            updated_at: Self::parse_timestamp(row.try_get("updated_at")?)?,
        })
    }

    fn row_to_session_with_user(row: SqliteRow) -> Result<SessionWithUser, GuildhallError> {
        let user = User {
            id: row.try_get("user_id")?,
            age: row.try_get("age")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
        };
        let session = Session {
            id: row.try_get("session_id")?,
            user_id: user.id.clone(),
            expires_at: Self::parse_timestamp(row.try_get("expires_at")?)?,
        };
        Ok(SessionWithUser { session, user })
    }

    fn parse_timestamp(value: String) -> Result<DateTime<Utc>, GuildhallError> {
        Ok(DateTime::parse_from_rfc3339(&value)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
            .with_timezone(&Utc))
    }
}
