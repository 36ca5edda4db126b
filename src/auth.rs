//! Session-token authentication: token generation, validation with
//! sliding expiration, invalidation, and the session cookie helpers.
//!
//! The bearer token only ever lives in the cookie; the store keeps a
//! SHA-256 derived id, so a copied database cannot mint valid cookies.

use crate::config::CONFIG;
use crate::db::models::{Session, SessionWithUser};
use crate::db::sqlite::GuildhallStorage;
use crate::error::GuildhallError;
use axum_extra::extract::cookie::{Cookie, SameSite};
use base64::Engine;
use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "auth-session";

const SESSION_LIFETIME_DAYS: i64 = 30;
const RENEWAL_WINDOW_DAYS: i64 = 15;

/// Fresh random token material for a new session cookie.
pub fn generate_session_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Stored session id derived from the bearer token.
pub fn session_id_from_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(digest)
}

/// Persist a new session for `user_id`, keyed by `token`'s derived id.
pub async fn create_session(
    store: &GuildhallStorage,
    token: &str,
    user_id: &str,
) -> Result<Session, GuildhallError> {
    let session = Session {
        id: session_id_from_token(token),
        user_id: user_id.to_string(),
        expires_at: Utc::now() + Duration::days(SESSION_LIFETIME_DAYS),
    };
    store.insert_session(&session).await?;
    Ok(session)
}

/// Resolve `token` to its session and user.
///
/// Expired sessions are deleted on sight and yield `None`. A session
/// inside the renewal window gets a fresh full lifetime.
pub async fn validate_session_token(
    store: &GuildhallStorage,
    token: &str,
) -> Result<Option<SessionWithUser>, GuildhallError> {
    let session_id = session_id_from_token(token);
    let Some(mut auth) = store.session_with_user(&session_id).await? else {
        return Ok(None);
    };

    let now = Utc::now();
    if now >= auth.session.expires_at {
        store.delete_session(&session_id).await?;
        return Ok(None);
    }

    if now >= auth.session.expires_at - Duration::days(RENEWAL_WINDOW_DAYS) {
        auth.session.expires_at = now + Duration::days(SESSION_LIFETIME_DAYS);
        store
            .update_session_expiry(&session_id, auth.session.expires_at)
            .await?;
    }

    Ok(Some(auth))
}

/// Remove a session, ending it for every holder of its cookie.
pub async fn invalidate_session(
    store: &GuildhallStorage,
    session_id: &str,
) -> Result<(), GuildhallError> {
    store.delete_session(session_id).await
}

/// Session cookie carrying `token`, scoped to the whole site.
pub fn session_token_cookie(token: String, max_age: time::Duration) -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE.to_string(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(!CONFIG.insecure_cookie)
        .max_age(max_age)
        .build()
}

/// Expired twin of the session cookie; sending it clears the browser's copy.
pub fn delete_session_token_cookie() -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE.to_string(), String::new()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(!CONFIG.insecure_cookie)
        .max_age(time::Duration::ZERO)
        .build()
}
