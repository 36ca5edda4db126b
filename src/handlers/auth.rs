use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use tracing::info;

use crate::auth;
use crate::error::GuildhallError;
use crate::handlers::pages::found;
use crate::middleware::session::CurrentSession;
use crate::router::GuildhallState;

/// POST /logout -> 401 without a session; with one, invalidate exactly
/// that session, clear its cookie, and send the browser home.
pub async fn logout(
    State(state): State<GuildhallState>,
    CurrentSession(session): CurrentSession,
    jar: CookieJar,
) -> Result<Response, GuildhallError> {
    let Some(current) = session else {
        return Err(GuildhallError::Unauthorized);
    };

    auth::invalidate_session(state.storage(), &current.session.id).await?;
    let jar = jar.remove(auth::delete_session_token_cookie());

    info!(user = %current.user.username, "session invalidated");
    Ok((jar, found("/")).into_response())
}
