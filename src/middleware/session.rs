use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;

use crate::auth;
use crate::db::models::SessionWithUser;
use crate::error::GuildhallError;
use crate::router::GuildhallState;

/// The request's authenticated session, if any.
///
/// Absence is data rather than a rejection; handlers decide between a
/// 401, a redirect, or anonymous rendering. Store failures during
/// validation surface as the usual 500 response.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Option<SessionWithUser>);

impl FromRequestParts<GuildhallState> for CurrentSession {
    type Rejection = GuildhallError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &GuildhallState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(token) = jar.get(auth::SESSION_COOKIE).map(|c| c.value().to_owned()) else {
            return Ok(Self(None));
        };

        let session = auth::validate_session_token(state.storage(), &token).await?;
        Ok(Self(session))
    }
}
