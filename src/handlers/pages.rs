use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::db::models::{MemberProfile, PublishedEvent};
use crate::error::GuildhallError;
use crate::router::GuildhallState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingPage {
    pub published_members: Vec<MemberProfile>,
    pub scheduled_events: Vec<PublishedEvent>,
}

#[derive(Debug, Serialize)]
pub struct PlayerPage {
    pub member: MemberProfile,
}

/// GET / -> every published member plus the event schedule, verbatim
/// for the rendering layer.
pub async fn landing(
    State(state): State<GuildhallState>,
) -> Result<Json<LandingPage>, GuildhallError> {
    let published_members = state.storage().published_members().await?;
    let scheduled_events = state.storage().scheduled_events().await?;
    Ok(Json(LandingPage {
        published_members,
        scheduled_events,
    }))
}

/// GET /player/{name} -> one member's profile, or 302 to the not-found
/// page when no member matches.
pub async fn player(
    State(state): State<GuildhallState>,
    Path(name): Path<String>,
) -> Result<Response, GuildhallError> {
    match state.storage().member_by_name(&name).await? {
        Some(member) => Ok(Json(PlayerPage { member }).into_response()),
        None => Ok(found("/404")),
    }
}

/// 302 Found. axum's `Redirect` helpers pin 303/307/308; the site's
/// loaders answer with 302.
pub fn found(location: &'static str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}
