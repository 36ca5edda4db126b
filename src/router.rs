use axum::Router;
use axum::routing::{get, post};

use crate::db::sqlite::GuildhallStorage;
use crate::handlers;

/// Shared router state: the long-lived storage handle, injected once at
/// construction so handlers and tests can substitute their own store.
#[derive(Clone)]
pub struct GuildhallState {
    storage: GuildhallStorage,
}

impl GuildhallState {
    pub fn new(storage: GuildhallStorage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &GuildhallStorage {
        &self.storage
    }
}

pub fn guildhall_router(state: GuildhallState) -> Router {
    Router::new()
        .route("/", get(handlers::pages::landing))
        .route("/player/{name}", get(handlers::pages::player))
        .route("/logout", post(handlers::auth::logout))
        .with_state(state)
}
