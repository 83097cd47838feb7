//! API routes for the fleet server.

mod routes;

use std::sync::Arc;

use axum::Router;

use crate::persistence::Database;
use crate::state::AppState;

/// Shared handler context: live state plus the write-through database.
#[derive(Clone)]
pub struct ApiContext {
    pub state: Arc<AppState>,
    pub db: Database,
}

pub fn routes() -> Router<ApiContext> {
    routes::create_router()
}
