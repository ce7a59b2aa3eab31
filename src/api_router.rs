//! Combines the API endpoints from all domain modules into a unified router.
//!
//! Two trees: the admin API (bearer-guarded) and the public capability-token
//! surfaces. They are assembled separately so nothing public can accidentally
//! inherit the guard, and nothing admin can escape it.

use axum::{middleware, routing::get, Json, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::core::middleware::require_admin;
use crate::shared::state::AppState;

/// Admin API routes from all modules. Every route here sits behind the
/// bearer guard added in `build_router`.
pub fn configure_api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(crate::deals::configure_deal_api_routes())
        .merge(crate::projects::configure_project_api_routes())
        .merge(crate::proposals::configure_proposal_api_routes())
        .merge(crate::speakers::configure_speaker_api_routes())
        .merge(crate::vendors::configure_vendor_api_routes())
}

/// Routes reachable without the admin token: the capability-token review
/// surfaces and the health probe.
pub fn configure_public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(crate::proposals::configure_proposal_public_routes())
        .merge(crate::proposals::speaker_review::configure_speaker_review_routes())
        .route("/health", get(health))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let admin = configure_api_routes()
        .layer(middleware::from_fn_with_state(state.clone(), require_admin));

    admin
        .merge(configure_public_routes())
        .layer(cors)
        .with_state(state)
}
