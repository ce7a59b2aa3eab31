use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::shared::error::ApiError;
use crate::shared::state::AppState;

/// Request-scoped admin guard for the /api surface. The bearer token is
/// resolved exactly once per request, before any handler runs; the public
/// capability-token routes live on a separate router and never pass through
/// here.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let presented = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match presented {
        Some(token) if token == state.config.admin.api_token => next.run(req).await,
        _ => {
            let request_id = Uuid::new_v4();
            log::warn!(
                "rejected unauthenticated {} {} (request {request_id})",
                req.method(),
                req.uri().path()
            );
            ApiError::Unauthorized.into_response()
        }
    }
}
