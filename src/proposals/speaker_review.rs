use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::proposals::firm_offer::{
    FirmOffer, STATUS_SPEAKER_CONFIRMED, STATUS_SPEAKER_DECLINED,
};
use crate::shared::error::ApiError;
use crate::shared::schema::firm_offers;
use crate::shared::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub decision: String,
    pub notes: Option<String>,
}

/// Decide the confirmation transition. Pending offers accept `confirmed` or
/// `declined`; anything after the latch is a conflict. Returns the flag value
/// and the status label to persist.
fn confirmation_transition(
    current: Option<bool>,
    decision: &str,
) -> Result<(bool, &'static str), ApiError> {
    if current.is_some() {
        return Err(ApiError::Conflict(
            "Speaker response already recorded".to_string(),
        ));
    }
    match decision {
        "confirmed" => Ok((true, STATUS_SPEAKER_CONFIRMED)),
        "declined" => Ok((false, STATUS_SPEAKER_DECLINED)),
        other => Err(ApiError::BadRequest(format!("invalid decision: {other}"))),
    }
}

fn find_by_token(conn: &mut PgConnection, token: &str) -> Result<FirmOffer, ApiError> {
    firm_offers::table
        .filter(firm_offers::speaker_access_token.eq(token))
        .first(conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Review link not found".to_string()))
}

/// Speaker-facing view, reached only through the capability token. The first
/// load stamps `speaker_viewed_at`; the confirm transition never touches it.
/// Once the offer is latched the payload carries `read_only: true` and the
/// caller renders a summary instead of the action form.
pub async fn view_firm_offer_by_token(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut conn = state.conn.get()?;
    let offer = find_by_token(&mut conn, &token)?;

    if offer.speaker_viewed_at.is_none() {
        diesel::update(firm_offers::table.filter(firm_offers::id.eq(offer.id)))
            .set(firm_offers::speaker_viewed_at.eq(Some(Utc::now())))
            .execute(&mut conn)?;
    }

    let current: FirmOffer = firm_offers::table
        .filter(firm_offers::id.eq(offer.id))
        .first(&mut conn)?;

    let read_only = current.speaker_confirmed.is_some();
    Ok(Json(json!({ "offer": current, "read_only": read_only })))
}

pub async fn confirm_firm_offer_by_token(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Json(req): Json<ConfirmRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut conn = state.conn.get()?;
    let offer = find_by_token(&mut conn, &token)?;

    let (confirmed, status_label) =
        confirmation_transition(offer.speaker_confirmed, &req.decision)?;
    let now = Utc::now();

    diesel::update(firm_offers::table.filter(firm_offers::id.eq(offer.id)))
        .set((
            firm_offers::speaker_confirmed.eq(Some(confirmed)),
            firm_offers::status.eq(status_label),
            firm_offers::speaker_notes.eq(req.notes),
            firm_offers::speaker_responded_at.eq(Some(now)),
            firm_offers::updated_at.eq(now),
        ))
        .execute(&mut conn)?;

    log::info!("firm offer {} marked {status_label} by speaker", offer.id);
    Ok(Json(json!({
        "message": "Response recorded",
        "status": status_label,
        "read_only": true,
    })))
}

pub fn configure_speaker_review_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/speaker-review/:token", get(view_firm_offer_by_token))
        .route(
            "/speaker-review/:token/confirm",
            post(confirm_firm_offer_by_token),
        )
}

#[cfg(test)]
mod tests {
    use super::confirmation_transition;
    use crate::shared::error::ApiError;

    #[test]
    fn pending_offers_accept_both_decisions() {
        assert_eq!(
            confirmation_transition(None, "confirmed").unwrap(),
            (true, "speaker_confirmed")
        );
        assert_eq!(
            confirmation_transition(None, "declined").unwrap(),
            (false, "speaker_declined")
        );
    }

    #[test]
    fn latched_offers_reject_every_transition() {
        for current in [Some(true), Some(false)] {
            for decision in ["confirmed", "declined"] {
                assert!(matches!(
                    confirmation_transition(current, decision),
                    Err(ApiError::Conflict(_))
                ));
            }
        }
    }

    #[test]
    fn unknown_decisions_are_validation_errors() {
        assert!(matches!(
            confirmation_transition(None, "maybe"),
            Err(ApiError::BadRequest(_))
        ));
    }
}
