use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::shared::error::ApiError;
use crate::shared::schema::{deals, firm_offers, proposals};
use crate::shared::state::AppState;
use crate::shared::utils::generate_access_token;

pub const STATUS_PENDING_CONFIRMATION: &str = "pending_confirmation";
pub const STATUS_SPEAKER_CONFIRMED: &str = "speaker_confirmed";
pub const STATUS_SPEAKER_DECLINED: &str = "speaker_declined";

/// Detailed confirmation packet for the booked speaker, 1:1 with a proposal.
/// Carries its own capability token, separately scoped from the proposal's
/// client-facing one. Once `speaker_confirmed` is non-null the confirmation
/// is latched: no state-changing write may succeed.
#[derive(Debug, Clone, Serialize, Deserialize, Queryable)]
pub struct FirmOffer {
    pub id: i32,
    pub proposal_id: i32,
    pub status: String,
    pub event_overview: serde_json::Value,
    pub speaker_program: serde_json::Value,
    pub financial_details: serde_json::Value,
    pub confirmation: serde_json::Value,
    pub speaker_access_token: String,
    pub speaker_viewed_at: Option<DateTime<Utc>>,
    pub speaker_confirmed: Option<bool>,
    pub speaker_notes: Option<String>,
    pub speaker_responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = firm_offers)]
pub struct NewFirmOffer {
    pub proposal_id: i32,
    pub status: String,
    pub event_overview: serde_json::Value,
    pub speaker_program: serde_json::Value,
    pub financial_details: serde_json::Value,
    pub confirmation: serde_json::Value,
    pub speaker_access_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFirmOfferRequest {
    pub event_overview: Option<serde_json::Value>,
    pub speaker_program: Option<serde_json::Value>,
    pub financial_details: Option<serde_json::Value>,
    pub confirmation: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFirmOfferRequest {
    pub status: Option<String>,
    pub speaker_confirmed: Option<bool>,
    pub speaker_notes: Option<String>,
    pub event_overview: Option<serde_json::Value>,
    pub speaker_program: Option<serde_json::Value>,
    pub financial_details: Option<serde_json::Value>,
    pub confirmation: Option<serde_json::Value>,
}

pub async fn create_firm_offer(
    State(state): State<Arc<AppState>>,
    Path(proposal_id): Path<i32>,
    Json(req): Json<CreateFirmOfferRequest>,
) -> Result<Json<FirmOffer>, ApiError> {
    let mut conn = state.conn.get()?;

    let deal_id: Option<i32> = proposals::table
        .filter(proposals::id.eq(proposal_id))
        .select(proposals::deal_id)
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Proposal not found".to_string()))?;

    let existing: Option<i32> = firm_offers::table
        .filter(firm_offers::proposal_id.eq(proposal_id))
        .select(firm_offers::id)
        .first(&mut conn)
        .optional()?;
    if existing.is_some() {
        return Err(ApiError::Conflict(
            "A firm offer already exists for this proposal".to_string(),
        ));
    }

    let now = Utc::now();
    let offer = NewFirmOffer {
        proposal_id,
        status: STATUS_PENDING_CONFIRMATION.to_string(),
        event_overview: req.event_overview.unwrap_or_else(|| json!({})),
        speaker_program: req.speaker_program.unwrap_or_else(|| json!({})),
        financial_details: req.financial_details.unwrap_or_else(|| json!({})),
        confirmation: req.confirmation.unwrap_or_else(|| json!({})),
        speaker_access_token: generate_access_token(),
        created_at: now,
        updated_at: now,
    };

    let created: FirmOffer = diesel::insert_into(firm_offers::table)
        .values(&offer)
        .get_result(&mut conn)?;

    // Back-link the originating deal, when the proposal has one.
    if let Some(deal_id) = deal_id {
        diesel::update(deals::table.filter(deals::id.eq(deal_id)))
            .set(deals::firm_offer_id.eq(Some(created.id)))
            .execute(&mut conn)?;
    }

    Ok(Json(created))
}

pub async fn get_firm_offer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<FirmOffer>, ApiError> {
    let mut conn = state.conn.get()?;

    let offer: FirmOffer = firm_offers::table
        .filter(firm_offers::id.eq(id))
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Firm offer not found".to_string()))?;

    Ok(Json(offer))
}

/// Admin-side PATCH. Section edits and confirmation writes are only accepted
/// while the offer is still pending; after the speaker has responded every
/// write is a conflict.
pub async fn update_firm_offer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateFirmOfferRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut conn = state.conn.get()?;

    let offer: FirmOffer = firm_offers::table
        .filter(firm_offers::id.eq(id))
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Firm offer not found".to_string()))?;

    if offer.speaker_confirmed.is_some() {
        return Err(ApiError::Conflict(
            "Speaker response already recorded; the offer is read-only".to_string(),
        ));
    }

    let now = Utc::now();

    diesel::update(firm_offers::table.filter(firm_offers::id.eq(id)))
        .set(firm_offers::updated_at.eq(now))
        .execute(&mut conn)?;

    if let Some(status) = req.status {
        diesel::update(firm_offers::table.filter(firm_offers::id.eq(id)))
            .set(firm_offers::status.eq(status))
            .execute(&mut conn)?;
    }

    if let Some(confirmed) = req.speaker_confirmed {
        diesel::update(firm_offers::table.filter(firm_offers::id.eq(id)))
            .set((
                firm_offers::speaker_confirmed.eq(Some(confirmed)),
                firm_offers::speaker_responded_at.eq(Some(now)),
            ))
            .execute(&mut conn)?;
    }

    if let Some(speaker_notes) = req.speaker_notes {
        diesel::update(firm_offers::table.filter(firm_offers::id.eq(id)))
            .set(firm_offers::speaker_notes.eq(speaker_notes))
            .execute(&mut conn)?;
    }

    if let Some(event_overview) = req.event_overview {
        diesel::update(firm_offers::table.filter(firm_offers::id.eq(id)))
            .set(firm_offers::event_overview.eq(event_overview))
            .execute(&mut conn)?;
    }

    if let Some(speaker_program) = req.speaker_program {
        diesel::update(firm_offers::table.filter(firm_offers::id.eq(id)))
            .set(firm_offers::speaker_program.eq(speaker_program))
            .execute(&mut conn)?;
    }

    if let Some(financial_details) = req.financial_details {
        diesel::update(firm_offers::table.filter(firm_offers::id.eq(id)))
            .set(firm_offers::financial_details.eq(financial_details))
            .execute(&mut conn)?;
    }

    if let Some(confirmation) = req.confirmation {
        diesel::update(firm_offers::table.filter(firm_offers::id.eq(id)))
            .set(firm_offers::confirmation.eq(confirmation))
            .execute(&mut conn)?;
    }

    Ok(Json(json!({ "message": "Firm offer updated" })))
}

pub async fn delete_firm_offer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut conn = state.conn.get()?;

    let affected =
        diesel::delete(firm_offers::table.filter(firm_offers::id.eq(id))).execute(&mut conn)?;
    if affected == 0 {
        return Err(ApiError::NotFound("Firm offer not found".to_string()));
    }

    Ok(Json(json!({ "message": "Firm offer deleted" })))
}
