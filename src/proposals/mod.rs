pub mod firm_offer;
pub mod speaker_review;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::shared::error::ApiError;
use crate::shared::schema::proposals;
use crate::shared::state::AppState;
use crate::shared::utils::generate_access_token;

/// Client-facing sales document. The access token is minted at creation and
/// is the sole credential for the public proposal view.
#[derive(Debug, Clone, Serialize, Deserialize, Queryable)]
pub struct Proposal {
    pub id: i32,
    pub deal_id: Option<i32>,
    pub client_name: String,
    pub client_email: String,
    pub event_title: String,
    pub event_date: Option<NaiveDate>,
    pub status: String,
    pub access_token: String,
    pub total_amount: Option<BigDecimal>,
    pub valid_until: Option<NaiveDate>,
    pub client_viewed_at: Option<DateTime<Utc>>,
    pub client_responded_at: Option<DateTime<Utc>>,
    pub client_notes: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = proposals)]
pub struct NewProposal {
    pub deal_id: Option<i32>,
    pub client_name: String,
    pub client_email: String,
    pub event_title: String,
    pub event_date: Option<NaiveDate>,
    pub status: String,
    pub access_token: String,
    pub total_amount: Option<BigDecimal>,
    pub valid_until: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProposalRequest {
    pub deal_id: Option<i32>,
    pub client_name: String,
    pub client_email: String,
    pub event_title: String,
    pub event_date: Option<String>,
    pub total_amount: Option<f64>,
    pub valid_until: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProposalRequest {
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub event_title: Option<String>,
    pub event_date: Option<String>,
    pub status: Option<String>,
    pub total_amount: Option<f64>,
    pub valid_until: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub accepted: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A client may answer a proposal that was sent (or already viewed); every
/// other status is terminal for the client surface.
fn client_response_transition(status: &str, accepted: bool) -> Result<&'static str, ApiError> {
    match status {
        "sent" | "viewed" => Ok(if accepted { "accepted" } else { "rejected" }),
        other => Err(ApiError::Conflict(format!(
            "proposal is {other} and no longer accepts a response"
        ))),
    }
}

pub async fn create_proposal(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProposalRequest>,
) -> Result<Json<Proposal>, ApiError> {
    let mut conn = state.conn.get()?;
    let now = Utc::now();

    let proposal = NewProposal {
        deal_id: req.deal_id,
        client_name: req.client_name,
        client_email: req.client_email,
        event_title: req.event_title,
        event_date: req
            .event_date
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        status: "draft".to_string(),
        access_token: generate_access_token(),
        total_amount: req.total_amount.and_then(|v| BigDecimal::try_from(v).ok()),
        valid_until: req
            .valid_until
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        notes: req.notes,
        created_at: now,
        updated_at: now,
    };

    let created: Proposal = diesel::insert_into(proposals::table)
        .values(&proposal)
        .get_result(&mut conn)?;

    Ok(Json(created))
}

pub async fn list_proposals(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Proposal>>, ApiError> {
    let mut conn = state.conn.get()?;
    let limit = query.limit.unwrap_or(50);
    let offset = query.offset.unwrap_or(0);

    let mut q = proposals::table.into_boxed();

    if let Some(status) = query.status {
        q = q.filter(proposals::status.eq(status));
    }

    if let Some(search) = query.search {
        let pattern = format!("%{search}%");
        q = q.filter(
            proposals::client_name
                .ilike(pattern.clone())
                .or(proposals::event_title.ilike(pattern)),
        );
    }

    let rows: Vec<Proposal> = q
        .order(proposals::created_at.desc())
        .limit(limit)
        .offset(offset)
        .load(&mut conn)?;

    Ok(Json(rows))
}

pub async fn get_proposal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Proposal>, ApiError> {
    let mut conn = state.conn.get()?;

    let proposal: Proposal = proposals::table
        .filter(proposals::id.eq(id))
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Proposal not found".to_string()))?;

    Ok(Json(proposal))
}

pub async fn update_proposal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateProposalRequest>,
) -> Result<Json<Proposal>, ApiError> {
    let mut conn = state.conn.get()?;
    let now = Utc::now();

    let affected = diesel::update(proposals::table.filter(proposals::id.eq(id)))
        .set(proposals::updated_at.eq(now))
        .execute(&mut conn)?;
    if affected == 0 {
        return Err(ApiError::NotFound("Proposal not found".to_string()));
    }

    if let Some(client_name) = req.client_name {
        diesel::update(proposals::table.filter(proposals::id.eq(id)))
            .set(proposals::client_name.eq(client_name))
            .execute(&mut conn)?;
    }

    if let Some(client_email) = req.client_email {
        diesel::update(proposals::table.filter(proposals::id.eq(id)))
            .set(proposals::client_email.eq(client_email))
            .execute(&mut conn)?;
    }

    if let Some(event_title) = req.event_title {
        diesel::update(proposals::table.filter(proposals::id.eq(id)))
            .set(proposals::event_title.eq(event_title))
            .execute(&mut conn)?;
    }

    if let Some(event_date) = req.event_date {
        if let Ok(date) = NaiveDate::parse_from_str(&event_date, "%Y-%m-%d") {
            diesel::update(proposals::table.filter(proposals::id.eq(id)))
                .set(proposals::event_date.eq(Some(date)))
                .execute(&mut conn)?;
        }
    }

    if let Some(status) = req.status {
        diesel::update(proposals::table.filter(proposals::id.eq(id)))
            .set(proposals::status.eq(status))
            .execute(&mut conn)?;
    }

    if let Some(total_amount) = req.total_amount.and_then(|v| BigDecimal::try_from(v).ok()) {
        diesel::update(proposals::table.filter(proposals::id.eq(id)))
            .set(proposals::total_amount.eq(total_amount))
            .execute(&mut conn)?;
    }

    if let Some(valid_until) = req.valid_until {
        if let Ok(date) = NaiveDate::parse_from_str(&valid_until, "%Y-%m-%d") {
            diesel::update(proposals::table.filter(proposals::id.eq(id)))
                .set(proposals::valid_until.eq(Some(date)))
                .execute(&mut conn)?;
        }
    }

    if let Some(notes) = req.notes {
        diesel::update(proposals::table.filter(proposals::id.eq(id)))
            .set(proposals::notes.eq(notes))
            .execute(&mut conn)?;
    }

    get_proposal(State(state), Path(id)).await
}

pub async fn delete_proposal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut conn = state.conn.get()?;

    let affected =
        diesel::delete(proposals::table.filter(proposals::id.eq(id))).execute(&mut conn)?;
    if affected == 0 {
        return Err(ApiError::NotFound("Proposal not found".to_string()));
    }

    Ok(Json(json!({ "message": "Proposal deleted" })))
}

/// Admin action: release a draft to the client. The proposal becomes
/// reachable through its access token once sent.
pub async fn send_proposal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Proposal>, ApiError> {
    let mut conn = state.conn.get()?;

    let proposal: Proposal = proposals::table
        .filter(proposals::id.eq(id))
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Proposal not found".to_string()))?;

    if proposal.status != "draft" && proposal.status != "sent" {
        return Err(ApiError::Conflict(format!(
            "proposal is {} and cannot be sent",
            proposal.status
        )));
    }

    diesel::update(proposals::table.filter(proposals::id.eq(id)))
        .set((
            proposals::status.eq("sent"),
            proposals::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

    get_proposal(State(state), Path(id)).await
}

/// Public capability surface: the token in the path is the authorization.
/// The first load stamps `client_viewed_at` (write-once) and moves a sent
/// proposal to viewed.
pub async fn view_proposal_by_token(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut conn = state.conn.get()?;

    let proposal: Proposal = proposals::table
        .filter(proposals::access_token.eq(&token))
        .filter(proposals::status.ne("draft"))
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Proposal not found".to_string()))?;

    if proposal.client_viewed_at.is_none() {
        diesel::update(proposals::table.filter(proposals::id.eq(proposal.id)))
            .set(proposals::client_viewed_at.eq(Some(Utc::now())))
            .execute(&mut conn)?;
    }

    if proposal.status == "sent" {
        diesel::update(proposals::table.filter(proposals::id.eq(proposal.id)))
            .set(proposals::status.eq("viewed"))
            .execute(&mut conn)?;
    }

    let current: Proposal = proposals::table
        .filter(proposals::id.eq(proposal.id))
        .first(&mut conn)?;

    let read_only = !matches!(current.status.as_str(), "sent" | "viewed");
    Ok(Json(json!({ "proposal": current, "read_only": read_only })))
}

pub async fn respond_to_proposal(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Json(req): Json<RespondRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut conn = state.conn.get()?;

    let proposal: Proposal = proposals::table
        .filter(proposals::access_token.eq(&token))
        .filter(proposals::status.ne("draft"))
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Proposal not found".to_string()))?;

    let next_status = client_response_transition(&proposal.status, req.accepted)?;
    let now = Utc::now();

    diesel::update(proposals::table.filter(proposals::id.eq(proposal.id)))
        .set((
            proposals::status.eq(next_status),
            proposals::client_responded_at.eq(Some(now)),
            proposals::client_notes.eq(req.notes),
            proposals::updated_at.eq(now),
        ))
        .execute(&mut conn)?;

    log::info!("proposal {} marked {next_status} by client", proposal.id);
    Ok(Json(json!({ "message": "Response recorded", "status": next_status })))
}

pub fn configure_proposal_api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/proposals", get(list_proposals).post(create_proposal))
        .route(
            "/api/proposals/:id",
            get(get_proposal)
                .put(update_proposal)
                .delete(delete_proposal),
        )
        .route("/api/proposals/:id/send", post(send_proposal))
        .route(
            "/api/proposals/:id/firm-offer",
            post(firm_offer::create_firm_offer),
        )
        .route(
            "/api/firm-offers/:id",
            get(firm_offer::get_firm_offer)
                .patch(firm_offer::update_firm_offer)
                .delete(firm_offer::delete_firm_offer),
        )
}

pub fn configure_proposal_public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/proposal-view/:token", get(view_proposal_by_token))
        .route("/proposal-view/:token/respond", post(respond_to_proposal))
}

#[cfg(test)]
mod tests {
    use super::client_response_transition;

    #[test]
    fn sent_and_viewed_proposals_accept_a_response() {
        assert_eq!(client_response_transition("sent", true).unwrap(), "accepted");
        assert_eq!(
            client_response_transition("viewed", false).unwrap(),
            "rejected"
        );
    }

    #[test]
    fn terminal_proposals_reject_further_responses() {
        for status in ["accepted", "rejected", "expired", "draft"] {
            assert!(client_response_transition(status, true).is_err());
            assert!(client_response_transition(status, false).is_err());
        }
    }
}
