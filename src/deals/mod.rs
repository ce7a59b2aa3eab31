pub mod conversion;
pub mod outbox;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::shared::error::ApiError;
use crate::shared::schema::deals;
use crate::shared::state::AppState;

pub const STATUS_WON: &str = "won";

/// Sales-pipeline record for a prospective speaking engagement. Status
/// transitions are unconstrained in storage; the update handler only
/// special-cases the transition into `won`.
#[derive(Debug, Clone, Serialize, Deserialize, Queryable)]
pub struct Deal {
    pub id: i32,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub company: Option<String>,
    pub event_title: String,
    pub event_date: Option<NaiveDate>,
    pub event_location: Option<String>,
    pub event_type: Option<String>,
    pub attendee_count: Option<i32>,
    pub deal_value: Option<BigDecimal>,
    pub status: String,
    pub priority: String,
    pub notes: Option<String>,
    pub firm_offer_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = deals)]
pub struct NewDeal {
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub company: Option<String>,
    pub event_title: String,
    pub event_date: Option<NaiveDate>,
    pub event_location: Option<String>,
    pub event_type: Option<String>,
    pub attendee_count: Option<i32>,
    pub deal_value: Option<BigDecimal>,
    pub status: String,
    pub priority: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDealRequest {
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub company: Option<String>,
    pub event_title: String,
    pub event_date: Option<String>,
    pub event_location: Option<String>,
    pub event_type: Option<String>,
    pub attendee_count: Option<i32>,
    pub deal_value: Option<f64>,
    pub priority: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDealRequest {
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub company: Option<String>,
    pub event_title: Option<String>,
    pub event_date: Option<String>,
    pub event_location: Option<String>,
    pub event_type: Option<String>,
    pub attendee_count: Option<i32>,
    pub deal_value: Option<f64>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub notes: Option<String>,
    pub firm_offer_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn parse_deal_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid deal id: {raw}")))
}

/// Synthesis fires only on the edge into `won`; won -> won never re-fires.
fn won_transition_fired(original_status: &str, updated_status: &str) -> bool {
    original_status != STATUS_WON && updated_status == STATUS_WON
}

pub async fn create_deal(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateDealRequest>,
) -> Result<Json<Deal>, ApiError> {
    let mut conn = state.conn.get()?;
    let now = Utc::now();

    let event_date = req
        .event_date
        .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok());

    let deal = NewDeal {
        client_name: req.client_name,
        client_email: req.client_email,
        client_phone: req.client_phone,
        company: req.company,
        event_title: req.event_title,
        event_date,
        event_location: req.event_location,
        event_type: req.event_type,
        attendee_count: req.attendee_count,
        deal_value: req.deal_value.and_then(|v| BigDecimal::try_from(v).ok()),
        status: "lead".to_string(),
        priority: req.priority.unwrap_or_else(|| "medium".to_string()),
        notes: req.notes,
        created_at: now,
        updated_at: now,
    };

    let created: Deal = diesel::insert_into(deals::table)
        .values(&deal)
        .get_result(&mut conn)?;

    Ok(Json(created))
}

pub async fn list_deals(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Deal>>, ApiError> {
    let mut conn = state.conn.get()?;
    let limit = query.limit.unwrap_or(50);
    let offset = query.offset.unwrap_or(0);

    let mut q = deals::table.into_boxed();

    if let Some(status) = query.status {
        q = q.filter(deals::status.eq(status));
    }

    if let Some(priority) = query.priority {
        q = q.filter(deals::priority.eq(priority));
    }

    if let Some(search) = query.search {
        let pattern = format!("%{search}%");
        q = q.filter(
            deals::client_name
                .ilike(pattern.clone())
                .or(deals::event_title.ilike(pattern.clone()))
                .or(deals::company.ilike(pattern)),
        );
    }

    let rows: Vec<Deal> = q
        .order(deals::created_at.desc())
        .limit(limit)
        .offset(offset)
        .load(&mut conn)?;

    Ok(Json(rows))
}

pub async fn get_deal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Deal>, ApiError> {
    let deal_id = parse_deal_id(&id)?;
    let mut conn = state.conn.get()?;

    let deal: Deal = deals::table
        .filter(deals::id.eq(deal_id))
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Deal not found".to_string()))?;

    Ok(Json(deal))
}

/// Shared by PUT and PATCH. Applies the partial update, then compares the
/// persisted status against the incoming one: a transition into `won` records
/// a durable conversion event in the same transaction as the deal write and
/// processes it once after commit. A synthesis failure is logged and recorded
/// on the event row; the deal update is still reported successful.
pub async fn update_deal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateDealRequest>,
) -> Result<Json<Deal>, ApiError> {
    let deal_id = parse_deal_id(&id)?;
    let mut conn = state.conn.get()?;

    let original: Deal = deals::table
        .filter(deals::id.eq(deal_id))
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Deal not found".to_string()))?;

    let original_status = original.status.clone();

    let (updated, won_event) =
        conn.transaction::<(Deal, Option<i32>), diesel::result::Error, _>(|conn| {
            let now = Utc::now();

            diesel::update(deals::table.filter(deals::id.eq(deal_id)))
                .set(deals::updated_at.eq(now))
                .execute(conn)?;

            if let Some(client_name) = req.client_name {
                diesel::update(deals::table.filter(deals::id.eq(deal_id)))
                    .set(deals::client_name.eq(client_name))
                    .execute(conn)?;
            }

            if let Some(client_email) = req.client_email {
                diesel::update(deals::table.filter(deals::id.eq(deal_id)))
                    .set(deals::client_email.eq(client_email))
                    .execute(conn)?;
            }

            if let Some(client_phone) = req.client_phone {
                diesel::update(deals::table.filter(deals::id.eq(deal_id)))
                    .set(deals::client_phone.eq(client_phone))
                    .execute(conn)?;
            }

            if let Some(company) = req.company {
                diesel::update(deals::table.filter(deals::id.eq(deal_id)))
                    .set(deals::company.eq(company))
                    .execute(conn)?;
            }

            if let Some(event_title) = req.event_title {
                diesel::update(deals::table.filter(deals::id.eq(deal_id)))
                    .set(deals::event_title.eq(event_title))
                    .execute(conn)?;
            }

            if let Some(event_date) = req.event_date {
                if let Ok(date) = NaiveDate::parse_from_str(&event_date, "%Y-%m-%d") {
                    diesel::update(deals::table.filter(deals::id.eq(deal_id)))
                        .set(deals::event_date.eq(Some(date)))
                        .execute(conn)?;
                }
            }

            if let Some(event_location) = req.event_location {
                diesel::update(deals::table.filter(deals::id.eq(deal_id)))
                    .set(deals::event_location.eq(event_location))
                    .execute(conn)?;
            }

            if let Some(event_type) = req.event_type {
                diesel::update(deals::table.filter(deals::id.eq(deal_id)))
                    .set(deals::event_type.eq(event_type))
                    .execute(conn)?;
            }

            if let Some(attendee_count) = req.attendee_count {
                diesel::update(deals::table.filter(deals::id.eq(deal_id)))
                    .set(deals::attendee_count.eq(attendee_count))
                    .execute(conn)?;
            }

            if let Some(deal_value) = req.deal_value.and_then(|v| BigDecimal::try_from(v).ok()) {
                diesel::update(deals::table.filter(deals::id.eq(deal_id)))
                    .set(deals::deal_value.eq(deal_value))
                    .execute(conn)?;
            }

            if let Some(status) = req.status {
                diesel::update(deals::table.filter(deals::id.eq(deal_id)))
                    .set(deals::status.eq(status))
                    .execute(conn)?;
            }

            if let Some(priority) = req.priority {
                diesel::update(deals::table.filter(deals::id.eq(deal_id)))
                    .set(deals::priority.eq(priority))
                    .execute(conn)?;
            }

            if let Some(notes) = req.notes {
                diesel::update(deals::table.filter(deals::id.eq(deal_id)))
                    .set(deals::notes.eq(notes))
                    .execute(conn)?;
            }

            if let Some(firm_offer_id) = req.firm_offer_id {
                diesel::update(deals::table.filter(deals::id.eq(deal_id)))
                    .set(deals::firm_offer_id.eq(firm_offer_id))
                    .execute(conn)?;
            }

            let updated: Deal = deals::table.filter(deals::id.eq(deal_id)).first(conn)?;

            let event_id = if won_transition_fired(&original_status, &updated.status) {
                Some(outbox::record_won_event(conn, &updated)?)
            } else {
                None
            };

            Ok((updated, event_id))
        })?;

    if let Some(event_id) = won_event {
        outbox::process_event(&mut conn, event_id);
    }

    Ok(Json(updated))
}

pub async fn delete_deal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deal_id = parse_deal_id(&id)?;
    let mut conn = state.conn.get()?;

    // No cascade: an associated firm offer outlives its deal.
    let affected =
        diesel::delete(deals::table.filter(deals::id.eq(deal_id))).execute(&mut conn)?;
    if affected == 0 {
        return Err(ApiError::NotFound("Deal not found".to_string()));
    }

    Ok(Json(json!({ "message": "Deal deleted" })))
}

pub fn configure_deal_api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/deals", get(list_deals).post(create_deal))
        .route(
            "/api/deals/:id",
            get(get_deal)
                .put(update_deal)
                .patch(update_deal)
                .delete(delete_deal),
        )
        .route("/api/deals/:id/events", get(outbox::list_deal_events))
}

#[cfg(test)]
mod tests {
    use super::{parse_deal_id, won_transition_fired};

    #[test]
    fn fires_only_on_the_edge_into_won() {
        assert!(won_transition_fired("negotiation", "won"));
        assert!(won_transition_fired("lead", "won"));
        assert!(won_transition_fired("lost", "won"));
        assert!(!won_transition_fired("won", "won"));
        assert!(!won_transition_fired("lead", "qualified"));
        assert!(!won_transition_fired("negotiation", "lost"));
        assert!(!won_transition_fired("won", "negotiation"));
    }

    #[test]
    fn rejects_non_numeric_ids() {
        assert!(parse_deal_id("42").is_ok());
        assert!(parse_deal_id("abc").is_err());
        assert!(parse_deal_id("").is_err());
        assert!(parse_deal_id("4.2").is_err());
    }
}
