use anyhow::Context;
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::deals::{conversion, Deal};
use crate::shared::error::ApiError;
use crate::shared::schema::{deal_events, projects};
use crate::shared::state::AppState;

pub const EVENT_DEAL_WON: &str = "deal_won";

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_PROCESSED: &str = "processed";
pub const STATUS_FAILED: &str = "failed";

const MAX_ATTEMPTS: i32 = 5;
const SWEEP_INTERVAL_SECS: u64 = 60;
// Rows younger than this are still owned by the request path.
const SWEEP_MIN_AGE_SECS: i64 = 30;

/// Durable record of a deal's transition into `won`, written in the same
/// transaction as the deal update. The payload is the deal snapshot at the
/// moment of the transition; synthesis reads it, not the live row.
#[derive(Debug, Clone, Serialize, Deserialize, Queryable)]
pub struct DealEvent {
    pub id: i32,
    pub deal_id: i32,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub status: String,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = deal_events)]
pub struct NewDealEvent {
    pub deal_id: i32,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub status: String,
    pub attempts: i32,
    pub created_at: DateTime<Utc>,
}

pub fn record_won_event(
    conn: &mut PgConnection,
    deal: &Deal,
) -> Result<i32, diesel::result::Error> {
    let event = NewDealEvent {
        deal_id: deal.id,
        event_type: EVENT_DEAL_WON.to_string(),
        payload: serde_json::to_value(deal).unwrap_or(serde_json::Value::Null),
        status: STATUS_PENDING.to_string(),
        attempts: 0,
        created_at: Utc::now(),
    };

    diesel::insert_into(deal_events::table)
        .values(&event)
        .returning(deal_events::id)
        .get_result(conn)
}

/// Attempt project synthesis for a recorded event. Never propagates: a
/// failure is logged and written back to the event row, and the sweeper
/// retries it later.
pub fn process_event(conn: &mut PgConnection, event_id: i32) {
    if let Err(err) = try_process(conn, event_id) {
        log::error!("deal event {event_id}: project synthesis failed: {err:#}");
        let _ = diesel::update(deal_events::table.filter(deal_events::id.eq(event_id)))
            .set((
                deal_events::status.eq(STATUS_FAILED),
                deal_events::attempts.eq(deal_events::attempts + 1),
                deal_events::last_error.eq(Some(format!("{err:#}"))),
            ))
            .execute(conn);
    }
}

fn try_process(conn: &mut PgConnection, event_id: i32) -> anyhow::Result<()> {
    let event: DealEvent = deal_events::table
        .filter(deal_events::id.eq(event_id))
        .first(conn)
        .context("event row not found")?;

    if event.status == STATUS_PROCESSED {
        return Ok(());
    }

    let deal: Deal = serde_json::from_value(event.payload.clone())
        .context("event payload is not a deal snapshot")?;

    let project = conversion::project_from_deal(&deal);
    diesel::insert_into(projects::table)
        .values(&project)
        .execute(conn)
        .context("project insert failed")?;

    diesel::update(deal_events::table.filter(deal_events::id.eq(event_id)))
        .set((
            deal_events::status.eq(STATUS_PROCESSED),
            deal_events::attempts.eq(deal_events::attempts + 1),
            deal_events::processed_at.eq(Some(Utc::now())),
        ))
        .execute(conn)?;

    log::info!(
        "deal {} won: created project \"{}\"",
        deal.id,
        project.project_name
    );
    Ok(())
}

/// Background reconciliation for events whose synchronous processing failed
/// (or never ran because the process died between commit and synthesis).
pub fn spawn_sweeper(state: Arc<AppState>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(SWEEP_INTERVAL_SECS));
        loop {
            ticker.tick().await;
            if let Err(err) = sweep_once(&state) {
                log::warn!("deal event sweep failed: {err:#}");
            }
        }
    });
}

pub fn sweep_once(state: &AppState) -> anyhow::Result<()> {
    let mut conn = state.conn.get()?;
    let cutoff = Utc::now() - chrono::Duration::seconds(SWEEP_MIN_AGE_SECS);

    let stale: Vec<i32> = deal_events::table
        .filter(deal_events::status.ne(STATUS_PROCESSED))
        .filter(deal_events::attempts.lt(MAX_ATTEMPTS))
        .filter(deal_events::created_at.lt(cutoff))
        .select(deal_events::id)
        .load(&mut conn)?;

    if stale.is_empty() {
        return Ok(());
    }

    log::info!("retrying {} unprocessed deal event(s)", stale.len());
    for event_id in stale {
        process_event(&mut conn, event_id);
    }
    Ok(())
}

/// Conversion audit trail for one deal, newest first.
pub async fn list_deal_events(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<DealEvent>>, ApiError> {
    let deal_id: i32 = id
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid deal id: {id}")))?;
    let mut conn = state.conn.get()?;

    let events: Vec<DealEvent> = deal_events::table
        .filter(deal_events::deal_id.eq(deal_id))
        .order(deal_events::created_at.desc())
        .load(&mut conn)?;

    Ok(Json(events))
}
