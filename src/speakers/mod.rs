use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::shared::error::ApiError;
use crate::shared::schema::speakers;
use crate::shared::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable)]
pub struct Speaker {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub topics: Vec<String>,
    pub fee_min: Option<BigDecimal>,
    pub fee_max: Option<BigDecimal>,
    pub travels_from: Option<String>,
    pub website: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = speakers)]
pub struct NewSpeaker {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub topics: Vec<String>,
    pub fee_min: Option<BigDecimal>,
    pub fee_max: Option<BigDecimal>,
    pub travels_from: Option<String>,
    pub website: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSpeakerRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub topics: Option<Vec<String>>,
    pub fee_min: Option<f64>,
    pub fee_max: Option<f64>,
    pub travels_from: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSpeakerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub topics: Option<Vec<String>>,
    pub fee_min: Option<f64>,
    pub fee_max: Option<f64>,
    pub travels_from: Option<String>,
    pub website: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub active: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn create_speaker(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSpeakerRequest>,
) -> Result<Json<Speaker>, ApiError> {
    let mut conn = state.conn.get()?;
    let now = Utc::now();

    let speaker = NewSpeaker {
        name: req.name,
        email: req.email,
        phone: req.phone,
        bio: req.bio,
        topics: req.topics.unwrap_or_default(),
        fee_min: req.fee_min.and_then(|v| BigDecimal::try_from(v).ok()),
        fee_max: req.fee_max.and_then(|v| BigDecimal::try_from(v).ok()),
        travels_from: req.travels_from,
        website: req.website,
        active: true,
        created_at: now,
        updated_at: now,
    };

    let created: Speaker = diesel::insert_into(speakers::table)
        .values(&speaker)
        .get_result(&mut conn)?;

    Ok(Json(created))
}

pub async fn list_speakers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Speaker>>, ApiError> {
    let mut conn = state.conn.get()?;
    let limit = query.limit.unwrap_or(50);
    let offset = query.offset.unwrap_or(0);

    let mut q = speakers::table.into_boxed();

    if let Some(active) = query.active {
        q = q.filter(speakers::active.eq(active));
    }

    if let Some(search) = query.search {
        let pattern = format!("%{search}%");
        q = q.filter(
            speakers::name
                .ilike(pattern.clone())
                .or(speakers::email.ilike(pattern)),
        );
    }

    let rows: Vec<Speaker> = q
        .order(speakers::name.asc())
        .limit(limit)
        .offset(offset)
        .load(&mut conn)?;

    Ok(Json(rows))
}

pub async fn get_speaker(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Speaker>, ApiError> {
    let mut conn = state.conn.get()?;

    let speaker: Speaker = speakers::table
        .filter(speakers::id.eq(id))
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Speaker not found".to_string()))?;

    Ok(Json(speaker))
}

pub async fn update_speaker(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateSpeakerRequest>,
) -> Result<Json<Speaker>, ApiError> {
    let mut conn = state.conn.get()?;
    let now = Utc::now();

    let affected = diesel::update(speakers::table.filter(speakers::id.eq(id)))
        .set(speakers::updated_at.eq(now))
        .execute(&mut conn)?;
    if affected == 0 {
        return Err(ApiError::NotFound("Speaker not found".to_string()));
    }

    if let Some(name) = req.name {
        diesel::update(speakers::table.filter(speakers::id.eq(id)))
            .set(speakers::name.eq(name))
            .execute(&mut conn)?;
    }

    if let Some(email) = req.email {
        diesel::update(speakers::table.filter(speakers::id.eq(id)))
            .set(speakers::email.eq(email))
            .execute(&mut conn)?;
    }

    if let Some(phone) = req.phone {
        diesel::update(speakers::table.filter(speakers::id.eq(id)))
            .set(speakers::phone.eq(phone))
            .execute(&mut conn)?;
    }

    if let Some(bio) = req.bio {
        diesel::update(speakers::table.filter(speakers::id.eq(id)))
            .set(speakers::bio.eq(bio))
            .execute(&mut conn)?;
    }

    if let Some(topics) = req.topics {
        diesel::update(speakers::table.filter(speakers::id.eq(id)))
            .set(speakers::topics.eq(topics))
            .execute(&mut conn)?;
    }

    if let Some(fee_min) = req.fee_min.and_then(|v| BigDecimal::try_from(v).ok()) {
        diesel::update(speakers::table.filter(speakers::id.eq(id)))
            .set(speakers::fee_min.eq(fee_min))
            .execute(&mut conn)?;
    }

    if let Some(fee_max) = req.fee_max.and_then(|v| BigDecimal::try_from(v).ok()) {
        diesel::update(speakers::table.filter(speakers::id.eq(id)))
            .set(speakers::fee_max.eq(fee_max))
            .execute(&mut conn)?;
    }

    if let Some(travels_from) = req.travels_from {
        diesel::update(speakers::table.filter(speakers::id.eq(id)))
            .set(speakers::travels_from.eq(travels_from))
            .execute(&mut conn)?;
    }

    if let Some(website) = req.website {
        diesel::update(speakers::table.filter(speakers::id.eq(id)))
            .set(speakers::website.eq(website))
            .execute(&mut conn)?;
    }

    if let Some(active) = req.active {
        diesel::update(speakers::table.filter(speakers::id.eq(id)))
            .set(speakers::active.eq(active))
            .execute(&mut conn)?;
    }

    get_speaker(State(state), Path(id)).await
}

pub async fn delete_speaker(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut conn = state.conn.get()?;

    let affected =
        diesel::delete(speakers::table.filter(speakers::id.eq(id))).execute(&mut conn)?;
    if affected == 0 {
        return Err(ApiError::NotFound("Speaker not found".to_string()));
    }

    Ok(Json(json!({ "message": "Speaker deleted" })))
}

pub fn configure_speaker_api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/speakers", get(list_speakers).post(create_speaker))
        .route(
            "/api/speakers/:id",
            get(get_speaker).put(update_speaker).delete(delete_speaker),
        )
}
