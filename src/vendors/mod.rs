use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::shared::error::ApiError;
use crate::shared::schema::vendors;
use crate::shared::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable)]
pub struct Vendor {
    pub id: i32,
    pub company_name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub service_category: Option<String>,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = vendors)]
pub struct NewVendor {
    pub company_name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub service_category: Option<String>,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateVendorRequest {
    pub company_name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub service_category: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateVendorRequest {
    pub company_name: Option<String>,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub service_category: Option<String>,
    pub notes: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub service_category: Option<String>,
    pub active: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn create_vendor(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateVendorRequest>,
) -> Result<Json<Vendor>, ApiError> {
    let mut conn = state.conn.get()?;
    let now = Utc::now();

    let vendor = NewVendor {
        company_name: req.company_name,
        contact_name: req.contact_name,
        email: req.email,
        phone: req.phone,
        service_category: req.service_category,
        notes: req.notes,
        active: true,
        created_at: now,
        updated_at: now,
    };

    let created: Vendor = diesel::insert_into(vendors::table)
        .values(&vendor)
        .get_result(&mut conn)?;

    Ok(Json(created))
}

pub async fn list_vendors(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Vendor>>, ApiError> {
    let mut conn = state.conn.get()?;
    let limit = query.limit.unwrap_or(50);
    let offset = query.offset.unwrap_or(0);

    let mut q = vendors::table.into_boxed();

    if let Some(service_category) = query.service_category {
        q = q.filter(vendors::service_category.eq(service_category));
    }

    if let Some(active) = query.active {
        q = q.filter(vendors::active.eq(active));
    }

    if let Some(search) = query.search {
        let pattern = format!("%{search}%");
        q = q.filter(
            vendors::company_name
                .ilike(pattern.clone())
                .or(vendors::contact_name.ilike(pattern)),
        );
    }

    let rows: Vec<Vendor> = q
        .order(vendors::company_name.asc())
        .limit(limit)
        .offset(offset)
        .load(&mut conn)?;

    Ok(Json(rows))
}

pub async fn get_vendor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Vendor>, ApiError> {
    let mut conn = state.conn.get()?;

    let vendor: Vendor = vendors::table
        .filter(vendors::id.eq(id))
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Vendor not found".to_string()))?;

    Ok(Json(vendor))
}

pub async fn update_vendor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateVendorRequest>,
) -> Result<Json<Vendor>, ApiError> {
    let mut conn = state.conn.get()?;
    let now = Utc::now();

    let affected = diesel::update(vendors::table.filter(vendors::id.eq(id)))
        .set(vendors::updated_at.eq(now))
        .execute(&mut conn)?;
    if affected == 0 {
        return Err(ApiError::NotFound("Vendor not found".to_string()));
    }

    if let Some(company_name) = req.company_name {
        diesel::update(vendors::table.filter(vendors::id.eq(id)))
            .set(vendors::company_name.eq(company_name))
            .execute(&mut conn)?;
    }

    if let Some(contact_name) = req.contact_name {
        diesel::update(vendors::table.filter(vendors::id.eq(id)))
            .set(vendors::contact_name.eq(contact_name))
            .execute(&mut conn)?;
    }

    if let Some(email) = req.email {
        diesel::update(vendors::table.filter(vendors::id.eq(id)))
            .set(vendors::email.eq(email))
            .execute(&mut conn)?;
    }

    if let Some(phone) = req.phone {
        diesel::update(vendors::table.filter(vendors::id.eq(id)))
            .set(vendors::phone.eq(phone))
            .execute(&mut conn)?;
    }

    if let Some(service_category) = req.service_category {
        diesel::update(vendors::table.filter(vendors::id.eq(id)))
            .set(vendors::service_category.eq(service_category))
            .execute(&mut conn)?;
    }

    if let Some(notes) = req.notes {
        diesel::update(vendors::table.filter(vendors::id.eq(id)))
            .set(vendors::notes.eq(notes))
            .execute(&mut conn)?;
    }

    if let Some(active) = req.active {
        diesel::update(vendors::table.filter(vendors::id.eq(id)))
            .set(vendors::active.eq(active))
            .execute(&mut conn)?;
    }

    get_vendor(State(state), Path(id)).await
}

pub async fn delete_vendor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut conn = state.conn.get()?;

    let affected = diesel::delete(vendors::table.filter(vendors::id.eq(id))).execute(&mut conn)?;
    if affected == 0 {
        return Err(ApiError::NotFound("Vendor not found".to_string()));
    }

    Ok(Json(json!({ "message": "Vendor deleted" })))
}

pub fn configure_vendor_api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/vendors", get(list_vendors).post(create_vendor))
        .route(
            "/api/vendors/:id",
            get(get_vendor).put(update_vendor).delete(delete_vendor),
        )
}
