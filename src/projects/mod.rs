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
use crate::shared::schema::projects;
use crate::shared::state::AppState;

/// Operations-side record for a booked engagement. Synthesized from a won
/// Deal (see deals::conversion) or entered directly by the operations team.
#[derive(Debug, Clone, Serialize, Deserialize, Queryable)]
pub struct Project {
    pub id: i32,
    pub project_name: String,
    pub project_type: String,
    pub event_classification: String,
    pub status: String,
    pub event_date: Option<NaiveDate>,
    pub event_location: String,
    pub attendee_count: i32,
    pub budget: BigDecimal,
    pub billing_contact_name: String,
    pub billing_contact_email: String,
    pub billing_contact_phone: String,
    pub logistics_contact_name: String,
    pub logistics_contact_email: String,
    pub logistics_contact_phone: String,
    pub contract_signed: bool,
    pub invoice_sent: bool,
    pub payment_received: bool,
    pub presentation_ready: bool,
    pub materials_sent: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Insertable)]
#[diesel(table_name = projects)]
pub struct NewProject {
    pub project_name: String,
    pub project_type: String,
    pub event_classification: String,
    pub status: String,
    pub event_date: Option<NaiveDate>,
    pub event_location: String,
    pub attendee_count: i32,
    pub budget: BigDecimal,
    pub billing_contact_name: String,
    pub billing_contact_email: String,
    pub billing_contact_phone: String,
    pub logistics_contact_name: String,
    pub logistics_contact_email: String,
    pub logistics_contact_phone: String,
    pub contract_signed: bool,
    pub invoice_sent: bool,
    pub payment_received: bool,
    pub presentation_ready: bool,
    pub materials_sent: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub project_name: String,
    pub project_type: Option<String>,
    pub event_classification: Option<String>,
    pub status: Option<String>,
    pub event_date: Option<String>,
    pub event_location: Option<String>,
    pub attendee_count: Option<i32>,
    pub budget: Option<f64>,
    pub billing_contact_name: Option<String>,
    pub billing_contact_email: Option<String>,
    pub billing_contact_phone: Option<String>,
    pub logistics_contact_name: Option<String>,
    pub logistics_contact_email: Option<String>,
    pub logistics_contact_phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    pub project_name: Option<String>,
    pub project_type: Option<String>,
    pub event_classification: Option<String>,
    pub status: Option<String>,
    pub event_date: Option<String>,
    pub event_location: Option<String>,
    pub attendee_count: Option<i32>,
    pub budget: Option<f64>,
    pub contract_signed: Option<bool>,
    pub invoice_sent: Option<bool>,
    pub payment_received: Option<bool>,
    pub presentation_ready: Option<bool>,
    pub materials_sent: Option<bool>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProjectRequest>,
) -> Result<Json<Project>, ApiError> {
    let mut conn = state.conn.get()?;
    let now = Utc::now();

    let event_date = req
        .event_date
        .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok());

    let project = NewProject {
        project_name: req.project_name,
        project_type: req.project_type.unwrap_or_else(|| "Other".to_string()),
        event_classification: req
            .event_classification
            .unwrap_or_else(|| "local".to_string()),
        status: req.status.unwrap_or_else(|| "2plus_months".to_string()),
        event_date,
        event_location: req
            .event_location
            .unwrap_or_else(|| "To be determined".to_string()),
        attendee_count: req.attendee_count.unwrap_or(0),
        budget: req
            .budget
            .and_then(|v| BigDecimal::try_from(v).ok())
            .unwrap_or_else(|| BigDecimal::from(0)),
        billing_contact_name: req.billing_contact_name.unwrap_or_default(),
        billing_contact_email: req.billing_contact_email.unwrap_or_default(),
        billing_contact_phone: req.billing_contact_phone.unwrap_or_default(),
        logistics_contact_name: req.logistics_contact_name.unwrap_or_default(),
        logistics_contact_email: req.logistics_contact_email.unwrap_or_default(),
        logistics_contact_phone: req.logistics_contact_phone.unwrap_or_default(),
        contract_signed: false,
        invoice_sent: false,
        payment_received: false,
        presentation_ready: false,
        materials_sent: false,
        notes: req.notes,
        created_at: now,
        updated_at: now,
    };

    let created: Project = diesel::insert_into(projects::table)
        .values(&project)
        .get_result(&mut conn)?;

    Ok(Json(created))
}

pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Project>>, ApiError> {
    let mut conn = state.conn.get()?;
    let limit = query.limit.unwrap_or(50);
    let offset = query.offset.unwrap_or(0);

    let mut q = projects::table.into_boxed();

    if let Some(status) = query.status {
        q = q.filter(projects::status.eq(status));
    }

    if let Some(search) = query.search {
        let pattern = format!("%{search}%");
        q = q.filter(
            projects::project_name
                .ilike(pattern.clone())
                .or(projects::event_location.ilike(pattern)),
        );
    }

    let rows: Vec<Project> = q
        .order(projects::created_at.desc())
        .limit(limit)
        .offset(offset)
        .load(&mut conn)?;

    Ok(Json(rows))
}

pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Project>, ApiError> {
    let mut conn = state.conn.get()?;

    let project: Project = projects::table
        .filter(projects::id.eq(id))
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(project))
}

pub async fn update_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateProjectRequest>,
) -> Result<Json<Project>, ApiError> {
    let mut conn = state.conn.get()?;
    let now = Utc::now();

    let affected = diesel::update(projects::table.filter(projects::id.eq(id)))
        .set(projects::updated_at.eq(now))
        .execute(&mut conn)?;
    if affected == 0 {
        return Err(ApiError::NotFound("Project not found".to_string()));
    }

    if let Some(project_name) = req.project_name {
        diesel::update(projects::table.filter(projects::id.eq(id)))
            .set(projects::project_name.eq(project_name))
            .execute(&mut conn)?;
    }

    if let Some(project_type) = req.project_type {
        diesel::update(projects::table.filter(projects::id.eq(id)))
            .set(projects::project_type.eq(project_type))
            .execute(&mut conn)?;
    }

    if let Some(event_classification) = req.event_classification {
        diesel::update(projects::table.filter(projects::id.eq(id)))
            .set(projects::event_classification.eq(event_classification))
            .execute(&mut conn)?;
    }

    if let Some(status) = req.status {
        diesel::update(projects::table.filter(projects::id.eq(id)))
            .set(projects::status.eq(status))
            .execute(&mut conn)?;
    }

    if let Some(event_date) = req.event_date {
        if let Ok(date) = NaiveDate::parse_from_str(&event_date, "%Y-%m-%d") {
            diesel::update(projects::table.filter(projects::id.eq(id)))
                .set(projects::event_date.eq(Some(date)))
                .execute(&mut conn)?;
        }
    }

    if let Some(event_location) = req.event_location {
        diesel::update(projects::table.filter(projects::id.eq(id)))
            .set(projects::event_location.eq(event_location))
            .execute(&mut conn)?;
    }

    if let Some(attendee_count) = req.attendee_count {
        diesel::update(projects::table.filter(projects::id.eq(id)))
            .set(projects::attendee_count.eq(attendee_count))
            .execute(&mut conn)?;
    }

    if let Some(budget) = req.budget.and_then(|v| BigDecimal::try_from(v).ok()) {
        diesel::update(projects::table.filter(projects::id.eq(id)))
            .set(projects::budget.eq(budget))
            .execute(&mut conn)?;
    }

    if let Some(contract_signed) = req.contract_signed {
        diesel::update(projects::table.filter(projects::id.eq(id)))
            .set(projects::contract_signed.eq(contract_signed))
            .execute(&mut conn)?;
    }

    if let Some(invoice_sent) = req.invoice_sent {
        diesel::update(projects::table.filter(projects::id.eq(id)))
            .set(projects::invoice_sent.eq(invoice_sent))
            .execute(&mut conn)?;
    }

    if let Some(payment_received) = req.payment_received {
        diesel::update(projects::table.filter(projects::id.eq(id)))
            .set(projects::payment_received.eq(payment_received))
            .execute(&mut conn)?;
    }

    if let Some(presentation_ready) = req.presentation_ready {
        diesel::update(projects::table.filter(projects::id.eq(id)))
            .set(projects::presentation_ready.eq(presentation_ready))
            .execute(&mut conn)?;
    }

    if let Some(materials_sent) = req.materials_sent {
        diesel::update(projects::table.filter(projects::id.eq(id)))
            .set(projects::materials_sent.eq(materials_sent))
            .execute(&mut conn)?;
    }

    if let Some(notes) = req.notes {
        diesel::update(projects::table.filter(projects::id.eq(id)))
            .set(projects::notes.eq(notes))
            .execute(&mut conn)?;
    }

    get_project(State(state), Path(id)).await
}

pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut conn = state.conn.get()?;

    let affected = diesel::delete(projects::table.filter(projects::id.eq(id)))
        .execute(&mut conn)?;
    if affected == 0 {
        return Err(ApiError::NotFound("Project not found".to_string()));
    }

    Ok(Json(json!({ "message": "Project deleted" })))
}

pub fn configure_project_api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/projects", get(list_projects).post(create_project))
        .route(
            "/api/projects/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
}
