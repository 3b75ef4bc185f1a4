use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::{parse_calendar_date, AppError};

use crate::models::{
    AvailableDatesResponse, CreateBlockedIntervalRequest, CreateDateOverrideRequest,
    CreateWeeklyRuleRequest, DateQuery, SlotsResponse,
};
use crate::router::AvailabilityState;

// ==============================================================================
// AVAILABILITY QUERIES
// ==============================================================================

#[axum::debug_handler]
pub async fn get_available_dates(
    State(state): State<Arc<AvailabilityState>>,
    Path(professional_id): Path<Uuid>,
) -> Result<Json<AvailableDatesResponse>, AppError> {
    let dates = state.availability.resolve_available_dates(professional_id).await?;

    Ok(Json(AvailableDatesResponse {
        professional_id,
        timezone: state.availability.timezone().tz().name().to_string(),
        dates,
    }))
}

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<AvailabilityState>>,
    Path(professional_id): Path<Uuid>,
    Query(query): Query<DateQuery>,
) -> Result<Json<SlotsResponse>, AppError> {
    let date = parse_calendar_date(&query.date)?;
    let slots = state.availability.resolve_available_slots(professional_id, date).await?;

    Ok(Json(SlotsResponse {
        professional_id,
        date,
        timezone: state.availability.timezone().tz().name().to_string(),
        slots,
    }))
}

#[axum::debug_handler]
pub async fn get_slot_grid(
    State(state): State<Arc<AvailabilityState>>,
    Path(professional_id): Path<Uuid>,
    Query(query): Query<DateQuery>,
) -> Result<Json<SlotsResponse>, AppError> {
    let date = parse_calendar_date(&query.date)?;
    let slots = state.availability.slot_grid(professional_id, date).await?;

    Ok(Json(SlotsResponse {
        professional_id,
        date,
        timezone: state.availability.timezone().tz().name().to_string(),
        slots,
    }))
}

#[axum::debug_handler]
pub async fn get_effective_availability(
    State(state): State<Arc<AvailabilityState>>,
    Path(professional_id): Path<Uuid>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Value>, AppError> {
    let date = parse_calendar_date(&query.date)?;
    let resolved = state.availability.effective_availability(professional_id, date).await?;

    Ok(Json(json!({
        "professional_id": professional_id,
        "availability": resolved,
    })))
}

// ==============================================================================
// SCHEDULE MANAGEMENT
// ==============================================================================

#[axum::debug_handler]
pub async fn create_weekly_rule(
    State(state): State<Arc<AvailabilityState>>,
    Path(professional_id): Path<Uuid>,
    Json(request): Json<CreateWeeklyRuleRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let rule = state.rules.create_weekly_rule(professional_id, request).await?;
    Ok((StatusCode::CREATED, Json(json!(rule))))
}

#[axum::debug_handler]
pub async fn create_date_override(
    State(state): State<Arc<AvailabilityState>>,
    Path(professional_id): Path<Uuid>,
    Json(request): Json<CreateDateOverrideRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let entry = state.rules.create_date_override(professional_id, request).await?;
    Ok((StatusCode::CREATED, Json(json!(entry))))
}

#[axum::debug_handler]
pub async fn create_blocked_interval(
    State(state): State<Arc<AvailabilityState>>,
    Path(professional_id): Path<Uuid>,
    Json(request): Json<CreateBlockedIntervalRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let block = state.rules.create_blocked_interval(professional_id, request).await?;
    Ok((StatusCode::CREATED, Json(json!(block))))
}
