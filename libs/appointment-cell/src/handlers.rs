// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::{parse_calendar_date, AppError, Appointment};

use crate::models::{
    AppointmentActions, AppointmentListQuery, BookSlotRequest, RecordSurveyRequest, RenewalStatus,
    SurveyEligibility,
};
use crate::router::AppointmentState;

// ==============================================================================
// BOOKING AND LIFECYCLE
// ==============================================================================

#[axum::debug_handler]
pub async fn book_slot(
    State(state): State<Arc<AppointmentState>>,
    Json(request): Json<BookSlotRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let appointment = state.booking.book_slot(request).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppointmentState>>,
    Query(query): Query<AppointmentListQuery>,
) -> Result<Json<Value>, AppError> {
    let from = parse_calendar_date(&query.from)?;
    let to = parse_calendar_date(&query.to)?;

    let appointments = state
        .lifecycle
        .list_professional_appointments(query.professional_id, from, to)
        .await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    Ok(Json(state.lifecycle.get_appointment(appointment_id).await?))
}

#[axum::debug_handler]
pub async fn confirm_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    Ok(Json(state.lifecycle.confirm_appointment(appointment_id).await?))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    Ok(Json(state.lifecycle.cancel_appointment(appointment_id).await?))
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    Ok(Json(state.lifecycle.complete_appointment(appointment_id).await?))
}

#[axum::debug_handler]
pub async fn get_appointment_actions(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<AppointmentActions>, AppError> {
    Ok(Json(state.lifecycle.appointment_actions(appointment_id).await?))
}

// ==============================================================================
// SURVEYS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_survey_eligibility(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<SurveyEligibility>, AppError> {
    Ok(Json(state.surveys.survey_eligibility(appointment_id).await?))
}

#[axum::debug_handler]
pub async fn record_survey(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<RecordSurveyRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let survey = state.surveys.record_survey(appointment_id, request).await?;
    Ok((StatusCode::CREATED, Json(json!(survey))))
}

// ==============================================================================
// SUBSCRIPTIONS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_renewal_status(
    State(state): State<Arc<AppointmentState>>,
    Path(professional_id): Path<Uuid>,
) -> Result<Json<RenewalStatus>, AppError> {
    Ok(Json(state.subscriptions.renewal_status(professional_id).await?))
}

#[axum::debug_handler]
pub async fn renew_plan(
    State(state): State<Arc<AppointmentState>>,
    Path(professional_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let renewed = state.subscriptions.renew_plan(professional_id).await?;
    Ok(Json(json!({
        "professional_id": renewed.professional_id,
        "expires_at": renewed.expires_at,
        "renewed": true
    })))
}
