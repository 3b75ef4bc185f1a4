use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::services::{AvailabilityService, ScheduleRulesService};

/// Shared state of the availability routes.
pub struct AvailabilityState {
    pub availability: Arc<AvailabilityService>,
    pub rules: ScheduleRulesService,
}

pub fn availability_routes(state: Arc<AvailabilityState>) -> Router {
    Router::new()
        .route("/{professional_id}/available-dates", get(handlers::get_available_dates))
        .route("/{professional_id}/available-slots", get(handlers::get_available_slots))
        .route("/{professional_id}/slot-grid", get(handlers::get_slot_grid))
        .route("/{professional_id}/availability", get(handlers::get_effective_availability))
        .route("/{professional_id}/weekly-rules", post(handlers::create_weekly_rule))
        .route("/{professional_id}/date-overrides", post(handlers::create_date_override))
        .route("/{professional_id}/blocked-intervals", post(handlers::create_blocked_interval))
        .with_state(state)
}
