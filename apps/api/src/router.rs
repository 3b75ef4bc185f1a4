use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::{appointment_routes, subscription_routes, AppointmentState};
use availability_cell::{availability_routes, AvailabilityState};

pub fn create_router(availability: Arc<AvailabilityState>, appointments: Arc<AppointmentState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Therapy booking API is running!" }))
        .nest("/professionals", availability_routes(availability))
        .nest("/appointments", appointment_routes(appointments.clone()))
        .nest("/subscriptions", subscription_routes(appointments))
}
