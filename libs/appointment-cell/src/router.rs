// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use availability_cell::AvailabilityService;
use shared_config::SchedulingConfig;
use shared_database::{AppointmentRepository, SubscriptionRepository};
use shared_models::ClinicTimezone;
use shared_utils::Clock;

use crate::handlers;
use crate::services::{
    AppointmentLifecycleService, BookingService, LifecycleNotifier, SubscriptionService, SurveyService,
    TimeWindowPolicies,
};

pub struct AppointmentState {
    pub booking: BookingService,
    pub lifecycle: AppointmentLifecycleService,
    pub surveys: SurveyService,
    pub subscriptions: SubscriptionService,
}

impl AppointmentState {
    pub fn new(
        config: &SchedulingConfig,
        availability: Arc<AvailabilityService>,
        appointments: Arc<dyn AppointmentRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        notifier: Arc<dyn LifecycleNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let policies = TimeWindowPolicies::from_config(config);
        let timezone = ClinicTimezone::new(config.clinic_timezone);

        Self {
            booking: BookingService::new(
                availability,
                appointments.clone(),
                notifier.clone(),
                clock.clone(),
                policies.confirmation,
            ),
            lifecycle: AppointmentLifecycleService::new(
                appointments.clone(),
                notifier,
                clock.clone(),
                timezone,
                policies,
            ),
            surveys: SurveyService::new(appointments, clock.clone(), policies.survey),
            subscriptions: SubscriptionService::new(subscriptions, clock, policies.plan_renewal),
        }
    }
}

pub fn appointment_routes(state: Arc<AppointmentState>) -> Router {
    Router::new()
        .route("/", post(handlers::book_slot).get(handlers::list_appointments))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/confirm", post(handlers::confirm_appointment))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .route("/{appointment_id}/complete", post(handlers::complete_appointment))
        .route("/{appointment_id}/actions", get(handlers::get_appointment_actions))
        .route(
            "/{appointment_id}/survey",
            get(handlers::get_survey_eligibility).post(handlers::record_survey),
        )
        .with_state(state)
}

pub fn subscription_routes(state: Arc<AppointmentState>) -> Router {
    Router::new()
        .route("/{professional_id}/renewal", get(handlers::get_renewal_status))
        .route("/{professional_id}/renew", post(handlers::renew_plan))
        .with_state(state)
}
