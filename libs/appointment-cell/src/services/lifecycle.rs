// libs/appointment-cell/src/services/lifecycle.rs
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_database::AppointmentRepository;
use shared_models::{Appointment, AppointmentStatus, ClinicTimezone, SchedulingError};
use shared_utils::Clock;

use crate::models::{AppointmentActions, LifecycleEvent};
use crate::services::windows::TimeWindowPolicies;

/// A status update can lose a race with another writer; re-read and retry this often.
const MAX_TRANSITION_ATTEMPTS: usize = 3;

/// Whether `from -> to` is an edge of the appointment state machine.
pub fn can_transition(from: AppointmentStatus, to: AppointmentStatus) -> bool {
    use AppointmentStatus::*;

    match (from, to) {
        (PendingConfirmation, Confirmed) => true,
        (PendingConfirmation, Cancelled) | (Confirmed, Cancelled) => true,
        (Confirmed, Completed) => true,
        (PendingConfirmation, _) | (Confirmed, _) => false,
        // Terminal states - no transitions allowed
        (Completed, _) | (Cancelled, _) => false,
    }
}

pub fn ensure_transition(from: AppointmentStatus, to: AppointmentStatus) -> Result<(), SchedulingError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        warn!("Invalid status transition attempted: {} -> {}", from, to);
        Err(SchedulingError::InvalidStatusTransition { from, to })
    }
}

/// Receives every persisted lifecycle step. Delivery (email, push) lives behind this.
#[async_trait]
pub trait LifecycleNotifier: Send + Sync {
    async fn notify(&self, event: LifecycleEvent, appointment: &Appointment);
}

/// Default notifier: records the transition in the service log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl LifecycleNotifier for TracingNotifier {
    async fn notify(&self, event: LifecycleEvent, appointment: &Appointment) {
        info!(
            appointment_id = %appointment.id,
            professional_id = %appointment.professional_id,
            patient_id = %appointment.patient_id,
            status = %appointment.status,
            "Appointment {}",
            event
        );
    }
}

pub struct AppointmentLifecycleService {
    appointments: Arc<dyn AppointmentRepository>,
    notifier: Arc<dyn LifecycleNotifier>,
    clock: Arc<dyn Clock>,
    timezone: ClinicTimezone,
    policies: TimeWindowPolicies,
}

impl AppointmentLifecycleService {
    pub fn new(
        appointments: Arc<dyn AppointmentRepository>,
        notifier: Arc<dyn LifecycleNotifier>,
        clock: Arc<dyn Clock>,
        timezone: ClinicTimezone,
        policies: TimeWindowPolicies,
    ) -> Self {
        Self {
            appointments,
            notifier,
            clock,
            timezone,
            policies,
        }
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, SchedulingError> {
        self.appointments
            .get_appointment(appointment_id)
            .await?
            .ok_or_else(|| SchedulingError::NotFound(format!("Appointment {}", appointment_id)))
    }

    /// Appointments of any status starting on the local dates `from..=to`.
    pub async fn list_professional_appointments(
        &self,
        professional_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        if from > to {
            return Err(SchedulingError::invalid(format!("{} is after {}", from, to)));
        }

        let (range_start, _) = self.timezone.day_bounds(from)?;
        let (_, range_end) = self.timezone.day_bounds(to)?;

        Ok(self
            .appointments
            .list_appointments(professional_id, range_start, range_end)
            .await?)
    }

    /// Patient confirmation of a pending appointment, inside the confirmation window.
    pub async fn confirm_appointment(&self, appointment_id: Uuid) -> Result<Appointment, SchedulingError> {
        let confirmation = self.policies.confirmation;

        self.transition(appointment_id, AppointmentStatus::Confirmed, |appointment, now| {
            if appointment.status == AppointmentStatus::PendingConfirmation
                && !confirmation.is_open(appointment.scheduled_at, now)
            {
                return Err(SchedulingError::WindowClosed(format!(
                    "appointment can only be confirmed within {} hours of its start",
                    confirmation.threshold().num_hours()
                )));
            }
            Ok(())
        })
        .await
    }

    pub async fn cancel_appointment(&self, appointment_id: Uuid) -> Result<Appointment, SchedulingError> {
        self.transition(appointment_id, AppointmentStatus::Cancelled, |_, _| Ok(()))
            .await
    }

    /// Mark a confirmed appointment completed once its scheduled time has fully elapsed.
    pub async fn complete_appointment(&self, appointment_id: Uuid) -> Result<Appointment, SchedulingError> {
        self.transition(appointment_id, AppointmentStatus::Completed, |appointment, now| {
            if now < appointment.ends_at() {
                return Err(SchedulingError::WindowClosed(format!(
                    "appointment runs until {}",
                    appointment.ends_at()
                )));
            }
            Ok(())
        })
        .await
    }

    /// Confirmation, join and survey answers for one appointment.
    pub async fn appointment_actions(&self, appointment_id: Uuid) -> Result<AppointmentActions, SchedulingError> {
        let (appointment, survey) = tokio::try_join!(
            self.get_appointment(appointment_id),
            async {
                self.appointments
                    .find_survey(appointment_id)
                    .await
                    .map_err(SchedulingError::from)
            },
        )?;
        let now = self.clock.now();

        Ok(AppointmentActions {
            appointment_id,
            status: appointment.status,
            can_confirm: self.policies.confirmation.permits(&appointment, now),
            can_cancel: can_transition(appointment.status, AppointmentStatus::Cancelled),
            join: self.policies.meeting_join.evaluate(&appointment, now),
            survey: self.policies.survey.evaluate(&appointment, survey.is_some(), now),
        })
    }

    async fn transition<F>(
        &self,
        appointment_id: Uuid,
        next: AppointmentStatus,
        guard: F,
    ) -> Result<Appointment, SchedulingError>
    where
        F: Fn(&Appointment, DateTime<Utc>) -> Result<(), SchedulingError>,
    {
        let mut current = self.get_appointment(appointment_id).await?;

        for attempt in 1..=MAX_TRANSITION_ATTEMPTS {
            let now = self.clock.now();
            ensure_transition(current.status, next)?;
            guard(&current, now)?;

            let updated = self
                .appointments
                .update_appointment_status(appointment_id, current.status, next, now)
                .await?;

            if let Some(updated) = updated {
                info!("Appointment {} moved {} -> {}", appointment_id, current.status, next);
                if let Some(event) = LifecycleEvent::for_status(next) {
                    self.notifier.notify(event, &updated).await;
                }
                return Ok(updated);
            }

            debug!(
                "Appointment {} changed while moving to {} (attempt {}), re-reading",
                appointment_id, next, attempt
            );
            current = self.get_appointment(appointment_id).await?;
        }

        Err(SchedulingError::InvalidStatusTransition {
            from: current.status,
            to: next,
        })
    }
}
