// libs/appointment-cell/src/services/survey.rs
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use shared_database::AppointmentRepository;
use shared_models::{RepositoryError, SchedulingError, Survey};
use shared_utils::Clock;

use crate::models::{RecordSurveyRequest, SurveyEligibility};
use crate::services::windows::SurveyWindow;

const MIN_RATING: u8 = 1;
const MAX_RATING: u8 = 5;

/// Post-session satisfaction surveys, one per appointment.
pub struct SurveyService {
    appointments: Arc<dyn AppointmentRepository>,
    clock: Arc<dyn Clock>,
    window: SurveyWindow,
}

impl SurveyService {
    pub fn new(appointments: Arc<dyn AppointmentRepository>, clock: Arc<dyn Clock>, window: SurveyWindow) -> Self {
        Self {
            appointments,
            clock,
            window,
        }
    }

    pub async fn survey_eligibility(&self, appointment_id: Uuid) -> Result<SurveyEligibility, SchedulingError> {
        let appointment = self
            .appointments
            .get_appointment(appointment_id)
            .await?
            .ok_or_else(|| SchedulingError::NotFound(format!("Appointment {}", appointment_id)))?;
        let existing = self.appointments.find_survey(appointment_id).await?;

        Ok(self.window.evaluate(&appointment, existing.is_some(), self.clock.now()))
    }

    pub async fn record_survey(
        &self,
        appointment_id: Uuid,
        request: RecordSurveyRequest,
    ) -> Result<Survey, SchedulingError> {
        if !(MIN_RATING..=MAX_RATING).contains(&request.rating) {
            return Err(SchedulingError::invalid(format!(
                "rating must be between {} and {}, got {}",
                MIN_RATING, MAX_RATING, request.rating
            )));
        }

        let appointment = self
            .appointments
            .get_appointment(appointment_id)
            .await?
            .ok_or_else(|| SchedulingError::NotFound(format!("Appointment {}", appointment_id)))?;

        if appointment.patient_id != request.patient_id {
            return Err(SchedulingError::invalid("only the appointment's patient can rate it"));
        }

        let now = self.clock.now();
        let existing = self.appointments.find_survey(appointment_id).await?;
        let eligibility = self.window.evaluate(&appointment, existing.is_some(), now);

        if eligibility.has_rated {
            return Err(already_rated(appointment_id));
        }
        if !eligibility.can_rate {
            return Err(SchedulingError::WindowClosed(format!(
                "appointment {} cannot be rated right now",
                appointment_id
            )));
        }

        let survey = Survey {
            id: Uuid::new_v4(),
            appointment_id,
            patient_id: request.patient_id,
            rating: request.rating,
            comment: request.comment.filter(|c| !c.trim().is_empty()),
            created_at: now,
        };

        match self.appointments.create_survey(&survey).await {
            Ok(created) => {
                info!("Survey recorded for appointment {} (rating {})", appointment_id, created.rating);
                Ok(created)
            }
            Err(RepositoryError::UniqueViolation(_)) => Err(already_rated(appointment_id)),
            Err(other) => Err(other.into()),
        }
    }
}

fn already_rated(appointment_id: Uuid) -> SchedulingError {
    SchedulingError::WindowClosed(format!("appointment {} has already been rated", appointment_id))
}
