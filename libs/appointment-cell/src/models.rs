// libs/appointment-cell/src/models.rs
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::AppointmentStatus;

// ==============================================================================
// LIFECYCLE EVENTS
// ==============================================================================

/// A successful lifecycle step, reported to the notifier after it is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    Booked,
    Confirmed,
    Cancelled,
    Completed,
}

impl LifecycleEvent {
    pub fn for_status(status: AppointmentStatus) -> Option<Self> {
        match status {
            AppointmentStatus::PendingConfirmation => None,
            AppointmentStatus::Confirmed => Some(LifecycleEvent::Confirmed),
            AppointmentStatus::Cancelled => Some(LifecycleEvent::Cancelled),
            AppointmentStatus::Completed => Some(LifecycleEvent::Completed),
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleEvent::Booked => write!(f, "booked"),
            LifecycleEvent::Confirmed => write!(f, "confirmed"),
            LifecycleEvent::Cancelled => write!(f, "cancelled"),
            LifecycleEvent::Completed => write!(f, "completed"),
        }
    }
}

// ==============================================================================
// WINDOW ANSWERS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinWindowStatus {
    pub permitted: bool,
    pub opens_at: DateTime<Utc>,
    pub closes_at: DateTime<Utc>,
    /// Why joining is not possible right now; `None` while the window is open.
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SurveyEligibility {
    pub has_rated: bool,
    pub can_rate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenewalStatus {
    pub professional_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub expired: bool,
    /// Clinic-calendar days until expiry; negative once expired.
    pub days_until_expiry: i64,
    pub can_renew: bool,
    /// Days until renewal becomes possible; zero when it already is.
    pub days_until_renewal_opens: i64,
}

/// What the patient-facing UI may offer for one appointment right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppointmentActions {
    pub appointment_id: Uuid,
    pub status: AppointmentStatus,
    pub can_confirm: bool,
    pub can_cancel: bool,
    pub join: JoinWindowStatus,
    pub survey: SurveyEligibility,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookSlotRequest {
    pub professional_id: Uuid,
    pub patient_id: Uuid,
    /// Local calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Local start time, `HH:MM`.
    pub start_time: String,
    /// Defaults to the configured slot duration.
    pub duration_minutes: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSurveyRequest {
    pub patient_id: Uuid,
    pub rating: u8,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AppointmentListQuery {
    pub professional_id: Uuid,
    pub from: String,
    pub to: String,
}
