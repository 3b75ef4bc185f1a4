// libs/shared/models/src/scheduling.rs
use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::{effective_end_minutes, LocalTimeOfDay};

// ==============================================================================
// PROFESSIONAL SCHEDULE RECORDS
// ==============================================================================

/// Recurring weekly availability window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyRule {
    pub id: Uuid,
    pub professional_id: Uuid,
    pub weekday: u8, // 0 = Sunday, 1 = Monday, etc.
    pub start_time: LocalTimeOfDay,
    pub end_time: LocalTimeOfDay,
}

impl WeeklyRule {
    pub fn effective_end_minutes(&self) -> u16 {
        effective_end_minutes(self.end_time)
    }
}

/// Availability for one specific date. Any override on a date replaces every weekly
/// rule for that date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateOverride {
    pub id: Uuid,
    pub professional_id: Uuid,
    pub for_date: NaiveDate,
    pub start_time: LocalTimeOfDay,
    pub end_time: LocalTimeOfDay,
    pub is_available: bool,
}

impl DateOverride {
    pub fn effective_end_minutes(&self) -> u16 {
        effective_end_minutes(self.end_time)
    }
}

/// Absolute-time range in which the professional cannot be booked (vacations,
/// personal blocks).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedInterval {
    pub id: Uuid,
    pub professional_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub reason: Option<String>,
}

impl BlockedInterval {
    /// Half-open overlap test against `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.ends_at && self.starts_at < end
    }
}

// ==============================================================================
// APPOINTMENTS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    PendingConfirmation,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Appointments that still hold their slot.
    pub fn is_active(&self) -> bool {
        matches!(self, AppointmentStatus::PendingConfirmation | AppointmentStatus::Confirmed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::PendingConfirmation => "pending_confirmation",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub professional_id: Uuid,
    pub patient_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: u32,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.scheduled_at + Duration::minutes(self.duration_minutes as i64)
    }
}

// ==============================================================================
// SURVEYS AND SUBSCRIPTIONS
// ==============================================================================

/// Patient rating of a finished session. At most one per appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Survey {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A professional's monthly plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSubscription {
    pub professional_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
