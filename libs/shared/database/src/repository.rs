// libs/shared/database/src/repository.rs
//
// Storage seams of the scheduling engine. Implementations decide how records are
// persisted; the engine only relies on the contracts documented here.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use shared_models::{
    Appointment, AppointmentStatus, BlockedInterval, DateOverride, PlanSubscription,
    RepositoryError, Survey, WeeklyRule,
};

/// Weekly rules, date overrides and blocked intervals owned by a professional.
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// All weekly rules, ordered by weekday then start time.
    async fn list_weekly_rules(&self, professional_id: Uuid) -> Result<Vec<WeeklyRule>, RepositoryError>;

    /// Overrides with `from <= for_date <= to`, ordered by date then start time.
    async fn list_overrides(
        &self,
        professional_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DateOverride>, RepositoryError>;

    /// Blocked intervals overlapping `[from, to)`.
    async fn list_blocked_intervals(
        &self,
        professional_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<BlockedInterval>, RepositoryError>;

    async fn create_weekly_rule(&self, rule: &WeeklyRule) -> Result<WeeklyRule, RepositoryError>;

    async fn create_override(&self, entry: &DateOverride) -> Result<DateOverride, RepositoryError>;

    async fn create_blocked_interval(&self, block: &BlockedInterval) -> Result<BlockedInterval, RepositoryError>;
}

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Appointments of any status with `from <= scheduled_at < to`, ordered by start.
    async fn list_appointments(
        &self,
        professional_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, RepositoryError>;

    async fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>, RepositoryError>;

    /// Insert a new appointment.
    ///
    /// Must fail with `RepositoryError::UniqueViolation` when another active
    /// appointment already holds the same `(professional_id, scheduled_at)`.
    async fn create_appointment(&self, appointment: &Appointment) -> Result<Appointment, RepositoryError>;

    /// Move an appointment from `expected` to `next`.
    ///
    /// Returns `Ok(None)` when the stored status no longer equals `expected`, and
    /// `RepositoryError::NotFound` when the appointment does not exist.
    async fn update_appointment_status(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        next: AppointmentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Appointment>, RepositoryError>;

    async fn find_survey(&self, appointment_id: Uuid) -> Result<Option<Survey>, RepositoryError>;

    /// Must fail with `RepositoryError::UniqueViolation` if the appointment already has a survey.
    async fn create_survey(&self, survey: &Survey) -> Result<Survey, RepositoryError>;
}

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn get_subscription(&self, professional_id: Uuid) -> Result<Option<PlanSubscription>, RepositoryError>;

    /// Insert or replace the professional's subscription.
    async fn save_subscription(&self, subscription: &PlanSubscription) -> Result<PlanSubscription, RepositoryError>;
}
