// libs/shared/database/src/memory.rs
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_models::{
    Appointment, AppointmentStatus, BlockedInterval, DateOverride, PlanSubscription,
    RepositoryError, Survey, WeeklyRule,
};

use crate::repository::{AppointmentRepository, ScheduleRepository, SubscriptionRepository};

#[derive(Debug, Default)]
struct MemoryState {
    weekly_rules: Vec<WeeklyRule>,
    overrides: Vec<DateOverride>,
    blocked_intervals: Vec<BlockedInterval>,
    appointments: HashMap<Uuid, Appointment>,
    surveys: HashMap<Uuid, Survey>,
    subscriptions: HashMap<Uuid, PlanSubscription>,
}

/// Process-local store. Writes are serialized by a single lock, which is also what
/// enforces the one-active-appointment-per-slot constraint.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: RwLock<MemoryState>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScheduleRepository for InMemoryRepository {
    async fn list_weekly_rules(&self, professional_id: Uuid) -> Result<Vec<WeeklyRule>, RepositoryError> {
        let state = self.state.read().await;
        let mut rules: Vec<WeeklyRule> = state
            .weekly_rules
            .iter()
            .filter(|r| r.professional_id == professional_id)
            .cloned()
            .collect();
        rules.sort_by_key(|r| (r.weekday, r.start_time));
        Ok(rules)
    }

    async fn list_overrides(
        &self,
        professional_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DateOverride>, RepositoryError> {
        let state = self.state.read().await;
        let mut overrides: Vec<DateOverride> = state
            .overrides
            .iter()
            .filter(|o| o.professional_id == professional_id && o.for_date >= from && o.for_date <= to)
            .cloned()
            .collect();
        overrides.sort_by_key(|o| (o.for_date, o.start_time));
        Ok(overrides)
    }

    async fn list_blocked_intervals(
        &self,
        professional_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<BlockedInterval>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .blocked_intervals
            .iter()
            .filter(|b| b.professional_id == professional_id && b.overlaps(from, to))
            .cloned()
            .collect())
    }

    async fn create_weekly_rule(&self, rule: &WeeklyRule) -> Result<WeeklyRule, RepositoryError> {
        self.state.write().await.weekly_rules.push(rule.clone());
        Ok(rule.clone())
    }

    async fn create_override(&self, entry: &DateOverride) -> Result<DateOverride, RepositoryError> {
        self.state.write().await.overrides.push(entry.clone());
        Ok(entry.clone())
    }

    async fn create_blocked_interval(&self, block: &BlockedInterval) -> Result<BlockedInterval, RepositoryError> {
        self.state.write().await.blocked_intervals.push(block.clone());
        Ok(block.clone())
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryRepository {
    async fn list_appointments(
        &self,
        professional_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        let state = self.state.read().await;
        let mut appointments: Vec<Appointment> = state
            .appointments
            .values()
            .filter(|a| a.professional_id == professional_id && a.scheduled_at >= from && a.scheduled_at < to)
            .cloned()
            .collect();
        appointments.sort_by_key(|a| a.scheduled_at);
        Ok(appointments)
    }

    async fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>, RepositoryError> {
        Ok(self.state.read().await.appointments.get(&id).cloned())
    }

    async fn create_appointment(&self, appointment: &Appointment) -> Result<Appointment, RepositoryError> {
        let mut state = self.state.write().await;

        let taken = state.appointments.values().any(|existing| {
            existing.professional_id == appointment.professional_id
                && existing.scheduled_at == appointment.scheduled_at
                && existing.status.is_active()
        });
        if taken {
            debug!(
                "Rejecting appointment for {} at {}: slot already held",
                appointment.professional_id, appointment.scheduled_at
            );
            return Err(RepositoryError::UniqueViolation(format!(
                "professional {} already has an active appointment at {}",
                appointment.professional_id, appointment.scheduled_at
            )));
        }
        if state.appointments.contains_key(&appointment.id) {
            return Err(RepositoryError::UniqueViolation(format!(
                "appointment {} already exists",
                appointment.id
            )));
        }

        state.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment.clone())
    }

    async fn update_appointment_status(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        next: AppointmentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Appointment>, RepositoryError> {
        let mut state = self.state.write().await;
        let appointment = state
            .appointments
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(format!("appointment {}", id)))?;

        if appointment.status != expected {
            return Ok(None);
        }

        appointment.status = next;
        appointment.updated_at = updated_at;
        Ok(Some(appointment.clone()))
    }

    async fn find_survey(&self, appointment_id: Uuid) -> Result<Option<Survey>, RepositoryError> {
        Ok(self.state.read().await.surveys.get(&appointment_id).cloned())
    }

    async fn create_survey(&self, survey: &Survey) -> Result<Survey, RepositoryError> {
        let mut state = self.state.write().await;
        if state.surveys.contains_key(&survey.appointment_id) {
            return Err(RepositoryError::UniqueViolation(format!(
                "appointment {} already has a survey",
                survey.appointment_id
            )));
        }
        state.surveys.insert(survey.appointment_id, survey.clone());
        Ok(survey.clone())
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryRepository {
    async fn get_subscription(&self, professional_id: Uuid) -> Result<Option<PlanSubscription>, RepositoryError> {
        Ok(self.state.read().await.subscriptions.get(&professional_id).cloned())
    }

    async fn save_subscription(&self, subscription: &PlanSubscription) -> Result<PlanSubscription, RepositoryError> {
        self.state
            .write()
            .await
            .subscriptions
            .insert(subscription.professional_id, subscription.clone());
        Ok(subscription.clone())
    }
}
