// libs/shared/database/src/postgrest.rs
//
// Repository backed by Supabase/PostgREST. The one-active-booking-per-slot guarantee
// comes from the partial unique index in migrations/0001_scheduling.sql, surfaced by
// PostgREST as HTTP 409.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Method,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::{
    Appointment, AppointmentStatus, BlockedInterval, DateOverride, PlanSubscription,
    RepositoryError, Survey, WeeklyRule,
};

use crate::repository::{AppointmentRepository, ScheduleRepository, SubscriptionRepository};
use crate::supabase::SupabaseClient;

pub struct SupabaseRepository {
    supabase: SupabaseClient,
}

impl SupabaseRepository {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub fn with_client(supabase: SupabaseClient) -> Self {
        Self { supabase }
    }

    async fn select<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, RepositoryError> {
        let rows: Vec<Value> = self.supabase.request(Method::GET, path, None).await?;
        decode_rows(rows)
    }

    async fn insert<T: Serialize + DeserializeOwned>(
        &self,
        table: &str,
        record: &T,
        extra_prefer: Option<&'static str>,
    ) -> Result<T, RepositoryError> {
        let body = serde_json::to_value(record).map_err(|e| RepositoryError::Decode(e.to_string()))?;

        let mut headers = SupabaseClient::return_representation();
        if let Some(prefer) = extra_prefer {
            headers = HeaderMap::new();
            headers.insert("Prefer", HeaderValue::from_static(prefer));
        }

        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(Method::POST, &format!("/rest/v1/{}", table), Some(body), Some(headers))
            .await?;

        decode_rows(rows)?
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::Decode(format!("insert into {} returned no rows", table)))
    }
}

fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, RepositoryError> {
    rows.into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| RepositoryError::Decode(e.to_string()))
}

fn timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[async_trait]
impl ScheduleRepository for SupabaseRepository {
    async fn list_weekly_rules(&self, professional_id: Uuid) -> Result<Vec<WeeklyRule>, RepositoryError> {
        debug!("Fetching weekly rules for professional {}", professional_id);
        let path = format!(
            "/rest/v1/weekly_rules?professional_id=eq.{}&order=weekday.asc,start_time.asc",
            professional_id
        );
        self.select(&path).await
    }

    async fn list_overrides(
        &self,
        professional_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DateOverride>, RepositoryError> {
        debug!("Fetching date overrides for professional {} ({} - {})", professional_id, from, to);
        let path = format!(
            "/rest/v1/date_overrides?professional_id=eq.{}&for_date=gte.{}&for_date=lte.{}&order=for_date.asc,start_time.asc",
            professional_id, from, to
        );
        self.select(&path).await
    }

    async fn list_blocked_intervals(
        &self,
        professional_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<BlockedInterval>, RepositoryError> {
        let path = format!(
            "/rest/v1/blocked_intervals?professional_id=eq.{}&starts_at=lt.{}&ends_at=gt.{}&order=starts_at.asc",
            professional_id,
            timestamp(to),
            timestamp(from)
        );
        self.select(&path).await
    }

    async fn create_weekly_rule(&self, rule: &WeeklyRule) -> Result<WeeklyRule, RepositoryError> {
        self.insert("weekly_rules", rule, None).await
    }

    async fn create_override(&self, entry: &DateOverride) -> Result<DateOverride, RepositoryError> {
        self.insert("date_overrides", entry, None).await
    }

    async fn create_blocked_interval(&self, block: &BlockedInterval) -> Result<BlockedInterval, RepositoryError> {
        self.insert("blocked_intervals", block, None).await
    }
}

#[async_trait]
impl AppointmentRepository for SupabaseRepository {
    async fn list_appointments(
        &self,
        professional_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        let path = format!(
            "/rest/v1/appointments?professional_id=eq.{}&scheduled_at=gte.{}&scheduled_at=lt.{}&order=scheduled_at.asc",
            professional_id,
            timestamp(from),
            timestamp(to)
        );
        self.select(&path).await
    }

    async fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>, RepositoryError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        Ok(self.select(&path).await?.into_iter().next())
    }

    async fn create_appointment(&self, appointment: &Appointment) -> Result<Appointment, RepositoryError> {
        debug!(
            "Inserting appointment {} for professional {} at {}",
            appointment.id, appointment.professional_id, appointment.scheduled_at
        );
        self.insert("appointments", appointment, None).await
    }

    async fn update_appointment_status(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        next: AppointmentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Appointment>, RepositoryError> {
        let path = format!("/rest/v1/appointments?id=eq.{}&status=eq.{}", id, expected);
        let body = json!({
            "status": next,
            "updated_at": timestamp(updated_at),
        });

        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(body),
                Some(SupabaseClient::return_representation()),
            )
            .await?;

        if let Some(updated) = decode_rows::<Appointment>(rows)?.into_iter().next() {
            return Ok(Some(updated));
        }

        // Nothing matched: either the status moved underneath us or the row is gone.
        match self.get_appointment(id).await? {
            Some(_) => Ok(None),
            None => Err(RepositoryError::NotFound(format!("appointment {}", id))),
        }
    }

    async fn find_survey(&self, appointment_id: Uuid) -> Result<Option<Survey>, RepositoryError> {
        let path = format!("/rest/v1/appointment_surveys?appointment_id=eq.{}", appointment_id);
        Ok(self.select(&path).await?.into_iter().next())
    }

    async fn create_survey(&self, survey: &Survey) -> Result<Survey, RepositoryError> {
        self.insert("appointment_surveys", survey, None).await
    }
}

#[async_trait]
impl SubscriptionRepository for SupabaseRepository {
    async fn get_subscription(&self, professional_id: Uuid) -> Result<Option<PlanSubscription>, RepositoryError> {
        let path = format!("/rest/v1/plan_subscriptions?professional_id=eq.{}", professional_id);
        Ok(self.select(&path).await?.into_iter().next())
    }

    async fn save_subscription(&self, subscription: &PlanSubscription) -> Result<PlanSubscription, RepositoryError> {
        self.insert(
            "plan_subscriptions",
            subscription,
            Some("resolution=merge-duplicates,return=representation"),
        )
        .await
    }
}
