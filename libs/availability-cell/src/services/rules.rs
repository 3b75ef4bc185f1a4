// libs/availability-cell/src/services/rules.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use shared_database::ScheduleRepository;
use shared_models::{
    parse_calendar_date, BlockedInterval, DateOverride, LocalTimeOfDay, SchedulingError, WeeklyRule,
};

use crate::models::{
    CreateBlockedIntervalRequest, CreateDateOverrideRequest, CreateWeeklyRuleRequest, TimeWindow,
};

/// Write side of a professional's schedule. Everything is validated here so that
/// resolution never has to drop malformed rows.
pub struct ScheduleRulesService {
    schedules: Arc<dyn ScheduleRepository>,
}

impl ScheduleRulesService {
    pub fn new(schedules: Arc<dyn ScheduleRepository>) -> Self {
        Self { schedules }
    }

    pub async fn create_weekly_rule(
        &self,
        professional_id: Uuid,
        request: CreateWeeklyRuleRequest,
    ) -> Result<WeeklyRule, SchedulingError> {
        if request.weekday > 6 {
            return Err(SchedulingError::invalid(
                "weekday must be between 0 (Sunday) and 6 (Saturday)",
            ));
        }
        let (start_time, end_time) = parse_window(&request.start_time, &request.end_time)?;

        let rule = WeeklyRule {
            id: Uuid::new_v4(),
            professional_id,
            weekday: request.weekday,
            start_time,
            end_time,
        };

        let created = self.schedules.create_weekly_rule(&rule).await?;
        info!(
            "Weekly rule {} created for professional {} (weekday {}, {} - {})",
            created.id, professional_id, created.weekday, created.start_time, created.end_time
        );
        Ok(created)
    }

    pub async fn create_date_override(
        &self,
        professional_id: Uuid,
        request: CreateDateOverrideRequest,
    ) -> Result<DateOverride, SchedulingError> {
        let for_date = parse_calendar_date(&request.for_date)?;
        let (start_time, end_time) = parse_window(&request.start_time, &request.end_time)?;

        let entry = DateOverride {
            id: Uuid::new_v4(),
            professional_id,
            for_date,
            start_time,
            end_time,
            is_available: request.is_available,
        };

        let created = self.schedules.create_override(&entry).await?;
        info!(
            "Date override {} created for professional {} on {} (available: {})",
            created.id, professional_id, created.for_date, created.is_available
        );
        Ok(created)
    }

    pub async fn create_blocked_interval(
        &self,
        professional_id: Uuid,
        request: CreateBlockedIntervalRequest,
    ) -> Result<BlockedInterval, SchedulingError> {
        let starts_at = parse_instant(&request.starts_at)?;
        let ends_at = parse_instant(&request.ends_at)?;
        if starts_at >= ends_at {
            return Err(SchedulingError::invalid("blocked interval must end after it starts"));
        }

        let block = BlockedInterval {
            id: Uuid::new_v4(),
            professional_id,
            starts_at,
            ends_at,
            reason: request.reason.filter(|r| !r.trim().is_empty()),
        };

        let created = self.schedules.create_blocked_interval(&block).await?;
        info!(
            "Blocked interval {} created for professional {} ({} - {})",
            created.id, professional_id, created.starts_at, created.ends_at
        );
        Ok(created)
    }
}

fn parse_window(start: &str, end: &str) -> Result<(LocalTimeOfDay, LocalTimeOfDay), SchedulingError> {
    let start_time = LocalTimeOfDay::parse(start)?;
    let end_time = LocalTimeOfDay::parse(end)?;

    if TimeWindow::from_bounds(start_time, end_time).is_none() {
        return Err(SchedulingError::invalid(format!(
            "start time {} must be before end time {}",
            start_time, end_time
        )));
    }

    Ok((start_time, end_time))
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, SchedulingError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| SchedulingError::invalid(format!("'{}' is not an RFC 3339 timestamp", raw)))
}
