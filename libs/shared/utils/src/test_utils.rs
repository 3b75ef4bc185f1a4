// Fixture builders shared by the cell test suites.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use shared_models::{
    Appointment, AppointmentStatus, BlockedInterval, ClinicTimezone, DateOverride, LocalTimeOfDay,
    WeeklyRule,
};

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

pub fn time(raw: &str) -> LocalTimeOfDay {
    LocalTimeOfDay::parse(raw).expect("valid fixture time")
}

/// The instant at which the wall clock in `tz` reads `raw` on `date`.
pub fn local_instant(tz: Tz, date: NaiveDate, raw: &str) -> DateTime<Utc> {
    ClinicTimezone::new(tz)
        .localize(date, time(raw))
        .expect("fixture time exists in timezone")
}

pub fn weekly_rule(professional_id: Uuid, weekday: u8, start: &str, end: &str) -> WeeklyRule {
    WeeklyRule {
        id: Uuid::new_v4(),
        professional_id,
        weekday,
        start_time: time(start),
        end_time: time(end),
    }
}

pub fn date_override(
    professional_id: Uuid,
    for_date: NaiveDate,
    start: &str,
    end: &str,
    is_available: bool,
) -> DateOverride {
    DateOverride {
        id: Uuid::new_v4(),
        professional_id,
        for_date,
        start_time: time(start),
        end_time: time(end),
        is_available,
    }
}

pub fn blocked_interval(
    professional_id: Uuid,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
) -> BlockedInterval {
    BlockedInterval {
        id: Uuid::new_v4(),
        professional_id,
        starts_at,
        ends_at,
        reason: Some("fixture block".to_string()),
    }
}

pub fn appointment(
    professional_id: Uuid,
    scheduled_at: DateTime<Utc>,
    duration_minutes: u32,
    status: AppointmentStatus,
) -> Appointment {
    Appointment {
        id: Uuid::new_v4(),
        professional_id,
        patient_id: Uuid::new_v4(),
        scheduled_at,
        duration_minutes,
        status,
        created_at: scheduled_at - chrono::Duration::days(2),
        updated_at: scheduled_at - chrono::Duration::days(2),
    }
}
