// libs/appointment-cell/src/services/windows.rs
//
// Time-gated predicates. Each takes the current instant explicitly and never reads a
// clock itself.

use chrono::{DateTime, Duration, Utc};

use shared_config::SchedulingConfig;
use shared_models::{Appointment, AppointmentStatus, ClinicTimezone, PlanSubscription, SchedulingError};

use crate::models::{JoinWindowStatus, RenewalStatus, SurveyEligibility};

const MINUTES_PER_HOUR: i64 = 60;
const MINUTES_PER_DAY: i64 = 24 * MINUTES_PER_HOUR;

/// The policies derived from one `SchedulingConfig`.
#[derive(Debug, Clone, Copy)]
pub struct TimeWindowPolicies {
    pub confirmation: ConfirmationWindow,
    pub meeting_join: MeetingJoinWindow,
    pub survey: SurveyWindow,
    pub plan_renewal: PlanRenewalWindow,
}

impl TimeWindowPolicies {
    pub fn from_config(config: &SchedulingConfig) -> Self {
        Self {
            confirmation: ConfirmationWindow::new(Duration::hours(config.confirmation_window_hours as i64)),
            meeting_join: MeetingJoinWindow::new(
                Duration::minutes(config.meeting_join_lead_minutes as i64),
                Duration::minutes(config.meeting_join_grace_minutes as i64),
            ),
            survey: SurveyWindow::new(Duration::days(config.survey_window_days as i64)),
            plan_renewal: PlanRenewalWindow::new(
                ClinicTimezone::new(config.clinic_timezone),
                config.plan_renewal_window_days as i64,
            ),
        }
    }
}

// ==============================================================================
// CONFIRMATION
// ==============================================================================

#[derive(Debug, Clone, Copy)]
pub struct ConfirmationWindow {
    threshold: Duration,
}

impl ConfirmationWindow {
    pub fn new(threshold: Duration) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Status a new booking starts in: far-off bookings wait for the patient's
    /// confirmation, bookings inside the window are confirmed outright.
    pub fn initial_status(&self, scheduled_at: DateTime<Utc>, now: DateTime<Utc>) -> AppointmentStatus {
        if scheduled_at - now >= self.threshold {
            AppointmentStatus::PendingConfirmation
        } else {
            AppointmentStatus::Confirmed
        }
    }

    /// `0 < until <= threshold`.
    pub fn is_open(&self, scheduled_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let until = scheduled_at - now;
        until > Duration::zero() && until <= self.threshold
    }

    pub fn permits(&self, appointment: &Appointment, now: DateTime<Utc>) -> bool {
        appointment.status == AppointmentStatus::PendingConfirmation
            && self.is_open(appointment.scheduled_at, now)
    }
}

// ==============================================================================
// MEETING JOIN
// ==============================================================================

#[derive(Debug, Clone, Copy)]
pub struct MeetingJoinWindow {
    lead: Duration,
    grace: Duration,
}

impl MeetingJoinWindow {
    pub fn new(lead: Duration, grace: Duration) -> Self {
        Self { lead, grace }
    }

    /// `[scheduled_at - lead, scheduled_at + duration + grace]`, both ends inclusive.
    pub fn bounds(&self, appointment: &Appointment) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            appointment.scheduled_at - self.lead,
            appointment.ends_at() + self.grace,
        )
    }

    pub fn evaluate(&self, appointment: &Appointment, now: DateTime<Utc>) -> JoinWindowStatus {
        let (opens_at, closes_at) = self.bounds(appointment);

        let message = if now < opens_at {
            Some(format!("Meeting available in {}", humanize_wait(opens_at - now)))
        } else if now > closes_at {
            Some("Meeting access window expired".to_string())
        } else {
            None
        };

        JoinWindowStatus {
            permitted: message.is_none(),
            opens_at,
            closes_at,
            message,
        }
    }
}

/// "N minutes", "N hours" or "N days", rounding minutes up so a wait never reads as
/// zero.
fn humanize_wait(wait: Duration) -> String {
    let minutes = (wait.num_seconds() + 59) / 60;

    let (amount, unit) = if minutes < MINUTES_PER_HOUR {
        (minutes, "minute")
    } else if minutes < MINUTES_PER_DAY {
        (minutes / MINUTES_PER_HOUR, "hour")
    } else {
        (minutes / MINUTES_PER_DAY, "day")
    };

    if amount == 1 {
        format!("{} {}", amount, unit)
    } else {
        format!("{} {}s", amount, unit)
    }
}

// ==============================================================================
// SURVEY
// ==============================================================================

#[derive(Debug, Clone, Copy)]
pub struct SurveyWindow {
    length: Duration,
}

impl SurveyWindow {
    pub fn new(length: Duration) -> Self {
        Self { length }
    }

    pub fn evaluate(&self, appointment: &Appointment, has_rated: bool, now: DateTime<Utc>) -> SurveyEligibility {
        let in_window = now > appointment.scheduled_at && now <= appointment.scheduled_at + self.length;

        SurveyEligibility {
            has_rated,
            can_rate: !has_rated && in_window && appointment.status != AppointmentStatus::Cancelled,
        }
    }
}

// ==============================================================================
// PLAN RENEWAL
// ==============================================================================

#[derive(Debug, Clone, Copy)]
pub struct PlanRenewalWindow {
    timezone: ClinicTimezone,
    window_days: i64,
}

impl PlanRenewalWindow {
    pub fn new(timezone: ClinicTimezone, window_days: i64) -> Self {
        Self { timezone, window_days }
    }

    /// Difference between the local calendar dates of expiry and now.
    pub fn days_until_expiry(&self, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
        (self.timezone.local_date(expires_at) - self.timezone.local_date(now)).num_days()
    }

    pub fn evaluate(&self, subscription: &PlanSubscription, now: DateTime<Utc>) -> RenewalStatus {
        let expired = subscription.expires_at <= now;
        let days_until_expiry = self.days_until_expiry(subscription.expires_at, now);
        let can_renew = expired || days_until_expiry <= self.window_days;

        RenewalStatus {
            professional_id: subscription.professional_id,
            expires_at: subscription.expires_at,
            expired,
            days_until_expiry,
            can_renew,
            days_until_renewal_opens: if can_renew {
                0
            } else {
                days_until_expiry - self.window_days
            },
        }
    }

    pub fn ensure_open(&self, subscription: &PlanSubscription, now: DateTime<Utc>) -> Result<RenewalStatus, SchedulingError> {
        let status = self.evaluate(subscription, now);
        if status.can_renew {
            Ok(status)
        } else {
            Err(SchedulingError::RenewalNotOpen {
                days_remaining: status.days_until_renewal_opens,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waits_are_rounded_up_to_whole_units() {
        assert_eq!(humanize_wait(Duration::seconds(30)), "1 minute");
        assert_eq!(humanize_wait(Duration::minutes(45)), "45 minutes");
        assert_eq!(humanize_wait(Duration::minutes(60)), "1 hour");
        assert_eq!(humanize_wait(Duration::minutes(150)), "2 hours");
        assert_eq!(humanize_wait(Duration::days(3) + Duration::hours(5)), "3 days");
    }
}
