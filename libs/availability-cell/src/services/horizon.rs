// libs/availability-cell/src/services/horizon.rs

use chrono::{Duration, NaiveDate};

use shared_models::SchedulingError;

/// Bounds the calendar dates that can be queried or booked: `today..=today + days`
/// in the clinic's local calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateHorizonPolicy {
    days: u32,
}

impl DateHorizonPolicy {
    pub fn new(days: u32) -> Self {
        Self { days }
    }

    pub fn last_date(&self, today: NaiveDate) -> NaiveDate {
        today + Duration::days(self.days as i64)
    }

    pub fn contains(&self, today: NaiveDate, date: NaiveDate) -> bool {
        today <= date && date <= self.last_date(today)
    }

    /// Every date inside the horizon, in order.
    pub fn dates(&self, today: NaiveDate) -> Vec<NaiveDate> {
        today.iter_days().take(self.days as usize + 1).collect()
    }

    pub fn ensure_contains(&self, today: NaiveDate, date: NaiveDate) -> Result<(), SchedulingError> {
        if self.contains(today, date) {
            Ok(())
        } else {
            Err(SchedulingError::OutOfHorizon { date })
        }
    }
}
