use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::{effective_end_minutes, LocalTimeOfDay};

/// A contiguous stretch of local wall-clock time on one date.
///
/// `end_time` is already resolved: a rule ending at `00:00` yields
/// `LocalTimeOfDay::END_OF_DAY` here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct TimeWindow {
    pub start_time: LocalTimeOfDay,
    pub end_time: LocalTimeOfDay,
}

impl TimeWindow {
    /// Build a window from stored bounds. Returns `None` when the window is empty.
    pub fn from_bounds(start: LocalTimeOfDay, raw_end: LocalTimeOfDay) -> Option<Self> {
        let end = LocalTimeOfDay::from_minutes(effective_end_minutes(raw_end))?;
        (start < end).then_some(Self {
            start_time: start,
            end_time: end,
        })
    }

    pub fn start_minutes(&self) -> u16 {
        self.start_time.minutes()
    }

    pub fn end_minutes(&self) -> u16 {
        self.end_time.minutes()
    }

    pub fn contains(&self, start: LocalTimeOfDay, end: LocalTimeOfDay) -> bool {
        self.start_time <= start && end <= self.end_time
    }
}

/// Where the effective windows of a date came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilitySource {
    DateOverride,
    WeeklyRules,
    Unscheduled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAvailability {
    pub date: NaiveDate,
    pub source: AvailabilitySource,
    pub windows: Vec<TimeWindow>,
}

impl ResolvedAvailability {
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateSlot {
    pub date: NaiveDate,
    pub start_time: LocalTimeOfDay,
    pub end_time: LocalTimeOfDay,
    pub available: bool,
}

// ==============================================================================
// REQUEST / RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWeeklyRuleRequest {
    pub weekday: u8,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDateOverrideRequest {
    pub for_date: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBlockedIntervalRequest {
    pub starts_at: String,
    pub ends_at: String,
    pub reason: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: String,
}

#[derive(Debug, Serialize)]
pub struct AvailableDatesResponse {
    pub professional_id: Uuid,
    pub timezone: String,
    pub dates: Vec<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct SlotsResponse {
    pub professional_id: Uuid,
    pub date: NaiveDate,
    pub timezone: String,
    pub slots: Vec<CandidateSlot>,
}
