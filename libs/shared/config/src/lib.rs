use std::env;
use std::fmt::Display;
use std::str::FromStr;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_CLINIC_TIMEZONE: Tz = chrono_tz::America::Santiago;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub port: u16,
    pub scheduling: SchedulingConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            port: env_or("PORT", 3000),
            scheduling: SchedulingConfig::from_env(),
        };

        if !config.is_configured() {
            warn!("Supabase not configured - appointments will only live in memory");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }
}

/// How a candidate slot is compared against existing bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingConflictRule {
    /// A slot is taken only when an active appointment starts at the same instant.
    StartInstant,
    /// A slot is taken when any active appointment overlaps it.
    IntervalOverlap,
}

impl FromStr for BookingConflictRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start_instant" => Ok(BookingConflictRule::StartInstant),
            "interval_overlap" => Ok(BookingConflictRule::IntervalOverlap),
            other => Err(format!("unknown booking conflict rule '{}'", other)),
        }
    }
}

impl std::fmt::Display for BookingConflictRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingConflictRule::StartInstant => write!(f, "start_instant"),
            BookingConflictRule::IntervalOverlap => write!(f, "interval_overlap"),
        }
    }
}

/// Scheduling policy values injected into the engine. Nothing in the engine reads
/// these from storage at call time.
#[derive(Debug, Clone)]
pub struct SchedulingConfig {
    pub clinic_timezone: Tz,
    pub slot_duration_minutes: u32,
    pub horizon_days: u32,
    pub confirmation_window_hours: u32,
    pub meeting_join_lead_minutes: u32,
    pub meeting_join_grace_minutes: u32,
    pub survey_window_days: u32,
    pub plan_renewal_window_days: u32,
    pub booking_conflict_rule: BookingConflictRule,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            clinic_timezone: DEFAULT_CLINIC_TIMEZONE,
            slot_duration_minutes: 60,
            horizon_days: 14,
            confirmation_window_hours: 24,
            meeting_join_lead_minutes: 5,
            meeting_join_grace_minutes: 5,
            survey_window_days: 7,
            plan_renewal_window_days: 5,
            booking_conflict_rule: BookingConflictRule::StartInstant,
        }
    }
}

impl SchedulingConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            clinic_timezone: env_or("CLINIC_TIMEZONE", defaults.clinic_timezone),
            slot_duration_minutes: env_or("SLOT_DURATION_MINUTES", defaults.slot_duration_minutes),
            horizon_days: env_or("BOOKING_HORIZON_DAYS", defaults.horizon_days),
            confirmation_window_hours: env_or(
                "CONFIRMATION_WINDOW_HOURS",
                defaults.confirmation_window_hours,
            ),
            meeting_join_lead_minutes: env_or(
                "MEETING_JOIN_LEAD_MINUTES",
                defaults.meeting_join_lead_minutes,
            ),
            meeting_join_grace_minutes: env_or(
                "MEETING_JOIN_GRACE_MINUTES",
                defaults.meeting_join_grace_minutes,
            ),
            survey_window_days: env_or("SURVEY_WINDOW_DAYS", defaults.survey_window_days),
            plan_renewal_window_days: env_or(
                "PLAN_RENEWAL_WINDOW_DAYS",
                defaults.plan_renewal_window_days,
            ),
            booking_conflict_rule: env_or("BOOKING_CONFLICT_RULE", defaults.booking_conflict_rule),
        }
    }
}

fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("{} has invalid value '{}' ({}), using default {}", key, raw, e, default);
            default
        }),
        Err(_) => default,
    }
}
