// libs/availability-cell/src/services/availability.rs

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, instrument};
use uuid::Uuid;

use shared_config::SchedulingConfig;
use shared_database::{AppointmentRepository, ScheduleRepository};
use shared_models::{
    Appointment, BlockedInterval, ClinicTimezone, DateOverride, LocalTimeOfDay, SchedulingError,
    WeeklyRule,
};
use shared_utils::Clock;

use crate::models::{CandidateSlot, ResolvedAvailability};
use crate::services::filter::SlotFilter;
use crate::services::horizon::DateHorizonPolicy;
use crate::services::resolver::AvailabilityResolver;
use crate::services::slots::SlotGenerator;

/// Everything needed to compute slots for a range of dates, fetched in one round.
struct ScheduleSnapshot {
    rules: Vec<WeeklyRule>,
    overrides: Vec<DateOverride>,
    blocked: Vec<BlockedInterval>,
    appointments: Vec<Appointment>,
}

/// Read side of the engine: which dates and slots a professional can be booked on.
pub struct AvailabilityService {
    schedules: Arc<dyn ScheduleRepository>,
    appointments: Arc<dyn AppointmentRepository>,
    clock: Arc<dyn Clock>,
    timezone: ClinicTimezone,
    horizon: DateHorizonPolicy,
    resolver: AvailabilityResolver,
    generator: SlotGenerator,
    filter: SlotFilter,
}

impl AvailabilityService {
    pub fn new(
        config: &SchedulingConfig,
        schedules: Arc<dyn ScheduleRepository>,
        appointments: Arc<dyn AppointmentRepository>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SchedulingError> {
        let timezone = ClinicTimezone::new(config.clinic_timezone);

        Ok(Self {
            schedules,
            appointments,
            clock,
            timezone,
            horizon: DateHorizonPolicy::new(config.horizon_days),
            resolver: AvailabilityResolver::new(),
            generator: SlotGenerator::new(config.slot_duration_minutes)?,
            filter: SlotFilter::new(timezone, config.booking_conflict_rule),
        })
    }

    pub fn timezone(&self) -> ClinicTimezone {
        self.timezone
    }

    pub fn slot_duration_minutes(&self) -> u32 {
        self.generator.duration_minutes()
    }

    /// Dates inside the horizon with at least one available slot.
    #[instrument(skip(self))]
    pub async fn resolve_available_dates(&self, professional_id: Uuid) -> Result<Vec<NaiveDate>, SchedulingError> {
        let now = self.clock.now();
        let today = self.timezone.local_date(now);
        let dates = self.horizon.dates(today);
        let (Some(&first), Some(&last)) = (dates.first(), dates.last()) else {
            return Ok(Vec::new());
        };

        let snapshot = self.load_snapshot(professional_id, first, last).await?;

        let mut available = Vec::new();
        for date in dates {
            let grid = self.grid_from_snapshot(&snapshot, date, now)?;
            if grid.iter().any(|slot| slot.available) {
                available.push(date);
            }
        }

        debug!(
            "Professional {} has {} bookable dates from {}",
            professional_id,
            available.len(),
            today
        );
        Ok(available)
    }

    /// Available slots on `date`. Dates outside the horizon yield an empty list.
    #[instrument(skip(self))]
    pub async fn resolve_available_slots(
        &self,
        professional_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<CandidateSlot>, SchedulingError> {
        let slots: Vec<CandidateSlot> = self
            .slot_grid(professional_id, date)
            .await?
            .into_iter()
            .filter(|slot| slot.available)
            .collect();

        debug!("Found {} available slots for {} on {}", slots.len(), professional_id, date);
        Ok(slots)
    }

    /// Every candidate slot on `date`, annotated with availability.
    pub async fn slot_grid(&self, professional_id: Uuid, date: NaiveDate) -> Result<Vec<CandidateSlot>, SchedulingError> {
        let now = self.clock.now();
        let today = self.timezone.local_date(now);

        if !self.horizon.contains(today, date) {
            debug!("{} is outside the booking horizon starting {}", date, today);
            return Ok(Vec::new());
        }

        let snapshot = self.load_snapshot(professional_id, date, date).await?;
        self.grid_from_snapshot(&snapshot, date, now)
    }

    /// Effective windows on `date`, regardless of the horizon.
    pub async fn effective_availability(
        &self,
        professional_id: Uuid,
        date: NaiveDate,
    ) -> Result<ResolvedAvailability, SchedulingError> {
        let (rules, overrides) = tokio::try_join!(
            self.schedules.list_weekly_rules(professional_id),
            self.schedules.list_overrides(professional_id, date, date),
        )?;

        Ok(self.resolver.resolve(date, &rules, &overrides))
    }

    /// Re-check a single slot against current data immediately before a booking write.
    ///
    /// Fails with `OutOfHorizon` for dates outside the horizon and `SlotConflict` when no
    /// available slot starts at `start_time`.
    pub async fn bookable_slot(
        &self,
        professional_id: Uuid,
        date: NaiveDate,
        start_time: LocalTimeOfDay,
    ) -> Result<(CandidateSlot, DateTime<Utc>), SchedulingError> {
        let now = self.clock.now();
        self.horizon.ensure_contains(self.timezone.local_date(now), date)?;

        let snapshot = self.load_snapshot(professional_id, date, date).await?;
        let slot = self
            .grid_from_snapshot(&snapshot, date, now)?
            .into_iter()
            .find(|slot| slot.start_time == start_time);

        match slot {
            Some(slot) if slot.available => {
                let (scheduled_at, _) = self.filter.slot_instants(&slot)?;
                Ok((slot, scheduled_at))
            }
            _ => Err(SchedulingError::SlotConflict {
                professional_id,
                scheduled_at: self.timezone.localize(date, start_time)?,
            }),
        }
    }

    async fn load_snapshot(
        &self,
        professional_id: Uuid,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Result<ScheduleSnapshot, SchedulingError> {
        let (range_start, _) = self.timezone.day_bounds(first)?;
        let (_, range_end) = self.timezone.day_bounds(last)?;
        // Bookings that started the previous day can still run into the first date.
        let bookings_from = range_start - Duration::days(1);

        let (rules, overrides, blocked, appointments) = tokio::try_join!(
            self.schedules.list_weekly_rules(professional_id),
            self.schedules.list_overrides(professional_id, first, last),
            self.schedules.list_blocked_intervals(professional_id, range_start, range_end),
            self.appointments.list_appointments(professional_id, bookings_from, range_end),
        )?;

        Ok(ScheduleSnapshot {
            rules,
            overrides,
            blocked,
            appointments,
        })
    }

    fn grid_from_snapshot(
        &self,
        snapshot: &ScheduleSnapshot,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Vec<CandidateSlot>, SchedulingError> {
        let resolved = self.resolver.resolve(date, &snapshot.rules, &snapshot.overrides);
        let candidates = self.generator.generate_all(date, &resolved.windows);
        self.filter
            .annotate(candidates, &snapshot.blocked, &snapshot.appointments, now)
    }
}
