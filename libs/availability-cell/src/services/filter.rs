// libs/availability-cell/src/services/filter.rs

use chrono::{DateTime, Utc};

use shared_config::BookingConflictRule;
use shared_models::{Appointment, BlockedInterval, ClinicTimezone, SchedulingError};

use crate::models::CandidateSlot;

/// Marks candidate slots unavailable when they are blocked, booked or already started.
///
/// Slots are local wall-clock values; they are converted to instants here and nowhere
/// else in the cell.
#[derive(Debug, Clone, Copy)]
pub struct SlotFilter {
    timezone: ClinicTimezone,
    conflict_rule: BookingConflictRule,
}

impl SlotFilter {
    pub fn new(timezone: ClinicTimezone, conflict_rule: BookingConflictRule) -> Self {
        Self {
            timezone,
            conflict_rule,
        }
    }

    /// `[start, end)` instants of a slot.
    pub fn slot_instants(&self, slot: &CandidateSlot) -> Result<(DateTime<Utc>, DateTime<Utc>), SchedulingError> {
        Ok((
            self.timezone.localize(slot.date, slot.start_time)?,
            self.timezone.localize(slot.date, slot.end_time)?,
        ))
    }

    /// Annotate every slot with its availability. Order and length are preserved.
    pub fn annotate(
        &self,
        slots: Vec<CandidateSlot>,
        blocked: &[BlockedInterval],
        appointments: &[Appointment],
        now: DateTime<Utc>,
    ) -> Result<Vec<CandidateSlot>, SchedulingError> {
        slots
            .into_iter()
            .map(|mut slot| {
                let (start, end) = self.slot_instants(&slot)?;
                slot.available = self.occurs(&slot, start, end)
                    && start > now
                    && !is_blocked(start, end, blocked)
                    && !self.is_booked(start, end, appointments);
                Ok(slot)
            })
            .collect()
    }

    /// Only the slots that remain available.
    pub fn apply(
        &self,
        slots: Vec<CandidateSlot>,
        blocked: &[BlockedInterval],
        appointments: &[Appointment],
        now: DateTime<Utc>,
    ) -> Result<Vec<CandidateSlot>, SchedulingError> {
        Ok(self
            .annotate(slots, blocked, appointments, now)?
            .into_iter()
            .filter(|slot| slot.available)
            .collect())
    }

    /// A slot whose local start falls in a DST gap has no instants of its own.
    fn occurs(&self, slot: &CandidateSlot, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.timezone.exists(slot.date, slot.start_time) && start < end
    }

    fn is_booked(&self, start: DateTime<Utc>, end: DateTime<Utc>, appointments: &[Appointment]) -> bool {
        appointments
            .iter()
            .filter(|a| a.status.is_active())
            .any(|a| match self.conflict_rule {
                BookingConflictRule::StartInstant => a.scheduled_at == start,
                BookingConflictRule::IntervalOverlap => a.scheduled_at < end && start < a.ends_at(),
            })
    }
}

fn is_blocked(start: DateTime<Utc>, end: DateTime<Utc>, blocked: &[BlockedInterval]) -> bool {
    blocked.iter().any(|b| b.overlaps(start, end))
}
