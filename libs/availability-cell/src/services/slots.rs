// libs/availability-cell/src/services/slots.rs

use chrono::NaiveDate;

use shared_models::{LocalTimeOfDay, SchedulingError, END_OF_DAY_MINUTES};

use crate::models::{CandidateSlot, TimeWindow};

/// Splits availability windows into fixed-length, hour-aligned candidate slots.
#[derive(Debug, Clone, Copy)]
pub struct SlotGenerator {
    duration_minutes: u16,
}

impl SlotGenerator {
    pub fn new(duration_minutes: u32) -> Result<Self, SchedulingError> {
        if duration_minutes == 0 || duration_minutes > END_OF_DAY_MINUTES as u32 {
            return Err(SchedulingError::invalid(format!(
                "slot duration must be between 1 and {} minutes, got {}",
                END_OF_DAY_MINUTES, duration_minutes
            )));
        }

        Ok(Self {
            duration_minutes: duration_minutes as u16,
        })
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes as u32
    }

    /// Walk the window in `duration` steps, keeping steps that start on the hour and
    /// end inside the window.
    pub fn generate(&self, date: NaiveDate, window: &TimeWindow) -> Vec<CandidateSlot> {
        let mut slots = Vec::new();
        let mut cursor = window.start_minutes();

        while cursor + self.duration_minutes <= window.end_minutes() {
            let end = cursor + self.duration_minutes;
            if let (Some(start_time), Some(end_time)) =
                (LocalTimeOfDay::from_minutes(cursor), LocalTimeOfDay::from_minutes(end))
            {
                if start_time.is_hour_aligned() {
                    slots.push(CandidateSlot {
                        date,
                        start_time,
                        end_time,
                        available: true,
                    });
                }
            }
            cursor = end;
        }

        slots
    }

    /// Slots for every window, ordered by start. Windows that overlap each other never
    /// produce overlapping slots.
    pub fn generate_all(&self, date: NaiveDate, windows: &[TimeWindow]) -> Vec<CandidateSlot> {
        let mut slots: Vec<CandidateSlot> = windows
            .iter()
            .flat_map(|window| self.generate(date, window))
            .collect();

        slots.sort_by_key(|slot| (slot.start_time, slot.end_time));
        remove_overlapping_slots(slots)
    }
}

fn remove_overlapping_slots(slots: Vec<CandidateSlot>) -> Vec<CandidateSlot> {
    let mut result: Vec<CandidateSlot> = Vec::with_capacity(slots.len());
    let mut last_end = LocalTimeOfDay::MIDNIGHT;

    for slot in slots {
        if result.is_empty() || slot.start_time >= last_end {
            last_end = slot.end_time;
            result.push(slot);
        }
    }

    result
}
