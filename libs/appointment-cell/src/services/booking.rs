// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use availability_cell::AvailabilityService;
use shared_database::AppointmentRepository;
use shared_models::{parse_calendar_date, Appointment, LocalTimeOfDay, RepositoryError, SchedulingError};
use shared_utils::Clock;

use crate::models::{BookSlotRequest, LifecycleEvent};
use crate::services::lifecycle::LifecycleNotifier;
use crate::services::windows::ConfirmationWindow;

type SlotKey = (Uuid, DateTime<Utc>);

/// One async mutex per `(professional, start instant)` being booked. Entries live only
/// while some attempt holds them.
#[derive(Default)]
struct SlotLocks {
    locks: DashMap<SlotKey, Arc<Mutex<()>>>,
}

impl SlotLocks {
    fn acquire(&self, key: SlotKey) -> SlotLock<'_> {
        let lock = self
            .locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        SlotLock {
            owner: self,
            key,
            lock: Some(lock),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.len()
    }
}

/// Handle on a slot's mutex. Dropping it, including when a booking future is
/// abandoned, removes the map entry once no other attempt shares it.
struct SlotLock<'a> {
    owner: &'a SlotLocks,
    key: SlotKey,
    lock: Option<Arc<Mutex<()>>>,
}

impl SlotLock<'_> {
    async fn lock(&self) -> Option<MutexGuard<'_, ()>> {
        match &self.lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        }
    }
}

impl Drop for SlotLock<'_> {
    fn drop(&mut self) {
        drop(self.lock.take());
        self.owner
            .locks
            .remove_if(&self.key, |_, held| Arc::strong_count(held) == 1);
    }
}

/// Turns a candidate slot into a persisted appointment.
///
/// The re-check against current data and the insert run under a per-slot lock, and the
/// repository's uniqueness constraint catches writers in other processes.
pub struct BookingService {
    availability: Arc<AvailabilityService>,
    appointments: Arc<dyn AppointmentRepository>,
    notifier: Arc<dyn LifecycleNotifier>,
    clock: Arc<dyn Clock>,
    confirmation: ConfirmationWindow,
    slot_locks: SlotLocks,
}

impl BookingService {
    pub fn new(
        availability: Arc<AvailabilityService>,
        appointments: Arc<dyn AppointmentRepository>,
        notifier: Arc<dyn LifecycleNotifier>,
        clock: Arc<dyn Clock>,
        confirmation: ConfirmationWindow,
    ) -> Self {
        Self {
            availability,
            appointments,
            notifier,
            clock,
            confirmation,
            slot_locks: SlotLocks::default(),
        }
    }

    #[instrument(skip(self, request), fields(professional_id = %request.professional_id))]
    pub async fn book_slot(&self, request: BookSlotRequest) -> Result<Appointment, SchedulingError> {
        let date = parse_calendar_date(&request.date)?;
        let start_time = LocalTimeOfDay::parse(&request.start_time)?;
        let slot_duration = self.availability.slot_duration_minutes();
        let duration_minutes = request.duration_minutes.unwrap_or(slot_duration);

        if duration_minutes == 0 || duration_minutes > slot_duration {
            return Err(SchedulingError::invalid(format!(
                "duration must be between 1 and {} minutes, got {}",
                slot_duration, duration_minutes
            )));
        }

        let scheduled_at = self.availability.timezone().localize(date, start_time)?;
        let result = {
            let slot = self.slot_locks.acquire((request.professional_id, scheduled_at));
            let _held = slot.lock().await;
            self.check_and_insert(&request, date, start_time, duration_minutes).await
        };

        let appointment = result?;
        info!(
            "Appointment {} booked for professional {} at {} ({})",
            appointment.id, appointment.professional_id, appointment.scheduled_at, appointment.status
        );
        self.notifier.notify(LifecycleEvent::Booked, &appointment).await;

        Ok(appointment)
    }

    async fn check_and_insert(
        &self,
        request: &BookSlotRequest,
        date: NaiveDate,
        start_time: LocalTimeOfDay,
        duration_minutes: u32,
    ) -> Result<Appointment, SchedulingError> {
        let (_, scheduled_at) = self
            .availability
            .bookable_slot(request.professional_id, date, start_time)
            .await?;

        let now = self.clock.now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            professional_id: request.professional_id,
            patient_id: request.patient_id,
            scheduled_at,
            duration_minutes,
            status: self.confirmation.initial_status(scheduled_at, now),
            created_at: now,
            updated_at: now,
        };

        match self.appointments.create_appointment(&appointment).await {
            Ok(created) => Ok(created),
            Err(RepositoryError::UniqueViolation(detail)) => {
                warn!("Lost booking race for {} at {}: {}", request.professional_id, scheduled_at, detail);
                Err(SchedulingError::SlotConflict {
                    professional_id: request.professional_id,
                    scheduled_at,
                })
            }
            Err(other) => Err(other.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    fn key() -> SlotKey {
        (Uuid::new_v4(), Utc::now())
    }

    #[tokio::test]
    async fn released_lock_leaves_no_entry() {
        let locks = SlotLocks::default();
        {
            let slot = locks.acquire(key());
            let _held = slot.lock().await;
            assert_eq!(locks.len(), 1);
        }
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn abandoned_waiter_leaves_entry_to_holder() {
        let locks = SlotLocks::default();
        let key = key();
        let holder = locks.acquire(key);
        let held = holder.lock().await;

        let waiter = async {
            let slot = locks.acquire(key);
            let _held = slot.lock().await;
        };
        assert!(timeout(Duration::from_millis(20), waiter).await.is_err());
        assert_eq!(locks.len(), 1);

        drop(held);
        drop(holder);
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn attempt_dropped_while_holding_cleans_up() {
        let locks = SlotLocks::default();

        let attempt = async {
            let slot = locks.acquire(key());
            let _held = slot.lock().await;
            std::future::pending::<()>().await;
        };
        assert!(timeout(Duration::from_millis(20), attempt).await.is_err());
        assert_eq!(locks.len(), 0);
    }
}
