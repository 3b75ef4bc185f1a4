// Shared harness for the appointment-cell integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use appointment_cell::{AppointmentState, BookSlotRequest, LifecycleEvent, LifecycleNotifier};
use availability_cell::AvailabilityService;
use shared_config::{SchedulingConfig, DEFAULT_CLINIC_TIMEZONE};
use shared_database::{AppointmentRepository, InMemoryRepository, ScheduleRepository, SubscriptionRepository};
use shared_models::Appointment;
use shared_utils::test_utils::{date, local_instant, weekly_rule};
use shared_utils::FixedClock;

/// Collects lifecycle events instead of delivering them.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<(LifecycleEvent, Uuid)>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<(LifecycleEvent, Uuid)> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl LifecycleNotifier for RecordingNotifier {
    async fn notify(&self, event: LifecycleEvent, appointment: &Appointment) {
        self.events.lock().unwrap().push((event, appointment.id));
    }
}

pub struct TestApp {
    pub repo: Arc<InMemoryRepository>,
    pub clock: Arc<FixedClock>,
    pub notifier: Arc<RecordingNotifier>,
    pub state: Arc<AppointmentState>,
    pub professional_id: Uuid,
}

/// Saturday 2024-06-01, 08:00 in the clinic timezone.
pub fn start_of_test() -> DateTime<Utc> {
    at(date(2024, 6, 1), "08:00")
}

pub fn at(day: NaiveDate, raw: &str) -> DateTime<Utc> {
    local_instant(DEFAULT_CLINIC_TIMEZONE, day, raw)
}

pub fn monday() -> NaiveDate {
    date(2024, 6, 3)
}

/// A professional available 09:00-12:00 every day.
pub async fn test_app() -> TestApp {
    let repo = Arc::new(InMemoryRepository::new());
    let professional_id = Uuid::new_v4();
    for weekday in 0..7 {
        repo.create_weekly_rule(&weekly_rule(professional_id, weekday, "09:00", "12:00"))
            .await
            .unwrap();
    }
    test_app_with(repo.clone(), repo, professional_id)
}

pub fn test_app_with(
    schedules: Arc<InMemoryRepository>,
    appointments: Arc<dyn AppointmentRepository>,
    professional_id: Uuid,
) -> TestApp {
    let config = SchedulingConfig::default();
    let clock = Arc::new(FixedClock::new(start_of_test()));
    let notifier = Arc::new(RecordingNotifier::default());

    let availability = Arc::new(
        AvailabilityService::new(&config, schedules.clone(), appointments.clone(), clock.clone()).unwrap(),
    );
    let subscriptions: Arc<dyn SubscriptionRepository> = schedules.clone();
    let state = AppointmentState::new(
        &config,
        availability,
        appointments,
        subscriptions,
        notifier.clone(),
        clock.clone(),
    );

    TestApp {
        repo: schedules,
        clock,
        notifier,
        state: Arc::new(state),
        professional_id,
    }
}

pub fn booking(professional_id: Uuid, day: &str, start: &str) -> BookSlotRequest {
    BookSlotRequest {
        professional_id,
        patient_id: Uuid::new_v4(),
        date: day.to_string(),
        start_time: start.to_string(),
        duration_minutes: Some(50),
    }
}
