// libs/appointment-cell/tests/booking_test.rs
mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use appointment_cell::LifecycleEvent;
use shared_database::{AppointmentRepository, InMemoryRepository, ScheduleRepository};
use shared_models::{Appointment, AppointmentStatus, RepositoryError, SchedulingError, Survey};
use shared_utils::test_utils::weekly_rule;

use common::{at, booking, monday, test_app, test_app_with};

#[tokio::test]
async fn far_booking_waits_for_confirmation() {
    let app = test_app().await;

    let appointment = app
        .state
        .booking
        .book_slot(booking(app.professional_id, "2024-06-03", "10:00"))
        .await
        .unwrap();

    assert_eq!(appointment.status, AppointmentStatus::PendingConfirmation);
    assert_eq!(appointment.scheduled_at, at(monday(), "10:00"));
    assert_eq!(appointment.duration_minutes, 50);
    assert_eq!(app.notifier.events(), vec![(LifecycleEvent::Booked, appointment.id)]);
}

#[tokio::test]
async fn booking_inside_confirmation_window_is_confirmed() {
    let app = test_app().await;

    // Two hours ahead of the test clock.
    let appointment = app
        .state
        .booking
        .book_slot(booking(app.professional_id, "2024-06-01", "10:00"))
        .await
        .unwrap();

    assert_eq!(appointment.status, AppointmentStatus::Confirmed);
}

#[tokio::test]
async fn exactly_twenty_four_hours_ahead_is_pending() {
    let app = test_app().await;
    app.clock.set(at(monday(), "10:00") - Duration::hours(24));

    let appointment = app
        .state
        .booking
        .book_slot(booking(app.professional_id, "2024-06-03", "10:00"))
        .await
        .unwrap();

    assert_eq!(appointment.status, AppointmentStatus::PendingConfirmation);
}

#[tokio::test]
async fn taken_slot_is_a_conflict() {
    let app = test_app().await;
    app.state
        .booking
        .book_slot(booking(app.professional_id, "2024-06-03", "10:00"))
        .await
        .unwrap();

    let second = app
        .state
        .booking
        .book_slot(booking(app.professional_id, "2024-06-03", "10:00"))
        .await;
    assert_matches!(second, Err(SchedulingError::SlotConflict { .. }));
    assert_eq!(app.notifier.events().len(), 1);
}

#[tokio::test]
async fn cancelled_booking_frees_the_slot() {
    let app = test_app().await;
    let first = app
        .state
        .booking
        .book_slot(booking(app.professional_id, "2024-06-03", "10:00"))
        .await
        .unwrap();
    app.state.lifecycle.cancel_appointment(first.id).await.unwrap();

    let second = app
        .state
        .booking
        .book_slot(booking(app.professional_id, "2024-06-03", "10:00"))
        .await;
    assert!(second.is_ok());
}

#[tokio::test]
async fn rejects_bookings_the_grid_does_not_offer() {
    let app = test_app().await;

    let off_hour = app
        .state
        .booking
        .book_slot(booking(app.professional_id, "2024-06-03", "10:30"))
        .await;
    assert_matches!(off_hour, Err(SchedulingError::SlotConflict { .. }));

    let outside_rules = app
        .state
        .booking
        .book_slot(booking(app.professional_id, "2024-06-03", "15:00"))
        .await;
    assert_matches!(outside_rules, Err(SchedulingError::SlotConflict { .. }));

    let too_far = app
        .state
        .booking
        .book_slot(booking(app.professional_id, "2024-06-20", "10:00"))
        .await;
    assert_matches!(too_far, Err(SchedulingError::OutOfHorizon { .. }));
}

#[tokio::test]
async fn rejects_malformed_requests() {
    let app = test_app().await;

    let mut long = booking(app.professional_id, "2024-06-03", "10:00");
    long.duration_minutes = Some(90);
    assert_matches!(app.state.booking.book_slot(long).await, Err(SchedulingError::InvalidInput(_)));

    let mut empty = booking(app.professional_id, "2024-06-03", "10:00");
    empty.duration_minutes = Some(0);
    assert_matches!(app.state.booking.book_slot(empty).await, Err(SchedulingError::InvalidInput(_)));

    let bad_date = booking(app.professional_id, "2024-13-03", "10:00");
    assert_matches!(app.state.booking.book_slot(bad_date).await, Err(SchedulingError::InvalidInput(_)));

    let bad_time = booking(app.professional_id, "2024-06-03", "ten");
    assert_matches!(app.state.booking.book_slot(bad_time).await, Err(SchedulingError::InvalidInput(_)));
}

#[tokio::test]
async fn default_duration_is_the_slot_length() {
    let app = test_app().await;
    let mut request = booking(app.professional_id, "2024-06-03", "11:00");
    request.duration_minutes = None;

    let appointment = app.state.booking.book_slot(request).await.unwrap();
    assert_eq!(appointment.duration_minutes, 60);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_bookings_for_one_slot_yield_one_appointment() {
    let app = test_app().await;

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let state = app.state.clone();
            let request = booking(app.professional_id, "2024-06-03", "09:00");
            tokio::spawn(async move { state.booking.book_slot(request).await })
        })
        .collect();

    let results: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let booked = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(SchedulingError::SlotConflict { .. })))
        .count();
    assert_eq!(booked, 1);
    assert_eq!(conflicts, 15);

    let stored = app
        .repo
        .list_appointments(app.professional_id, at(monday(), "00:00"), at(monday(), "23:00"))
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
}

/// Appointment store whose reads lag behind its writes, as another process's would.
struct StaleReads {
    inner: Arc<InMemoryRepository>,
}

#[async_trait]
impl AppointmentRepository for StaleReads {
    async fn list_appointments(
        &self,
        _: Uuid,
        _: DateTime<Utc>,
        _: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        Ok(Vec::new())
    }

    async fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>, RepositoryError> {
        self.inner.get_appointment(id).await
    }

    async fn create_appointment(&self, appointment: &Appointment) -> Result<Appointment, RepositoryError> {
        self.inner.create_appointment(appointment).await
    }

    async fn update_appointment_status(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        next: AppointmentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Appointment>, RepositoryError> {
        self.inner.update_appointment_status(id, expected, next, updated_at).await
    }

    async fn find_survey(&self, appointment_id: Uuid) -> Result<Option<Survey>, RepositoryError> {
        self.inner.find_survey(appointment_id).await
    }

    async fn create_survey(&self, survey: &Survey) -> Result<Survey, RepositoryError> {
        self.inner.create_survey(survey).await
    }
}

#[tokio::test]
async fn unique_constraint_backs_up_the_recheck() {
    let repo = Arc::new(InMemoryRepository::new());
    let professional_id = Uuid::new_v4();
    repo.create_weekly_rule(&weekly_rule(professional_id, 1, "09:00", "12:00"))
        .await
        .unwrap();

    // Two engines sharing storage but not their in-process locks.
    let first = test_app_with(repo.clone(), repo.clone(), professional_id);
    let second = test_app_with(repo.clone(), Arc::new(StaleReads { inner: repo.clone() }), professional_id);

    first
        .state
        .booking
        .book_slot(booking(professional_id, "2024-06-03", "10:00"))
        .await
        .unwrap();

    let lost = second
        .state
        .booking
        .book_slot(booking(professional_id, "2024-06-03", "10:00"))
        .await;
    assert_matches!(lost, Err(SchedulingError::SlotConflict { .. }));
    assert!(second.notifier.events().is_empty());
}
