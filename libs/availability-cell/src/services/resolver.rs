// libs/availability-cell/src/services/resolver.rs

use chrono::NaiveDate;
use tracing::warn;

use shared_models::{weekday_index, DateOverride, LocalTimeOfDay, WeeklyRule};
use uuid::Uuid;

use crate::models::{AvailabilitySource, ResolvedAvailability, TimeWindow};

/// Merges weekly rules and date overrides into the effective windows of one date.
///
/// Any override for the date shadows the weekly rules completely, even when none of
/// the overrides is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct AvailabilityResolver;

impl AvailabilityResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(
        &self,
        date: NaiveDate,
        rules: &[WeeklyRule],
        overrides: &[DateOverride],
    ) -> ResolvedAvailability {
        let todays_overrides: Vec<&DateOverride> =
            overrides.iter().filter(|o| o.for_date == date).collect();

        let (source, mut windows) = if !todays_overrides.is_empty() {
            let windows = todays_overrides
                .iter()
                .filter(|o| o.is_available)
                .filter_map(|o| window_or_warn(o.start_time, o.end_time, "override", o.id))
                .collect::<Vec<_>>();
            (AvailabilitySource::DateOverride, windows)
        } else {
            let weekday = weekday_index(date);
            let windows = rules
                .iter()
                .filter(|r| r.weekday == weekday)
                .filter_map(|r| window_or_warn(r.start_time, r.end_time, "weekly rule", r.id))
                .collect::<Vec<_>>();

            if windows.is_empty() {
                (AvailabilitySource::Unscheduled, windows)
            } else {
                (AvailabilitySource::WeeklyRules, windows)
            }
        };

        windows.sort();

        ResolvedAvailability {
            date,
            source,
            windows,
        }
    }
}

fn window_or_warn(
    start: LocalTimeOfDay,
    end: LocalTimeOfDay,
    kind: &str,
    id: Uuid,
) -> Option<TimeWindow> {
    let window = TimeWindow::from_bounds(start, end);
    if window.is_none() {
        // Creation rejects these; a stored one means the row was written elsewhere.
        warn!("Ignoring empty {} {} ({} - {})", kind, id, start, end);
    }
    window
}
