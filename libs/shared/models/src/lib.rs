pub mod error;
pub mod scheduling;
pub mod time;

pub use error::{AppError, RepositoryError, SchedulingError};
pub use scheduling::*;
pub use time::{
    effective_end_minutes, parse_calendar_date, weekday_index, ClinicTimezone, LocalTimeOfDay,
    END_OF_DAY_MINUTES,
};
