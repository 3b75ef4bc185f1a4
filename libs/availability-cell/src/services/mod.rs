pub mod availability;
pub mod filter;
pub mod horizon;
pub mod resolver;
pub mod rules;
pub mod slots;

pub use availability::AvailabilityService;
pub use filter::SlotFilter;
pub use horizon::DateHorizonPolicy;
pub use resolver::AvailabilityResolver;
pub use rules::ScheduleRulesService;
pub use slots::SlotGenerator;
