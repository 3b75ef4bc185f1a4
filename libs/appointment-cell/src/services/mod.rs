pub mod booking;
pub mod lifecycle;
pub mod subscription;
pub mod survey;
pub mod windows;

pub use booking::BookingService;
pub use lifecycle::{can_transition, AppointmentLifecycleService, LifecycleNotifier, TracingNotifier};
pub use subscription::SubscriptionService;
pub use survey::SurveyService;
pub use windows::{
    ConfirmationWindow, MeetingJoinWindow, PlanRenewalWindow, SurveyWindow, TimeWindowPolicies,
};
