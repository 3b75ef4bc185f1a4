pub mod memory;
pub mod postgrest;
pub mod repository;
pub mod supabase;

pub use memory::InMemoryRepository;
pub use postgrest::SupabaseRepository;
pub use repository::{AppointmentRepository, ScheduleRepository, SubscriptionRepository};
pub use supabase::SupabaseClient;
