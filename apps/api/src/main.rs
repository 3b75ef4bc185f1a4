use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use appointment_cell::{AppointmentState, TracingNotifier};
use availability_cell::{AvailabilityService, AvailabilityState, ScheduleRulesService};
use shared_config::AppConfig;
use shared_database::{
    AppointmentRepository, InMemoryRepository, ScheduleRepository, SubscriptionRepository,
    SupabaseRepository,
};
use shared_utils::SystemClock;

struct Repositories {
    schedules: Arc<dyn ScheduleRepository>,
    appointments: Arc<dyn AppointmentRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl Repositories {
    fn from_config(config: &AppConfig) -> Self {
        if config.is_configured() {
            info!("Using Supabase storage at {}", config.supabase_url);
            let repo = Arc::new(SupabaseRepository::new(config));
            Self {
                schedules: repo.clone(),
                appointments: repo.clone(),
                subscriptions: repo,
            }
        } else {
            info!("Using in-memory storage");
            let repo = Arc::new(InMemoryRepository::new());
            Self {
                schedules: repo.clone(),
                appointments: repo.clone(),
                subscriptions: repo,
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting therapy booking API server");

    let config = AppConfig::from_env();
    info!(
        "Clinic timezone {}, {} minute slots, {} day horizon, conflict rule {}",
        config.scheduling.clinic_timezone,
        config.scheduling.slot_duration_minutes,
        config.scheduling.horizon_days,
        config.scheduling.booking_conflict_rule
    );

    let repos = Repositories::from_config(&config);
    let clock = Arc::new(SystemClock);

    let availability = Arc::new(
        AvailabilityService::new(
            &config.scheduling,
            repos.schedules.clone(),
            repos.appointments.clone(),
            clock.clone(),
        )
        .context("invalid scheduling configuration")?,
    );

    let availability_state = Arc::new(AvailabilityState {
        availability: availability.clone(),
        rules: ScheduleRulesService::new(repos.schedules.clone()),
    });
    let appointment_state = Arc::new(AppointmentState::new(
        &config.scheduling,
        availability,
        repos.appointments,
        repos.subscriptions,
        Arc::new(TracingNotifier),
        clock,
    ));

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router::create_router(availability_state, appointment_state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
