use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod actor;
mod adapters;
mod app_state;
mod config;
mod domain;
mod router;
mod routes;

use app_state::AppState;
use domain::timeclock::WallClock;

#[tokio::main]
async fn main() {
    dotenvy::from_filename("./hearth-api/.env.local").ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hearth_api=debug,tower_http=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::read_config().expect("Failed to read configuration");

    let connection_pool = PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect_lazy_with(config.database.with_db());

    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to run database migrations");

    let clock = WallClock::from_offset_minutes(config.application.utc_offset_minutes);
    let app_state = AppState::new(connection_pool, clock);
    let app = router::create(app_state, &config);

    let address = format!(
        "{}:{}",
        config.application.host, config.application.port
    );
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .expect("Failed to bind listener");
    tracing::info!("listening on {}", address);

    axum::serve(listener, app)
        .await
        .expect("Server failed");
}
