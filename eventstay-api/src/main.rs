use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use eventstay_api::{app, AppState, AuthConfig};
use eventstay_store::{
    app_config::Config, DbClient, PgBookingRepository, PgHotelRepository, PgRoomRepository,
    PgSessionRepository, PgTicketRepository,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "eventstay_api=debug,eventstay_core=debug,tower_http=debug,axum::rejection=trace"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Event Stay API on port {}", config.server.port);

    // Postgres Connection
    let db = DbClient::new(&config.database)
        .await
        .context("Failed to connect to Postgres")?;
    if config.database.run_migrations {
        db.migrate().await.context("Failed to run migrations")?;
    }

    let tickets = Arc::new(PgTicketRepository::new(db.pool.clone()));
    let app_state = AppState::new(
        Arc::new(PgBookingRepository::new(db.pool.clone())),
        Arc::new(PgRoomRepository::new(db.pool.clone())),
        Arc::new(PgHotelRepository::new(db.pool.clone())),
        tickets,
        Arc::new(PgSessionRepository::new(db.pool.clone())),
        AuthConfig {
            secret: config.auth.jwt_secret.clone(),
        },
    );

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
