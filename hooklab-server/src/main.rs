use anyhow::{Context, Result};
use hooklab_server::{app, config, db, state::AppState};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hooklab_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = config::Settings::new().context("Failed to load settings")?;

    let db = db::Database::new(&settings.database.path).context("Failed to create database")?;
    db.initialize()
        .context("Failed to initialize database schema")?;

    if settings.database.seed_demo_data {
        db.seed_demo_data().context("Failed to seed demo data")?;
        tracing::info!("Demo data seeded");
    }

    tracing::info!("Database initialized at {}", settings.database.path);

    if settings.auth.allow_passwordless_admin {
        tracing::warn!("Passwordless admin login is enabled; do not expose this server");
    }

    let state = AppState::new(db).with_passwordless_admin(settings.auth.allow_passwordless_admin);

    match state.session_manager.cleanup_expired_sessions() {
        Ok(0) => tracing::info!("No expired sessions to clean up"),
        Ok(count) => tracing::info!("Cleaned up {} expired sessions on startup", count),
        Err(e) => tracing::error!("Failed to cleanup expired sessions on startup: {:#}", e),
    }

    let router = app::build_router(state);

    let addr: SocketAddr = settings
        .bind_address()
        .parse()
        .context("Failed to parse server address")?;
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, router).await.context("Server error")?;
    Ok(())
}
