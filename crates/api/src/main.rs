use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_api::config::{LogFormat, ServerConfig};
use folio_api::router::build_app_router;
use folio_api::state::AppState;
use folio_core::history::RevisionBackend;
use folio_core::memory::{MemoryPostStore, MemoryRevisionBackend};
use folio_core::restore::PostStore;
use folio_events::{AuditLog, EventBus};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env();

    // --- Tracing ---
    let json_logs = config.log_format == LogFormat::Json;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio_api=debug,tower_http=debug".into()),
        )
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .init();

    tracing::info!(
        host = %config.host,
        port = %config.port,
        history_cap = config.history.cap,
        snapshot_before_restore = config.history.snapshot_before_restore,
        log_format = ?config.log_format,
        "Loaded server configuration"
    );

    // --- Storage ---
    let backend: Arc<dyn RevisionBackend>;
    let posts: Arc<dyn PostStore>;
    match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = folio_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            folio_db::health_check(&pool)
                .await
                .expect("Database health check failed");

            folio_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            backend = Arc::new(folio_db::PgRevisionBackend::new(pool.clone()));
            posts = Arc::new(folio_db::PgPostStore::new(pool));
        }
        None => {
            tracing::warn!("DATABASE_URL not set, revisions are kept in memory only");
            backend = Arc::new(MemoryRevisionBackend::new());
            posts = Arc::new(MemoryPostStore::new());
        }
    }

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    let audit_handle = tokio::spawn(AuditLog::run(event_bus.subscribe()));

    // --- App state ---
    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    let state = AppState::new(backend, posts, Arc::clone(&event_bus), config);
    let app = build_app_router(state);

    // --- Start server ---
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // The router (and its state clone of the bus) is gone; dropping the last
    // sender closes the channel so the audit log drains and exits.
    drop(event_bus);
    let _ = tokio::time::timeout(shutdown_timeout, audit_handle).await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
