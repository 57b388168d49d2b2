use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use educ_api::config::ServerConfig;
use educ_api::router::build_app_router;
use educ_api::state::AppState;
use educ_api::storage::{AttachmentStore, LocalAttachmentStore};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "educ_api=debug,educ_events=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = educ_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    educ_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    educ_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Language model ---
    let llm = educ_llm::LlmClient::new(educ_llm::LlmConfig::from_env())
        .expect("Failed to build language model client");
    if !llm.is_configured() {
        tracing::warn!("LLM_API_KEY not set, AI endpoints will answer 502");
    }

    // --- Attachment storage ---
    let storage = LocalAttachmentStore::new(&config.storage_dir);
    match storage.check().await {
        Ok(()) => tracing::info!(root = %config.storage_dir, "Attachment storage ready"),
        Err(e) => tracing::warn!(
            root = %config.storage_dir,
            error = %e,
            "Attachment storage not writable, justification uploads will fail",
        ),
    }

    // --- Event bus ---
    let event_bus = Arc::new(educ_events::EventBus::default());
    let persistence_handle = tokio::spawn(educ_events::EventPersistence::run(
        pool.clone(),
        event_bus.subscribe(),
    ));
    tracing::info!("Usage event persistence started");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        llm: Arc::new(llm),
        storage: Arc::new(storage),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
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

    // Dropping the last sender closes the channel; persistence drains and exits.
    drop(event_bus);
    let drained = tokio::time::timeout(
        Duration::from_secs(config.shutdown_timeout_secs),
        persistence_handle,
    )
    .await;
    if drained.is_err() {
        tracing::warn!("Usage event persistence did not drain before the shutdown timeout");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM.
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
