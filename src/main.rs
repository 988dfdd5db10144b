use std::sync::Arc;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod docs;
mod error;
mod handlers;
mod models;
mod probe;
mod store;
#[cfg(test)]
mod testing;

use crate::config::Config;
use crate::probe::{MetadataClient, SystemProbe};
use crate::store::MessageStore;

/// Shared application state; cheap to clone (all heap behind Arc).
#[derive(Clone)]
pub struct AppState {
    pub messages: Arc<MessageStore>,
    pub system: Arc<SystemProbe>,
    pub metadata: MetadataClient,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            messages: Arc::new(MessageStore::new()),
            system: Arc::new(SystemProbe::new()),
            metadata: MetadataClient::new(config.metadata_url.clone(), config.metadata_timeout),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (ignored in production where env vars are injected)
    dotenv::dotenv().ok();

    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,cloud_demo_service=debug")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Cloud Demo Service - Rust + Axum    ║");
    info!("║  health · aws-info · messages        ║");
    info!("╚══════════════════════════════════════╝");

    let state = AppState::new(&config);

    let server_info = state.system.system_info().await;
    info!(
        hostname = %server_info.hostname,
        platform = %server_info.platform,
        cpus = server_info.cpu_count,
        memory = %server_info.memory_total,
        "Server info"
    );
    let metadata = state.metadata.fetch_and_cache().await;
    info!(
        instance_id = %metadata.instance_id(),
        on_cloud = metadata.is_cloud(),
        "Instance metadata"
    );

    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn build_router(state: AppState) -> Router {
    let routes = Router::new()
        // ── Landing page & API docs ─────────────────────────────────────────
        .route("/", get(handlers::root))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", docs::ApiDoc::openapi()))

        // ── Health / liveness ───────────────────────────────────────────────
        .route("/health", get(handlers::health))
        .route("/ping", get(handlers::ping))

        // ── Host & cloud facts ──────────────────────────────────────────────
        .route("/aws-info", get(handlers::info::aws_info))
        .route("/system-info", get(handlers::info::system_info))

        // ── Messages ────────────────────────────────────────────────────────
        .route(
            "/messages",
            get(handlers::messages::list_messages).post(handlers::messages::create_message),
        )

        // ── Load / alerting drills ──────────────────────────────────────────
        .route("/load-test", get(handlers::load::load_test))
        .route("/error-test", get(handlers::load::error_test));

    with_middleware(routes).with_state(state)
}

/// Error fallbacks and the middleware stack. Must be applied after every route is registered.
fn with_middleware(routes: Router<AppState>) -> Router<AppState> {
    routes
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(CatchPanicLayer::custom(error::panic_response)),
        )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
