use std::net::SocketAddr;

use axum::Router;
use serde::Serialize;
use thiserror::Error;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod extract;
mod llm;
mod middleware;
mod routes;
mod state;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Proactive Engagement API",
        version = "0.1.0",
        description = "Decides whether a storefront should show an engagement popup for a browsing session."
    ),
    paths(
        routes::health::health_check,
        routes::decide::decide,
        routes::events::ingest_event,
    ),
    components(schemas(
        HealthResponse,
        engage_core::error::ApiError,
        engage_core::session::PageType,
        engage_core::session::EventKind,
        engage_core::session::Event,
        engage_core::session::SessionSnapshot,
        engage_core::session::DecisionRequest,
        engage_core::decision::Decision,
        routes::events::EventAck,
    ))
)]
struct ApiDoc;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// False when no reasoning credential is configured
    pub analyzer_enabled: bool,
}

#[derive(Debug, Error)]
enum StartupError {
    #[error("failed to build reasoning service client: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    // Load .env if present (dev only)
    let _ = dotenvy::dotenv();

    // Structured JSON logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "engage_api=debug,engage_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = config::Config::from_env();
    tracing::info!(config = ?config, "configuration loaded");

    let cors_layer = middleware::cors::build_cors_layer(&config.cors_origins);
    let bind = (config.host.clone(), config.port);
    let app_state = state::AppState::from_config(config)?;

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(routes::health::router())
        .merge(routes::decide::router().layer(middleware::rate_limit::decide_layer()))
        .merge(routes::events::router().layer(middleware::rate_limit::events_layer()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer),
        )
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(bind.clone())
        .await
        .map_err(|source| StartupError::Bind {
            addr: format!("{}:{}", bind.0, bind.1),
            source,
        })?;
    tracing::info!("Proactive engagement API listening on {}:{}", bind.0, bind.1);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(StartupError::Serve)
}
