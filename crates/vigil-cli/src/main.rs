#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use vigil_server::handler;
use vigil_server::service::ServiceState;

use crate::config::Cli;

/// Tracing target for server startup events.
pub const TRACING_TARGET_STARTUP: &str = "vigil_cli::server::startup";

/// Tracing target for server shutdown events.
pub const TRACING_TARGET_SHUTDOWN: &str = "vigil_cli::server::shutdown";

/// Tracing target for configuration events.
pub const TRACING_TARGET_CONFIG: &str = "vigil_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    init_tracing();
    log_startup_info();

    cli.validate().context("invalid configuration")?;
    cli.log();

    let state = ServiceState::from_config(&cli.service)
        .await
        .context("failed to initialize application state")?;
    let router = create_router(state, &cli);

    server::serve(router, cli.server).await?;

    Ok(())
}

/// Creates the application router with middleware layers applied.
///
/// The OpenAPI document produced by the handler routers is served at
/// `/api-docs/openapi.json`.
fn create_router(state: ServiceState, cli: &Cli) -> Router {
    let (router, api) = handler::openapi_routes().with_state(state).split_for_parts();

    router
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
        .layer(build_cors(cli))
        .layer(TimeoutLayer::new(cli.server.request_timeout()))
        .layer(TraceLayer::new_for_http())
}

/// Builds the CORS layer from the configured origins.
///
/// Cookie-based authentication needs `Access-Control-Allow-Credentials`,
/// which rules out wildcard origins; when no origins are configured the
/// frontend origin from the service configuration is allowed.
fn build_cors(cli: &Cli) -> CorsLayer {
    let configured = if cli.server.cors_allowed_origins.is_empty() {
        std::slice::from_ref(&cli.service.frontend_url)
    } else {
        cli.server.cors_allowed_origins.as_slice()
    };

    let origins: Vec<HeaderValue> = configured
        .iter()
        .filter_map(|origin| {
            let origin = origin.trim_end_matches('/');
            match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(
                        target: TRACING_TARGET_CONFIG,
                        origin,
                        error = %e,
                        "skipping invalid CORS origin"
                    );
                    None
                }
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Initializes tracing with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Logs startup information.
fn log_startup_info() {
    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        "starting vigil server"
    );

    tracing::debug!(
        target: TRACING_TARGET_STARTUP,
        pid = process::id(),
        arch = std::env::consts::ARCH,
        os = std::env::consts::OS,
        "build information"
    );
}
