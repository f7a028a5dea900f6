//! HTTP surface for the metrics exposition and health checks

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use exporter_lib::Exporter;
use std::sync::Arc;
use tracing::{error, info};

/// Content type of the Prometheus text exposition format
pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub const HEALTH_PATH: &str = "/healthz";
pub const READY_PATH: &str = "/readyz";

/// Shared application state
pub struct AppState {
    pub exporter: Exporter,
    pub web_path: String,
}

impl AppState {
    pub fn new(exporter: Exporter, web_path: impl Into<String>) -> Self {
        Self {
            exporter,
            web_path: web_path.into(),
        }
    }
}

async fn healthz() -> &'static str {
    "OK"
}

async fn readyz() -> &'static str {
    "OK"
}

/// Landing page linking to the metrics path
async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(format!(
        "<html>\n<head><title>Hetzner Cloud Exporter</title></head>\n<body>\n\
         <h1>Hetzner Cloud Exporter</h1>\n\
         <p><a href=\"{path}\">Metrics</a></p>\n\
         </body>\n</html>\n",
        path = state.web_path
    ))
}

/// Run a scrape and return the text exposition
async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.exporter.render().await {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Create the router
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route(&state.web_path, get(metrics))
        .route(HEALTH_PATH, get(healthz))
        .route(READY_PATH, get(readyz));

    if state.web_path != "/" {
        router = router.route("/", get(index));
    }

    router.with_state(state)
}

/// Serve `state` on `address` until ctrl-c is received
pub async fn serve(address: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(address).await?;
    info!(addr = %address, "Starting HTTP server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
