//! HTTP Server
//!
//! Axum server exposing the exporter endpoints:
//!
//! - `GET /` - HTML landing page with a link to metrics
//! - `GET /metrics` - runs one scrape cycle, then renders the registry
//! - `GET /health` - 200 if the last scrape succeeded, 503 otherwise
//!
//! Collection is pull-driven: every `/metrics` request triggers a full
//! scrape of the OmniLogic API before rendering, so repeated Prometheus
//! pulls are the retry mechanism. The orchestrator serializes overlapping
//! requests internally.

use crate::config::Config;
use crate::metrics::ExporterMetrics;
use crate::scrape::ScrapeOrchestrator;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
struct AppState {
    metrics: ExporterMetrics,
    orchestrator: Arc<ScrapeOrchestrator>,
}

pub async fn start(config: Config) -> anyhow::Result<()> {
    let metrics = ExporterMetrics::new()?;
    let orchestrator = Arc::new(ScrapeOrchestrator::new(
        config.omnilogic.clone(),
        metrics.clone(),
    )?);

    let state = AppState {
        metrics,
        orchestrator,
    };

    let app = Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(state);

    let addr = format!("{}:{}", config.server.addr, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Metrics server listening on {}", addr);
    info!("Metrics available at http://{}/metrics", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn root_handler() -> impl IntoResponse {
    axum::response::Html(
        r#"<html>
<head><title>OmniLogic Exporter</title></head>
<body>
<h1>OmniLogic Exporter</h1>
<p><a href="/metrics">Metrics</a></p>
<p><a href="/health">Health</a></p>
</body>
</html>"#,
    )
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    state.orchestrator.scrape().await;

    match state.metrics.render() {
        Ok(metrics) => metrics.into_response(),
        Err(e) => {
            error!("Failed to render metrics: {}", e);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error rendering metrics: {}", e),
            )
                .into_response()
        }
    }
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let up_value = state.metrics.up.get();

    if up_value > 0.0 {
        (axum::http::StatusCode::OK, "OK")
    } else {
        (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            "OmniLogic API unreachable",
        )
    }
}
