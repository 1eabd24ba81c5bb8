use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use multiswap_settlement::SettlementEngine;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::collector::MetricsCollector;

/// HTTP server for metrics endpoint
pub struct MetricsServer {
    collector: Arc<MetricsCollector>,
    engine: Option<Arc<SettlementEngine>>,
    addr: String,
}

#[derive(Clone)]
struct AppState {
    collector: Arc<MetricsCollector>,
    engine: Option<Arc<SettlementEngine>>,
}

impl MetricsServer {
    /// Create a new metrics server
    pub fn new(collector: Arc<MetricsCollector>, addr: String) -> Self {
        Self {
            collector,
            engine: None,
            addr,
        }
    }

    /// Expose the engine's status on `/status`
    pub fn with_engine(mut self, engine: Arc<SettlementEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Routes served by this server
    pub fn router(&self) -> Router {
        Router::new()
            .route("/metrics", get(metrics_handler))
            .route("/health", get(health_handler))
            .route("/status", get(status_handler))
            .with_state(AppState {
                collector: self.collector.clone(),
                engine: self.engine.clone(),
            })
    }

    /// Start the metrics HTTP server
    pub async fn serve(self) -> Result<(), MetricsServerError> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Start the metrics HTTP server, stopping once `shutdown` resolves
    pub async fn serve_with_shutdown(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), MetricsServerError> {
        let app = self.router();

        let listener = TcpListener::bind(&self.addr)
            .await
            .map_err(|e| MetricsServerError::BindError(e.to_string()))?;

        tracing::info!("Metrics server listening on {}", self.addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| MetricsServerError::ServerError(e.to_string()))?;

        Ok(())
    }
}

/// Handler for /metrics endpoint
/// Returns Prometheus-formatted metrics
async fn metrics_handler(State(state): State<AppState>) -> Result<Response, MetricsHandlerError> {
    let metrics = state
        .collector
        .export_metrics()
        .map_err(|e| MetricsHandlerError::ExportError(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [("Content-Type", "text/plain; version=0.0.4")],
        metrics,
    )
        .into_response())
}

/// Handler for /health endpoint
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Handler for /status endpoint
/// Returns the engine's status as JSON
async fn status_handler(State(state): State<AppState>) -> Result<Response, MetricsHandlerError> {
    let engine = state.engine.ok_or(MetricsHandlerError::NoEngine)?;
    let status = engine
        .status()
        .map_err(|e| MetricsHandlerError::StatusError(e.to_string()))?;

    Ok(Json(status).into_response())
}

/// Metrics server error types
#[derive(Debug, thiserror::Error)]
pub enum MetricsServerError {
    #[error("failed to bind to address: {0}")]
    BindError(String),
    #[error("server error: {0}")]
    ServerError(String),
}

/// Metrics handler error types
#[derive(Debug, thiserror::Error)]
pub enum MetricsHandlerError {
    #[error("failed to export metrics: {0}")]
    ExportError(String),
    #[error("no engine attached")]
    NoEngine,
    #[error("failed to read engine status: {0}")]
    StatusError(String),
}

impl IntoResponse for MetricsHandlerError {
    fn into_response(self) -> Response {
        let status = match &self {
            MetricsHandlerError::ExportError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            MetricsHandlerError::NoEngine => StatusCode::NOT_FOUND,
            MetricsHandlerError::StatusError(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn fetch(router: Router, path: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn server() -> MetricsServer {
        MetricsServer::new(Arc::new(MetricsCollector::new()), "127.0.0.1:0".to_string())
    }

    #[tokio::test]
    async fn test_metrics_server_creation() {
        let server = server();
        assert_eq!(server.addr, "127.0.0.1:0");
        assert!(server.engine.is_none());
    }

    #[tokio::test]
    async fn test_health_and_metrics() {
        let router = server().router();

        let (status, body) = fetch(router.clone(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");

        let (status, body) = fetch(router, "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("multiswap_settlements_completed_total"));
    }

    #[tokio::test]
    async fn test_status_without_engine() {
        let (status, _) = fetch(server().router(), "/status").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_status_reports_engine() {
        let engine = Arc::new(
            SettlementEngine::builder("engine", "controller", "treasury")
                .fee_rate_bps(25)
                .paused(true)
                .build()
                .unwrap(),
        );
        let (status, body) = fetch(server().with_engine(engine).router(), "/status").await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["engine"], "engine");
        assert_eq!(json["fee_rate_bps"], 25);
        assert_eq!(json["paused"], true);
        assert_eq!(json["settlements_committed"], 0);
    }

    #[tokio::test]
    async fn test_serve_with_shutdown() {
        let server = server();
        server
            .serve_with_shutdown(async {})
            .await
            .unwrap();
    }
}
