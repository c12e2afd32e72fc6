use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Request, State},
    http::StatusCode,
    middleware::Next,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;
use crate::config::AppConfig;
use crate::extraction::{ExtractionOrchestrator, ExtractionResult, ProcessingOptions};
use crate::llm::{LazyCompletionService, TextCompletionService};
use crate::rate_limit::{SimpleRateLimiter, rate_limit_middleware};

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Effective "no timeout" when the timeout middleware is disabled.
const DISABLED_TIMEOUT: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Wire up shared state around a completion service.
pub fn build_state(config: Arc<AppConfig>, service: Arc<dyn TextCompletionService>) -> AppState {
    let orchestrator =
        ExtractionOrchestrator::new(service).with_llm_timeout(config.extraction.llm_timeout());
    let rate_limiter = SimpleRateLimiter::new(
        config.resilience.requests_per_second,
        config.resilience.burst_size,
    );

    AppState {
        orchestrator: Arc::new(orchestrator),
        rate_limiter: Arc::new(rate_limiter),
        config,
    }
}

/// Routes plus the middleware stack, ready to serve.
pub fn build_router(state: AppState) -> Router {
    let timeout_duration = if state.config.resilience.timeout_disabled {
        DISABLED_TIMEOUT
    } else {
        Duration::from_secs(state.config.resilience.request_timeout_secs)
    };

    Router::new()
        .route("/health", get(health))
        .route("/api/extract", post(api_extract))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(axum::middleware::from_fn(
            move |req: Request, next: Next| async move {
                match tokio::time::timeout(timeout_duration, next.run(req)).await {
                    Ok(res) => res,
                    Err(_elapsed) => {
                        (StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response()
                    }
                }
            },
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let service = LazyCompletionService::from_env();
    if service.is_configured() {
        info!(name: "llm.config.loaded", "Completion service configured");
    } else {
        tracing::warn!(
            name: "llm.config.missing",
            "Completion service not configured; language-model strategies will fall back to basic cleanup"
        );
    }

    info!(
        name: "extraction.config.loaded",
        enable_ocr = config.extraction.enable_ocr,
        max_pages = config.extraction.max_pages,
        quality_threshold = config.extraction.quality_threshold,
        llm_timeout_secs = config.extraction.llm_timeout_secs,
        "Extraction defaults loaded"
    );

    let state = build_state(Arc::clone(&config), Arc::new(service));
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Response for GET /health.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// GET /health - Liveness probe.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Request body for the extraction API.
#[derive(Debug, Deserialize)]
struct ExtractRequest {
    /// Raw document text.
    content: String,
    /// Per-request options; server defaults apply when absent.
    #[serde(default)]
    options: Option<ProcessingOptions>,
}

/// POST /api/extract - Run the extraction pipeline.
///
/// Always answers 200 with an [`ExtractionResult`]; a failed run is a result
/// with zero confidence, not an HTTP error.
async fn api_extract(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Json<ExtractionResult> {
    let options = request
        .options
        .unwrap_or_else(|| state.config.extraction.default_options());

    info!(
        name: "api.extract.received",
        content_bytes = request.content.len(),
        enable_ocr = options.enable_ocr,
        "Extraction requested"
    );

    let result = state.orchestrator.analyze(&request.content, &options).await;

    info!(
        name: "api.extract.completed",
        method = %result.extraction_method,
        confidence = result.confidence,
        usable = result.is_usable(),
        "Extraction completed"
    );

    Json(result)
}
