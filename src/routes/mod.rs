//! Router assembly: HTTP endpoints, WebSocket upgrade, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - JSON API under `/api/v1/...`
/// - CORS (allow any origin/method/headers); tighten for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/classify", post(http::http_post_classify))
        .route("/api/v1/classify/samples", get(http::http_get_classify_samples))
        .route("/api/v1/generate", post(http::http_post_generate))
        .route("/api/v1/score", post(http::http_post_score))
        .route("/api/v1/emotion", post(http::http_post_emotion))
        .route("/api/v1/annotate", post(http::http_post_annotate))
        .route("/api/v1/translate", post(http::http_post_translate))
        .route("/api/v1/translate/random", get(http::http_get_translate_random))
        .route("/api/v1/pinyin", post(http::http_post_pinyin))
        .route("/api/v1/meter", post(http::http_post_meter))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
