//! Axum router configuration with middleware.
//!
//! Chat endpoints are under `/api/`, the realtime push channel under
//! `/ws/events`. Middleware: CORS, tracing.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/chat", post(handlers::chat::send_chat))
        .route("/history/{user_id}", get(handlers::history::get_history))
        .route("/vision", post(handlers::vision::analyze_frame))
        .route("/design", post(handlers::design::generate_design));

    Router::new()
        .nest("/api", api_routes)
        .route("/ws/events", get(handlers::ws::ws_handler))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
