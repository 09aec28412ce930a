//! Route definitions and router setup
//!
//! Configures all API routes and middleware.

mod diagram;
mod interaction;
mod layer;

use crate::config::Settings;
use crate::state::SharedState;
use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::Level;

/// Create the application router with all routes and middleware
pub fn create_router(state: SharedState, settings: &Settings) -> Router {
    // Build CORS layer
    let cors = build_cors_layer(settings);

    // Build tracing/logging layer
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Build middleware stack
    let middleware = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .layer(trace_layer)
        .layer(CompressionLayer::new())
        .layer(cors)
        .propagate_x_request_id();

    // Build the router
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Diagram data
        .route("/api/init", get(diagram::init_view_model))
        .route("/api/reverse-engineer", post(diagram::reverse_engineer))
        .route("/api/sample", post(diagram::load_sample))
        .route("/api/export", get(diagram::export_view_model))
        .route("/api/import", post(diagram::import))
        .route("/api/nodes/positions", post(diagram::update_positions))
        .route("/api/nodes/sizes", post(diagram::update_sizes))

        // Pointer interaction
        .route("/api/hover", post(interaction::hover))
        .route("/api/hover/clear", post(interaction::clear_hover))
        .route("/api/select", post(interaction::select))
        .route("/api/highlight", post(interaction::resolve_highlight))
        .route("/api/drag/start", post(interaction::start_drag))
        .route("/api/drag/stop", post(interaction::stop_drag))
        .route("/api/pan", post(interaction::set_pan_mode))
        .route("/api/lock", post(interaction::toggle_lock))

        // Layer ordering
        .route("/api/layers", get(layer::list_layers))
        .route("/api/layers/add", post(layer::add_item))
        .route("/api/layers/remove", post(layer::remove_item))
        .route("/api/layers/move", post(layer::move_item))
        .route("/api/layers/reorder", post(layer::reorder_items))

        // Apply middleware and state
        .layer(middleware)
        .with_state(state)
}

/// Build CORS layer from settings
fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<_> = settings
        .cors
        .allowed_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    let cors = if origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        CorsLayer::new().allow_origin(origins)
    };

    cors.allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_DISPOSITION])
        .max_age(Duration::from_secs(3600))
}

/// Health check endpoint
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "success": true,
        "message": "Server is running fine.",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}
