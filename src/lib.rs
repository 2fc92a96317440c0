//! Thin HTTP relay between the browser chat client and the Gemini API.

pub mod agent;
pub mod config;
pub mod errors;
pub mod models;
pub mod routes;
pub mod service;

use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::routes::api_routes::{ask_handler, not_found_handler};
use crate::service::relay_service::RelayService;

/// Builds the relay router around an already-wired service.
pub fn build_router(service: RelayService) -> Router {
    Router::new()
        .route("/ask", post(ask_handler))
        .fallback(not_found_handler)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
