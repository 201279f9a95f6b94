//! Route table of the marketplace API

use super::handlers::{self, AppState};
use axum::{Router, routing::get};

/// Liveness probes, stateless
pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/healthz", get(handlers::health_check))
}

/// Status, search, listing and category routes
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/status", get(handlers::status))
        .route("/api/search", get(handlers::search))
        .route(
            "/api/listings",
            get(handlers::list_listings)
                .post(handlers::create_listing)
                .put(handlers::update_listing_status),
        )
        .route(
            "/api/categories",
            get(handlers::list_categories)
                .post(handlers::create_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .with_state(state)
}
