//! Asterism Service Library
//!
//! HTTP handlers, router and types for the constellation position service.
//! This library is used by both the asterism-service binary and integration tests.

pub mod handlers;

use std::sync::Arc;

use asterism::SkyService;
use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Application state shared across handlers.
pub struct AppState {
    /// Constellation resolver holding the star dataset.
    pub sky: SkyService,
}

/// Build the application router.
///
/// Every request is traced and CORS is fully permissive.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/constellation", get(handlers::get_constellation))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

// Re-export commonly used types for convenience
pub use handlers::{ConstellationQuery, ConstellationResult, ErrorResponse, MISSING_PARAMETERS};
