/**
 * Router Assembly
 *
 * Combines the API routes with the shared layers:
 * - `TraceLayer` for request logging through `tracing`
 * - permissive CORS for browser clients
 * - a JSON 404 fallback
 */

use axum::{http::StatusCode, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::backend::error::BackendError;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

async fn not_found() -> BackendError {
    BackendError::handler(StatusCode::NOT_FOUND, "Route not found")
}

/// Create the application router
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = configure_api_routes(Router::new(), &app_state);

    router
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
