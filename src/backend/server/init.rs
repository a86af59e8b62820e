/**
 * Server Initialization
 *
 * Builds the Axum application.
 *
 * # Initialization Process
 *
 * 1. Select the entity store (PostgreSQL or in-memory)
 * 2. Create the application state
 * 3. Create the router with all routes and layers
 */

use axum::Router;

use crate::backend::routes::router::create_router;
use crate::backend::server::config::load_store;
use crate::backend::server::state::AppState;
use crate::backend::store::{SharedStore, StoreResult};
use crate::shared::config::AppConfig;

/// Create and configure the Axum application
///
/// Fails if a database is configured but cannot be reached or migrated.
pub async fn create_app(config: AppConfig) -> StoreResult<Router<()>> {
    tracing::info!("Initializing coursetree backend server");
    let store = load_store(&config).await?;
    Ok(create_app_with_store(config, store))
}

/// Create the application on an already constructed store
///
/// Tests use this to drive the HTTP layer against a `MemoryStore` they can
/// also inspect directly.
pub fn create_app_with_store(config: AppConfig, store: SharedStore) -> Router<()> {
    let app_state = AppState::new(store, config);
    let router = create_router(app_state);
    tracing::info!("Router configured");
    router
}
