/**
 * Application State
 *
 * Shared state handed to every request handler. It holds the entity store
 * behind a trait object, so handlers never know whether PostgreSQL or the
 * in-memory store is serving them, plus the loaded configuration.
 *
 * Handlers that only need one part extract it through `FromRef`:
 *
 * ```rust,ignore
 * async fn handler(State(store): State<SharedStore>) { /* ... */ }
 * ```
 */

use std::sync::Arc;

use axum::extract::FromRef;

use crate::backend::store::SharedStore;
use crate::shared::config::AppConfig;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Entity store for every collection
    pub store: SharedStore,
    /// Server configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: SharedStore, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for SharedStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
