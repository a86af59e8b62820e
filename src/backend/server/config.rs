/**
 * Store Selection
 *
 * Picks the entity store from the configuration. With a `DATABASE_URL` the
 * server connects to PostgreSQL and applies the migrations, and a failed
 * connection or migration is returned to the caller so startup aborts.
 * Without a URL it uses the in-memory store and logs a warning.
 */

use std::sync::Arc;
use std::time::Duration;

use crate::backend::store::{MemoryStore, PgStore, SharedStore, StoreResult};
use crate::shared::config::AppConfig;

/// Build the entity store described by `config`
pub async fn load_store(config: &AppConfig) -> StoreResult<SharedStore> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set. Using the in-memory store; data will not persist.");
        return Ok(Arc::new(MemoryStore::new()));
    };

    let timeout = Duration::from_secs(config.db_connect_timeout_secs);
    match PgStore::connect(url, timeout).await {
        Ok(store) => {
            tracing::info!("Using PostgreSQL store");
            Ok(Arc::new(store))
        }
        Err(e) => {
            tracing::error!("Failed to connect to database: {}", e);
            Err(e)
        }
    }
}
