//! # Persistence
//!
//! Implementations of the `KeyValueStore` trait and helpers for building keys.

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_store;

use std::sync::Arc;

use crate::domain::config::DatabaseConfig;
use crate::domain::traits::KeyValueStore;

/// Join key parts with `:`, e.g. `guild:hash:!room:example.org`.
pub fn make_key(parts: &[&str]) -> String {
    parts.join(":")
}

/// Build the store selected by the config, falling back to memory.
pub async fn open(config: &DatabaseConfig) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    match &config.url {
        #[cfg(feature = "redis")]
        Some(url) => Ok(Arc::new(redis_store::RedisStore::connect(url).await?)),
        #[cfg(not(feature = "redis"))]
        Some(url) => {
            tracing::warn!(
                "database.url is set to {} but the redis feature is disabled; using memory store",
                url
            );
            Ok(Arc::new(memory::MemoryStore::new()))
        }
        None => {
            tracing::warn!("No database configured; guild settings will not survive a restart");
            Ok(Arc::new(memory::MemoryStore::new()))
        }
    }
}
