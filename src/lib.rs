//! Todo API — CRUD over HTTP with pluggable storage.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod store;
pub mod todos;

use config::{ServerConfig, StoreKind};
use store::{LibSqlBackend, MemoryStore, TodoStore};

/// Build the configured store backend.
pub async fn open_store(config: &ServerConfig) -> error::Result<Arc<dyn TodoStore>> {
    let store: Arc<dyn TodoStore> = match config.store {
        StoreKind::Sqlite => Arc::new(LibSqlBackend::new_local(&config.db_path).await?),
        StoreKind::Memory => {
            tracing::warn!("Using in-memory store; todos are lost on exit");
            Arc::new(MemoryStore::new())
        }
    };
    Ok(store)
}
