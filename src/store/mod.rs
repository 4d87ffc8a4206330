//! Key-value storage abstraction for locally persisted, single-user state.
//!
//! The calculator never touches storage; history, custom presets and alert
//! settings are kept by [`crate::history`] on top of this trait.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod memory;

pub use memory::MemoryStore;

/// String key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync + fmt::Debug {
    /// Value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Insert or replace the value under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Storage full: {0}")]
    StorageFull(String),
    #[error("Not found: {0}")]
    NotFound(String),
}
