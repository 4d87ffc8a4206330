//! SQLite persistence for the local key-value store.
//!
//! This module provides:
//! - Database initialization and migrations
//! - SQLite pragma configuration
//! - A repository implementing [`KeyValueStore`](crate::store::KeyValueStore)

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::Repository;
