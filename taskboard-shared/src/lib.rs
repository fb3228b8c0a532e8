//! # Taskboard Shared Library
//!
//! This crate contains the models, storage layer, cache layer, and business
//! services used by the Taskboard API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their CRUD operations
//! - `services`: Project and task services (authorization + cache coherence)
//! - `auth`: JWT and password utilities, request auth context
//! - `db`: PostgreSQL pool and migrations
//! - `cache`: Best-effort Redis cache and invalidation helpers

pub mod auth;
pub mod cache;
pub mod db;
pub mod models;
pub mod services;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
