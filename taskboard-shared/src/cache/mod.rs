/// Best-effort caching for derived aggregates
///
/// The cache is a side-channel performance optimization: the system is
/// correct with it absent, disabled, or failing. Two entries exist, both
/// with a 60 second TTL:
///
/// ```text
/// projects:<userId>            serialized project list for that user
/// stats:<projectId>:<userId>   serialized task-status histogram
/// ```
///
/// # Modules
///
/// - `client`: optional Redis wrapper; every operation is advisory
/// - `keys`: key builders and the shared TTL
/// - `invalidation`: delete-based invalidation used by both services

pub mod client;
pub mod invalidation;
pub mod keys;

// Re-export common types for convenience
pub use client::{Cache, CacheConfig};
