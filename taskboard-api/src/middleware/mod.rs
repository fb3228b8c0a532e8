/// API middleware
///
/// - `security`: OWASP-style security headers on every response
/// - `rate_limit`: Redis-backed per-user fixed-window rate limiting

pub mod rate_limit;
pub mod security;
