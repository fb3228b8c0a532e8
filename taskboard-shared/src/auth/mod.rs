/// Authentication utilities
///
/// # Modules
///
/// - `jwt`: Token generation and validation (HS256 access/refresh tokens)
/// - `password`: Argon2id password hashing and verification
/// - `middleware`: Request auth context and extractor

pub mod jwt;
pub mod middleware;
pub mod password;
