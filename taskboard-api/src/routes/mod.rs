/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh, logout, me)
/// - `projects`: Project CRUD
/// - `tasks`: Task CRUD, statistics, and the cross-project listing

pub mod auth;
pub mod health;
pub mod projects;
pub mod tasks;
