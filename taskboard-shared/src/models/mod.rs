/// Database models for Taskboard
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: Accounts, roles, and summary identities
/// - `project`: Projects with owner/member sets and lifecycle status
/// - `task`: Tasks with assignees, status, priority, and the stats
///   aggregation

pub mod project;
pub mod task;
pub mod user;
