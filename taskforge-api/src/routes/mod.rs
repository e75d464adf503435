/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Login endpoint
/// - `users`: User accounts (public signup, owner-only mutation)
/// - `task_statuses`: Workflow states
/// - `labels`: Task labels
/// - `tasks`: Tasks with filtering and pagination

pub mod auth;
pub mod health;
pub mod labels;
pub mod task_statuses;
pub mod tasks;
pub mod users;
