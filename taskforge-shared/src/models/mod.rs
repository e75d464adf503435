/// Database models for Taskforge
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts and authentication
/// - `task_status`: Workflow states referenced by tasks via slug
/// - `label`: Task categorization labels (many-to-many with tasks)
/// - `task`: Tasks with status, assignee, labels, and search filtering
///
/// # Example
///
/// ```no_run
/// use taskforge_shared::models::user::{User, CreateUser};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let new_user = CreateUser {
///     email: "user@example.com".to_string(),
///     password_digest: "$argon2id$...".to_string(),
///     first_name: Some("John".to_string()),
///     last_name: None,
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod label;
pub mod task;
pub mod task_status;
pub mod user;
