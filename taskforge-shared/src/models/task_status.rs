/// TaskStatus model and database operations
///
/// Task statuses are the workflow states a task can be in (e.g. "Draft",
/// "In Progress"). On the wire a task references its status by `slug`, a
/// short URL-safe identifier, never by numeric id.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE task_statuses (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     slug VARCHAR(255) NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// TaskStatus model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskStatus {
    /// Unique status ID
    pub id: i64,

    /// Human-readable name (e.g. "In Progress")
    pub name: String,

    /// Unique URL-safe slug (e.g. "in_progress")
    pub slug: String,

    /// When the status was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new task status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskStatus {
    /// Human-readable name
    pub name: String,

    /// Unique slug
    pub slug: String,
}

/// Input for updating a task status
///
/// Only non-None fields will be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTaskStatus {
    /// New name
    pub name: Option<String>,

    /// New slug
    pub slug: Option<String>,
}

impl TaskStatus {
    /// Creates a new task status
    ///
    /// # Errors
    ///
    /// Returns an error if the slug already exists (unique constraint
    /// violation) or the database connection fails.
    pub async fn create(pool: &PgPool, data: CreateTaskStatus) -> Result<Self, sqlx::Error> {
        let status = sqlx::query_as::<_, TaskStatus>(
            r#"
            INSERT INTO task_statuses (name, slug)
            VALUES ($1, $2)
            RETURNING id, name, slug, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.slug)
        .fetch_one(pool)
        .await?;

        Ok(status)
    }

    /// Finds a task status by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let status = sqlx::query_as::<_, TaskStatus>(
            "SELECT id, name, slug, created_at FROM task_statuses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(status)
    }

    /// Finds a task status by slug
    ///
    /// This is the resolution used when a task create/update payload
    /// references a status on the wire.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        let status = sqlx::query_as::<_, TaskStatus>(
            "SELECT id, name, slug, created_at FROM task_statuses WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(pool)
        .await?;

        Ok(status)
    }

    /// Lists all task statuses ordered by id
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let statuses = sqlx::query_as::<_, TaskStatus>(
            "SELECT id, name, slug, created_at FROM task_statuses ORDER BY id",
        )
        .fetch_all(pool)
        .await?;

        Ok(statuses)
    }

    /// Updates a task status
    ///
    /// Returns the updated status if found, None if it doesn't exist.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateTaskStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        if data.name.is_none() && data.slug.is_none() {
            return Self::find_by_id(pool, id).await;
        }

        let mut query = String::from("UPDATE task_statuses SET id = id");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.slug.is_some() {
            bind_count += 1;
            query.push_str(&format!(", slug = ${}", bind_count));
        }

        query.push_str(" WHERE id = $1 RETURNING id, name, slug, created_at");

        let mut q = sqlx::query_as::<_, TaskStatus>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(slug) = data.slug {
            q = q.bind(slug);
        }

        let status = q.fetch_optional(pool).await?;

        Ok(status)
    }

    /// Deletes a task status by ID
    ///
    /// The caller is responsible for checking that no task references the
    /// status before issuing the delete (see `Task::exists_by_status_id`).
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_statuses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
