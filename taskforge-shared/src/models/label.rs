/// Label model and database operations
///
/// Labels categorize tasks through a many-to-many relationship backed by
/// the `task_labels` join table. Label names are unique.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Label model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Label {
    /// Unique label ID
    pub id: i64,

    /// Unique label name
    pub name: String,

    /// When the label was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLabel {
    /// Unique label name
    pub name: String,
}

/// Input for updating a label
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLabel {
    /// New name
    pub name: Option<String>,
}

impl Label {
    /// Creates a new label
    ///
    /// # Errors
    ///
    /// Returns an error if the name already exists (unique constraint
    /// violation) or the database connection fails.
    pub async fn create(pool: &PgPool, data: CreateLabel) -> Result<Self, sqlx::Error> {
        let label = sqlx::query_as::<_, Label>(
            r#"
            INSERT INTO labels (name)
            VALUES ($1)
            RETURNING id, name, created_at
            "#,
        )
        .bind(data.name)
        .fetch_one(pool)
        .await?;

        Ok(label)
    }

    /// Finds a label by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let label =
            sqlx::query_as::<_, Label>("SELECT id, name, created_at FROM labels WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;

        Ok(label)
    }

    /// Finds a label by name
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Self>, sqlx::Error> {
        let label =
            sqlx::query_as::<_, Label>("SELECT id, name, created_at FROM labels WHERE name = $1")
                .bind(name)
                .fetch_optional(pool)
                .await?;

        Ok(label)
    }

    /// Lists all labels ordered by id
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let labels =
            sqlx::query_as::<_, Label>("SELECT id, name, created_at FROM labels ORDER BY id")
                .fetch_all(pool)
                .await?;

        Ok(labels)
    }

    /// Resolves a set of label ids to labels, silently skipping ids with no
    /// matching row
    pub async fn find_by_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<Self>, sqlx::Error> {
        let labels = sqlx::query_as::<_, Label>(
            "SELECT id, name, created_at FROM labels WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;

        Ok(labels)
    }

    /// Updates a label
    ///
    /// Returns the updated label if found, None if it doesn't exist.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateLabel,
    ) -> Result<Option<Self>, sqlx::Error> {
        let Some(name) = data.name else {
            return Self::find_by_id(pool, id).await;
        };

        let label = sqlx::query_as::<_, Label>(
            "UPDATE labels SET name = $2 WHERE id = $1 RETURNING id, name, created_at",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(label)
    }

    /// Deletes a label by ID
    ///
    /// The caller is responsible for checking that no task references the
    /// label before issuing the delete (see `Task::exists_by_label_id`).
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM labels WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_label_default() {
        let update = UpdateLabel::default();
        assert!(update.name.is_none());
    }
}
