/// Task model and database operations
///
/// Tasks are the central entity: a title plus an optional ordering index and
/// free-form content, exactly one status, an optional assignee, and a set of
/// labels (via the `task_labels` join table).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     title VARCHAR(255) NOT NULL,
///     index INTEGER,
///     content TEXT,
///     status_id BIGINT NOT NULL REFERENCES task_statuses(id) ON DELETE RESTRICT,
///     assignee_id BIGINT REFERENCES users(id) ON DELETE RESTRICT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE task_labels (
///     task_id BIGINT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     label_id BIGINT NOT NULL REFERENCES labels(id) ON DELETE RESTRICT,
///     PRIMARY KEY (task_id, label_id)
/// );
/// ```
///
/// # Filtering
///
/// `TaskFilter` carries the optional search parameters; every supplied
/// condition must hold (logical AND), absent conditions impose no
/// constraint. Title matching is a case-insensitive substring match
/// (`ILIKE`).
///
/// # Example
///
/// ```no_run
/// use taskforge_shared::models::task::{Task, CreateTask, TaskFilter};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     title: "Ship the release".to_string(),
///     index: Some(1),
///     content: None,
///     status_id: 1,
///     assignee_id: None,
///     label_ids: vec![],
/// }).await?;
///
/// let filter = TaskFilter {
///     title_cont: Some("release".to_string()),
///     ..Default::default()
/// };
/// let page = Task::search(&pool, &filter, 10, 0).await?;
/// let total = Task::count_filtered(&pool, &filter).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: i64,

    /// Task title
    pub title: String,

    /// Optional ordering index
    pub index: Option<i32>,

    /// Optional free-form description
    pub content: Option<String>,

    /// Status reference (always present)
    pub status_id: i64,

    /// Optional assignee reference
    pub assignee_id: Option<i64>,

    /// When the task was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new task
///
/// `status_id` and `assignee_id` must already be resolved to existing rows
/// by the caller; `label_ids` likewise holds only resolved label ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Task title
    pub title: String,

    /// Optional ordering index
    pub index: Option<i32>,

    /// Optional description
    pub content: Option<String>,

    /// Resolved status id
    pub status_id: i64,

    /// Resolved assignee id, if any
    pub assignee_id: Option<i64>,

    /// Resolved label ids
    pub label_ids: Vec<i64>,
}

/// Input for updating an existing task
///
/// Only non-None fields will be updated. Optional columns use the
/// double-Option pattern: `Some(None)` clears, `Some(Some(v))` applies.
/// A present `label_ids` replaces the whole label set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New index (use Some(None) to clear)
    pub index: Option<Option<i32>>,

    /// New content (use Some(None) to clear)
    pub content: Option<Option<String>>,

    /// New resolved status id
    pub status_id: Option<i64>,

    /// New resolved assignee id (use Some(None) to unassign)
    pub assignee_id: Option<Option<i64>>,

    /// Replacement label set
    pub label_ids: Option<Vec<i64>>,
}

/// Optional search conditions for task listing
///
/// All supplied conditions are combined with AND.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFilter {
    /// Case-insensitive substring match on title
    pub title_cont: Option<String>,

    /// Exact assignee id
    pub assignee_id: Option<i64>,

    /// Status slug
    pub status_slug: Option<String>,

    /// Task must carry this label
    pub label_id: Option<i64>,
}

impl TaskFilter {
    /// True when no condition is supplied
    ///
    /// An empty filter matches every task; callers use this to choose the
    /// unpaged listing path over the paginated search.
    pub fn is_empty(&self) -> bool {
        self.title_cont.is_none()
            && self.assignee_id.is_none()
            && self.status_slug.is_none()
            && self.label_id.is_none()
    }
}

/// Builds the WHERE clause for a filter, numbering binds from
/// `start_bind`
///
/// Conditions are emitted in a fixed order (title, assignee, status,
/// label); the caller must bind values in the same order.
fn filter_clause(filter: &TaskFilter, start_bind: usize) -> String {
    let mut conditions = Vec::new();
    let mut bind = start_bind;

    if filter.title_cont.is_some() {
        conditions.push(format!("title ILIKE ${}", bind));
        bind += 1;
    }
    if filter.assignee_id.is_some() {
        conditions.push(format!("assignee_id = ${}", bind));
        bind += 1;
    }
    if filter.status_slug.is_some() {
        conditions.push(format!(
            "status_id IN (SELECT id FROM task_statuses WHERE slug = ${})",
            bind
        ));
        bind += 1;
    }
    if filter.label_id.is_some() {
        conditions.push(format!(
            "EXISTS (SELECT 1 FROM task_labels tl WHERE tl.task_id = tasks.id AND tl.label_id = ${})",
            bind
        ));
    }

    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

const TASK_COLUMNS: &str = "id, title, index, content, status_id, assignee_id, created_at";

impl Task {
    /// Creates a new task together with its label set
    ///
    /// The task row and the `task_labels` rows are written in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced row vanished between resolution and
    /// insert (foreign key violation) or the database connection fails.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (title, index, content, status_id, assignee_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            TASK_COLUMNS
        ))
        .bind(data.title)
        .bind(data.index)
        .bind(data.content)
        .bind(data.status_id)
        .bind(data.assignee_id)
        .fetch_one(&mut *tx)
        .await?;

        for label_id in &data.label_ids {
            sqlx::query(
                "INSERT INTO task_labels (task_id, label_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(task.id)
            .bind(label_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE id = $1",
            TASK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists all tasks ordered by id
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks ORDER BY id",
            TASK_COLUMNS
        ))
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Searches tasks matching a filter, with limit/offset pagination
    ///
    /// Results are ordered by id. Bind values must follow the condition
    /// order emitted by the filter clause.
    pub async fn search(
        pool: &PgPool,
        filter: &TaskFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let clause = filter_clause(filter, 1);
        let bind_count = [
            filter.title_cont.is_some(),
            filter.assignee_id.is_some(),
            filter.status_slug.is_some(),
            filter.label_id.is_some(),
        ]
        .iter()
        .filter(|p| **p)
        .count();

        let query = format!(
            "SELECT {} FROM tasks{} ORDER BY id LIMIT ${} OFFSET ${}",
            TASK_COLUMNS,
            clause,
            bind_count + 1,
            bind_count + 2
        );

        let mut q = sqlx::query_as::<_, Task>(&query);

        if let Some(ref title_cont) = filter.title_cont {
            q = q.bind(format!("%{}%", title_cont));
        }
        if let Some(assignee_id) = filter.assignee_id {
            q = q.bind(assignee_id);
        }
        if let Some(ref status_slug) = filter.status_slug {
            q = q.bind(status_slug.clone());
        }
        if let Some(label_id) = filter.label_id {
            q = q.bind(label_id);
        }

        let tasks = q.bind(limit).bind(offset).fetch_all(pool).await?;

        Ok(tasks)
    }

    /// Counts tasks matching a filter
    pub async fn count_filtered(pool: &PgPool, filter: &TaskFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM tasks{}", filter_clause(filter, 1));

        let mut q = sqlx::query_as::<_, (i64,)>(&query);

        if let Some(ref title_cont) = filter.title_cont {
            q = q.bind(format!("%{}%", title_cont));
        }
        if let Some(assignee_id) = filter.assignee_id {
            q = q.bind(assignee_id);
        }
        if let Some(ref status_slug) = filter.status_slug {
            q = q.bind(status_slug.clone());
        }
        if let Some(label_id) = filter.label_id {
            q = q.bind(label_id);
        }

        let (count,) = q.fetch_one(pool).await?;

        Ok(count)
    }

    /// Updates a task, replacing its label set when one is supplied
    ///
    /// Only non-None fields are written. The task row and the label set are
    /// updated in one transaction.
    ///
    /// # Returns
    ///
    /// The updated task if found, None if the task doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE tasks SET id = id");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.index.is_some() {
            bind_count += 1;
            query.push_str(&format!(", index = ${}", bind_count));
        }
        if data.content.is_some() {
            bind_count += 1;
            query.push_str(&format!(", content = ${}", bind_count));
        }
        if data.status_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status_id = ${}", bind_count));
        }
        if data.assignee_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assignee_id = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {}", TASK_COLUMNS));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(index_opt) = data.index {
            q = q.bind(index_opt);
        }
        if let Some(content_opt) = data.content {
            q = q.bind(content_opt);
        }
        if let Some(status_id) = data.status_id {
            q = q.bind(status_id);
        }
        if let Some(assignee_opt) = data.assignee_id {
            q = q.bind(assignee_opt);
        }

        let task = q.fetch_optional(&mut *tx).await?;

        let Some(task) = task else {
            tx.rollback().await?;
            return Ok(None);
        };

        if let Some(label_ids) = data.label_ids {
            sqlx::query("DELETE FROM task_labels WHERE task_id = $1")
                .bind(task.id)
                .execute(&mut *tx)
                .await?;

            for label_id in &label_ids {
                sqlx::query(
                    "INSERT INTO task_labels (task_id, label_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
                )
                .bind(task.id)
                .bind(label_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        Ok(Some(task))
    }

    /// Deletes a task by ID
    ///
    /// Join rows in `task_labels` are removed by the ON DELETE CASCADE.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Gets the label ids attached to a task, ordered by id
    pub async fn label_ids(pool: &PgPool, task_id: i64) -> Result<Vec<i64>, sqlx::Error> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT label_id FROM task_labels WHERE task_id = $1 ORDER BY label_id",
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Checks whether any task is assigned to the given user
    ///
    /// Used as the referential guard before deleting a user.
    pub async fn exists_by_assignee_id(pool: &PgPool, user_id: i64) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM tasks WHERE assignee_id = $1)")
                .bind(user_id)
                .fetch_one(pool)
                .await?;

        Ok(exists)
    }

    /// Checks whether any task references the given status
    ///
    /// Used as the referential guard before deleting a task status.
    pub async fn exists_by_status_id(pool: &PgPool, status_id: i64) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM tasks WHERE status_id = $1)")
                .bind(status_id)
                .fetch_one(pool)
                .await?;

        Ok(exists)
    }

    /// Checks whether any task carries the given label
    ///
    /// Used as the referential guard before deleting a label.
    pub async fn exists_by_label_id(pool: &PgPool, label_id: i64) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM task_labels WHERE label_id = $1)")
                .bind(label_id)
                .fetch_one(pool)
                .await?;

        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter() {
        let filter = TaskFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter_clause(&filter, 1), "");
    }

    #[test]
    fn test_single_condition_filter() {
        let filter = TaskFilter {
            title_cont: Some("fix".to_string()),
            ..Default::default()
        };
        assert!(!filter.is_empty());
        assert_eq!(filter_clause(&filter, 1), " WHERE title ILIKE $1");
    }

    #[test]
    fn test_all_conditions_are_conjunctive() {
        let filter = TaskFilter {
            title_cont: Some("fix".to_string()),
            assignee_id: Some(7),
            status_slug: Some("draft".to_string()),
            label_id: Some(3),
        };

        let clause = filter_clause(&filter, 1);
        assert_eq!(
            clause,
            " WHERE title ILIKE $1 AND assignee_id = $2 \
             AND status_id IN (SELECT id FROM task_statuses WHERE slug = $3) \
             AND EXISTS (SELECT 1 FROM task_labels tl WHERE tl.task_id = tasks.id AND tl.label_id = $4)"
        );
    }

    #[test]
    fn test_bind_numbering_skips_absent_conditions() {
        let filter = TaskFilter {
            assignee_id: Some(7),
            label_id: Some(3),
            ..Default::default()
        };

        let clause = filter_clause(&filter, 1);
        assert!(clause.contains("assignee_id = $1"));
        assert!(clause.contains("tl.label_id = $2"));
    }

    #[test]
    fn test_update_task_default() {
        let update = UpdateTask::default();
        assert!(update.title.is_none());
        assert!(update.index.is_none());
        assert!(update.content.is_none());
        assert!(update.status_id.is_none());
        assert!(update.assignee_id.is_none());
        assert!(update.label_ids.is_none());
    }
}
