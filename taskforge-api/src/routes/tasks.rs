/// Task endpoints
///
/// # Endpoints
///
/// - `GET /api/tasks` - List tasks, optionally filtered and paginated
/// - `POST /api/tasks` - Create task
/// - `GET /api/tasks/:id` - Show task
/// - `PUT /api/tasks/:id` - Update task (three-state partial update)
/// - `DELETE /api/tasks/:id` - Delete task
///
/// All endpoints require authentication.
///
/// # Filtering and pagination
///
/// `GET /api/tasks` accepts `titleCont`, `assigneeId`, `status` (slug), and
/// `labelId` query parameters, combined with AND. With no filter parameter
/// the full unpaged listing is returned; with at least one, results are
/// paginated with a 1-based `page` parameter (default 1) and a fixed page
/// size of 10. Both paths set the `X-Total-Count` response header to the
/// total number of matching tasks.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    patch::Patch,
};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use taskforge_shared::{
    auth::middleware::AuthContext,
    models::{
        label::Label,
        task::{CreateTask, Task, TaskFilter, UpdateTask},
        task_status::TaskStatus,
        user::User,
    },
};
use validator::Validate;

/// Page size for filtered task listings
const PAGE_SIZE: i64 = 10;

/// Task wire representation
///
/// `status` carries the status slug; `assignee_id` is omitted when the task
/// is unassigned.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
    /// Task ID
    pub id: i64,

    /// Title
    pub title: String,

    /// Optional ordering index
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<i32>,

    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Assignee id, omitted when unassigned
    #[serde(rename = "assignee_id", skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<i64>,

    /// Status slug
    pub status: String,

    /// Attached label ids
    pub task_label_ids: Vec<i64>,

    /// Creation date, `yyyy-MM-dd`
    pub created_at: NaiveDate,
}

/// Create request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    /// Title, must not be blank
    #[validate(length(min = 1, message = "Title must not be blank"))]
    pub title: String,

    /// Optional ordering index
    pub index: Option<i32>,

    /// Optional description
    pub content: Option<String>,

    /// Status slug, resolved to an existing status
    pub status: String,

    /// Optional assignee id
    #[serde(rename = "assignee_id")]
    pub assignee_id: Option<i64>,

    /// Optional label ids
    pub task_label_ids: Option<Vec<i64>>,
}

/// Update request with three-state fields
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    /// New title
    #[serde(default)]
    pub title: Patch<String>,

    /// New index (null clears)
    #[serde(default)]
    pub index: Patch<Option<i32>>,

    /// New content (null clears)
    #[serde(default)]
    pub content: Patch<Option<String>>,

    /// New status slug; must resolve or the whole update fails
    #[serde(default)]
    pub status: Patch<String>,

    /// New assignee id (null unassigns)
    #[serde(default, rename = "assignee_id")]
    pub assignee_id: Patch<Option<i64>>,

    /// Replacement label set (null clears all labels)
    #[serde(default)]
    pub task_label_ids: Patch<Option<Vec<i64>>>,
}

/// Filter and pagination query parameters
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TaskQuery {
    /// Case-insensitive substring match on title
    pub title_cont: Option<String>,

    /// Exact assignee id
    pub assignee_id: Option<i64>,

    /// Status slug
    pub status: Option<String>,

    /// Task must carry this label
    pub label_id: Option<i64>,

    /// 1-based page number, used only on the filtered path
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

impl TaskQuery {
    fn filter(&self) -> TaskFilter {
        TaskFilter {
            title_cont: self.title_cont.clone(),
            assignee_id: self.assignee_id,
            status_slug: self.status.clone(),
            label_id: self.label_id,
        }
    }
}

/// Converts a task row into its wire representation
///
/// The status slug and label ids are fetched explicitly; the status row is
/// guaranteed by the NOT NULL foreign key.
async fn to_dto(pool: &PgPool, task: Task) -> ApiResult<TaskDto> {
    let status = TaskStatus::find_by_id(pool, task.status_id)
        .await?
        .ok_or_else(|| {
            ApiError::InternalError(format!("Task {} references missing status", task.id))
        })?;

    let label_ids = Task::label_ids(pool, task.id).await?;

    Ok(TaskDto {
        id: task.id,
        title: task.title,
        index: task.index,
        content: task.content,
        assignee_id: task.assignee_id,
        status: status.slug,
        task_label_ids: label_ids,
        created_at: task.created_at.date_naive(),
    })
}

async fn to_dtos(pool: &PgPool, tasks: Vec<Task>) -> ApiResult<Vec<TaskDto>> {
    let mut dtos = Vec::with_capacity(tasks.len());
    for task in tasks {
        dtos.push(to_dto(pool, task).await?);
    }
    Ok(dtos)
}

fn total_count_header(total: i64) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("X-Total-Count", HeaderValue::from(total.max(0) as u64));
    headers
}

/// Lists tasks, optionally filtered and paginated
///
/// An empty filter bag returns the complete unpaged listing; any supplied
/// parameter switches to the paginated search. Both paths report the total
/// matching count in `X-Total-Count`.
pub async fn index(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(query): Query<TaskQuery>,
) -> ApiResult<(HeaderMap, Json<Vec<TaskDto>>)> {
    let filter = query.filter();

    if filter.is_empty() {
        let tasks = Task::list(&state.db).await?;
        let total = tasks.len() as i64;
        let dtos = to_dtos(&state.db, tasks).await?;
        return Ok((total_count_header(total), Json(dtos)));
    }

    let page = query.page.max(1);
    let offset = (page - 1) * PAGE_SIZE;

    let tasks = Task::search(&state.db, &filter, PAGE_SIZE, offset).await?;
    let total = Task::count_filtered(&state.db, &filter).await?;
    let dtos = to_dtos(&state.db, tasks).await?;

    Ok((total_count_header(total), Json(dtos)))
}

/// Shows a single task
pub async fn show(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<Json<TaskDto>> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Task not found: {}", id)))?;

    Ok(Json(to_dto(&state.db, task).await?))
}

/// Creates a new task
///
/// The status slug must resolve to an existing status; an unresolvable
/// assignee id leaves the task unassigned, and unresolvable label ids are
/// skipped.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `404 Not Found`: Status slug doesn't resolve
pub async fn create(
    State(state): State<AppState>,
    _auth: AuthContext,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskDto>)> {
    req.validate()?;

    let status = TaskStatus::find_by_slug(&state.db, &req.status)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("TaskStatus not found with slug: {}", req.status))
        })?;

    let assignee_id = resolve_assignee(&state.db, req.assignee_id).await?;
    let label_ids = resolve_labels(&state.db, req.task_label_ids.unwrap_or_default()).await?;

    let task = Task::create(
        &state.db,
        CreateTask {
            title: req.title,
            index: req.index,
            content: req.content,
            status_id: status.id,
            assignee_id,
            label_ids,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(to_dto(&state.db, task).await?)))
}

/// Updates a task
///
/// Absent fields are left unchanged. A present status slug must resolve or
/// the whole update fails; an unresolvable assignee id unassigns; a present
/// label list replaces the label set, skipping unresolvable ids.
pub async fn update(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskDto>> {
    Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Task not found: {}", id)))?;

    let mut update = UpdateTask::default();

    if let Patch::Present(title) = req.title {
        if title.is_empty() {
            return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
                field: "title".to_string(),
                message: "Title must not be blank".to_string(),
            }]));
        }
        update.title = Some(title);
    }
    if let Patch::Present(index) = req.index {
        update.index = Some(index);
    }
    if let Patch::Present(content) = req.content {
        update.content = Some(content);
    }
    if let Patch::Present(slug) = req.status {
        let status = TaskStatus::find_by_slug(&state.db, &slug)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!("TaskStatus not found with slug: {}", slug))
            })?;
        update.status_id = Some(status.id);
    }
    if let Patch::Present(assignee) = req.assignee_id {
        update.assignee_id = Some(resolve_assignee(&state.db, assignee).await?);
    }
    if let Patch::Present(label_ids) = req.task_label_ids {
        update.label_ids = Some(resolve_labels(&state.db, label_ids.unwrap_or_default()).await?);
    }

    let task = Task::update(&state.db, id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Task not found: {}", id)))?;

    Ok(Json(to_dto(&state.db, task).await?))
}

/// Deletes a task
pub async fn delete(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Task not found: {}", id)))?;

    Task::delete(&state.db, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Resolves an assignee id to an existing user id, unassigning when the id
/// doesn't resolve
async fn resolve_assignee(pool: &PgPool, assignee_id: Option<i64>) -> ApiResult<Option<i64>> {
    let Some(id) = assignee_id else {
        return Ok(None);
    };

    Ok(User::find_by_id(pool, id).await?.map(|user| user.id))
}

/// Resolves label ids to existing labels, skipping ids with no matching row
async fn resolve_labels(pool: &PgPool, label_ids: Vec<i64>) -> ApiResult<Vec<i64>> {
    if label_ids.is_empty() {
        return Ok(Vec::new());
    }

    let labels = Label::find_by_ids(pool, &label_ids).await?;
    Ok(labels.into_iter().map(|label| label.id).collect())
}
