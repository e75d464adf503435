/// Task status endpoints
///
/// # Endpoints
///
/// - `GET /api/task_statuses` - List statuses
/// - `POST /api/task_statuses` - Create status
/// - `GET /api/task_statuses/:id` - Show status
/// - `PUT /api/task_statuses/:id` - Update status
/// - `DELETE /api/task_statuses/:id` - Delete status (blocked while in use)
///
/// All endpoints require authentication.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    patch::Patch,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use taskforge_shared::{
    auth::middleware::AuthContext,
    models::{
        task::Task,
        task_status::{CreateTaskStatus, TaskStatus, UpdateTaskStatus},
    },
};
use validator::Validate;

/// Task status wire representation
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusDto {
    /// Status ID
    pub id: i64,

    /// Human-readable name
    pub name: String,

    /// Unique slug used by tasks to reference the status
    pub slug: String,

    /// Creation date, `yyyy-MM-dd`
    pub created_at: NaiveDate,
}

impl From<TaskStatus> for TaskStatusDto {
    fn from(status: TaskStatus) -> Self {
        Self {
            id: status.id,
            name: status.name,
            slug: status.slug,
            created_at: status.created_at.date_naive(),
        }
    }
}

/// Create request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskStatusRequest {
    /// Human-readable name
    #[validate(length(min = 1, message = "Name must not be blank"))]
    pub name: String,

    /// Unique slug
    #[validate(length(min = 1, message = "Slug must not be blank"))]
    pub slug: String,
}

/// Update request with three-state fields
#[derive(Debug, Deserialize, Default)]
pub struct UpdateTaskStatusRequest {
    /// New name
    #[serde(default)]
    pub name: Patch<String>,

    /// New slug
    #[serde(default)]
    pub slug: Patch<String>,
}

/// Lists all task statuses
pub async fn index(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> ApiResult<Json<Vec<TaskStatusDto>>> {
    let statuses = TaskStatus::list(&state.db).await?;
    Ok(Json(statuses.into_iter().map(TaskStatusDto::from).collect()))
}

/// Creates a new task status
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `409 Conflict`: Slug already exists
pub async fn create(
    State(state): State<AppState>,
    _auth: AuthContext,
    Json(req): Json<CreateTaskStatusRequest>,
) -> ApiResult<(StatusCode, Json<TaskStatusDto>)> {
    req.validate()?;

    let status = TaskStatus::create(
        &state.db,
        CreateTaskStatus {
            name: req.name,
            slug: req.slug,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(TaskStatusDto::from(status))))
}

/// Shows a single task status
pub async fn show(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<Json<TaskStatusDto>> {
    let status = TaskStatus::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("TaskStatus not found: {}", id)))?;

    Ok(Json(TaskStatusDto::from(status)))
}

/// Updates a task status
pub async fn update(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTaskStatusRequest>,
) -> ApiResult<Json<TaskStatusDto>> {
    TaskStatus::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("TaskStatus not found: {}", id)))?;

    let mut update = UpdateTaskStatus::default();

    if let Patch::Present(name) = req.name {
        if name.is_empty() {
            return Err(blank_field_error("name"));
        }
        update.name = Some(name);
    }
    if let Patch::Present(slug) = req.slug {
        if slug.is_empty() {
            return Err(blank_field_error("slug"));
        }
        update.slug = Some(slug);
    }

    let status = TaskStatus::update(&state.db, id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("TaskStatus not found: {}", id)))?;

    Ok(Json(TaskStatusDto::from(status)))
}

/// Deletes a task status
///
/// Blocked with 409 while any task references the status.
pub async fn delete(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    TaskStatus::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("TaskStatus not found: {}", id)))?;

    if Task::exists_by_status_id(&state.db, id).await? {
        return Err(ApiError::Conflict(
            "Cannot delete task status: status is in use".to_string(),
        ));
    }

    TaskStatus::delete(&state.db, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

fn blank_field_error(field: &str) -> ApiError {
    ApiError::ValidationError(vec![ValidationErrorDetail {
        field: field.to_string(),
        message: format!("{} must not be blank", field),
    }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_task_status_dto_serialization() {
        let status = TaskStatus {
            id: 2,
            name: "In Progress".to_string(),
            slug: "in_progress".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
        };

        let json = serde_json::to_value(TaskStatusDto::from(status)).unwrap();

        assert_eq!(json["id"], 2);
        assert_eq!(json["name"], "In Progress");
        assert_eq!(json["slug"], "in_progress");
        assert_eq!(json["createdAt"], "2024-01-02");
    }

    #[test]
    fn test_create_request_rejects_blank_fields() {
        let req = CreateTaskStatusRequest {
            name: "".to_string(),
            slug: "draft".to_string(),
        };
        assert!(req.validate().is_err());

        let req = CreateTaskStatusRequest {
            name: "Draft".to_string(),
            slug: "".to_string(),
        };
        assert!(req.validate().is_err());

        let req = CreateTaskStatusRequest {
            name: "Draft".to_string(),
            slug: "draft".to_string(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_update_request_three_states() {
        let req: UpdateTaskStatusRequest =
            serde_json::from_str(r#"{"slug": "updated_slug"}"#).unwrap();

        assert!(req.name.is_absent());
        assert_eq!(req.slug, Patch::Present("updated_slug".to_string()));
    }
}
