/// Label endpoints
///
/// # Endpoints
///
/// - `GET /api/labels` - List labels
/// - `POST /api/labels` - Create label
/// - `GET /api/labels/:id` - Show label
/// - `PUT /api/labels/:id` - Update label
/// - `DELETE /api/labels/:id` - Delete label (blocked while in use)
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
        label::{CreateLabel, Label, UpdateLabel},
        task::Task,
    },
};
use validator::Validate;

/// Label wire representation
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelDto {
    /// Label ID
    pub id: i64,

    /// Unique label name
    pub name: String,

    /// Creation date, `yyyy-MM-dd`
    pub created_at: NaiveDate,
}

impl From<Label> for LabelDto {
    fn from(label: Label) -> Self {
        Self {
            id: label.id,
            name: label.name,
            created_at: label.created_at.date_naive(),
        }
    }
}

/// Create request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLabelRequest {
    /// Label name, 3 to 1000 characters
    #[validate(length(min = 3, max = 1000, message = "Name must be 3 to 1000 characters"))]
    pub name: String,
}

/// Update request with a three-state name field
#[derive(Debug, Deserialize, Default)]
pub struct UpdateLabelRequest {
    /// New name, 3 to 1000 characters
    #[serde(default)]
    pub name: Patch<String>,
}

/// Lists all labels
pub async fn index(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> ApiResult<Json<Vec<LabelDto>>> {
    let labels = Label::list(&state.db).await?;
    Ok(Json(labels.into_iter().map(LabelDto::from).collect()))
}

/// Creates a new label
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `409 Conflict`: Name already exists
pub async fn create(
    State(state): State<AppState>,
    _auth: AuthContext,
    Json(req): Json<CreateLabelRequest>,
) -> ApiResult<(StatusCode, Json<LabelDto>)> {
    req.validate()?;

    let label = Label::create(&state.db, CreateLabel { name: req.name }).await?;

    Ok((StatusCode::CREATED, Json(LabelDto::from(label))))
}

/// Shows a single label
pub async fn show(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<Json<LabelDto>> {
    let label = Label::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Label not found: {}", id)))?;

    Ok(Json(LabelDto::from(label)))
}

/// Updates a label
pub async fn update(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<i64>,
    Json(req): Json<UpdateLabelRequest>,
) -> ApiResult<Json<LabelDto>> {
    Label::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Label not found: {}", id)))?;

    let mut update = UpdateLabel::default();

    if let Patch::Present(name) = req.name {
        if name.len() < 3 || name.len() > 1000 {
            return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
                field: "name".to_string(),
                message: "Name must be 3 to 1000 characters".to_string(),
            }]));
        }
        update.name = Some(name);
    }

    let label = Label::update(&state.db, id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Label not found: {}", id)))?;

    Ok(Json(LabelDto::from(label)))
}

/// Deletes a label
///
/// Blocked with 409 while any task carries the label.
pub async fn delete(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    Label::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Label not found: {}", id)))?;

    if Task::exists_by_label_id(&state.db, id).await? {
        return Err(ApiError::Conflict(
            "Cannot delete label: label is in use".to_string(),
        ));
    }

    Label::delete(&state.db, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_label_dto_serialization() {
        let label = Label {
            id: 3,
            name: "bug".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
        };

        let json = serde_json::to_value(LabelDto::from(label)).unwrap();

        assert_eq!(json["id"], 3);
        assert_eq!(json["name"], "bug");
        assert_eq!(json["createdAt"], "2024-05-01");
    }

    #[test]
    fn test_create_request_length_bounds() {
        let req = CreateLabelRequest {
            name: "ab".to_string(),
        };
        assert!(req.validate().is_err());

        let req = CreateLabelRequest {
            name: "bug".to_string(),
        };
        assert!(req.validate().is_ok());

        let req = CreateLabelRequest {
            name: "x".repeat(1001),
        };
        assert!(req.validate().is_err());
    }
}
