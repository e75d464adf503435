/// User endpoints
///
/// # Endpoints
///
/// - `GET /api/users` - List users (authenticated)
/// - `POST /api/users` - Sign up (public)
/// - `GET /api/users/:id` - Show user (authenticated)
/// - `PUT /api/users/:id` - Update own profile (owner only)
/// - `DELETE /api/users/:id` - Delete own profile (owner only, blocked
///   while tasks are assigned to the user)
///
/// Update and delete check existence before ownership, so a non-existent id
/// yields 404 even for a non-owner.

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
    auth::{middleware::AuthContext, ownership::ensure_profile_owner, password},
    models::{
        task::Task,
        user::{CreateUser, UpdateUser, User},
    },
};
use validator::{Validate, ValidateEmail};

/// User wire representation
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    /// User ID
    pub id: i64,

    /// Email address
    pub email: String,

    /// First name
    pub first_name: Option<String>,

    /// Last name
    pub last_name: Option<String>,

    /// Creation date, `yyyy-MM-dd`
    pub created_at: NaiveDate,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: user.created_at.date_naive(),
        }
    }
}

/// Create (signup) request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Plaintext password, hashed before storage
    #[validate(length(min = 3, message = "Password must be at least 3 characters"))]
    pub password: String,

    /// Optional first name
    pub first_name: Option<String>,

    /// Optional last name
    pub last_name: Option<String>,
}

/// Update request with three-state fields
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    /// New email address
    #[serde(default)]
    pub email: Patch<String>,

    /// New plaintext password; blank values are ignored
    #[serde(default)]
    pub password: Patch<String>,

    /// New first name (null clears)
    #[serde(default)]
    pub first_name: Patch<Option<String>>,

    /// New last name (null clears)
    #[serde(default)]
    pub last_name: Patch<Option<String>>,
}

/// Lists all users
pub async fn index(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> ApiResult<Json<Vec<UserDto>>> {
    let users = User::list(&state.db).await?;
    Ok(Json(users.into_iter().map(UserDto::from).collect()))
}

/// Creates a new user (public signup)
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `409 Conflict`: Email already exists
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserDto>)> {
    req.validate()?;

    let password_digest = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            password_digest,
            first_name: req.first_name,
            last_name: req.last_name,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

/// Shows a single user
pub async fn show(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<Json<UserDto>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User not found: {}", id)))?;

    Ok(Json(UserDto::from(user)))
}

/// Updates a user's own profile
///
/// Existence is checked before ownership: a missing id is 404 regardless of
/// who asks; an existing id updated by a non-owner is 403.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserDto>> {
    let target = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User not found: {}", id)))?;

    ensure_profile_owner(&auth, &target)?;

    let mut update = UpdateUser::default();

    if let Patch::Present(email) = req.email {
        if !email.validate_email() {
            return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
                field: "email".to_string(),
                message: "Invalid email format".to_string(),
            }]));
        }
        update.email = Some(email);
    }

    // Re-hash only when a non-blank password was supplied
    if let Patch::Present(password) = req.password {
        if !password.trim().is_empty() {
            if password.len() < 3 {
                return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
                    field: "password".to_string(),
                    message: "Password must be at least 3 characters".to_string(),
                }]));
            }
            update.password_digest = Some(password::hash_password(&password)?);
        }
    }

    if let Patch::Present(first_name) = req.first_name {
        update.first_name = Some(first_name);
    }
    if let Patch::Present(last_name) = req.last_name {
        update.last_name = Some(last_name);
    }

    let user = User::update(&state.db, id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User not found: {}", id)))?;

    Ok(Json(UserDto::from(user)))
}

/// Deletes a user's own profile
///
/// Blocked with 409 while any task references the user as assignee.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let target = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User not found: {}", id)))?;

    ensure_profile_owner(&auth, &target)?;

    if Task::exists_by_assignee_id(&state.db, id).await? {
        return Err(ApiError::Conflict(
            "Cannot delete user: user has assigned tasks".to_string(),
        ));
    }

    User::delete(&state.db, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_user_dto_serialization() {
        let user = User {
            id: 1,
            first_name: Some("John".to_string()),
            last_name: Some("Doe".to_string()),
            email: "john@example.com".to_string(),
            password_digest: "digest".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap(),
        };

        let json = serde_json::to_value(UserDto::from(user)).unwrap();

        assert_eq!(json["id"], 1);
        assert_eq!(json["email"], "john@example.com");
        assert_eq!(json["firstName"], "John");
        assert_eq!(json["lastName"], "Doe");
        assert_eq!(json["createdAt"], "2024-03-15");
        // The password digest never reaches the wire
        assert!(json.get("passwordDigest").is_none());
    }

    #[test]
    fn test_create_request_validation() {
        let req = CreateUserRequest {
            email: "not-an-email".to_string(),
            password: "qwerty".to_string(),
            first_name: None,
            last_name: None,
        };
        assert!(req.validate().is_err());

        let req = CreateUserRequest {
            email: "user@example.com".to_string(),
            password: "ab".to_string(),
            first_name: None,
            last_name: None,
        };
        assert!(req.validate().is_err());

        let req = CreateUserRequest {
            email: "user@example.com".to_string(),
            password: "qwerty".to_string(),
            first_name: Some("John".to_string()),
            last_name: None,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_update_request_three_states() {
        let req: UpdateUserRequest =
            serde_json::from_str(r#"{"firstName": null, "email": "new@example.com"}"#).unwrap();

        assert_eq!(req.first_name, Patch::Present(None));
        assert_eq!(req.email, Patch::Present("new@example.com".to_string()));
        assert!(req.last_name.is_absent());
        assert!(req.password.is_absent());
    }
}
