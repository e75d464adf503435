/// Authentication endpoint
///
/// # Endpoints
///
/// - `POST /api/login` - Exchange credentials for a bearer token
///
/// The username is the user's email address. On success the response body
/// is the raw token string; clients send it back as
/// `Authorization: Bearer <token>`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Json};
use serde::Deserialize;
use taskforge_shared::{
    auth::{jwt, password},
    models::user::User,
};

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address used as the login name
    pub username: String,

    /// Password
    pub password: String,
}

/// Login handler
///
/// # Endpoint
///
/// ```text
/// POST /api/login
/// Content-Type: application/json
///
/// {
///   "username": "user@example.com",
///   "password": "qwerty"
/// }
/// ```
///
/// # Response
///
/// `200 OK` with the bearer token as a plain string body.
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<String> {
    // Find user by email; unknown users get the same error as a bad
    // password so the response doesn't leak which emails exist
    let user = User::find_by_email(&state.db, &req.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_digest)?;
    if !valid {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let claims = jwt::Claims::new(user.id, user.email.clone());
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(token)
}
