/// Authentication endpoints
///
/// - `POST /api/auth/signup` - create an account
/// - `POST /api/auth/login` - exchange email and password for a JWT
/// - `GET /api/auth/me` - profile of the bearer of a JWT

use crate::{
    app::{AppState, AuthUser},
    error::{ApiError, ApiJson, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use synergyhub_shared::{
    auth::{jwt, password},
    models::user::{NewUser, UserProfile},
};
use validator::Validate;

/// Signup request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct SignupRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,

    pub job_title: String,
    pub department: String,
}

/// Login request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: &'static str,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserProfile,
}

/// Registers a new user
///
/// ```text
/// POST /api/auth/signup
///
/// { "username": "ada", "email": "ada@example.com", "password": "...",
///   "jobTitle": "Engineer", "department": "R&D" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: a required field is missing, or the username or
///   email is already taken
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(mut req): ApiJson<SignupRequest>,
) -> ApiResult<(StatusCode, Json<SignupResponse>)> {
    req.username = req.username.trim().to_string();
    req.email = req.email.trim().to_string();
    req.validate()?;

    let password_hash = password::hash_password(&req.password)?;
    let new_user = NewUser::new(&req.username, &req.email, password_hash)
        .with_profile(&req.job_title, &req.department);

    let user = state
        .stores
        .users
        .create_user(new_user)
        .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User created");

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User created",
            user: user.profile(),
        }),
    ))
}

/// Authenticates a user and issues a 7-day token
///
/// # Errors
///
/// - `400 Bad Request`: email or password missing
/// - `401 Unauthorized`: unknown email or wrong password
pub async fn login(
    State(state): State<AppState>,
    ApiJson(mut req): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.email = req.email.trim().to_string();
    req.validate()?;

    let invalid = || ApiError::Unauthorized("Invalid credentials".to_string());

    let user = state
        .stores
        .users
        .find_user_by_email(&req.email)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "Password mismatch");
        return Err(invalid());
    }

    let token = jwt::create_token(&jwt::Claims::new(user.id), state.jwt_secret())?;

    Ok(Json(LoginResponse {
        message: "Authenticated",
        token,
        user: user.profile(),
    }))
}

/// Returns the authenticated user's profile
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<MeResponse>> {
    let user = state
        .stores
        .users
        .find_user(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))?;

    Ok(Json(MeResponse {
        user: user.profile(),
    }))
}
