use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::auth::extractor::ActiveUser;
use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, verify_password, MIN_PASSWORD_LENGTH};
use crate::errors::AppError;
use crate::models::user::{NewUser, UpdateUser, UserResponse};
use crate::state::AppState;
use crate::users::repository;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMeRequest {
    #[validate(email)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

fn issue_token(state: &AppState, user: UserResponse) -> Result<TokenResponse, AppError> {
    let access_token = generate_access_token(user.id, &user.username, &state.jwt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Token generation failed: {e}")))?;
    Ok(TokenResponse {
        access_token,
        token_type: "bearer",
        expires_in: state.jwt.expires_in_secs(),
        user,
    })
}

/// POST /api/v1/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    req.validate()?;
    if req.password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }

    if repository::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }
    if repository::find_by_username(&state.db, &req.username).await?.is_some() {
        return Err(AppError::Conflict("Username already taken".to_string()));
    }

    let hashed_password = hash_password(&req.password)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {e}")))?;

    let user = repository::create(
        &state.db,
        &NewUser {
            email: req.email,
            username: req.username,
            hashed_password,
        },
    )
    .await?;

    info!("Registered user {} ({})", user.id, user.username);
    let response = issue_token(&state, user.into())?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let invalid = || AppError::Unauthorized("Incorrect username or password".into());

    let user = repository::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&req.password, &user.hashed_password)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(invalid());
    }

    if !user.is_active {
        return Err(AppError::Forbidden("Inactive user".into()));
    }

    Ok(Json(issue_token(&state, user.into())?))
}

/// GET /api/v1/auth/me
pub async fn handle_me(ActiveUser(user): ActiveUser) -> Json<UserResponse> {
    Json(user.into())
}

/// PUT /api/v1/auth/me
pub async fn handle_update_me(
    State(state): State<AppState>,
    ActiveUser(me): ActiveUser,
    Json(req): Json<UpdateMeRequest>,
) -> Result<Json<UserResponse>, AppError> {
    req.validate()?;

    if let Some(email) = &req.email {
        if let Some(existing) = repository::find_by_email(&state.db, email).await? {
            if existing.id != me.id {
                return Err(AppError::Conflict("Email already registered".to_string()));
            }
        }
    }

    let update = UpdateUser {
        email: req.email,
        ..UpdateUser::default()
    };
    repository::update(&state.db, me.id, &update)
        .await?
        .map(|u| Json(u.into()))
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}
