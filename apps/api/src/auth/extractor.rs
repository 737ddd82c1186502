//! Bearer-token extractor for Axum handlers.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::auth::jwt::validate_token;
use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;
use crate::users;

/// Authenticated user taken from `Authorization: Bearer <token>`.
///
/// Add it as a handler argument to require a valid token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Unauthorized("Invalid Authorization format. Expected: Bearer <token>".into())
        })?;

        let claims = validate_token(token, &state.jwt)
            .map_err(|_| AppError::Unauthorized("Could not validate credentials".into()))?;

        Ok(AuthUser {
            user_id: claims.sub,
            username: claims.username,
        })
    }
}

/// Like [`AuthUser`], but also loads the account and requires it to be
/// active. Tokens stay valid after deactivation, so endpoints that act on
/// the caller's own record use this instead.
#[derive(Debug, Clone)]
pub struct ActiveUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for ActiveUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;

        let user = users::repository::find_by_id(&state.db, auth.user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Could not validate credentials".into()))?;

        if !user.is_active {
            return Err(AppError::Forbidden("Inactive user".into()));
        }
        Ok(ActiveUser(user))
    }
}
