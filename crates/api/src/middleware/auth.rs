//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use educ_core::access::Principal;
use educ_core::error::CoreError;
use educ_core::types::DbId;
use educ_db::repositories::{ProfileRepo, RoleRepo};

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated caller extracted from a JWT Bearer token.
///
/// The token only names the profile; the profile must still exist and be
/// active, and its role grants are read from the database on every request.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Profile id (from `claims.sub`).
    pub user_id: DbId,
    /// Identity plus every role grant currently held.
    pub principal: Principal,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        let profile = ProfileRepo::find_by_id(&state.pool, claims.sub)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Account not found or deactivated".into(),
                ))
            })?;

        let grants = RoleRepo::grants_for_user(&state.pool, profile.id).await?;

        Ok(AuthUser {
            user_id: profile.id,
            principal: Principal::new(profile.id, grants),
        })
    }
}
