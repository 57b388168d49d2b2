//! Handlers for the `/auth` resource (login, current user).

use axum::extract::State;
use axum::Json;
use educ_core::access::Principal;
use educ_core::error::CoreError;
use educ_core::roles::Role;
use educ_core::types::DbId;
use educ_db::models::profile::Profile;
use educ_db::repositories::{ProfileRepo, RoleRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::extract::ValidJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Public identity returned by login and `/auth/me`.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub email: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub roles: Vec<Role>,
    /// Landing dashboard hint for the frontend; never used for access.
    pub primary_role: Option<Role>,
}

impl UserInfo {
    fn new(profile: Profile, principal: &Principal) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            full_name: profile.full_name,
            avatar_url: profile.avatar_url,
            roles: principal.roles(),
            primary_role: principal.primary_role(),
        }
    }
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate with email + password and return an access token.
pub async fn login(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let profile = ProfileRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(invalid_credentials)?;

    let password_valid = verify_password(&input.password, &profile.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = profile.id, "Failed login attempt");
        return Err(invalid_credentials());
    }

    if !profile.is_active {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Account is deactivated".into(),
        )));
    }

    let grants = RoleRepo::grants_for_user(&state.pool, profile.id).await?;
    let principal = Principal::new(profile.id, grants);

    let access_token = generate_access_token(profile.id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = profile.id, "User logged in");

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.config.jwt.expires_in_secs(),
        user: UserInfo::new(profile, &principal),
    }))
}

/// GET /api/v1/auth/me
///
/// The caller's identity, roles and primary role.
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<UserInfo>>> {
    let profile = ProfileRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Profile",
            id: user.user_id,
        })?;

    Ok(Json(DataResponse {
        data: UserInfo::new(profile, &user.principal),
    }))
}
