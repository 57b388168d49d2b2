//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects the request with 403 when
//! the caller holds none of the listed roles in any establishment. They
//! check membership only; establishment scoping of the target is done in
//! the handler once the target is known.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use educ_core::access::authorize;
use educ_core::roles::Role;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Roles administering an establishment.
pub const ADMIN_ROLES: &[Role] = &[Role::SchoolAdmin, Role::SystemAdmin];

/// Roles allowed to declare attendance, grade and generate material.
pub const STAFF_ROLES: &[Role] = &[Role::Teacher, Role::SchoolAdmin, Role::SystemAdmin];

async fn require(
    parts: &mut Parts,
    state: &AppState,
    roles: &[Role],
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    authorize(&user.principal, roles, None)?;
    Ok(user)
}

/// Requires `SCHOOL_ADMIN` or `SYSTEM_ADMIN`.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require(parts, state, ADMIN_ROLES).await.map(RequireAdmin)
    }
}

/// Requires `TEACHER`, `SCHOOL_ADMIN` or `SYSTEM_ADMIN`.
pub struct RequireStaff(pub AuthUser);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require(parts, state, STAFF_ROLES).await.map(RequireStaff)
    }
}

/// Requires `TEACHER`.
pub struct RequireTeacher(pub AuthUser);

impl FromRequestParts<AppState> for RequireTeacher {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require(parts, state, &[Role::Teacher])
            .await
            .map(RequireTeacher)
    }
}

/// Requires `PARENT`.
pub struct RequireParent(pub AuthUser);

impl FromRequestParts<AppState> for RequireParent {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require(parts, state, &[Role::Parent]).await.map(RequireParent)
    }
}
