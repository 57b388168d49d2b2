//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Resolves the caller from a JWT Bearer token and
//!   loads its role grants.
//! - [`rbac::RequireAdmin`] -- `SCHOOL_ADMIN` or `SYSTEM_ADMIN`.
//! - [`rbac::RequireStaff`] -- `TEACHER`, `SCHOOL_ADMIN` or `SYSTEM_ADMIN`.
//! - [`rbac::RequireTeacher`] -- `TEACHER`.
//! - [`rbac::RequireParent`] -- `PARENT`.

pub mod auth;
pub mod rbac;
