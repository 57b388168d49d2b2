//! Relationship-aware access checks.
//!
//! [`educ_core::access`] decides what the role grants alone allow. The
//! checks here add the relationship predicates (parent-of, teacher-of,
//! student-self) that need the database. Every handler that touches another
//! person's data goes through one of them.

use educ_core::access::Principal;
use educ_core::error::CoreError;
use educ_core::roles::Role;
use educ_core::types::DbId;
use educ_db::models::school::{Class, Student};
use educ_db::repositories::{ClassRepo, RelationshipRepo, StudentRepo};
use educ_db::DbPool;

use crate::error::AppResult;

/// Whether the caller administers `etablissement_id` (or everything).
pub fn administers(principal: &Principal, etablissement_id: DbId) -> bool {
    principal.has_role_in(Role::SchoolAdmin, etablissement_id) || principal.is_system_admin()
}

/// Load a student or fail with `NotFound`.
pub async fn require_student(pool: &DbPool, student_id: DbId) -> AppResult<Student> {
    StudentRepo::find_by_id(pool, student_id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "Student",
                id: student_id,
            }
            .into()
        })
}

/// Load a class or fail with `NotFound`.
pub async fn require_class(pool: &DbPool, classe_id: DbId) -> AppResult<Class> {
    ClassRepo::find_by_id(pool, classe_id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "Class",
                id: classe_id,
            }
            .into()
        })
}

/// Allow the caller to read or act on `student`'s records.
///
/// Passes for a system administrator, a school administrator of the
/// student's establishment, a teacher of the student's class, a parent of
/// the student, or the student themself.
pub async fn ensure_student_access(
    pool: &DbPool,
    principal: &Principal,
    student: &Student,
) -> AppResult<()> {
    if administers(principal, student.etablissement_id) {
        return Ok(());
    }

    if let Some(classe_id) = student.classe_id {
        if principal.has_role_in(Role::Teacher, student.etablissement_id)
            && RelationshipRepo::teaches_class(pool, principal.user_id, classe_id).await?
        {
            return Ok(());
        }
    }

    if principal.has_role(Role::Parent)
        && RelationshipRepo::is_parent_of(pool, principal.user_id, student.id).await?
    {
        return Ok(());
    }

    if principal.has_role(Role::Student)
        && RelationshipRepo::is_student_self(pool, principal.user_id, student.id).await?
    {
        return Ok(());
    }

    Err(CoreError::Forbidden(format!("Access to student {} denied", student.id)).into())
}

/// Allow the caller to write into `class` (attendance, grades).
///
/// Administrators of the class's establishment always pass. A teacher must
/// be assigned to the class, and to the subject when `matiere_id` is given.
pub async fn ensure_class_access(
    pool: &DbPool,
    principal: &Principal,
    class: &Class,
    matiere_id: Option<DbId>,
) -> AppResult<()> {
    if administers(principal, class.etablissement_id) {
        return Ok(());
    }

    if principal.has_role_in(Role::Teacher, class.etablissement_id) {
        let assigned = match matiere_id {
            Some(matiere_id) => {
                RelationshipRepo::teaches_class_subject(pool, principal.user_id, class.id, matiere_id)
                    .await?
            }
            None => RelationshipRepo::teaches_class(pool, principal.user_id, class.id).await?,
        };
        if assigned {
            return Ok(());
        }
    }

    Err(CoreError::Forbidden(format!("Access to class {} denied", class.id)).into())
}
