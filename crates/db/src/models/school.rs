//! Establishments, classes, subjects and students.

use serde::Serialize;
use sqlx::FromRow;
use educ_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Class {
    pub id: DbId,
    pub etablissement_id: DbId,
    pub name: String,
    pub level: Option<String>,
    pub created_at: Timestamp,
}

/// A row from the `matieres` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Matiere {
    pub id: DbId,
    pub etablissement_id: DbId,
    pub name: String,
    pub coefficient: f64,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Student {
    pub id: DbId,
    pub profile_id: DbId,
    pub etablissement_id: DbId,
    pub classe_id: Option<DbId>,
    pub matricule: Option<String>,
    pub created_at: Timestamp,
}

/// A student joined with its profile and class, as shown to parents.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChildSummary {
    pub student_id: DbId,
    pub profile_id: DbId,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub matricule: Option<String>,
    pub etablissement_id: DbId,
    pub classe_id: Option<DbId>,
    pub classe_name: Option<String>,
}
