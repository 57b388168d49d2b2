//! Homework submission models.

use serde::Serialize;
use sqlx::FromRow;
use educ_core::types::{DbId, Timestamp};

/// A row from the `submissions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Submission {
    pub id: DbId,
    pub assignment_id: DbId,
    pub student_id: DbId,
    pub content: Option<String>,
    pub file_url: Option<String>,
    pub submitted_at: Timestamp,
    pub note: Option<f64>,
    pub commentaire: Option<String>,
    pub graded_by: Option<DbId>,
    pub graded_at: Option<Timestamp>,
}

/// The assignment context a submission is graded against.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SubmissionContext {
    pub submission_id: DbId,
    pub assignment_id: DbId,
    pub classe_id: DbId,
    pub matiere_id: DbId,
    pub teacher_id: Option<DbId>,
    pub etablissement_id: DbId,
}
