//! Grade, grading period and report card models.

use serde::Serialize;
use sqlx::FromRow;
use educ_core::types::{DbId, Timestamp};

/// A row from the `grades` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Grade {
    pub id: DbId,
    pub student_id: DbId,
    pub matiere_id: DbId,
    pub classe_id: DbId,
    pub etablissement_id: DbId,
    pub period: String,
    pub score: f64,
    pub coefficient: f64,
    pub validated: bool,
    pub teacher_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One row of a bulk grade upsert, already deduplicated.
#[derive(Debug, Clone)]
pub struct UpsertGrade {
    pub student_id: DbId,
    pub score: f64,
    pub coefficient: f64,
}

/// The shared context of a bulk grade upsert.
#[derive(Debug, Clone)]
pub struct GradeBatchContext {
    pub etablissement_id: DbId,
    pub classe_id: DbId,
    pub matiere_id: DbId,
    pub period: String,
    pub teacher_id: DbId,
}

/// A grade joined with its subject name, for recent-grade listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GradeWithSubject {
    pub id: DbId,
    pub matiere_id: DbId,
    pub matiere_name: String,
    pub period: String,
    pub score: f64,
    pub coefficient: f64,
    pub validated: bool,
    pub updated_at: Timestamp,
}

/// A row from the `grading_periods` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GradingPeriod {
    pub id: DbId,
    pub etablissement_id: DbId,
    pub period: String,
    pub locked: bool,
    pub locked_by: Option<DbId>,
    pub locked_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// A row from the `report_cards` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReportCard {
    pub id: DbId,
    pub student_id: DbId,
    pub etablissement_id: DbId,
    pub period: String,
    pub general_average: Option<f64>,
    pub subject_averages: serde_json::Value,
    pub published: bool,
    pub generated_by: Option<DbId>,
    pub generated_at: Timestamp,
}

/// Average of one class for one subject, shown on the teacher dashboard.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClassAverage {
    pub classe_id: DbId,
    pub classe_name: String,
    pub matiere_id: DbId,
    pub matiere_name: String,
    pub average: Option<f64>,
    pub grade_count: i64,
}
