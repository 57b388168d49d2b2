//! Attendance record models.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use educ_core::attendance::AttendanceStatus;
use educ_core::types::{DbId, Timestamp};

/// A row from the `attendance` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Attendance {
    pub id: DbId,
    pub student_id: DbId,
    pub etablissement_id: DbId,
    pub date: NaiveDate,
    pub status: String,
    pub reason: Option<String>,
    pub justification_url: Option<String>,
    pub decision: String,
    pub decision_note: Option<String>,
    pub validated: bool,
    pub validated_by: Option<DbId>,
    pub validated_at: Option<Timestamp>,
    pub declared_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One row of a bulk declaration, already deduplicated.
#[derive(Debug, Clone)]
pub struct DeclareAttendance {
    pub student_id: DbId,
    pub status: AttendanceStatus,
    pub reason: Option<String>,
}

/// Aggregate counts used for the attendance rate.
#[derive(Debug, Clone, Copy, Default, FromRow)]
pub struct AttendanceCounts {
    pub total: i64,
    pub absent: i64,
}
