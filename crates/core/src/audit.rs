//! Audit vocabulary for privileged mutations.

use serde::Serialize;
use serde_json::Value;

use crate::types::DbId;

pub const ACTION_ATTENDANCE_DECISION: &str = "attendance.decision";
pub const ACTION_GRADES_PERIOD_LOCK: &str = "grades.period_lock";
pub const ACTION_SUBMISSION_GRADE: &str = "submission.grade";

pub const ENTITY_ATTENDANCE: &str = "attendance";
pub const ENTITY_GRADING_PERIOD: &str = "grading_period";
pub const ENTITY_SUBMISSION: &str = "submission";

/// An audit entry before it is written.
#[derive(Debug, Clone, Serialize)]
pub struct NewAuditEntry {
    pub actor_id: DbId,
    pub action: &'static str,
    pub entity_type: &'static str,
    pub entity_id: Option<DbId>,
    pub etablissement_id: Option<DbId>,
    pub before: Option<Value>,
    pub after: Option<Value>,
}
