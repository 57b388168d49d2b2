//! Attendance statuses, justification decisions and the attendance rate.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Wire literal approving a justification.
pub const DECISION_LITERAL_APPROVE: &str = "VALIDE";

/// Wire literal rejecting a justification.
pub const DECISION_LITERAL_REJECT: &str = "REFUSE";

/// Attendance rate reported for a range without any record.
pub const EMPTY_RANGE_RATE: f64 = 100.0;

/// Maximum size of a justification attachment (5 MiB).
pub const MAX_ATTACHMENT_BYTES: usize = 5 * 1024 * 1024;

/// Longest accepted justification reason, in characters.
pub const MAX_REASON_CHARS: usize = 1000;

/// Accepted attachment extensions.
pub const ATTACHMENT_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg", "webp"];

/// Status declared for a student on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "PRESENT",
            AttendanceStatus::Absent => "ABSENT",
            AttendanceStatus::Late => "LATE",
        }
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PRESENT" => Ok(AttendanceStatus::Present),
            "ABSENT" => Ok(AttendanceStatus::Absent),
            "LATE" => Ok(AttendanceStatus::Late),
            other => Err(format!("Unknown attendance status '{other}'")),
        }
    }
}

/// Administrative disposition of a justification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Pending,
    Approved,
    Rejected,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Pending => "PENDING",
            Decision::Approved => "APPROVED",
            Decision::Rejected => "REJECTED",
        }
    }
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Decision::Pending),
            "APPROVED" => Ok(Decision::Approved),
            "REJECTED" => Ok(Decision::Rejected),
            other => Err(format!("Unknown decision '{other}'")),
        }
    }
}

/// Parse the decision literal sent by the admin decision endpoint.
///
/// Only `VALIDE` and `REFUSE` are accepted (exact, case-sensitive).
pub fn parse_decision_literal(literal: &str) -> Result<Decision, CoreError> {
    match literal {
        DECISION_LITERAL_APPROVE => Ok(Decision::Approved),
        DECISION_LITERAL_REJECT => Ok(Decision::Rejected),
        other => Err(CoreError::Validation(format!(
            "Invalid decision '{other}'. Must be one of: {DECISION_LITERAL_APPROVE}, {DECISION_LITERAL_REJECT}"
        ))),
    }
}

/// Only absences and late arrivals can carry a justification.
pub fn ensure_justifiable(status: AttendanceStatus) -> Result<(), CoreError> {
    match status {
        AttendanceStatus::Absent | AttendanceStatus::Late => Ok(()),
        AttendanceStatus::Present => Err(CoreError::Validation(
            "Only ABSENT or LATE records can be justified".into(),
        )),
    }
}

pub fn ensure_reason_length(reason: &str) -> Result<(), CoreError> {
    if reason.chars().count() > MAX_REASON_CHARS {
        return Err(CoreError::Validation(format!(
            "reason must be at most {MAX_REASON_CHARS} characters"
        )));
    }
    Ok(())
}

/// Validate the file name of a justification attachment and return its
/// lowercase extension.
pub fn attachment_extension(file_name: &str) -> Result<String, CoreError> {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    if ATTACHMENT_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(CoreError::Validation(format!(
            "Unsupported attachment type '.{ext}'. Supported: {}",
            ATTACHMENT_EXTENSIONS.join(", ")
        )))
    }
}

/// Attendance rate from aggregate counts.
///
/// `(total - absent) / total * 100`, rounded to one decimal; an empty range
/// is [`EMPTY_RANGE_RATE`].
pub fn rate_from_counts(total: i64, absent: i64) -> f64 {
    if total <= 0 {
        return EMPTY_RANGE_RATE;
    }
    let attended = (total - absent.clamp(0, total)) as f64;
    round1(attended / total as f64 * 100.0)
}

/// Attendance rate over individual records.
pub fn attendance_rate<I>(statuses: I) -> f64
where
    I: IntoIterator<Item = AttendanceStatus>,
{
    let (total, absent) = statuses.into_iter().fold((0i64, 0i64), |(t, a), s| {
        (t + 1, a + i64::from(s == AttendanceStatus::Absent))
    });
    rate_from_counts(total, absent)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
