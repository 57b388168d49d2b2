//! Attendance declaration and justification.

use axum::extract::{Multipart, Path, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use educ_core::attendance::{
    attachment_extension, ensure_justifiable, ensure_reason_length, AttendanceStatus,
    MAX_ATTACHMENT_BYTES,
};
use educ_core::error::CoreError;
use educ_core::types::DbId;
use educ_db::models::attendance::{Attendance, DeclareAttendance};
use educ_db::repositories::{AttendanceRepo, RelationshipRepo, StudentRepo};
use educ_db::DbPool;
use educ_events::bus::{ATTENDANCE_DECLARED, ATTENDANCE_JUSTIFIED};
use educ_events::UsageEvent;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::access::{ensure_class_access, ensure_student_access, require_class, require_student};
use crate::error::{AppError, AppResult};
use crate::extract::ValidJson;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireStaff;
use crate::response::{DataResponse, SuccessResponse};
use crate::state::AppState;
use crate::storage::{content_type_for, justification_key, StorageError};

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct DeclareRow {
    pub student_id: DbId,
    pub status: AttendanceStatus,
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BulkDeclareRequest {
    pub date: NaiveDate,
    /// Class the batch is declared for. Defaults to the class of the first
    /// row's student.
    pub classe_id: Option<DbId>,
    /// At most 500 rows per batch.
    #[validate(length(min = 1, max = 500), nested)]
    pub rows: Vec<DeclareRow>,
}

#[derive(Debug, Serialize)]
pub struct BulkDeclarePayload {
    /// Rows written after in-batch deduplication.
    pub count: usize,
    pub attendance: Vec<Attendance>,
}

/// Who may justify a record through a given endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justifier {
    /// The student themself or one of their parents.
    StudentOrParent,
    ParentOnly,
}

/// Parsed and validated `multipart/form-data` justification.
#[derive(Debug, Default)]
struct JustificationForm {
    attendance_id: Option<DbId>,
    reason: Option<String>,
    file: Option<Upload>,
}

#[derive(Debug)]
struct Upload {
    extension: String,
    bytes: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/attendance-bulk-declare
///
/// Upsert one day of attendance for a class. Duplicate students inside the
/// batch collapse to their last row. The whole batch is rejected if any
/// student is not enrolled in the class.
pub async fn bulk_declare(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    ValidJson(input): ValidJson<BulkDeclareRequest>,
) -> AppResult<Json<SuccessResponse<BulkDeclarePayload>>> {
    let classe_id = match input.classe_id {
        Some(id) => id,
        None => {
            // Validation guarantees at least one row.
            let first = input.rows[0].student_id;
            StudentRepo::find_by_id(&state.pool, first)
                .await?
                .and_then(|s| s.classe_id)
                .ok_or_else(|| {
                    CoreError::Validation(format!(
                        "Student {first} is not enrolled in a class; pass classe_id"
                    ))
                })?
        }
    };

    let class = require_class(&state.pool, classe_id).await?;
    ensure_class_access(&state.pool, &user.principal, &class, None).await?;

    let student_ids: Vec<DbId> = input.rows.iter().map(|r| r.student_id).collect();
    let outside = StudentRepo::ids_outside_class(&state.pool, class.id, &student_ids).await?;
    if !outside.is_empty() {
        return Err(CoreError::Validation(format!(
            "Students not enrolled in class {}: {outside:?}",
            class.id
        ))
        .into());
    }

    let rows: Vec<DeclareAttendance> = input
        .rows
        .into_iter()
        .map(|r| DeclareAttendance {
            student_id: r.student_id,
            status: r.status,
            reason: r.reason.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
        })
        .collect();

    let attendance = AttendanceRepo::bulk_upsert(
        &state.pool,
        class.etablissement_id,
        input.date,
        user.user_id,
        rows,
    )
    .await?;

    tracing::info!(
        classe_id = class.id,
        date = %input.date,
        count = attendance.len(),
        declared_by = user.user_id,
        "Attendance declared",
    );

    state.event_bus.publish(
        UsageEvent::new(ATTENDANCE_DECLARED)
            .with_actor(user.user_id)
            .with_etablissement(Some(class.etablissement_id))
            .with_payload(json!({
                "classe_id": class.id,
                "date": input.date,
                "count": attendance.len(),
            })),
    );

    Ok(Json(SuccessResponse::new(BulkDeclarePayload {
        count: attendance.len(),
        attendance,
    })))
}

/// POST /api/v1/attendance-justify
///
/// Multipart form: `attendance_id`, optional `reason`, optional `file`.
/// Open to the student concerned and their parents.
pub async fn justify(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<Attendance>>> {
    submit_justification(&state, &user, multipart, Justifier::StudentOrParent)
        .await
        .map(|data| Json(DataResponse { data }))
}

/// Shared by `attendance-justify` and `parent-justify-absence`.
///
/// The form is fully validated and the caller authorized before anything is
/// written to storage. A stored file that the record ends up not pointing to
/// is removed again.
pub async fn submit_justification(
    state: &AppState,
    user: &AuthUser,
    multipart: Multipart,
    justifier: Justifier,
) -> AppResult<Attendance> {
    let form = read_justification_form(multipart).await?;

    let attendance_id = form
        .attendance_id
        .ok_or_else(|| CoreError::Validation("attendance_id is required".into()))?;

    let record = find_attendance(&state.pool, attendance_id).await?;

    let is_parent =
        RelationshipRepo::is_parent_of(&state.pool, user.user_id, record.student_id).await?;
    let allowed = match justifier {
        Justifier::ParentOnly => is_parent,
        Justifier::StudentOrParent => {
            is_parent
                || RelationshipRepo::is_student_self(&state.pool, user.user_id, record.student_id)
                    .await?
        }
    };
    if !allowed {
        return Err(CoreError::Forbidden(format!(
            "Not allowed to justify attendance record {attendance_id}"
        ))
        .into());
    }

    let status: AttendanceStatus = record
        .status
        .parse()
        .map_err(|e: String| AppError::InternalError(e))?;
    ensure_justifiable(status)?;

    if form.reason.is_none() && form.file.is_none() {
        return Err(CoreError::Validation(
            "A justification needs a reason or an attachment".into(),
        )
        .into());
    }

    let key = match &form.file {
        Some(file) => {
            let key = justification_key(record.id, &file.extension, &file.bytes);
            state.storage.put(&key, &file.bytes).await?;
            Some(key)
        }
        None => None,
    };

    let updated = match AttendanceRepo::justify(
        &state.pool,
        record.id,
        form.reason.as_deref(),
        key.as_deref(),
    )
    .await
    {
        Ok(Some(updated)) => Ok(updated),
        Ok(None) => Err(AppError::from(CoreError::NotFound {
            entity: "Attendance",
            id: record.id,
        })),
        Err(e) => Err(AppError::from(e)),
    };

    if updated.is_err() {
        // Same content as the attachment already on record: that file stays.
        let orphan = key
            .as_deref()
            .filter(|k| record.justification_url.as_deref() != Some(*k));
        if let Some(key) = orphan {
            discard_attachment(state, key).await;
        }
    }
    let updated = updated?;

    tracing::info!(
        attendance_id = updated.id,
        user_id = user.user_id,
        has_attachment = key.is_some(),
        "Attendance justification submitted",
    );

    state.event_bus.publish(
        UsageEvent::new(ATTENDANCE_JUSTIFIED)
            .with_actor(user.user_id)
            .with_etablissement(Some(updated.etablissement_id))
            .with_payload(json!({
                "attendance_id": updated.id,
                "has_attachment": key.is_some(),
            })),
    );

    Ok(updated)
}

/// GET /api/v1/justifications/{attendance_id}/file
///
/// Streams the attachment of a justification. Readable by whoever may see
/// the student's records: administrators of the establishment, teachers of
/// the class, parents and the student.
pub async fn download_justification(
    State(state): State<AppState>,
    user: AuthUser,
    Path(attendance_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let record = find_attendance(&state.pool, attendance_id).await?;
    let student = require_student(&state.pool, record.student_id).await?;
    ensure_student_access(&state.pool, &user.principal, &student).await?;

    let missing = || CoreError::NotFound {
        entity: "Justification attachment",
        id: attendance_id,
    };
    let key = record.justification_url.as_deref().ok_or_else(missing)?;
    let bytes = match state.storage.get(key).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) | Err(StorageError::InvalidKey(_)) => return Err(missing().into()),
        Err(e) => return Err(e.into()),
    };

    let file_name = key.rsplit('/').next().unwrap_or(key);
    tracing::debug!(
        attendance_id,
        user_id = user.user_id,
        size = bytes.len(),
        "Attachment downloaded",
    );

    Ok((
        [
            (CONTENT_TYPE, content_type_for(key).to_string()),
            (
                CONTENT_DISPOSITION,
                format!("inline; filename=\"{file_name}\""),
            ),
            (CACHE_CONTROL, "private, no-store".to_string()),
        ],
        bytes,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_attendance(pool: &DbPool, attendance_id: DbId) -> AppResult<Attendance> {
    AttendanceRepo::find_by_id(pool, attendance_id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "Attendance",
                id: attendance_id,
            }
            .into()
        })
}

async fn discard_attachment(state: &AppState, key: &str) {
    if let Err(e) = state.storage.delete(key).await {
        tracing::warn!(key, error = %e, "Failed to remove orphaned attachment");
    }
}

async fn read_justification_form(mut multipart: Multipart) -> AppResult<JustificationForm> {
    let mut form = JustificationForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "attendance_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                let id = text.trim().parse::<DbId>().map_err(|_| {
                    CoreError::Validation(format!("attendance_id must be an integer, got '{text}'"))
                })?;
                form.attendance_id = Some(id);
            }
            "reason" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                let text = text.trim();
                ensure_reason_length(text)?;
                if !text.is_empty() {
                    form.reason = Some(text.to_string());
                }
            }
            "file" => {
                let file_name = field.file_name().unwrap_or("attachment").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if data.len() > MAX_ATTACHMENT_BYTES {
                    return Err(CoreError::Validation(format!(
                        "Attachment exceeds {} MiB",
                        MAX_ATTACHMENT_BYTES / (1024 * 1024)
                    ))
                    .into());
                }
                if !data.is_empty() {
                    form.file = Some(Upload {
                        extension: attachment_extension(&file_name)?,
                        bytes: data.to_vec(),
                    });
                }
            }
            _ => {
                // Skip unknown fields.
            }
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;

    use super::*;

    const BOUNDARY: &str = "educ-boundary";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a [u8]),
    }

    async fn multipart(parts: &[Part<'_>]) -> Multipart {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")
                            .as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                }
                Part::File(file_name, bytes) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
                             Content-Type: application/octet-stream\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri("/attendance-justify")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    #[tokio::test]
    async fn form_reads_id_reason_and_file() {
        let form = read_justification_form(
            multipart(&[
                Part::Text("attendance_id", " 42 "),
                Part::Text("reason", "  Rendez-vous médical  "),
                Part::File("Certificat.PDF", b"%PDF-1.4"),
            ])
            .await,
        )
        .await
        .unwrap();

        assert_eq!(form.attendance_id, Some(42));
        assert_eq!(form.reason.as_deref(), Some("Rendez-vous médical"));
        let file = form.file.unwrap();
        assert_eq!(file.extension, "pdf");
        assert_eq!(file.bytes, b"%PDF-1.4");
    }

    #[tokio::test]
    async fn blank_reason_and_empty_file_are_ignored() {
        let form = read_justification_form(
            multipart(&[
                Part::Text("attendance_id", "7"),
                Part::Text("reason", "   "),
                Part::File("vide.png", b""),
            ])
            .await,
        )
        .await
        .unwrap();

        assert_eq!(form.reason, None);
        assert!(form.file.is_none());
    }

    #[tokio::test]
    async fn overlong_reason_is_rejected() {
        let reason = "x".repeat(1001);
        let result = read_justification_form(
            multipart(&[Part::Text("attendance_id", "7"), Part::Text("reason", &reason)]).await,
        )
        .await;

        assert_matches!(result, Err(AppError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn unsupported_extension_is_rejected() {
        let result = read_justification_form(
            multipart(&[
                Part::Text("attendance_id", "7"),
                Part::File("script.exe", b"MZ"),
            ])
            .await,
        )
        .await;

        assert_matches!(
            result,
            Err(AppError::Core(CoreError::Validation(msg))) if msg.contains(".exe")
        );
    }

    #[tokio::test]
    async fn non_numeric_attendance_id_is_rejected() {
        let result =
            read_justification_form(multipart(&[Part::Text("attendance_id", "abc")]).await).await;

        assert_matches!(result, Err(AppError::Core(CoreError::Validation(_))));
    }
}
