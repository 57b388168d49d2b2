//! Timetable export as an iCalendar document.

use std::collections::BTreeMap;

use axum::extract::{Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::IntoResponse;
use chrono::Utc;
use educ_core::calendar::{build_calendar, ScheduleSlot};
use educ_core::roles::Role;
use educ_core::types::DbId;
use educ_db::models::schedule::ScheduleEntry;
use educ_db::repositories::{ScheduleRepo, StudentRepo};
use educ_events::bus::SCHEDULE_EXPORTED;
use educ_events::UsageEvent;
use serde::Deserialize;
use serde_json::json;

use crate::access::{ensure_class_access, require_class};
use crate::dashboard;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub const ICS_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";
pub const ICS_FILENAME: &str = "emploi-du-temps.ics";

#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    /// Export one class instead of the caller's own timetable.
    pub classe_id: Option<DbId>,
}

/// GET /api/v1/export-schedule-ics?classe_id=
///
/// Without `classe_id`, exports the union of the caller's timetables: the
/// slots they teach, their own class as a student and their children's
/// classes as a parent. With `classe_id`, exports that class if the caller
/// teaches it or administers its establishment.
pub async fn export_ics(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ExportParams>,
) -> AppResult<impl IntoResponse> {
    let pool = &state.pool;

    let entries = match params.classe_id {
        Some(classe_id) => {
            let class = require_class(pool, classe_id).await?;
            ensure_class_access(pool, &user.principal, &class, None).await?;
            ScheduleRepo::list_for_class(pool, class.id, None).await?
        }
        None => own_schedule(&state, &user).await?,
    };

    let slots: Vec<ScheduleSlot> = entries.into_iter().map(ScheduleSlot::from).collect();
    let body = build_calendar(&slots, dashboard::today(), Utc::now());

    tracing::debug!(user_id = user.user_id, events = slots.len(), "Schedule exported");

    state.event_bus.publish(
        UsageEvent::new(SCHEDULE_EXPORTED)
            .with_actor(user.user_id)
            .with_payload(json!({
                "classe_id": params.classe_id,
                "events": slots.len(),
            })),
    );

    Ok((
        [
            (CONTENT_TYPE, ICS_CONTENT_TYPE.to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{ICS_FILENAME}\""),
            ),
        ],
        body,
    ))
}

/// Every slot relevant to the caller, deduplicated and ordered by id.
async fn own_schedule(state: &AppState, user: &AuthUser) -> AppResult<Vec<ScheduleEntry>> {
    let pool = &state.pool;
    let mut by_id: BTreeMap<DbId, ScheduleEntry> = BTreeMap::new();

    if user.principal.has_role(Role::Teacher) {
        for entry in ScheduleRepo::list_for_teacher(pool, user.user_id, None).await? {
            by_id.insert(entry.id, entry);
        }
    }

    let mut classe_ids: Vec<DbId> = Vec::new();
    if user.principal.has_role(Role::Student) {
        if let Some(student) = StudentRepo::find_by_profile(pool, user.user_id).await? {
            classe_ids.extend(student.classe_id);
        }
    }
    if user.principal.has_role(Role::Parent) {
        let children = StudentRepo::list_children(pool, user.user_id).await?;
        classe_ids.extend(children.into_iter().filter_map(|c| c.classe_id));
    }
    classe_ids.sort_unstable();
    classe_ids.dedup();

    if !classe_ids.is_empty() {
        for entry in ScheduleRepo::list_for_classes(pool, &classe_ids).await? {
            by_id.insert(entry.id, entry);
        }
    }

    Ok(by_id.into_values().collect())
}
