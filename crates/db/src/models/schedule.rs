//! Timetable entry models.

use chrono::NaiveTime;
use serde::Serialize;
use sqlx::FromRow;
use educ_core::calendar::ScheduleSlot;
use educ_core::types::DbId;

/// A schedule row joined with its class and subject names.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScheduleEntry {
    pub id: DbId,
    pub classe_id: DbId,
    pub classe_name: String,
    pub matiere_id: DbId,
    pub matiere_name: String,
    pub teacher_id: Option<DbId>,
    pub weekday: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room: Option<String>,
}

impl From<ScheduleEntry> for ScheduleSlot {
    fn from(entry: ScheduleEntry) -> Self {
        ScheduleSlot {
            id: entry.id,
            weekday: entry.weekday,
            start_time: entry.start_time,
            end_time: entry.end_time,
            summary: entry.matiere_name,
            location: entry.room,
            description: Some(entry.classe_name),
        }
    }
}
