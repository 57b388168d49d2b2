//! Repository for the `schedules` table.

use sqlx::PgPool;
use educ_core::types::DbId;

use crate::models::schedule::ScheduleEntry;

const SELECT: &str = "\
    SELECT sc.id, sc.classe_id, c.name AS classe_name, sc.matiere_id, m.name AS matiere_name, \
           sc.teacher_id, sc.weekday, sc.start_time, sc.end_time, sc.room \
    FROM schedules sc \
    JOIN classes c ON c.id = sc.classe_id \
    JOIN matieres m ON m.id = sc.matiere_id";

pub struct ScheduleRepo;

impl ScheduleRepo {
    /// Weekly timetable of a class, optionally for one ISO weekday.
    pub async fn list_for_class(
        pool: &PgPool,
        classe_id: DbId,
        weekday: Option<i16>,
    ) -> Result<Vec<ScheduleEntry>, sqlx::Error> {
        let query = format!(
            "{SELECT} WHERE sc.classe_id = $1 AND ($2::SMALLINT IS NULL OR sc.weekday = $2) \
             ORDER BY sc.weekday, sc.start_time, sc.id"
        );
        sqlx::query_as::<_, ScheduleEntry>(&query)
            .bind(classe_id)
            .bind(weekday)
            .fetch_all(pool)
            .await
    }

    /// Weekly timetable of a teacher, optionally for one ISO weekday.
    pub async fn list_for_teacher(
        pool: &PgPool,
        teacher_id: DbId,
        weekday: Option<i16>,
    ) -> Result<Vec<ScheduleEntry>, sqlx::Error> {
        let query = format!(
            "{SELECT} WHERE sc.teacher_id = $1 AND ($2::SMALLINT IS NULL OR sc.weekday = $2) \
             ORDER BY sc.weekday, sc.start_time, sc.id"
        );
        sqlx::query_as::<_, ScheduleEntry>(&query)
            .bind(teacher_id)
            .bind(weekday)
            .fetch_all(pool)
            .await
    }

    /// Union of the timetables of several classes (a parent's children).
    pub async fn list_for_classes(
        pool: &PgPool,
        classe_ids: &[DbId],
    ) -> Result<Vec<ScheduleEntry>, sqlx::Error> {
        let query = format!(
            "{SELECT} WHERE sc.classe_id = ANY($1) ORDER BY sc.weekday, sc.start_time, sc.id"
        );
        sqlx::query_as::<_, ScheduleEntry>(&query)
            .bind(classe_ids)
            .fetch_all(pool)
            .await
    }
}
