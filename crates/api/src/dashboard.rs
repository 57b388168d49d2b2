//! Support for dashboard aggregation.
//!
//! A dashboard is a set of independent reads. Once the caller has been
//! authorized, a failing read must not sink the whole response: it falls
//! back to a default value and is logged.

use std::future::Future;

use chrono::{Days, NaiveDate, Utc};
use educ_core::attendance::rate_from_counts;
use educ_db::models::attendance::AttendanceCounts;

/// Attendance rates on dashboards cover this many days, today included.
pub const ATTENDANCE_WINDOW_DAYS: u64 = 30;

/// Await a non-critical sub-query, degrading to `fallback` on error.
pub async fn or_fallback<T, E, F>(label: &'static str, fallback: T, query: F) -> T
where
    F: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    match query.await {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, sub_query = label, "Dashboard sub-query failed, using default");
            fallback
        }
    }
}

/// Like [`or_fallback`] with the type's default.
pub async fn or_default<T, E, F>(label: &'static str, query: F) -> T
where
    T: Default,
    F: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    or_fallback(label, T::default(), query).await
}

/// First day of the attendance window ending `today`.
pub fn window_start(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_days(Days::new(ATTENDANCE_WINDOW_DAYS - 1))
        .unwrap_or(today)
}

/// Today in UTC (Côte d'Ivoire runs on UTC all year).
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// ISO weekday of `date` (1 = Monday .. 7 = Sunday), as stored in `schedules`.
pub fn iso_weekday(date: NaiveDate) -> i16 {
    use chrono::Datelike;
    date.weekday().number_from_monday() as i16
}

/// Attendance rate from aggregate counts, 100.0 when the query failed.
pub async fn attendance_rate<E, F>(label: &'static str, query: F) -> f64
where
    F: Future<Output = Result<AttendanceCounts, E>>,
    E: std::fmt::Display,
{
    match query.await {
        Ok(counts) => rate_from_counts(counts.total, counts.absent),
        Err(e) => {
            tracing::warn!(error = %e, sub_query = label, "Dashboard sub-query failed, using default");
            rate_from_counts(0, 0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failed_query_degrades_to_default() {
        let count: i64 = or_default("count", async { Err::<i64, _>("boom") }).await;
        assert_eq!(count, 0);

        let rate = attendance_rate("rate", async { Err::<AttendanceCounts, _>("boom") }).await;
        assert_eq!(rate, 100.0);
    }

    #[tokio::test]
    async fn successful_query_passes_through() {
        let count: i64 = or_default("count", async { Ok::<_, String>(7) }).await;
        assert_eq!(count, 7);

        let counts = AttendanceCounts {
            total: 10,
            absent: 2,
        };
        let rate = attendance_rate("rate", async { Ok::<_, String>(counts) }).await;
        assert_eq!(rate, 80.0);
    }

    #[test]
    fn window_covers_thirty_days() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert_eq!(window_start(today), NaiveDate::from_ymd_opt(2026, 9, 18).unwrap());
    }

    #[test]
    fn weekday_is_iso() {
        // 2026-10-14 is a Wednesday.
        assert_eq!(iso_weekday(NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()), 3);
        assert_eq!(iso_weekday(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()), 7);
    }
}
