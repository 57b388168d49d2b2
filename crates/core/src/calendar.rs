//! iCalendar (RFC 5545) export of weekly timetables.
//!
//! Each schedule slot is weekday-coded (ISO: 1 = Monday .. 7 = Sunday) and
//! becomes one weekly recurring `VEVENT` anchored on the slot's next
//! occurrence, today included. Output is deterministic for a given
//! `today` / `stamp` pair.

use chrono::{Datelike, Days, NaiveDate, NaiveTime};

use crate::types::{DbId, Timestamp};

/// Line terminator mandated by RFC 5545.
pub const CRLF: &str = "\r\n";

/// Longest content line, in octets, before folding (RFC 5545 §3.1).
pub const MAX_LINE_OCTETS: usize = 75;

/// Header lines emitted before any event.
const HEADER: &[&str] = &[
    "BEGIN:VCALENDAR",
    "VERSION:2.0",
    "PRODID:-//Educ-CI//Emploi du temps//FR",
    "CALSCALE:GREGORIAN",
    "METHOD:PUBLISH",
    "X-WR-CALNAME:Emploi du temps",
];

const FOOTER: &str = "END:VCALENDAR";

/// One recurring timetable entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleSlot {
    pub id: DbId,
    pub weekday: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub summary: String,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// RFC 5545 `BYDAY` code for an ISO weekday number.
pub fn byday_code(weekday: i16) -> Option<&'static str> {
    match weekday {
        1 => Some("MO"),
        2 => Some("TU"),
        3 => Some("WE"),
        4 => Some("TH"),
        5 => Some("FR"),
        6 => Some("SA"),
        7 => Some("SU"),
        _ => None,
    }
}

/// Date of the next `weekday` on or after `today`.
pub fn next_occurrence(today: NaiveDate, weekday: i16) -> Option<NaiveDate> {
    byday_code(weekday)?;
    let current = today.weekday().number_from_monday() as i64;
    let ahead = (i64::from(weekday) - current).rem_euclid(7) as u64;
    today.checked_add_days(Days::new(ahead))
}

/// Render a whole calendar document. Slots with an invalid weekday are
/// skipped.
pub fn build_calendar(slots: &[ScheduleSlot], today: NaiveDate, stamp: Timestamp) -> String {
    let mut lines: Vec<String> = HEADER.iter().map(|l| l.to_string()).collect();
    let dtstamp = stamp.format("%Y%m%dT%H%M%SZ").to_string();

    for slot in slots {
        let (Some(byday), Some(date)) =
            (byday_code(slot.weekday), next_occurrence(today, slot.weekday))
        else {
            continue;
        };

        lines.push("BEGIN:VEVENT".into());
        lines.push(format!("UID:schedule-{}@educ-ci", slot.id));
        lines.push(format!("DTSTAMP:{dtstamp}"));
        lines.push(format!("DTSTART:{}", local_datetime(date, slot.start_time)));
        lines.push(format!("DTEND:{}", local_datetime(date, slot.end_time)));
        lines.push(format!("RRULE:FREQ=WEEKLY;BYDAY={byday}"));
        lines.push(format!("SUMMARY:{}", escape_text(&slot.summary)));
        if let Some(location) = &slot.location {
            lines.push(format!("LOCATION:{}", escape_text(location)));
        }
        if let Some(description) = &slot.description {
            lines.push(format!("DESCRIPTION:{}", escape_text(description)));
        }
        lines.push("END:VEVENT".into());
    }

    lines.push(FOOTER.into());

    let mut out = String::new();
    for line in &lines {
        out.push_str(&fold_line(line));
        out.push_str(CRLF);
    }
    out
}

/// Fold a content line so no physical line exceeds [`MAX_LINE_OCTETS`].
///
/// Continuation lines start with a single space, which counts towards their
/// length. Splits only on UTF-8 character boundaries.
pub fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    let mut budget = MAX_LINE_OCTETS;
    let mut used = 0;
    for c in line.chars() {
        let width = c.len_utf8();
        if used + width > budget {
            out.push_str(CRLF);
            out.push(' ');
            used = 1;
            budget = MAX_LINE_OCTETS;
        }
        out.push(c);
        used += width;
    }
    out
}

/// Floating local date-time (`YYYYMMDDTHHMMSS`).
fn local_datetime(date: NaiveDate, time: NaiveTime) -> String {
    format!("{}T{}", date.format("%Y%m%d"), time.format("%H%M%S"))
}

/// Escape a TEXT value (backslash, semicolon, comma, newline).
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn stamp() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 10, 14, 9, 30, 0).unwrap()
    }

    /// Wednesday.
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
    }

    fn slot(id: DbId, weekday: i16) -> ScheduleSlot {
        ScheduleSlot {
            id,
            weekday,
            start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            summary: "Mathématiques".into(),
            location: Some("Salle 12".into()),
            description: None,
        }
    }

    #[test]
    fn empty_schedule_has_only_header_and_footer() {
        let ics = build_calendar(&[], today(), stamp());
        let lines: Vec<&str> = ics.split(CRLF).filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.first(), Some(&"BEGIN:VCALENDAR"));
        assert_eq!(lines.last(), Some(&"END:VCALENDAR"));
        assert_eq!(lines.len(), HEADER.len() + 1);
        assert!(!ics.contains("VEVENT"));
        assert!(ics.ends_with(CRLF));
    }

    #[test]
    fn next_occurrence_includes_today() {
        assert_eq!(next_occurrence(today(), 3), Some(today()));
    }

    #[test]
    fn next_occurrence_wraps_to_next_week() {
        // Monday after Wednesday 2026-10-14.
        assert_eq!(
            next_occurrence(today(), 1),
            NaiveDate::from_ymd_opt(2026, 10, 19)
        );
        assert_eq!(
            next_occurrence(today(), 7),
            NaiveDate::from_ymd_opt(2026, 10, 18)
        );
    }

    #[test]
    fn invalid_weekday_has_no_occurrence() {
        assert_eq!(next_occurrence(today(), 0), None);
        assert_eq!(next_occurrence(today(), 8), None);
    }

    #[test]
    fn event_carries_weekly_rule_and_anchor_date() {
        let ics = build_calendar(&[slot(4, 5)], today(), stamp());
        assert!(ics.contains("BEGIN:VEVENT\r\n"));
        assert!(ics.contains("UID:schedule-4@educ-ci\r\n"));
        assert!(ics.contains("DTSTAMP:20261014T093000Z\r\n"));
        assert!(ics.contains("DTSTART:20261016T080000\r\n"));
        assert!(ics.contains("DTEND:20261016T090000\r\n"));
        assert!(ics.contains("RRULE:FREQ=WEEKLY;BYDAY=FR\r\n"));
        assert!(ics.contains("LOCATION:Salle 12\r\n"));
    }

    #[test]
    fn invalid_slots_are_skipped() {
        let ics = build_calendar(&[slot(1, 9), slot(2, 2)], today(), stamp());
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
        assert!(ics.contains("UID:schedule-2@educ-ci"));
    }

    #[test]
    fn output_is_deterministic() {
        let slots = [slot(1, 1), slot(2, 4)];
        assert_eq!(
            build_calendar(&slots, today(), stamp()),
            build_calendar(&slots, today(), stamp())
        );
    }

    #[test]
    fn long_accented_summary_is_folded() {
        let mut long = slot(7, 3);
        long.summary =
            "Éducation physique et sportive, approfondissement des activités athlétiques".into();

        let ics = build_calendar(&[long.clone()], today(), stamp());

        for line in ics.split(CRLF) {
            assert!(line.len() <= MAX_LINE_OCTETS, "line too long: {line:?}");
        }
        // Unfolding restores the escaped value.
        let unfolded = ics.replace("\r\n ", "");
        assert!(unfolded.contains(&format!("SUMMARY:{}\r\n", escape_text(&long.summary))));
    }

    #[test]
    fn fold_never_splits_a_character() {
        let line = format!("SUMMARY:{}", "é".repeat(60));
        let folded = fold_line(&line);

        let parts: Vec<&str> = folded.split(CRLF).collect();
        assert!(parts.len() > 1);
        assert!(parts.iter().all(|p| p.len() <= MAX_LINE_OCTETS));
        assert!(parts[1..].iter().all(|p| p.starts_with(' ')));
        assert_eq!(folded.replace("\r\n ", ""), line);
    }

    #[test]
    fn short_lines_are_untouched() {
        assert_eq!(fold_line("VERSION:2.0"), "VERSION:2.0");
        let exact = "X".repeat(MAX_LINE_OCTETS);
        assert_eq!(fold_line(&exact), exact);
    }

    #[test]
    fn text_values_are_escaped() {
        assert_eq!(escape_text("a,b;c\\d\ne"), "a\\,b\\;c\\\\d\\ne");
    }
}
