//! ICS file generation.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use icalendar::{Calendar, Component};

use crate::error::{PlanToMeetError, PlanToMeetResult};
use crate::poll::{FinalizedPollInfo, parse_clock_time};

/// Generate .ics content for a finalized poll.
///
/// Weekday-only days resolve against `today`. Times are floating local
/// times: the poll never carried a timezone.
pub fn generate_ics(info: &FinalizedPollInfo, today: NaiveDate) -> PlanToMeetResult<String> {
    let (start, end) = event_window(info, today)?;

    let mut cal = Calendar::new();

    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&format!("{}-{}@plantomeet", info.poll_id, info.slot_id));
    ics_event.summary(info.display_title());
    ics_event.description(&format!(
        "Scheduled with PlanToMeet ({} min)",
        info.duration_minutes
    ));

    // DTSTAMP - required by RFC 5545
    let dtstamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
    ics_event.add_property("DTSTAMP", &dtstamp);

    // Floating datetime (no Z, no TZID)
    ics_event.add_property("DTSTART", start.format("%Y%m%dT%H%M%S").to_string());
    ics_event.add_property("DTEND", end.format("%Y%m%dT%H%M%S").to_string());

    cal.push(ics_event.done());
    let cal = cal.done();

    Ok(strip_ics_bloat(&cal.to_string()))
}

/// Clean up ICS output from the icalendar crate
/// - Replace PRODID with PLANTOMEET
/// - Remove CALSCALE:GREGORIAN (it's the default)
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:PLANTOMEET\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

fn event_window(
    info: &FinalizedPollInfo,
    today: NaiveDate,
) -> PlanToMeetResult<(NaiveDateTime, NaiveDateTime)> {
    let date = resolve_day(&info.day, today)
        .ok_or_else(|| PlanToMeetError::Ics(format!("Unrecognized day '{}'", info.day)))?;
    let start_time = parse_clock_time(&info.start_time).ok_or_else(|| {
        PlanToMeetError::Ics(format!("Unrecognized start time '{}'", info.start_time))
    })?;
    let start = date.and_time(start_time);

    let end = match parse_clock_time(&info.end_time).map(|t| date.and_time(t)) {
        Some(end) if end > start => Some(end),
        // Unparseable, or the slot runs past midnight
        _ if info.duration_minutes > 0 => {
            start.checked_add_signed(Duration::minutes(i64::from(info.duration_minutes)))
        }
        _ => None,
    };
    let end = end.ok_or_else(|| {
        PlanToMeetError::Ics(format!(
            "Slot '{}' has no usable end time or duration",
            info.slot_id
        ))
    })?;

    Ok((start, end))
}

/// Resolve a slot's `day`: an ISO date, or a weekday name taken as its next
/// occurrence on or after `today`.
pub fn resolve_day(day: &str, today: NaiveDate) -> Option<NaiveDate> {
    let day = day.trim();

    if let Ok(date) = NaiveDate::parse_from_str(day, "%Y-%m-%d") {
        return Some(date);
    }

    // "Mon", "monday", "Tue." or "Wed 3/4"
    let word = day
        .split_whitespace()
        .next()?
        .trim_end_matches(['.', ',']);
    let weekday: Weekday = word.parse().ok()?;

    let ahead = (7 + weekday.num_days_from_monday() - today.weekday().num_days_from_monday()) % 7;
    today.checked_add_signed(Duration::days(i64::from(ahead)))
}
