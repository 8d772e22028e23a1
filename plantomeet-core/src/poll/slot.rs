//! Candidate meeting times.

use std::fmt;

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{PlanToMeetError, PlanToMeetResult};

/// One candidate time. Slots are frozen once the poll is shared: recipients
/// hold copies keyed by `slot_id`, so edits after distribution would split them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub slot_id: String,
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: u32,
}

impl Slot {
    pub fn new(
        slot_id: &str,
        day: &str,
        start_time: &str,
        end_time: &str,
        duration_minutes: u32,
    ) -> Self {
        Slot {
            slot_id: slot_id.to_string(),
            day: day.to_string(),
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            duration_minutes,
        }
    }

    /// Build a slot from its start and length, deriving `end_time` as `HH:MM`.
    pub fn starting_at(
        day: &str,
        start_time: &str,
        duration_minutes: u32,
    ) -> PlanToMeetResult<Self> {
        let start = parse_clock_time(start_time).ok_or_else(|| {
            PlanToMeetError::InvalidDraft(format!("Unrecognized start time '{start_time}'"))
        })?;
        let end = start + Duration::minutes(i64::from(duration_minutes));

        Ok(Slot {
            slot_id: uuid::Uuid::new_v4().to_string(),
            day: day.trim().to_string(),
            start_time: start.format("%H:%M").to_string(),
            end_time: end.format("%H:%M").to_string(),
            duration_minutes,
        })
    }

    pub(crate) fn validate(&self) -> PlanToMeetResult<()> {
        let blank = [
            ("slot id", &self.slot_id),
            ("day", &self.day),
            ("start time", &self.start_time),
            ("end time", &self.end_time),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty());

        if let Some((field, _)) = blank {
            return Err(PlanToMeetError::InvalidDraft(format!(
                "Slot '{}' has an empty {field}",
                self.slot_id
            )));
        }

        if self.duration_minutes == 0 {
            return Err(PlanToMeetError::InvalidDraft(format!(
                "Slot '{}' has a zero duration",
                self.slot_id
            )));
        }

        Ok(())
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}–{}", self.day, self.start_time, self.end_time)
    }
}

/// Parse a wall-clock time: `14:00`, `9:30`, `2:30 PM`, `2pm`, `14`.
pub fn parse_clock_time(input: &str) -> Option<NaiveTime> {
    let upper = input.trim().to_ascii_uppercase();

    let (clock, meridiem) = if let Some(rest) = upper.strip_suffix("AM") {
        (rest.trim_end(), Some("AM"))
    } else if let Some(rest) = upper.strip_suffix("PM") {
        (rest.trim_end(), Some("PM"))
    } else {
        (upper.as_str(), None)
    };

    if clock.is_empty() {
        return None;
    }

    // chrono needs minutes to build a NaiveTime
    let clock = if clock.contains(':') {
        clock.to_string()
    } else {
        format!("{clock}:00")
    };

    match meridiem {
        Some(m) => NaiveTime::parse_from_str(&format!("{clock} {m}"), "%I:%M %p").ok(),
        None => NaiveTime::parse_from_str(&clock, "%H:%M").ok(),
    }
}
