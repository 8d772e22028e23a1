//! Self-contained snapshot of a finalized poll.

use serde::{Deserialize, Serialize};

use crate::constants::UNTITLED_EVENT;
use crate::poll::{Poll, Slot};

/// Everything a recipient needs to put the chosen slot on a calendar.
///
/// There is no row for this in the store: it lives only inside the
/// finalized message URL (see `message_url`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizedPollInfo {
    pub poll_id: String,
    pub title: String,
    pub slot_id: String,
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: u32,
}

impl FinalizedPollInfo {
    pub fn new(poll: &Poll, slot: &Slot) -> Self {
        FinalizedPollInfo {
            poll_id: poll.id.clone(),
            title: poll.title.clone(),
            slot_id: slot.slot_id.clone(),
            day: slot.day.clone(),
            start_time: slot.start_time.clone(),
            end_time: slot.end_time.clone(),
            duration_minutes: slot.duration_minutes,
        }
    }

    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            UNTITLED_EVENT
        } else {
            &self.title
        }
    }

    pub fn short_date(&self) -> String {
        format!("{} {}", self.day, self.start_time)
    }

    /// Text the host shows for the finalized message bubble.
    pub fn summary_text(&self) -> String {
        format!("{} scheduled for {}", self.display_title(), self.short_date())
    }
}
