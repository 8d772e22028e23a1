//! Composing a poll before it is shared.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{PlanToMeetError, PlanToMeetResult};
use crate::poll::{Poll, Slot};

/// A poll being composed. Nothing is persisted or shared yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollDraft {
    pub title: String,
    pub slots: Vec<Slot>,
}

impl PollDraft {
    pub fn new(title: &str) -> Self {
        PollDraft {
            title: title.trim().to_string(),
            slots: Vec::new(),
        }
    }

    pub fn add_slot(&mut self, slot: Slot) -> &mut Self {
        self.slots.push(slot);
        self
    }

    pub fn remove_slot(&mut self, slot_id: &str) -> Option<Slot> {
        let index = self.slots.iter().position(|s| s.slot_id == slot_id)?;
        Some(self.slots.remove(index))
    }

    pub fn validate(&self) -> PlanToMeetResult<()> {
        if self.slots.is_empty() {
            return Err(PlanToMeetError::InvalidDraft(
                "A poll needs at least one slot".into(),
            ));
        }

        let mut seen = HashSet::new();
        for slot in &self.slots {
            slot.validate()?;
            if !seen.insert(slot.slot_id.as_str()) {
                return Err(PlanToMeetError::InvalidDraft(format!(
                    "Duplicate slot id '{}'",
                    slot.slot_id
                )));
            }
        }

        Ok(())
    }

    /// Share the poll under a freshly generated id.
    pub fn publish(self) -> PlanToMeetResult<Poll> {
        let poll_id = uuid::Uuid::new_v4().to_string();
        self.publish_as(&poll_id)
    }

    /// Share the poll under an id chosen by the caller.
    pub fn publish_as(self, poll_id: &str) -> PlanToMeetResult<Poll> {
        if poll_id.trim().is_empty() {
            return Err(PlanToMeetError::InvalidDraft("Poll id is empty".into()));
        }
        self.validate()?;

        Ok(Poll {
            id: poll_id.to_string(),
            title: self.title,
            slots: self.slots,
        })
    }
}
