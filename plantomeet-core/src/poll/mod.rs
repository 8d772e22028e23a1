//! Poll lifecycle: `Composing -> Open -> Finalized`.
//!
//! Each state is its own type. A [`PollDraft`] publishes into a [`Poll`], and
//! a `Poll` is consumed by [`Poll::finalize`] to produce a [`FinalizedPoll`].
//! `FinalizedPoll` has no way back to `Poll`, so a second finalization
//! cannot be written.

mod draft;
mod finalized;
mod local;
mod slot;

pub use draft::PollDraft;
pub use finalized::FinalizedPollInfo;
pub use local::LocalPolls;
pub use slot::{Slot, parse_clock_time};

use serde::{Deserialize, Serialize};

use crate::constants::UNTITLED_POLL;
use crate::error::{PlanToMeetError, PlanToMeetResult};

/// A shared poll accepting participants and responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub id: String,
    pub title: String,
    pub slots: Vec<Slot>,
}

impl Poll {
    pub fn slot(&self, slot_id: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.slot_id == slot_id)
    }

    /// Like [`Poll::slot`], but a slot from another poll is an error.
    pub fn require_slot(&self, slot_id: &str) -> PlanToMeetResult<&Slot> {
        self.slot(slot_id).ok_or_else(|| PlanToMeetError::UnknownSlot {
            poll_id: self.id.clone(),
            slot_id: slot_id.to_string(),
        })
    }

    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            UNTITLED_POLL
        } else {
            &self.title
        }
    }

    /// Text the host shows for the open poll's message bubble.
    pub fn summary_text(&self) -> String {
        format!("Shared {}", self.display_title())
    }

    /// Pick the outcome. One-way: the open poll is consumed.
    pub fn finalize(self, slot_id: &str) -> PlanToMeetResult<FinalizedPoll> {
        let index = self
            .slots
            .iter()
            .position(|s| s.slot_id == slot_id)
            .ok_or_else(|| PlanToMeetError::UnknownSlot {
                poll_id: self.id.clone(),
                slot_id: slot_id.to_string(),
            })?;

        Ok(FinalizedPoll { poll: self, index })
    }
}

/// A poll with its outcome chosen. Terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedPoll {
    poll: Poll,
    index: usize,
}

impl FinalizedPoll {
    pub fn poll(&self) -> &Poll {
        &self.poll
    }

    pub fn slot(&self) -> &Slot {
        &self.poll.slots[self.index]
    }

    /// The self-contained snapshot that travels in the finalized message URL.
    pub fn info(&self) -> FinalizedPollInfo {
        FinalizedPollInfo::new(&self.poll, self.slot())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollStatus {
    Open,
    Finalized,
}

/// Where a poll is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    Composing(PollDraft),
    Open(Poll),
    Finalized(FinalizedPoll),
}

impl PollState {
    /// `None` while composing: nothing has been persisted yet.
    pub fn status(&self) -> Option<PollStatus> {
        match self {
            PollState::Composing(_) => None,
            PollState::Open(_) => Some(PollStatus::Open),
            PollState::Finalized(_) => Some(PollStatus::Finalized),
        }
    }

    pub fn poll_id(&self) -> Option<&str> {
        match self {
            PollState::Composing(_) => None,
            PollState::Open(poll) => Some(&poll.id),
            PollState::Finalized(finalized) => Some(&finalized.poll().id),
        }
    }

    /// The poll, if it still accepts responses.
    pub fn open(&self) -> PlanToMeetResult<&Poll> {
        match self {
            PollState::Open(poll) => Ok(poll),
            PollState::Finalized(finalized) => {
                Err(PlanToMeetError::PollFinalized(finalized.poll().id.clone()))
            }
            PollState::Composing(_) => Err(PlanToMeetError::InvalidDraft(
                "Poll has not been published".into(),
            )),
        }
    }
}
