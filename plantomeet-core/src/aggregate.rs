//! Per-slot availability summaries.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::availability::Availability;
use crate::participant::Participant;
use crate::poll::{Poll, Slot};
use crate::response::Response;

/// Counts for one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotTally {
    pub slot: Slot,
    pub yes: usize,
    pub maybe: usize,
    pub no: usize,
    /// session id -> answer
    pub votes: BTreeMap<String, Availability>,
}

impl SlotTally {
    fn new(slot: &Slot) -> Self {
        SlotTally {
            slot: slot.clone(),
            yes: 0,
            maybe: 0,
            no: 0,
            votes: BTreeMap::new(),
        }
    }

    fn record(&mut self, session_id: &str, availability: Availability) {
        // At most one response per key, but a batched read can still carry
        // legacy duplicates. The last one read wins.
        if let Some(previous) = self.votes.insert(session_id.to_string(), availability) {
            *self.count_mut(previous) -= 1;
        }
        *self.count_mut(availability) += 1;
    }

    fn count_mut(&mut self, availability: Availability) -> &mut usize {
        match availability {
            Availability::Yes => &mut self.yes,
            Availability::Maybe => &mut self.maybe,
            Availability::No => &mut self.no,
        }
    }

    /// A "yes" is worth two "maybe"s.
    pub fn score(&self) -> usize {
        2 * self.yes + self.maybe
    }

    pub fn total(&self) -> usize {
        self.votes.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSummary {
    pub poll_id: String,
    /// In the poll's slot order.
    pub slots: Vec<SlotTally>,
    /// Responses that named another poll or a slot this poll does not have.
    pub orphaned: usize,
}

impl PollSummary {
    pub fn tally(poll: &Poll, responses: &[Response]) -> Self {
        let mut slots: Vec<SlotTally> = poll.slots.iter().map(SlotTally::new).collect();
        let mut orphaned = 0;

        for response in responses {
            let tally = if response.poll_id == poll.id {
                slots.iter_mut().find(|t| t.slot.slot_id == response.slot_id)
            } else {
                None
            };

            match tally {
                Some(tally) => tally.record(&response.session_id, response.availability),
                None => orphaned += 1,
            }
        }

        if orphaned > 0 {
            tracing::warn!(
                poll_id = %poll.id,
                orphaned,
                "responses reference slots outside the poll"
            );
        }

        PollSummary {
            poll_id: poll.id.clone(),
            slots,
            orphaned,
        }
    }

    /// Slots tied at the top score. Empty until someone says yes or maybe.
    pub fn best_slots(&self) -> Vec<&SlotTally> {
        let top = self.slots.iter().map(SlotTally::score).max().unwrap_or(0);
        if top == 0 {
            return Vec::new();
        }
        self.slots.iter().filter(|t| t.score() == top).collect()
    }

    /// Sessions with at least one counted response.
    pub fn respondents(&self) -> BTreeSet<&str> {
        self.slots
            .iter()
            .flat_map(|t| t.votes.keys().map(String::as_str))
            .collect()
    }

    /// Joined participants who have not answered any slot yet.
    pub fn pending<'a>(&self, participants: &'a [Participant]) -> Vec<&'a Participant> {
        let respondents = self.respondents();
        participants
            .iter()
            .filter(|p| p.poll_id == self.poll_id && !respondents.contains(p.session_id.as_str()))
            .collect()
    }
}

/// Split a batched multi-poll read by poll id.
pub fn group_by_poll(responses: Vec<Response>) -> HashMap<String, Vec<Response>> {
    let mut grouped: HashMap<String, Vec<Response>> = HashMap::new();
    for response in responses {
        grouped
            .entry(response.poll_id.clone())
            .or_default()
            .push(response);
    }
    grouped
}
