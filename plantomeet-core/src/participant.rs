//! Participants: one row per (poll, session).

use serde::{Deserialize, Serialize};

/// A person taking part in a poll, identified by the host's session id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub poll_id: String,
    pub session_id: String,
    pub display_name: Option<String>,
}

impl Participant {
    pub fn new(poll_id: &str, session_id: &str, display_name: Option<String>) -> Self {
        Participant {
            poll_id: poll_id.to_string(),
            session_id: session_id.to_string(),
            display_name,
        }
    }

    /// Display name, falling back to the session id for anonymous participants.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.session_id)
    }
}

/// `participants` table row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ParticipantRow {
    pub poll_id: String,
    pub session_id: String,
    pub display_name: Option<String>,
}

impl From<ParticipantRow> for Participant {
    fn from(row: ParticipantRow) -> Self {
        Participant {
            poll_id: row.poll_id,
            session_id: row.session_id,
            display_name: row.display_name,
        }
    }
}

impl From<&Participant> for ParticipantRow {
    fn from(participant: &Participant) -> Self {
        ParticipantRow {
            poll_id: participant.poll_id.clone(),
            session_id: participant.session_id.clone(),
            display_name: participant.display_name.clone(),
        }
    }
}
