//! Error types for the plantomeet ecosystem.

use thiserror::Error;

/// Errors that can occur in plantomeet operations.
#[derive(Error, Debug)]
pub enum PlanToMeetError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// A message URL is missing a required field or carries a malformed one.
    #[error("Message URL decode error: {0}")]
    Decode(String),

    /// An availability value outside the closed three-element vocabulary.
    #[error("Unknown availability value: '{0}'")]
    Vocabulary(String),

    /// The backing store answered with a non-2xx status.
    #[error("Backend responded with status {status}: {body}")]
    Backend { status: u16, body: String },

    /// The request never produced a response (DNS, TLS, connection reset, ...).
    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid poll draft: {0}")]
    InvalidDraft(String),

    #[error("Slot '{slot_id}' does not belong to poll '{poll_id}'")]
    UnknownSlot { poll_id: String, slot_id: String },

    #[error("Poll not found: {0}")]
    PollNotFound(String),

    #[error("Poll '{0}' is finalized")]
    PollFinalized(String),

    #[error("ICS generation error: {0}")]
    Ics(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlanToMeetError {
    /// True when the store rejected a write because the row already exists.
    pub fn is_conflict(&self) -> bool {
        matches!(self, PlanToMeetError::Backend { status: 409, .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PlanToMeetError::Backend { status: 404, .. } | PlanToMeetError::PollNotFound(_)
        )
    }
}

impl From<serde_json::Error> for PlanToMeetError {
    fn from(err: serde_json::Error) -> Self {
        PlanToMeetError::Serialization(err.to_string())
    }
}

/// Result type alias for plantomeet operations.
pub type PlanToMeetResult<T> = Result<T, PlanToMeetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_is_backend_409_only() {
        let conflict = PlanToMeetError::Backend {
            status: 409,
            body: "duplicate key".into(),
        };
        let server = PlanToMeetError::Backend {
            status: 500,
            body: String::new(),
        };

        assert!(conflict.is_conflict());
        assert!(!server.is_conflict());
        assert!(!PlanToMeetError::Network("reset".into()).is_conflict());
    }

    #[test]
    fn backend_error_message_carries_status_and_body() {
        let err = PlanToMeetError::Backend {
            status: 401,
            body: "{\"message\":\"JWT expired\"}".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("JWT expired"));
    }
}
