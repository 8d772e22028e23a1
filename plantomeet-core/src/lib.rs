//! Core poll state synchronization for plantomeet.
//!
//! This crate provides everything a host client needs to run a poll inside a
//! messaging thread:
//! - `store` and `repository` for participants and responses in the backing store
//! - `poll` for the `Composing -> Open -> Finalized` lifecycle
//! - `message_url` for carrying poll state inside message URLs
//! - `aggregate` for per-slot availability summaries
//! - `routing` for the host's entry point and per-invocation context

pub mod aggregate;
pub mod app_config;
pub mod availability;
pub mod constants;
pub mod error;
pub mod ics;
pub mod message_url;
pub mod participant;
pub mod poll;
pub mod repository;
pub mod response;
pub mod routing;
pub mod store;

// Re-export the everyday types at crate root for convenience
pub use aggregate::{PollSummary, SlotTally};
pub use app_config::AppConfig;
pub use availability::Availability;
pub use error::{PlanToMeetError, PlanToMeetResult};
pub use message_url::MessageUrlCodec;
pub use participant::Participant;
pub use poll::{FinalizedPoll, FinalizedPollInfo, Poll, PollDraft, PollState, PollStatus, Slot};
pub use response::Response;
pub use routing::{PollContext, Route, Trigger, route};
