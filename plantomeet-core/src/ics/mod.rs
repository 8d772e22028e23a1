//! Calendar export for finalized polls.
//!
//! Produces a single-event RFC 5545 calendar that a recipient can import.

mod generate;

pub use generate::{generate_ics, resolve_day};
