//! Responses: one availability answer per (poll, slot, session).

use serde::{Deserialize, Serialize};

use crate::availability::{Availability, DbAvailability, from_db_value};
use crate::error::PlanToMeetResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub poll_id: String,
    pub slot_id: String,
    pub session_id: String,
    pub availability: Availability,
}

/// `responses` table row as it comes off the wire.
///
/// `availability` stays a raw string so an unknown value surfaces as a
/// vocabulary error instead of a generic deserialization failure.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ResponseRow {
    pub poll_id: String,
    pub slot_id: String,
    pub session_id: String,
    pub availability: String,
}

/// `responses` row as written by this crate.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct NewResponseRow<'a> {
    pub poll_id: &'a str,
    pub slot_id: &'a str,
    pub session_id: &'a str,
    pub availability: DbAvailability,
}

impl TryFrom<ResponseRow> for Response {
    type Error = crate::error::PlanToMeetError;

    fn try_from(row: ResponseRow) -> PlanToMeetResult<Self> {
        Ok(Response {
            availability: from_db_value(&row.availability)?,
            poll_id: row.poll_id,
            slot_id: row.slot_id,
            session_id: row.session_id,
        })
    }
}
