//! Participant persistence, keyed by (poll, session).

use std::sync::Arc;

use serde_json::json;

use crate::error::PlanToMeetResult;
use crate::participant::{Participant, ParticipantRow};
use crate::repository::{UpsertStrategy, upsert_row};
use crate::store::{Filter, RecordStore, Resource, StoreRequest, execute_minimal, fetch_rows};

#[derive(Clone)]
pub struct ParticipantRepository {
    store: Arc<dyn RecordStore>,
    strategy: UpsertStrategy,
}

impl ParticipantRepository {
    pub fn new(store: Arc<dyn RecordStore>, strategy: UpsertStrategy) -> Self {
        ParticipantRepository { store, strategy }
    }

    /// Point lookup on the compound key. Returns the first match, if any.
    pub async fn get_participant(
        &self,
        poll_id: &str,
        session_id: &str,
    ) -> PlanToMeetResult<Option<Participant>> {
        let request = StoreRequest::get(Resource::Participants)
            .select("*")
            .filter(Filter::eq("poll_id", poll_id))
            .filter(Filter::eq("session_id", session_id))
            .limit(1);

        let rows: Vec<ParticipantRow> = fetch_rows(self.store.as_ref(), request).await?;
        Ok(rows.into_iter().next().map(Participant::from))
    }

    pub async fn list_participants(&self, poll_id: &str) -> PlanToMeetResult<Vec<Participant>> {
        let request = StoreRequest::get(Resource::Participants)
            .select("*")
            .filter(Filter::eq("poll_id", poll_id));

        let rows: Vec<ParticipantRow> = fetch_rows(self.store.as_ref(), request).await?;
        Ok(rows.into_iter().map(Participant::from).collect())
    }

    /// Insert or update the participant row for (poll, session). Idempotent.
    pub async fn upsert_participant(&self, participant: &Participant) -> PlanToMeetResult<()> {
        let row = serde_json::to_value(ParticipantRow::from(participant))?;
        let update = json!({ "display_name": participant.display_name });

        upsert_row(
            self.store.as_ref(),
            self.strategy,
            Resource::Participants,
            &[
                ("poll_id", participant.poll_id.as_str()),
                ("session_id", participant.session_id.as_str()),
            ],
            row,
            update,
        )
        .await
    }

    /// Rename a session across every poll it joined.
    ///
    /// This is a blind PATCH scoped only by session: there is no existence
    /// check, and a session with no rows is a silent no-op, not an error.
    pub async fn update_display_name_for_session(
        &self,
        session_id: &str,
        display_name: &str,
    ) -> PlanToMeetResult<()> {
        let request = StoreRequest::patch(Resource::Participants)
            .filter(Filter::eq("session_id", session_id))
            .body(json!({ "display_name": display_name }));

        execute_minimal(self.store.as_ref(), request).await
    }
}
