//! Entry point the host calls when the extension opens or a message is tapped.
//!
//! All state is resolved from the selected message URL. There is no other
//! session memory: per-invocation state goes into a [`PollContext`].

use std::sync::Arc;

use crate::aggregate::PollSummary;
use crate::availability::Availability;
use crate::error::{PlanToMeetError, PlanToMeetResult};
use crate::message_url::{decode_finalized, extract_poll_id, is_finalized};
use crate::participant::Participant;
use crate::poll::{FinalizedPollInfo, Poll, PollState};
use crate::repository::{ParticipantRepository, ResponseRepository, UpsertStrategy};
use crate::response::Response;
use crate::store::RecordStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    BecameActive,
    SelectedMessage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Start a new poll.
    Composer,
    PollDetail { poll_id: String },
    AddToCalendar(FinalizedPollInfo),
}

/// Decide what to show for the URL attached to the selected message.
///
/// Both triggers resolve the same way. A finalized URL that fails to decode
/// falls back to the composer rather than failing.
pub fn route(trigger: Trigger, selected_url: Option<&str>) -> Route {
    let Some(url) = selected_url else {
        tracing::debug!(?trigger, "no selected message, opening composer");
        return Route::Composer;
    };

    if is_finalized(url) {
        return match decode_finalized(url) {
            Ok(info) => Route::AddToCalendar(info),
            Err(err) => {
                tracing::warn!(
                    ?trigger,
                    %url,
                    error = %err,
                    "finalized URL did not decode, opening composer"
                );
                Route::Composer
            }
        };
    }

    match extract_poll_id(url) {
        Some(poll_id) => Route::PollDetail { poll_id },
        None => {
            tracing::debug!(?trigger, %url, "not a poll URL, opening composer");
            Route::Composer
        }
    }
}

/// Everything one routing invocation needs to talk to the store for a poll.
#[derive(Clone)]
pub struct PollContext {
    poll_id: String,
    session_id: String,
    participants: ParticipantRepository,
    responses: ResponseRepository,
}

impl PollContext {
    pub fn new(
        poll_id: &str,
        session_id: &str,
        store: Arc<dyn RecordStore>,
        strategy: UpsertStrategy,
    ) -> Self {
        PollContext {
            poll_id: poll_id.to_string(),
            session_id: session_id.to_string(),
            participants: ParticipantRepository::new(store.clone(), strategy),
            responses: ResponseRepository::new(store, strategy),
        }
    }

    pub fn poll_id(&self) -> &str {
        &self.poll_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Register this session on the poll. Calling again just updates the name.
    pub async fn join(&self, display_name: Option<String>) -> PlanToMeetResult<Participant> {
        let participant = Participant::new(&self.poll_id, &self.session_id, display_name);
        self.participants.upsert_participant(&participant).await?;
        Ok(participant)
    }

    /// Rename this session on every poll it joined.
    pub async fn rename(&self, display_name: &str) -> PlanToMeetResult<()> {
        self.participants
            .update_display_name_for_session(&self.session_id, display_name)
            .await
    }

    /// Record this session's answer for one slot.
    ///
    /// Only an open poll takes answers, and only for its own slots. The
    /// store itself would accept either.
    pub async fn set_availability(
        &self,
        state: &PollState,
        slot_id: &str,
        availability: Availability,
    ) -> PlanToMeetResult<()> {
        let poll = self.own_poll(state)?;
        poll.require_slot(slot_id)?;

        self.responses
            .upsert_response(&self.poll_id, slot_id, &self.session_id, availability)
            .await
    }

    fn own_poll<'a>(&self, state: &'a PollState) -> PlanToMeetResult<&'a Poll> {
        let poll = state.open()?;
        if poll.id != self.poll_id {
            return Err(PlanToMeetError::PollNotFound(self.poll_id.clone()));
        }
        Ok(poll)
    }

    pub async fn responses(&self) -> PlanToMeetResult<Vec<Response>> {
        self.responses.list_responses(&self.poll_id).await
    }

    pub async fn participants(&self) -> PlanToMeetResult<Vec<Participant>> {
        self.participants.list_participants(&self.poll_id).await
    }

    /// This session's answers, keyed by slot id.
    pub async fn my_answers(&self) -> PlanToMeetResult<Vec<(String, Availability)>> {
        Ok(self
            .responses()
            .await?
            .into_iter()
            .filter(|r| r.session_id == self.session_id)
            .map(|r| (r.slot_id, r.availability))
            .collect())
    }

    /// Fresh tally. Nothing is cached between calls.
    pub async fn summary(&self, poll: &Poll) -> PlanToMeetResult<PollSummary> {
        let responses = self.responses().await?;
        Ok(PollSummary::tally(poll, &responses))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message_url::MessageUrlCodec;
    use crate::poll::{PollDraft, Slot};
    use crate::store::{MemoryStore, Resource};

    fn standup() -> Poll {
        let mut draft = PollDraft::new("Standup");
        draft
            .add_slot(Slot::new("s1", "Mon", "14:00", "15:00", 60))
            .add_slot(Slot::new("s2", "Tue", "09:00", "10:00", 60));
        draft.publish_as("p1").unwrap()
    }

    fn context(store: &Arc<MemoryStore>, session: &str) -> PollContext {
        PollContext::new("p1", session, store.clone(), UpsertStrategy::OnConflict)
    }

    #[test]
    fn no_url_opens_composer() {
        for trigger in [Trigger::BecameActive, Trigger::SelectedMessage] {
            assert_eq!(route(trigger, None), Route::Composer);
        }
    }

    #[test]
    fn poll_url_opens_detail() {
        let codec = MessageUrlCodec::new("https://plantomeet.app").unwrap();
        let url = codec.poll_url(&standup());

        assert_eq!(
            route(Trigger::SelectedMessage, Some(url.as_str())),
            Route::PollDetail { poll_id: "p1".into() }
        );
    }

    #[test]
    fn finalized_url_opens_add_to_calendar() {
        let codec = MessageUrlCodec::new("https://plantomeet.app").unwrap();
        let info = standup().finalize("s1").unwrap().info();
        let url = codec.encode_finalized(&info);

        assert_eq!(
            route(Trigger::BecameActive, Some(url.as_str())),
            Route::AddToCalendar(info)
        );
    }

    #[test]
    fn broken_finalized_url_falls_back_to_composer() {
        let url = "https://plantomeet.app/poll/p1?finalized=true&pollId=p1&title=x";
        assert_eq!(route(Trigger::SelectedMessage, Some(url)), Route::Composer);
    }

    #[test]
    fn unrelated_url_opens_composer() {
        assert_eq!(
            route(Trigger::SelectedMessage, Some("https://example.test/news")),
            Route::Composer
        );
        assert_eq!(route(Trigger::SelectedMessage, Some("::")), Route::Composer);
    }

    #[tokio::test]
    async fn join_vote_and_summarize() {
        let store = Arc::new(MemoryStore::new());
        let state = PollState::Open(standup());

        let ana = context(&store, "u1");
        let ben = context(&store, "u2");
        ana.join(Some("Ana".into())).await.unwrap();
        ben.join(None).await.unwrap();

        ana.set_availability(&state, "s1", Availability::Yes).await.unwrap();
        ana.set_availability(&state, "s2", Availability::Maybe).await.unwrap();

        let summary = ben.summary(&standup()).await.unwrap();
        assert_eq!(summary.slots[0].yes, 1);
        assert_eq!(summary.slots[1].maybe, 1);

        let participants = ben.participants().await.unwrap();
        let pending: Vec<&str> = summary
            .pending(&participants)
            .into_iter()
            .map(Participant::label)
            .collect();
        assert_eq!(pending, vec!["u2"]);

        let mut mine = ana.my_answers().await.unwrap();
        mine.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            mine,
            vec![("s1".into(), Availability::Yes), ("s2".into(), Availability::Maybe)]
        );
    }

    #[tokio::test]
    async fn finalized_poll_refuses_votes_without_touching_the_store() {
        let store = Arc::new(MemoryStore::new());
        let state = PollState::Finalized(standup().finalize("s1").unwrap());

        let err = context(&store, "u1")
            .set_availability(&state, "s2", Availability::Yes)
            .await
            .unwrap_err();

        assert!(matches!(err, PlanToMeetError::PollFinalized(_)));
        assert_eq!(store.request_count(), 0);
    }

    #[tokio::test]
    async fn foreign_slot_is_refused() {
        let store = Arc::new(MemoryStore::new());
        let state = PollState::Open(standup());

        let err = context(&store, "u1")
            .set_availability(&state, "s9", Availability::Yes)
            .await
            .unwrap_err();

        assert!(matches!(err, PlanToMeetError::UnknownSlot { .. }));
        assert!(store.rows(Resource::Responses).is_empty());
    }

    #[tokio::test]
    async fn context_for_another_poll_is_refused() {
        let store = Arc::new(MemoryStore::new());
        let mut other = standup();
        other.id = "p2".into();

        let err = context(&store, "u1")
            .set_availability(&PollState::Open(other), "s1", Availability::Yes)
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn rename_reaches_all_polls_of_session() {
        let store = Arc::new(MemoryStore::new());
        let p1 = context(&store, "u1");
        let p2 = PollContext::new("p2", "u1", store.clone(), UpsertStrategy::OnConflict);
        p1.join(Some("Ana".into())).await.unwrap();
        p2.join(Some("Ana".into())).await.unwrap();

        p1.rename("Ana Lima").await.unwrap();

        for row in store.rows(Resource::Participants) {
            assert_eq!(row["display_name"], "Ana Lima");
        }
    }
}
