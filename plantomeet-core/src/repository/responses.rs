//! Response persistence, keyed by (poll, slot, session).

use std::sync::Arc;

use serde_json::json;

use crate::availability::Availability;
use crate::error::PlanToMeetResult;
use crate::repository::{UpsertStrategy, upsert_row};
use crate::response::{NewResponseRow, Response, ResponseRow};
use crate::store::{Filter, RecordStore, Resource, StoreRequest, fetch_rows};

#[derive(Clone)]
pub struct ResponseRepository {
    store: Arc<dyn RecordStore>,
    strategy: UpsertStrategy,
}

fn into_responses(rows: Vec<ResponseRow>) -> PlanToMeetResult<Vec<Response>> {
    rows.into_iter().map(Response::try_from).collect()
}

impl ResponseRepository {
    pub fn new(store: Arc<dyn RecordStore>, strategy: UpsertStrategy) -> Self {
        ResponseRepository { store, strategy }
    }

    pub async fn list_responses(&self, poll_id: &str) -> PlanToMeetResult<Vec<Response>> {
        let request = StoreRequest::get(Resource::Responses)
            .select("*")
            .filter(Filter::eq("poll_id", poll_id));

        into_responses(fetch_rows(self.store.as_ref(), request).await?)
    }

    /// Batched fetch across polls. An empty id list returns without a request.
    pub async fn list_responses_for_polls<S: AsRef<str>>(
        &self,
        poll_ids: &[S],
    ) -> PlanToMeetResult<Vec<Response>> {
        if poll_ids.is_empty() {
            return Ok(Vec::new());
        }

        let request = StoreRequest::get(Resource::Responses)
            .select("*")
            .filter(Filter::in_list("poll_id", poll_ids));

        into_responses(fetch_rows(self.store.as_ref(), request).await?)
    }

    /// Record one session's availability for one slot. Later writes win.
    pub async fn upsert_response(
        &self,
        poll_id: &str,
        slot_id: &str,
        session_id: &str,
        availability: Availability,
    ) -> PlanToMeetResult<()> {
        let availability = availability.to_db();
        let row = serde_json::to_value(NewResponseRow {
            poll_id,
            slot_id,
            session_id,
            availability,
        })?;

        upsert_row(
            self.store.as_ref(),
            self.strategy,
            Resource::Responses,
            &[
                ("poll_id", poll_id),
                ("slot_id", slot_id),
                ("session_id", session_id),
            ],
            row,
            json!({ "availability": availability }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlanToMeetError;
    use crate::store::MemoryStore;

    fn repo(strategy: UpsertStrategy) -> (Arc<MemoryStore>, ResponseRepository) {
        let store = Arc::new(MemoryStore::new());
        let repo = ResponseRepository::new(store.clone(), strategy);
        (store, repo)
    }

    #[tokio::test]
    async fn single_vote_is_listed() {
        let (_, repo) = repo(UpsertStrategy::OnConflict);
        repo.upsert_response("p1", "s1", "u1", Availability::Yes)
            .await
            .unwrap();

        let responses = repo.list_responses("p1").await.unwrap();
        assert_eq!(
            responses,
            vec![Response {
                poll_id: "p1".into(),
                slot_id: "s1".into(),
                session_id: "u1".into(),
                availability: Availability::Yes,
            }]
        );
    }

    #[tokio::test]
    async fn stored_row_uses_wire_vocabulary() {
        let (store, repo) = repo(UpsertStrategy::OnConflict);
        repo.upsert_response("p1", "s1", "u1", Availability::Yes)
            .await
            .unwrap();

        assert_eq!(store.rows(Resource::Responses)[0]["availability"], "available");
    }

    #[tokio::test]
    async fn later_write_wins() {
        for strategy in [UpsertStrategy::OnConflict, UpsertStrategy::InsertThenUpdate] {
            let (store, repo) = repo(strategy);
            repo.upsert_response("p1", "s1", "u1", Availability::Maybe)
                .await
                .unwrap();
            repo.upsert_response("p1", "s1", "u1", Availability::No)
                .await
                .unwrap();

            assert_eq!(store.rows(Resource::Responses).len(), 1);
            let responses = repo.list_responses("p1").await.unwrap();
            assert_eq!(responses.len(), 1);
            assert_eq!(responses[0].availability, Availability::No, "{strategy:?}");
        }
    }

    #[tokio::test]
    async fn different_slots_are_different_rows() {
        let (_, repo) = repo(UpsertStrategy::OnConflict);
        repo.upsert_response("p1", "s1", "u1", Availability::Yes)
            .await
            .unwrap();
        repo.upsert_response("p1", "s2", "u1", Availability::No)
            .await
            .unwrap();

        assert_eq!(repo.list_responses("p1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_batch_skips_the_store() {
        let (store, repo) = repo(UpsertStrategy::OnConflict);
        let none: [&str; 0] = [];

        let responses = repo.list_responses_for_polls(&none).await.unwrap();

        assert!(responses.is_empty());
        assert_eq!(store.request_count(), 0);
    }

    #[tokio::test]
    async fn batch_fetch_spans_polls() {
        let (_, repo) = repo(UpsertStrategy::OnConflict);
        repo.upsert_response("p1", "s1", "u1", Availability::Yes)
            .await
            .unwrap();
        repo.upsert_response("p2", "s9", "u1", Availability::Maybe)
            .await
            .unwrap();
        repo.upsert_response("p3", "s1", "u1", Availability::No)
            .await
            .unwrap();

        let responses = repo
            .list_responses_for_polls(&["p1".to_string(), "p2".to_string()])
            .await
            .unwrap();

        let mut polls: Vec<&str> = responses.iter().map(|r| r.poll_id.as_str()).collect();
        polls.sort();
        assert_eq!(polls, vec!["p1", "p2"]);
    }

    #[tokio::test]
    async fn unknown_vocabulary_fails_the_read() {
        let (store, repo) = repo(UpsertStrategy::OnConflict);
        store.seed(
            Resource::Responses,
            json!({ "poll_id": "p1", "slot_id": "s1", "session_id": "u1", "availability": "busy" }),
        );

        let err = repo.list_responses("p1").await.unwrap_err();
        assert!(matches!(err, PlanToMeetError::Vocabulary(v) if v == "busy"));
    }

    #[tokio::test]
    async fn network_shaped_failures_propagate() {
        let (store, repo) = repo(UpsertStrategy::OnConflict);
        store.fail_with(502, "bad gateway");

        assert!(repo.list_responses("p1").await.is_err());
        assert!(
            repo.upsert_response("p1", "s1", "u1", Availability::Yes)
                .await
                .is_err()
        );
    }
}
