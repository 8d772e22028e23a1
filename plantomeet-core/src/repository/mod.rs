//! Repositories for the `participants` and `responses` resources.
//!
//! Both upserts go to the store as a single write keyed on the compound
//! unique key, so two clients writing the same key at the same time end up
//! with one row holding whichever write landed last. Nothing stronger than
//! last-write-wins per cell is promised.

mod participants;
mod responses;

pub use participants::ParticipantRepository;
pub use responses::ResponseRepository;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PlanToMeetResult;
use crate::store::{Filter, Prefer, RecordStore, Resource, StoreRequest, execute_minimal};

/// How an upsert is pushed to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertStrategy {
    /// One `POST ... ?on_conflict=<key>` with `resolution=merge-duplicates`.
    #[default]
    OnConflict,
    /// Plain `POST`; a unique-key conflict is retried once as a `PATCH` on the key.
    /// For stores that do not support `on_conflict`.
    InsertThenUpdate,
}

/// Write `row` under its compound key using `strategy`.
///
/// `update` holds the non-key columns sent when a conflict is retried as a PATCH.
pub(crate) async fn upsert_row(
    store: &dyn RecordStore,
    strategy: UpsertStrategy,
    resource: Resource,
    key: &[(&str, &str)],
    row: Value,
    update: Value,
) -> PlanToMeetResult<()> {
    match strategy {
        UpsertStrategy::OnConflict => {
            let request = StoreRequest::post(resource)
                .on_conflict(resource.key_columns())
                .prefer(Prefer::MergeDuplicates)
                .body(row);
            execute_minimal(store, request).await
        }
        UpsertStrategy::InsertThenUpdate => {
            let insert = StoreRequest::post(resource).body(row);
            match execute_minimal(store, insert).await {
                Err(err) if err.is_conflict() => {
                    tracing::warn!(
                        %resource,
                        ?key,
                        "upsert hit an existing row, retrying as update"
                    );
                    let patch = key
                        .iter()
                        .fold(StoreRequest::patch(resource), |request, (column, value)| {
                            request.filter(Filter::eq(column, value))
                        })
                        .body(update);
                    execute_minimal(store, patch).await
                }
                other => other,
            }
        }
    }
}
