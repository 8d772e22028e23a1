//! In-process record store with the backing service's observable semantics.
//!
//! Unique keys are enforced per resource: a plain POST that collides answers
//! 409, a POST with `on_conflict` + `resolution=merge-duplicates` updates the
//! existing row. Every request is counted so tests can assert that a call
//! never reached the store.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use crate::error::{PlanToMeetError, PlanToMeetResult};
use crate::store::{Method, Prefer, RecordStore, Resource, StoreRequest};

type Row = Map<String, Value>;

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<Resource, Vec<Row>>>,
    requests: AtomicUsize,
    failure: Mutex<Option<PlanToMeetError>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests executed so far, failed ones included.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Snapshot of a table's rows.
    pub fn rows(&self, resource: Resource) -> Vec<Value> {
        let tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        tables
            .get(&resource)
            .map(|rows| rows.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default()
    }

    /// Insert a row directly, bypassing unique keys (for seeding legacy or bad data).
    pub fn seed(&self, resource: Resource, row: Value) {
        if let Value::Object(row) = row {
            let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
            tables.entry(resource).or_default().push(row);
        }
    }

    /// Make every following request fail with a backend error.
    pub fn fail_with(&self, status: u16, body: &str) {
        let mut failure = self.failure.lock().unwrap_or_else(|e| e.into_inner());
        *failure = Some(PlanToMeetError::Backend {
            status,
            body: body.to_string(),
        });
    }

    fn injected_failure(&self) -> Option<PlanToMeetError> {
        let failure = self.failure.lock().unwrap_or_else(|e| e.into_inner());
        match failure.as_ref() {
            Some(PlanToMeetError::Backend { status, body }) => Some(PlanToMeetError::Backend {
                status: *status,
                body: body.clone(),
            }),
            _ => None,
        }
    }
}

fn matches_all(request: &StoreRequest, row: &Row) -> bool {
    request.filters.iter().all(|f| f.matches(row))
}

fn same_key(resource: Resource, a: &Row, b: &Row) -> bool {
    resource
        .key_columns()
        .iter()
        .all(|column| a.get(*column) == b.get(*column))
}

fn project(row: &Row, select: Option<&str>) -> Value {
    match select {
        None | Some("*") => Value::Object(row.clone()),
        Some(columns) => {
            let projected: Row = columns
                .split(',')
                .map(str::trim)
                .filter_map(|c| row.get(c).map(|v| (c.to_string(), v.clone())))
                .collect();
            Value::Object(projected)
        }
    }
}

fn body_rows(request: &StoreRequest) -> PlanToMeetResult<Vec<Row>> {
    match &request.body {
        Some(Value::Object(row)) => Ok(vec![row.clone()]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::Object(row) => Ok(row.clone()),
                other => Err(bad_request(&format!("row must be an object, got {other}"))),
            })
            .collect(),
        _ => Err(bad_request("request body must be a JSON object or array")),
    }
}

fn bad_request(message: &str) -> PlanToMeetError {
    PlanToMeetError::Backend {
        status: 400,
        body: json!({ "message": message }).to_string(),
    }
}

fn unique_violation(resource: Resource) -> PlanToMeetError {
    PlanToMeetError::Backend {
        status: 409,
        body: json!({
            "code": "23505",
            "message": format!(
                "duplicate key value violates unique constraint \"{resource}_pkey\""
            ),
        })
        .to_string(),
    }
}

fn merge(target: &mut Row, patch: &Row) {
    for (column, value) in patch {
        target.insert(column.clone(), value.clone());
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn execute(&self, request: StoreRequest) -> PlanToMeetResult<Option<Value>> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self.injected_failure() {
            return Err(err);
        }

        let resource = request.resource;
        let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        let table = tables.entry(resource).or_default();

        match request.method {
            Method::Get => {
                let limit = request.limit.unwrap_or(usize::MAX);
                let rows: Vec<Value> = table
                    .iter()
                    .filter(|row| matches_all(&request, row))
                    .take(limit)
                    .map(|row| project(row, request.select.as_deref()))
                    .collect();
                Ok(Some(Value::Array(rows)))
            }
            Method::Post => {
                let upsert =
                    request.on_conflict.is_some() && request.has_prefer(Prefer::MergeDuplicates);
                let incoming = body_rows(&request)?;

                // Validate the whole batch before touching the table
                if !upsert {
                    for row in &incoming {
                        if table.iter().any(|existing| same_key(resource, existing, row)) {
                            return Err(unique_violation(resource));
                        }
                    }
                }

                for row in incoming {
                    match table.iter_mut().find(|existing| same_key(resource, existing, &row)) {
                        Some(existing) => merge(existing, &row),
                        None => table.push(row),
                    }
                }

                Ok(None)
            }
            Method::Patch => {
                let patch = match &request.body {
                    Some(Value::Object(patch)) => patch.clone(),
                    _ => return Err(bad_request("PATCH body must be a JSON object")),
                };

                for row in table.iter_mut().filter(|row| matches_all(&request, row)) {
                    merge(row, &patch);
                }

                Ok(None)
            }
            Method::Delete => {
                table.retain(|row| !matches_all(&request, row));
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Filter;

    fn participant(poll: &str, session: &str, name: &str) -> Value {
        json!({ "poll_id": poll, "session_id": session, "display_name": name })
    }

    #[tokio::test]
    async fn plain_post_conflicts_on_duplicate_key() {
        let store = MemoryStore::new();
        let insert = || {
            StoreRequest::post(Resource::Participants)
                .body(participant("p1", "u1", "Ana"))
                .prefer(Prefer::ReturnMinimal)
        };

        assert!(store.execute(insert()).await.unwrap().is_none());
        let err = store.execute(insert()).await.unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(store.rows(Resource::Participants).len(), 1);
    }

    #[tokio::test]
    async fn merge_duplicates_updates_in_place() {
        let store = MemoryStore::new();
        let upsert = |name: &str| {
            StoreRequest::post(Resource::Participants)
                .on_conflict(Resource::Participants.key_columns())
                .prefer(Prefer::MergeDuplicates)
                .body(participant("p1", "u1", name))
        };

        store.execute(upsert("Ana")).await.unwrap();
        store.execute(upsert("Ana B.")).await.unwrap();

        let rows = store.rows(Resource::Participants);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["display_name"], "Ana B.");
    }

    #[tokio::test]
    async fn get_applies_filters_limit_and_select() {
        let store = MemoryStore::new();
        store.seed(Resource::Participants, participant("p1", "u1", "Ana"));
        store.seed(Resource::Participants, participant("p1", "u2", "Ben"));
        store.seed(Resource::Participants, participant("p2", "u1", "Ana"));

        let request = StoreRequest::get(Resource::Participants)
            .select("session_id")
            .filter(Filter::eq("poll_id", "p1"))
            .limit(1);

        let rows = store.execute(request).await.unwrap().unwrap();
        assert_eq!(rows, json!([{ "session_id": "u1" }]));
    }

    #[tokio::test]
    async fn patch_without_match_is_a_no_op() {
        let store = MemoryStore::new();
        store.seed(Resource::Participants, participant("p1", "u1", "Ana"));

        let request = StoreRequest::patch(Resource::Participants)
            .filter(Filter::eq("session_id", "nobody"))
            .body(json!({ "display_name": "Zed" }));

        assert!(store.execute(request).await.unwrap().is_none());
        assert_eq!(store.rows(Resource::Participants)[0]["display_name"], "Ana");
    }

    #[tokio::test]
    async fn mutations_answer_without_a_body() {
        let store = MemoryStore::new();
        let upsert = StoreRequest::post(Resource::Participants)
            .on_conflict(Resource::Participants.key_columns())
            .prefer(Prefer::MergeDuplicates)
            .body(participant("p1", "u1", "Ana"));
        let rename = StoreRequest::patch(Resource::Participants)
            .filter(Filter::eq("session_id", "u1"))
            .body(json!({ "display_name": "Ana B." }));

        assert!(store.execute(upsert).await.unwrap().is_none());
        assert!(store.execute(rename).await.unwrap().is_none());
        assert_eq!(store.rows(Resource::Participants)[0]["display_name"], "Ana B.");
    }

    #[tokio::test]
    async fn injected_failure_surfaces_and_is_counted() {
        let store = MemoryStore::new();
        store.fail_with(503, "upstream unavailable");

        let err = store
            .execute(StoreRequest::get(Resource::Responses))
            .await
            .unwrap_err();

        assert!(matches!(err, PlanToMeetError::Backend { status: 503, .. }));
        assert_eq!(store.request_count(), 1);
    }
}
