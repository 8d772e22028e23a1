//! Record store client.
//!
//! Every repository read and write is one request against the backing
//! REST resource API. There is no local cache and no automatic retry: each
//! call is independently fallible and the caller decides whether to try again.
//!
//! The `RecordStore` trait is the seam between repositories and transport.
//! `HttpStore` talks to the real service; `MemoryStore` (tests only)
//! reproduces the same observable semantics in process.

mod filter;
mod http;
#[cfg(test)]
mod memory;

pub use filter::Filter;
pub use http::HttpStore;
#[cfg(test)]
pub use memory::MemoryStore;

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{PlanToMeetError, PlanToMeetResult};

/// Executes one request against the backing store.
///
/// Returns `None` when the store answers with no content (204 or an empty
/// body), the decoded JSON otherwise. Non-2xx answers become
/// `PlanToMeetError::Backend`, transport failures `PlanToMeetError::Network`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn execute(&self, request: StoreRequest) -> PlanToMeetResult<Option<Value>>;
}

/// The two resources the poll core persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Participants,
    Responses,
}

impl Resource {
    pub fn table(&self) -> &'static str {
        match self {
            Resource::Participants => "participants",
            Resource::Responses => "responses",
        }
    }

    /// Columns of the compound unique key.
    pub fn key_columns(&self) -> &'static [&'static str] {
        match self {
            Resource::Participants => &["poll_id", "session_id"],
            Resource::Responses => &["poll_id", "slot_id", "session_id"],
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.table())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directives sent in the `Prefer` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefer {
    /// Ask for no response body on mutations.
    ReturnMinimal,
    /// Turn a POST that hits the `on_conflict` key into an update.
    MergeDuplicates,
}

impl Prefer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Prefer::ReturnMinimal => "return=minimal",
            Prefer::MergeDuplicates => "resolution=merge-duplicates",
        }
    }
}

/// A typed request against one resource.
#[derive(Debug, Clone)]
pub struct StoreRequest {
    pub method: Method,
    pub resource: Resource,
    pub select: Option<String>,
    pub filters: Vec<Filter>,
    pub limit: Option<usize>,
    pub on_conflict: Option<Vec<String>>,
    pub body: Option<Value>,
    pub prefer: Vec<Prefer>,
    pub headers: Vec<(String, String)>,
}

impl StoreRequest {
    pub fn new(method: Method, resource: Resource) -> Self {
        StoreRequest {
            method,
            resource,
            select: None,
            filters: Vec::new(),
            limit: None,
            on_conflict: None,
            body: None,
            prefer: Vec::new(),
            headers: Vec::new(),
        }
    }

    pub fn get(resource: Resource) -> Self {
        Self::new(Method::Get, resource)
    }

    pub fn post(resource: Resource) -> Self {
        Self::new(Method::Post, resource)
    }

    pub fn patch(resource: Resource) -> Self {
        Self::new(Method::Patch, resource)
    }

    pub fn delete(resource: Resource) -> Self {
        Self::new(Method::Delete, resource)
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.select = Some(columns.to_string());
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn on_conflict(mut self, columns: &[&str]) -> Self {
        self.on_conflict = Some(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn prefer(mut self, prefer: Prefer) -> Self {
        if !self.prefer.contains(&prefer) {
            self.prefer.push(prefer);
        }
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Query parameters in wire order: select, filters, limit, on_conflict.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        if let Some(ref select) = self.select {
            pairs.push(("select".to_string(), select.clone()));
        }
        for filter in &self.filters {
            pairs.push((filter.column().to_string(), filter.to_param()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(ref columns) = self.on_conflict {
            pairs.push(("on_conflict".to_string(), columns.join(",")));
        }

        pairs
    }

    /// Combined `Prefer` header value, if any directive was set.
    pub fn prefer_header(&self) -> Option<String> {
        if self.prefer.is_empty() {
            return None;
        }
        let directives: Vec<&str> = self.prefer.iter().map(Prefer::as_str).collect();
        Some(directives.join(","))
    }

    pub fn has_prefer(&self, prefer: Prefer) -> bool {
        self.prefer.contains(&prefer)
    }
}

/// Run a read and decode the returned rows. An empty answer is an empty list.
pub async fn fetch_rows<T: DeserializeOwned>(
    store: &dyn RecordStore,
    request: StoreRequest,
) -> PlanToMeetResult<Vec<T>> {
    match store.execute(request).await? {
        None => Ok(Vec::new()),
        Some(value @ Value::Array(_)) => Ok(serde_json::from_value(value)?),
        Some(other) => Err(PlanToMeetError::Serialization(format!(
            "Expected a JSON array of rows, got: {other}"
        ))),
    }
}

/// Run a mutation, discarding whatever body the store sends back.
pub async fn execute_minimal(
    store: &dyn RecordStore,
    request: StoreRequest,
) -> PlanToMeetResult<()> {
    store.execute(request.prefer(Prefer::ReturnMinimal)).await?;
    Ok(())
}
