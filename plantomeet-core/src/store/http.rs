//! REST transport for the backing store.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use url::Url;

use crate::constants::REST_PATH;
use crate::error::{PlanToMeetError, PlanToMeetResult};
use crate::store::{Method, RecordStore, StoreRequest};

/// HTTP client for the backing store's REST API.
pub struct HttpStore {
    http: reqwest::Client,
    rest_url: Url,
    api_key: String,
}

impl HttpStore {
    /// `store_url` is the service root; requests go to `{store_url}/rest/v1/{resource}`.
    pub fn new(store_url: &str, api_key: &str) -> PlanToMeetResult<Self> {
        let mut base = Url::parse(store_url)
            .map_err(|e| PlanToMeetError::Config(format!("Invalid store_url '{store_url}': {e}")))?;

        // Url::join replaces the last segment unless the path ends in '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let rest_url = base
            .join(&format!("{REST_PATH}/"))
            .map_err(|e| PlanToMeetError::Config(e.to_string()))?;

        Ok(HttpStore {
            http: reqwest::Client::new(),
            rest_url,
            api_key: api_key.to_string(),
        })
    }

    pub fn rest_url(&self) -> &Url {
        &self.rest_url
    }

    /// Full request URL with the encoded query string.
    pub fn request_url(&self, request: &StoreRequest) -> PlanToMeetResult<Url> {
        let mut url = self
            .rest_url
            .join(request.resource.table())
            .map_err(|e| PlanToMeetError::Config(e.to_string()))?;

        let pairs = request.query_pairs();
        if !pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in &pairs {
                query.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Headers in send order. Per-request headers come last and win.
    pub fn request_headers(&self, request: &StoreRequest) -> Vec<(String, String)> {
        let mut headers = vec![
            ("apikey".to_string(), self.api_key.clone()),
            ("Authorization".to_string(), format!("Bearer {}", self.api_key)),
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
        ];

        if let Some(prefer) = request.prefer_header() {
            headers.push(("Prefer".to_string(), prefer));
        }

        for (name, value) in &request.headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
            headers.push((name.clone(), value.clone()));
        }

        headers
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl RecordStore for HttpStore {
    async fn execute(&self, request: StoreRequest) -> PlanToMeetResult<Option<Value>> {
        let url = self.request_url(&request)?;
        let method = request.method;
        let resource = request.resource;

        tracing::debug!(%method, %resource, query = url.query().unwrap_or(""), "store request");

        let mut builder = self.http.request(to_reqwest_method(method), url);
        for (name, value) in self.request_headers(&request) {
            builder = builder.header(name, value);
        }
        if let Some(ref body) = request.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!(
                %method,
                %resource,
                error = %e,
                "store request failed before a response"
            );
            PlanToMeetError::Network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                %method,
                %resource,
                status = status.as_u16(),
                %body,
                "store request rejected"
            );
            return Err(PlanToMeetError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let text = response
            .text()
            .await
            .map_err(|e| PlanToMeetError::Network(e.to_string()))?;

        if text.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&text)?))
    }
}
