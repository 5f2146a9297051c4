//! HTTP transport for the schedule, menu, geocoding and directions services.
//!
//! Everything above this module talks to [`HttpClient`]; the browser build
//! plugs in the fetch-based client from `wasm_fetch`, native builds use
//! [`ReqwestClient`].

use std::rc::Rc;

use async_trait::async_trait;
use serde_json::Value;

use school_dash_shared::{DashError, DashResult};

/// A GET request with query parameters and headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
        }
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.headers.push((key.to_string(), value.into()));
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// URL with the query string percent-encoded
    pub fn full_url(&self) -> DashResult<String> {
        let url = url::Url::parse_with_params(&self.url, &self.query).map_err(|e| {
            DashError::Validation {
                message: format!("Invalid URL {}: {}", self.url, e),
            }
        })?;
        Ok(url.into())
    }
}

/// JSON-over-HTTP client
#[async_trait(?Send)]
pub trait HttpClient {
    /// Issue the request and parse the body as JSON.
    ///
    /// Non-2xx answers become `DashError::Http` carrying the status;
    /// failures without a response carry `status: None`.
    async fn get_json(&self, request: &HttpRequest) -> DashResult<Value>;
}

#[async_trait(?Send)]
impl<T: HttpClient + ?Sized> HttpClient for Rc<T> {
    async fn get_json(&self, request: &HttpRequest) -> DashResult<Value> {
        (**self).get_json(request).await
    }
}

#[async_trait(?Send)]
impl<T: HttpClient + ?Sized> HttpClient for &T {
    async fn get_json(&self, request: &HttpRequest) -> DashResult<Value> {
        (**self).get_json(request).await
    }
}

/// Service-provided error detail from a JSON error body (`msg` or `message`)
pub fn error_detail(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            ["msg", "message"]
                .iter()
                .find_map(|key| json.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_default()
}

/// Native client backed by reqwest
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Default)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

#[cfg(not(target_arch = "wasm32"))]
impl ReqwestClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait(?Send)]
impl HttpClient for ReqwestClient {
    async fn get_json(&self, request: &HttpRequest) -> DashResult<Value> {
        let mut builder = self
            .client
            .get(&request.url)
            .query(&request.query)
            .header("Accept", "application/json");
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| DashError::Http {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| DashError::Http {
            status: Some(status.as_u16()),
            message: format!("Failed to read body: {e}"),
        })?;

        if !status.is_success() {
            log::warn!("GET {} answered {}", request.url, status);
            return Err(DashError::Http {
                status: Some(status.as_u16()),
                message: error_detail(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            log::error!("Unparsable JSON from {}: {e}; body: {body}", request.url);
            DashError::from(e)
        })
    }
}
