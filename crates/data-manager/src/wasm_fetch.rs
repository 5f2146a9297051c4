use async_trait::async_trait;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

use school_dash_shared::{DashError, DashResult};

use crate::http::{error_detail, HttpClient, HttpRequest};

/// WASM-compatible HTTP client using browser's fetch API
#[derive(Debug, Clone, Default)]
pub struct FetchClient;

impl FetchClient {
    pub fn new() -> Self {
        Self
    }

    /// Fetch a JSON document, keeping the status on failures
    pub async fn fetch_json(&self, request: &HttpRequest) -> DashResult<Value> {
        let opts = RequestInit::new();
        opts.set_method("GET");
        opts.set_mode(RequestMode::Cors);

        let headers = Headers::new().map_err(js_error)?;
        headers.set("Accept", "application/json").map_err(js_error)?;
        for (key, value) in &request.headers {
            headers.set(key, value).map_err(js_error)?;
        }
        opts.set_headers(&headers);

        let url = request.full_url()?;
        let js_request = Request::new_with_str_and_init(&url, &opts).map_err(js_error)?;

        let window = web_sys::window().ok_or_else(|| DashError::JsInterop {
            message: "No window object available".to_string(),
        })?;

        // A rejected fetch promise means no response at all (offline, CORS, DNS)
        let resp_value = JsFuture::from(window.fetch_with_request(&js_request))
            .await
            .map_err(|e| DashError::Http {
                status: None,
                message: format!("{e:?}"),
            })?;
        let resp: Response = resp_value.dyn_into().map_err(js_error)?;

        let text_promise = resp.text().map_err(js_error)?;
        let body = JsFuture::from(text_promise)
            .await
            .map_err(js_error)?
            .as_string()
            .unwrap_or_default();

        if !resp.ok() {
            log::warn!("GET {} answered {}", request.url, resp.status());
            return Err(DashError::Http {
                status: Some(resp.status()),
                message: error_detail(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            log::error!("Unparsable JSON from {}: {e}; body: {body}", request.url);
            DashError::from(e)
        })
    }
}

#[async_trait(?Send)]
impl HttpClient for FetchClient {
    async fn get_json(&self, request: &HttpRequest) -> DashResult<Value> {
        self.fetch_json(request).await
    }
}

fn js_error(err: JsValue) -> DashError {
    DashError::JsInterop {
        message: format!("{err:?}"),
    }
}
