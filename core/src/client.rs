//! Remote data gateway: generic JSON verbs over a `Transport`.
//!
//! # Design
//! `ApiClient` holds a base URL, default headers and a transport, and carries
//! no mutable state between calls. Each verb builds an `HttpRequest`, hands it
//! to the transport exactly once, and interprets the `HttpResponse`:
//!
//! - 2xx with a body decodes to `Some(value)`; 204 yields `None` without
//!   touching the body.
//! - Any other status becomes `ApiError::Http`.
//! - Transport and decode failures become `ApiError::Network`.
//!
//! Retry policy belongs to callers.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{overlay_headers, HttpMethod, HttpRequest, HttpResponse, Transport};

const JSON: &str = "application/json";

/// Per-call options. Headers are overlaid on the client defaults.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient<T> {
    base_url: String,
    default_headers: Vec<(String, String)>,
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            default_headers: vec![("Content-Type".to_string(), JSON.to_string())],
            transport,
        }
    }

    /// Resolve `path` against the base URL unless it is already absolute.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// Build the request without sending it.
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
        options: &RequestOptions,
    ) -> HttpRequest {
        let mut headers = self.default_headers.clone();
        overlay_headers(&mut headers, &options.headers);
        HttpRequest {
            method,
            url: self.url_for(path),
            headers,
            body,
        }
    }

    pub async fn get<R: DeserializeOwned>(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<Option<R>, ApiError> {
        self.send(HttpMethod::Get, path, None, options).await
    }

    pub async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        options: &RequestOptions,
    ) -> Result<Option<R>, ApiError> {
        let body = encode(body)?;
        self.send(HttpMethod::Post, path, Some(body), options).await
    }

    pub async fn put<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        options: &RequestOptions,
    ) -> Result<Option<R>, ApiError> {
        let body = encode(body)?;
        self.send(HttpMethod::Put, path, Some(body), options).await
    }

    pub async fn delete<R: DeserializeOwned>(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<Option<R>, ApiError> {
        self.send(HttpMethod::Delete, path, None, options).await
    }

    async fn send<R: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
        options: &RequestOptions,
    ) -> Result<Option<R>, ApiError> {
        let request = self.build_request(method, path, body, options);
        tracing::debug!(method = method.as_str(), url = %request.url, "sending request");

        let result = match self.transport.execute(request).await {
            Ok(response) => parse_response(response),
            Err(error) => Err(ApiError::from(error)),
        };
        if let Err(error) = &result {
            tracing::warn!(method = method.as_str(), path, %error, "request failed");
        }
        result
    }
}

fn encode<B: Serialize>(body: &B) -> Result<String, ApiError> {
    serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))
}

/// Interpret a completed round-trip.
pub fn parse_response<R: DeserializeOwned>(response: HttpResponse) -> Result<Option<R>, ApiError> {
    if !response.is_success() {
        return Err(ApiError::Http {
            status: response.status,
            status_text: response.status_text,
        });
    }
    if response.status == 204 {
        return Ok(None);
    }
    serde_json::from_str(&response.body)
        .map(Some)
        .map_err(|e| ApiError::Network(e.to_string()))
}
