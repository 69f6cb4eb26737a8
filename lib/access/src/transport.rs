//! HTTP plumbing shared by the gateway and resource clients.
//!
//! Requests carry their headers explicitly: the bearer credential is a field
//! of [`ApiRequest`], set per call from the session store, rather than a
//! default header mutated on a shared client.

pub mod mock;

use crate::config::ApiConfig;
use crate::error::TransportError;
use async_trait::async_trait;
use rootcause::prelude::Report;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request to the backend, path relative to the API root.
#[derive(Clone, PartialEq)]
pub struct ApiRequest {
    method: Method,
    path: String,
    bearer: Option<String>,
    body: Option<JsonValue>,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            bearer: None,
            body: None,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Attaches `Authorization: Bearer <token>`.
    #[must_use]
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Attaches a bearer token if one is given.
    #[must_use]
    pub fn with_optional_bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }

    /// Sets a JSON body.
    #[must_use]
    pub fn with_json(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn bearer(&self) -> Option<&str> {
        self.bearer.as_deref()
    }

    #[must_use]
    pub fn body(&self) -> Option<&JsonValue> {
        self.body.as_ref()
    }

    /// Returns the headers this request must be sent with.
    ///
    /// `Content-Type` only accompanies a body; `Authorization` only a bearer.
    #[must_use]
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![("Accept", "application/json".to_string())];
        if self.body.is_some() {
            headers.push(("Content-Type", "application/json".to_string()));
        }
        if let Some(token) = &self.bearer {
            headers.push(("Authorization", format!("Bearer {token}")));
        }
        headers
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .field("body", &self.body.as_ref().map(|_| "<json>"))
            .finish()
    }
}

/// A response that arrived, whatever its status.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    status: u16,
    body: JsonValue,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: u16, body: JsonValue) -> Self {
        Self { status, body }
    }

    /// A 200 response with the given body.
    #[must_use]
    pub fn ok(body: JsonValue) -> Self {
        Self::new(200, body)
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn body(&self) -> &JsonValue {
        &self.body
    }

    /// Returns true for 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true for 4xx.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Returns the server's `detail` message, if any.
    #[must_use]
    pub fn detail(&self) -> Option<String> {
        match &self.body {
            JsonValue::Object(map) => map
                .get("detail")
                .and_then(JsonValue::as_str)
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            _ => None,
        }
    }

    /// Deserializes the body.
    ///
    /// # Errors
    ///
    /// Returns the serde error if the body does not have the expected shape.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.body.clone())
    }
}

/// Sends requests to the backend.
///
/// Only failures where no response arrived are errors; every HTTP status,
/// including 4xx and 5xx, is returned as an [`ApiResponse`].
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, Report<TransportError>>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, Report<TransportError>> {
        (**self).send(request).await
    }
}

/// Transport over a real HTTP connection.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Builds a client for the configured API root.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, Report<TransportError>> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs() {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|e| TransportError::ClientBuild {
            details: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip_all, fields(method = %request.method(), path = %request.path()))]
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, Report<TransportError>> {
        let url = self.url_for(request.path());
        let method = match request.method() {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &url);
        for (name, value) in request.headers() {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body() {
            builder = builder.body(body.to_string());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout {
                    endpoint: request.path().to_string(),
                }
            } else {
                TransportError::ConnectionFailed {
                    endpoint: request.path().to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::BodyRead {
                endpoint: request.path().to_string(),
                reason: e.to_string(),
            })?;

        debug!(status, "response received");
        Ok(ApiResponse::new(status, parse_body(&text)))
    }
}

/// Empty bodies are `null`; non-JSON bodies are kept as a string.
fn parse_body(text: &str) -> JsonValue {
    if text.trim().is_empty() {
        return JsonValue::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| JsonValue::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_without_token_sends_no_auth_or_content_type() {
        let headers = ApiRequest::get("/user/").headers();
        assert!(headers.iter().all(|(name, _)| *name != "Authorization"));
        assert!(headers.iter().all(|(name, _)| *name != "Content-Type"));
    }

    #[test]
    fn bearer_header_is_exact() {
        let headers = ApiRequest::get("/user/").with_bearer("AAA").headers();
        assert!(headers.contains(&("Authorization", "Bearer AAA".to_string())));
    }

    #[test]
    fn json_body_sets_content_type() {
        let headers = ApiRequest::post("/token/")
            .with_json(json!({"email": "a@b.c"}))
            .headers();
        assert!(headers.contains(&("Content-Type", "application/json".to_string())));
    }

    #[test]
    fn request_debug_hides_token() {
        let rendered = format!("{:?}", ApiRequest::get("/user/").with_bearer("AAA"));
        assert!(!rendered.contains("AAA"));
    }

    #[test]
    fn detail_is_extracted() {
        let response = ApiResponse::new(401, json!({"detail": "Invalid credentials"}));
        assert_eq!(response.detail().as_deref(), Some("Invalid credentials"));
        assert!(response.is_client_error());
        assert!(!response.is_success());
    }

    #[test]
    fn detail_absent_for_non_objects() {
        assert_eq!(ApiResponse::ok(json!(["x"])).detail(), None);
        assert_eq!(ApiResponse::new(400, json!({"detail": "  "})).detail(), None);
    }

    #[test]
    fn parse_body_handles_empty_and_text() {
        assert_eq!(parse_body(""), JsonValue::Null);
        assert_eq!(parse_body("{\"a\":1}"), json!({"a": 1}));
        assert_eq!(parse_body("Bad Gateway"), json!("Bad Gateway"));
    }

    #[test]
    fn transport_url_joins_paths() {
        let transport = ReqwestTransport::new(&ApiConfig::new("http://localhost:8000/api/"))
            .expect("client");
        assert_eq!(
            transport.url_for("/token/refresh/"),
            "http://localhost:8000/api/token/refresh/"
        );
    }
}
