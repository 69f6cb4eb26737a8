//! Scripted transport for tests.

use super::{ApiRequest, ApiResponse, HttpTransport, Method};
use crate::error::TransportError;
use async_trait::async_trait;
use rootcause::prelude::Report;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

enum Scripted {
    Respond(ApiResponse),
    Fail,
}

/// A transport that answers from a script and records every request.
///
/// Responses are queued per `(method, path)`. The last queued response for a
/// route keeps being returned once the queue is drained. Unscripted routes
/// answer `404 {"detail": "Not found."}`.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<HashMap<(Method, String), VecDeque<Scripted>>>,
    sent: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response for a route.
    #[must_use]
    pub fn respond(self, method: Method, path: &str, response: ApiResponse) -> Self {
        self.push(method, path, Scripted::Respond(response));
        self
    }

    /// Queues a connection failure for a route.
    #[must_use]
    pub fn fail(self, method: Method, path: &str) -> Self {
        self.push(method, path, Scripted::Fail);
        self
    }

    fn push(&self, method: Method, path: &str, entry: Scripted) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry((method, path.to_string()))
            .or_default()
            .push_back(entry);
    }

    /// Returns every request sent so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the requests sent to one path.
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path() == path)
            .collect()
    }

    /// Returns how many requests were sent.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, Report<TransportError>> {
        let key = (request.method(), request.path().to_string());
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        let outcome = match script.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().map(|entry| match entry {
                Scripted::Respond(response) => Scripted::Respond(response.clone()),
                Scripted::Fail => Scripted::Fail,
            }),
            None => None,
        };

        match outcome {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail) => Err(TransportError::ConnectionFailed {
                endpoint: key.1,
                reason: "connection refused".to_string(),
            }
            .into()),
            None => Ok(ApiResponse::new(404, json!({"detail": "Not found."}))),
        }
    }
}
