//! Scripted [`HttpClient`] for tests that must not touch the network.
//!
//! Available inside this crate's tests and to other crates through the
//! `test-support` feature.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{HttpClient, HttpRequest, HttpResponse};

#[derive(Debug, Default)]
struct Script {
    responses: VecDeque<Result<HttpResponse, TransportError>>,
    fallback: Option<HttpResponse>,
    requests: Vec<HttpRequest>,
}

/// Replays queued responses in order and records every request it sees.
///
/// Clones share the same script, so a test can keep one handle for
/// assertions while the transport owns another.
#[derive(Debug, Clone, Default)]
pub struct ScriptedHttpClient {
    script: Arc<Mutex<Script>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push_response(&self, response: HttpResponse) {
        self.script().responses.push_back(Ok(response));
    }

    pub fn push_error(&self, error: TransportError) {
        self.script().responses.push_back(Err(error));
    }

    /// Response to return once the queue is exhausted
    pub fn set_fallback(&self, response: HttpResponse) {
        self.script().fallback = Some(response);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.script().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.script().requests.len()
    }
}

#[async_trait]
impl HttpClient for ScriptedHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut script = self.script();
        script.requests.push(request);

        match script.responses.pop_front() {
            Some(result) => result,
            None => script.fallback.clone().ok_or_else(|| {
                TransportError::Network("no scripted response left".to_string())
            }),
        }
    }
}
