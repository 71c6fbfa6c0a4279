//! Scripted transport for unit tests across the crate.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;

use super::{OutboundRequest, RawResponse, Transport, TransportError};

pub trait RawResponseExt: Sized {
    fn ok(body: &str) -> Self;
    fn status(status: u16, body: &str) -> Self;
    fn with_header(self, name: &'static str, value: &'static str) -> Self;
}

impl RawResponseExt for RawResponse {
    fn ok(body: &str) -> Self {
        Self::status(200, body)
    }

    fn status(status: u16, body: &str) -> Self {
        RawResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers: HeaderMap::new(),
            body: body.to_string(),
        }
    }

    fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.insert(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_static(value),
        );
        self
    }
}

/// Replays queued outcomes in order, then falls back to a fixed response if one is set.
/// Every request is recorded for assertions.
#[derive(Default)]
pub struct ScriptedTransport {
    queue: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    fallback: Option<RawResponse>,
    requests: Mutex<Vec<OutboundRequest>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<RawResponse>) -> Self {
        Self::scripted(responses.into_iter().map(Ok).collect())
    }

    /// Like `new`, but individual sends may fail before any response arrives.
    pub fn scripted(outcomes: Vec<Result<RawResponse, TransportError>>) -> Self {
        Self {
            queue: Mutex::new(outcomes.into()),
            ..Default::default()
        }
    }

    pub fn always(response: RawResponse) -> Self {
        Self {
            fallback: Some(response),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &OutboundRequest) -> Result<RawResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        let next = self.queue.lock().unwrap().pop_front();
        next.or_else(|| self.fallback.clone().map(Ok))
            .expect("no scripted response left")
    }
}
