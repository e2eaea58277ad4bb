//! Observability events emitted around every API call.
//!
//! Listeners call [`ApiClient::subscribe`](super::ApiClient::subscribe) and receive a
//! [`ApiEvent::Request`] before each round trip and a matching [`ApiEvent::Response`]
//! after it. Both carry the same `id`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

/// Events buffered per subscriber before the slowest one starts lagging.
const CHANNEL_CAPACITY: usize = 256;

/// Body fields replaced before they leave the client.
const REDACTED_FIELDS: [&str; 1] = ["motdepasse"];

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ApiEvent {
    Request(RequestEvent),
    Response(ResponseEvent),
}

impl ApiEvent {
    pub fn id(&self) -> u64 {
        match self {
            Self::Request(event) => event.id,
            Self::Response(event) => event.id,
        }
    }
}

/// Emitted before the HTTP call is sent.
#[derive(Debug, Clone, Serialize)]
pub struct RequestEvent {
    pub id: u64,
    pub method: String,
    pub url: String,
    pub body: Option<Value>,
    /// Caller-supplied context, e.g. the account id a getter is working for.
    pub context: Value,
}

/// Emitted once the response body has been parsed.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseEvent {
    pub id: u64,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Value,
    /// True when the body is an API failure envelope.
    pub failure: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct EventHub {
    sender: broadcast::Sender<ApiEvent>,
    next_id: Arc<AtomicU64>,
}

impl EventHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            sender,
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ApiEvent> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: ApiEvent) {
        // Err only means nobody is listening.
        let _ = self.sender.send(event);
    }
}

pub(crate) fn redact(body: Option<&Value>) -> Option<Value> {
    let mut body = body.cloned()?;
    if let Some(object) = body.as_object_mut() {
        for field in REDACTED_FIELDS {
            if let Some(value) = object.get_mut(field) {
                *value = Value::String("***".to_string());
            }
        }
    }
    Some(body)
}
