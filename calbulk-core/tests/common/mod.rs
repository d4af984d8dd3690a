//! Scripted in-memory stand-in for the events resource.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use calbulk_core::event::{BoundaryPatch, NewEvent};
use calbulk_core::{
    ApiResponse, BearerToken, BulkOperationEngine, EngineConfig, EventBoundary, EventsApi,
    MemoryUndoStore, ResourceId, ResourceSnapshot, SelectionState, StaticTokenProvider,
    TransportError,
};
use serde_json::json;

pub const RATE_LIMIT_BODY: &str =
    r#"{"error":{"code":403,"message":"Rate Limit Exceeded","errors":[{"domain":"usageLimits","reason":"rateLimitExceeded"}]}}"#;
pub const FORBIDDEN_BODY: &str =
    r#"{"error":{"code":403,"message":"Forbidden","errors":[{"domain":"global","reason":"forbidden"}]}}"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    Get,
    Delete,
    Patch,
    Insert,
}

#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16, String),
    Network,
}

impl Reply {
    pub fn status(code: u16) -> Self {
        Reply::Status(code, String::new())
    }

    pub fn with_body(code: u16, body: &str) -> Self {
        Reply::Status(code, body.to_string())
    }
}

#[derive(Default)]
struct Script {
    queue: VecDeque<Reply>,
    forever: Option<Reply>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredEvent {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start: EventBoundary,
    pub end: EventBoundary,
}

impl StoredEvent {
    pub fn timed(summary: &str, start: &str, end: &str) -> Self {
        StoredEvent {
            summary: Some(summary.to_string()),
            description: None,
            start: EventBoundary::date_time(start, None),
            end: EventBoundary::date_time(end, None),
        }
    }

    pub fn all_day(summary: &str, start: &str, end: &str) -> Self {
        StoredEvent {
            summary: Some(summary.to_string()),
            description: None,
            start: EventBoundary::all_day(start),
            end: EventBoundary::all_day(end),
        }
    }
}

/// Calls not covered by a script behave like a well-behaved server backed
/// by `events`.
#[derive(Default)]
pub struct FakeEventsApi {
    events: Mutex<HashMap<String, StoredEvent>>,
    scripts: Mutex<HashMap<(Call, String), Script>>,
    calls: Mutex<HashMap<(Call, String), usize>>,
    inserted: Mutex<Vec<NewEvent>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    latency: Option<Duration>,
}

impl FakeEventsApi {
    pub fn new() -> Self {
        FakeEventsApi::default()
    }

    /// Every mutating call takes this long, so overlapping calls are observable.
    pub fn with_latency(latency: Duration) -> Self {
        FakeEventsApi {
            latency: Some(latency),
            ..FakeEventsApi::default()
        }
    }

    pub fn add_event(&self, id: &str, event: StoredEvent) {
        self.events.lock().unwrap().insert(id.to_string(), event);
    }

    pub fn event(&self, id: &str) -> Option<StoredEvent> {
        self.events.lock().unwrap().get(id).cloned()
    }

    /// Reply with `replies` in order for `call` on `key`, then fall back to
    /// default behavior. `key` is the event id, or the summary for inserts.
    pub fn script(&self, call: Call, key: &str, replies: Vec<Reply>) {
        let mut scripts = self.scripts.lock().unwrap();
        let script = scripts.entry((call, key.to_string())).or_default();
        script.queue.extend(replies);
    }

    /// Reply with `reply` for every `call` on `key`, after any queued replies.
    pub fn always(&self, call: Call, key: &str, reply: Reply) {
        let mut scripts = self.scripts.lock().unwrap();
        scripts.entry((call, key.to_string())).or_default().forever = Some(reply);
    }

    pub fn calls(&self, call: Call, key: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(&(call, key.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self, call: Call) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|((c, _), _)| *c == call)
            .map(|(_, n)| *n)
            .sum()
    }

    pub fn inserted(&self) -> Vec<NewEvent> {
        self.inserted.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call, key: &str) -> Option<Reply> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry((call, key.to_string()))
            .or_default() += 1;

        let mut scripts = self.scripts.lock().unwrap();
        let script = scripts.get_mut(&(call, key.to_string()))?;
        script.queue.pop_front().or_else(|| script.forever.clone())
    }

    async fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    fn scripted(reply: Reply) -> Result<ApiResponse, TransportError> {
        match reply {
            Reply::Status(status, body) => Ok(ApiResponse::new(status, body)),
            Reply::Network => Err(TransportError("connection reset by peer".to_string())),
        }
    }
}

#[async_trait]
impl EventsApi for FakeEventsApi {
    async fn get_event(
        &self,
        _token: &BearerToken,
        id: &ResourceId,
    ) -> Result<ApiResponse, TransportError> {
        if let Some(reply) = self.record(Call::Get, id.as_str()) {
            return Self::scripted(reply);
        }

        match self.event(id.as_str()) {
            Some(event) => Ok(ApiResponse::new(
                200,
                json!({
                    "id": id.as_str(),
                    "summary": event.summary,
                    "description": event.description,
                    "start": event.start,
                    "end": event.end,
                })
                .to_string(),
            )),
            None => Ok(ApiResponse::new(404, r#"{"error":{"code":404}}"#)),
        }
    }

    async fn delete_event(
        &self,
        _token: &BearerToken,
        id: &ResourceId,
    ) -> Result<ApiResponse, TransportError> {
        let scripted = self.record(Call::Delete, id.as_str());
        self.enter().await;
        self.leave();

        if let Some(reply) = scripted {
            return Self::scripted(reply);
        }

        match self.events.lock().unwrap().remove(id.as_str()) {
            Some(_) => Ok(ApiResponse::new(204, "")),
            None => Ok(ApiResponse::new(410, "")),
        }
    }

    async fn patch_event(
        &self,
        _token: &BearerToken,
        id: &ResourceId,
        patch: &BoundaryPatch,
    ) -> Result<ApiResponse, TransportError> {
        let scripted = self.record(Call::Patch, id.as_str());
        self.enter().await;
        self.leave();

        if let Some(reply) = scripted {
            return Self::scripted(reply);
        }

        let mut events = self.events.lock().unwrap();
        match events.get_mut(id.as_str()) {
            Some(event) => {
                event.start = patch.start.clone();
                event.end = patch.end.clone();
                Ok(ApiResponse::new(200, "{}"))
            }
            None => Ok(ApiResponse::new(404, "")),
        }
    }

    async fn insert_event(
        &self,
        _token: &BearerToken,
        event: &NewEvent,
    ) -> Result<ApiResponse, TransportError> {
        let scripted = self.record(Call::Insert, &event.summary);
        self.enter().await;
        self.leave();

        if let Some(reply) = scripted {
            return Self::scripted(reply);
        }

        let mut inserted = self.inserted.lock().unwrap();
        inserted.push(event.clone());
        let new_id = format!("restored-{}", inserted.len());

        self.events.lock().unwrap().insert(
            new_id.clone(),
            StoredEvent {
                summary: Some(event.summary.clone()),
                description: Some(event.description.clone()),
                start: event.start.clone(),
                end: event.end.clone(),
            },
        );

        Ok(ApiResponse::new(200, json!({ "id": new_id }).to_string()))
    }
}

pub fn token() -> BearerToken {
    BearerToken::new("test-token")
}

pub fn selection(ids: &[&str]) -> SelectionState {
    ids.iter().copied().map(ResourceId::from).collect()
}

pub fn snapshot(id: &str, title: &str) -> ResourceSnapshot {
    ResourceSnapshot {
        id: ResourceId::new(id),
        title: title.to_string(),
        description: String::new(),
        start: EventBoundary::date_time("2024-03-04T09:00:00Z", None),
        end: EventBoundary::date_time("2024-03-04T10:00:00Z", None),
    }
}

pub fn engine(api: Arc<FakeEventsApi>, store: Arc<MemoryUndoStore>) -> BulkOperationEngine {
    BulkOperationEngine::new(
        api,
        Arc::new(StaticTokenProvider::new(Some(token()))),
        store,
        &EngineConfig::default(),
    )
}

pub fn signed_out_engine(
    api: Arc<FakeEventsApi>,
    store: Arc<MemoryUndoStore>,
) -> BulkOperationEngine {
    BulkOperationEngine::new(
        api,
        Arc::new(StaticTokenProvider::new(None)),
        store,
        &EngineConfig::default(),
    )
}
