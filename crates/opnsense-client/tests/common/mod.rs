//! In-memory appliance used by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use opnsense_core::{HttpMethod, Transport, TransportError};
use serde_json::{json, Map, Value};

/// Enumeration fields rendered as option maps on reads.
const SELECT_FIELDS: &[(&str, &str)] = &[
    ("route", "gateway"),
    ("vlan", "pcp"),
    ("vlan", "if"),
    ("host", "rr"),
    ("dot", "type"),
    ("alias", "host"),
];

/// Request as seen by the appliance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Read(String),
    Write(String),
    Reconfigure(String),
}

impl Event {
    pub fn is_read(&self) -> bool {
        matches!(self, Self::Read(_))
    }
}

#[derive(Default)]
struct State {
    objects: HashMap<String, (String, Value)>,
    next_id: u64,
    events: Vec<Event>,
}

/// Stores objects by identifier and answers with the appliance's idioms:
/// `saved`/`deleted` sentinels, `[]` for unknown identifiers, option maps for
/// enumeration fields.
pub struct FakeAppliance {
    state: Mutex<State>,
    reconfigure_failures: AtomicUsize,
    latency: Duration,
}

impl FakeAppliance {
    pub fn new() -> Self {
        Self::with_latency(Duration::from_millis(2))
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            state: Mutex::new(State::default()),
            reconfigure_failures: AtomicUsize::new(0),
            latency,
        }
    }

    /// Make the next `count` reconfigures fail at the network level.
    pub fn fail_next_reconfigures(&self, count: usize) {
        self.reconfigure_failures.store(count, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<Event> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn clear_events(&self) {
        self.state.lock().unwrap().events.clear();
    }

    pub fn stored(&self, id: &str) -> Option<Value> {
        self.state
            .lock()
            .unwrap()
            .objects
            .get(id)
            .map(|(_, fields)| fields.clone())
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().objects.len()
    }

    fn record(&self, event: Event) {
        self.state.lock().unwrap().events.push(event);
    }

    fn take_reconfigure_failure(&self) -> bool {
        self.reconfigure_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn add(&self, body: Option<Value>) -> Value {
        let Some((key, fields)) = unwrap_envelope(body) else {
            return json!({ "result": "failed" });
        };
        if let Some(validations) = validate(&key, &fields) {
            return json!({ "result": "failed", "validations": validations });
        }

        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("{key}-{}", state.next_id);
        state.objects.insert(id.clone(), (key, fields));
        json!({ "result": "saved", "uuid": id })
    }

    fn set(&self, id: &str, body: Option<Value>) -> Value {
        let Some((key, fields)) = unwrap_envelope(body) else {
            return json!({ "result": "failed" });
        };
        if let Some(validations) = validate(&key, &fields) {
            return json!({ "result": "failed", "validations": validations });
        }

        let mut state = self.state.lock().unwrap();
        match state.objects.get_mut(id) {
            Some(slot) => {
                *slot = (key, fields);
                json!({ "result": "saved" })
            }
            None => json!({ "result": "failed" }),
        }
    }

    fn get(&self, id: &str) -> Value {
        let state = self.state.lock().unwrap();
        match state.objects.get(id) {
            Some((key, fields)) => {
                let mut envelope = Map::new();
                envelope.insert(key.clone(), render(key, fields));
                Value::Object(envelope)
            }
            None => json!([]),
        }
    }

    fn delete(&self, id: &str) -> Value {
        match self.state.lock().unwrap().objects.remove(id) {
            Some(_) => json!({ "result": "deleted" }),
            None => json!({ "result": "not found" }),
        }
    }
}

#[async_trait]
impl Transport for FakeAppliance {
    async fn do_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, TransportError> {
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        let action = segments.get(2).copied().unwrap_or_default();
        let id = segments.get(3).copied().unwrap_or_default();

        let event = match (method, action) {
            (_, "reconfigure") => Event::Reconfigure(path.to_string()),
            (HttpMethod::Get, _) => Event::Read(path.to_string()),
            (HttpMethod::Post, _) => Event::Write(path.to_string()),
        };
        self.record(event);
        tokio::time::sleep(self.latency).await;

        if action == "reconfigure" {
            if self.take_reconfigure_failure() {
                return Err(TransportError::Network("connection reset by peer".into()));
            }
            return Ok(json!({ "status": "ok" }));
        }

        let expected = if action.starts_with("get") {
            HttpMethod::Get
        } else {
            HttpMethod::Post
        };
        if method != expected {
            return Err(TransportError::Status {
                code: 405,
                body: format!("{method} not allowed on {path}"),
            });
        }

        let response = if action.starts_with("add") {
            self.add(body)
        } else if action.starts_with("set") {
            self.set(id, body)
        } else if action.starts_with("get") {
            self.get(id)
        } else if action.starts_with("del") {
            self.delete(id)
        } else {
            return Err(TransportError::Status {
                code: 404,
                body: format!("no endpoint {path}"),
            });
        };
        Ok(response)
    }
}

fn unwrap_envelope(body: Option<Value>) -> Option<(String, Value)> {
    match body? {
        Value::Object(envelope) if envelope.len() == 1 => envelope.into_iter().next(),
        _ => None,
    }
}

fn validate(key: &str, fields: &Value) -> Option<Value> {
    if key == "vlan" {
        let tag = fields.get("tag").and_then(Value::as_str).unwrap_or_default();
        if tag.is_empty() {
            return Some(json!({ "vlan.tag": "A tag between 1 and 4094 is required." }));
        }
    }
    None
}

fn render(key: &str, fields: &Value) -> Value {
    let mut rendered = fields.clone();
    let Some(object) = rendered.as_object_mut() else {
        return rendered;
    };

    for (_, field) in SELECT_FIELDS.iter().filter(|(k, _)| *k == key) {
        let selected = object
            .get(*field)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let mut options = Map::new();
        options.insert(
            "zz-unused".to_string(),
            json!({ "value": "unused", "selected": 0 }),
        );
        if !selected.is_empty() {
            options.insert(
                selected.clone(),
                json!({ "value": selected, "selected": 1 }),
            );
        }
        object.insert((*field).to_string(), Value::Object(options));
    }
    rendered
}
