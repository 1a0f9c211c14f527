//! Scripted transport and recording emitter for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use catalog_core::ProductId;
use serde_json::{json, Value};

use crate::error::{CatalogError, CatalogResult};
use crate::events::{CatalogEventEmitter, Notice};
use crate::transport::CatalogTransport;

/// A canned response.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Status(u16),
    Offline,
    /// Waits, then answers with the inner reply.
    Delayed(Duration, Box<Reply>),
}

impl Reply {
    /// A listing page with products `ids` out of `total`.
    pub fn page(ids: &[ProductId], total: u64) -> Reply {
        let products: Vec<Value> = ids
            .iter()
            .map(|id| json!({ "id": id, "title": format!("Product {}", id), "category": "tops" }))
            .collect();
        Reply::Json(json!({ "products": products, "total": total, "skip": 0, "limit": 10 }))
    }

    pub fn after(self, millis: u64) -> Reply {
        Reply::Delayed(Duration::from_millis(millis), Box::new(self))
    }
}

/// Transport that replays scripted replies keyed by `"METHOD path"`.
///
/// Replies queued for one route are consumed in order; the last one repeats.
/// Unscripted routes answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    log: Mutex<Vec<String>>,
    bodies: Mutex<Vec<(String, Value)>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, route: &str, reply: Reply) {
        self.routes
            .lock()
            .unwrap()
            .entry(route.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Every request seen so far, as `"METHOD path?query"`.
    pub fn requests(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    /// Bodies sent on `route` (e.g. `"PATCH products/2"`), oldest first.
    pub fn bodies(&self, route: &str) -> Vec<Value> {
        self.bodies
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| r == route)
            .map(|(_, body)| body.clone())
            .collect()
    }

    fn record_body(&self, method: &str, path: &[&str], body: Value) {
        let route = format!("{} {}", method, path.join("/"));
        self.bodies.lock().unwrap().push((route, body));
    }

    fn next_reply(&self, route: &str) -> Reply {
        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(route) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap_or(Reply::Status(404)),
            None => Reply::Status(404),
        }
    }

    async fn answer(&self, method: &str, path: &[&str], query: &[(String, String)]) -> CatalogResult<Value> {
        let route = format!("{} {}", method, path.join("/"));
        let logged = if query.is_empty() {
            route.clone()
        } else {
            let pairs: Vec<String> = query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            format!("{}?{}", route, pairs.join("&"))
        };
        self.log.lock().unwrap().push(logged);

        let mut reply = self.next_reply(&route);
        loop {
            match reply {
                Reply::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
                Reply::Json(value) => return Ok(value),
                Reply::Status(404) => return Err(CatalogError::NotFound(route)),
                Reply::Status(status) => {
                    return Err(CatalogError::HttpStatus {
                        status,
                        body: String::new(),
                    })
                }
                Reply::Offline => return Err(CatalogError::ConnectionFailed("offline".into())),
            }
        }
    }
}

#[async_trait]
impl CatalogTransport for ScriptedTransport {
    async fn get(&self, path: &[&str], query: &[(String, String)]) -> CatalogResult<Value> {
        self.answer("GET", path, query).await
    }

    async fn post(&self, path: &[&str], body: Value) -> CatalogResult<Value> {
        self.record_body("POST", path, body);
        self.answer("POST", path, &[]).await
    }

    async fn patch(&self, path: &[&str], body: Value) -> CatalogResult<Value> {
        self.record_body("PATCH", path, body);
        self.answer("PATCH", path, &[]).await
    }

    async fn delete(&self, path: &[&str]) -> CatalogResult<Value> {
        self.answer("DELETE", path, &[]).await
    }
}

/// Emitter that keeps everything it receives.
#[derive(Default)]
pub struct RecordingEmitter {
    pub notices: Mutex<Vec<Notice>>,
    pub fetch_errors: Mutex<Vec<String>>,
}

impl RecordingEmitter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl CatalogEventEmitter for RecordingEmitter {
    fn emit_notice(&self, notice: &Notice) {
        self.notices.lock().unwrap().push(notice.clone());
    }

    fn emit_fetch_error(&self, message: &str, _retryable: bool) {
        self.fetch_errors.lock().unwrap().push(message.to_string());
    }
}
