//! In-process scripted gateway for unit and integration tests
//!
//! [`FakeGateway`] replaces network I/O with canned responses keyed by
//! method and path, and records every request it receives so tests can
//! assert on what the client sent (or that it sent nothing at all).
//!
//! # Scripting rules
//!
//! - Responses for one route are served in the order they were scripted.
//! - The last scripted response of a route is sticky: once the queue is down
//!   to one entry it is served for every further call.
//! - A call to an unscripted route fails with [`GatewayError::Transport`].
//!
//! # Example
//!
//! ```
//! use chemviz::gateway::{ApiRequest, FakeGateway, Gateway, Method};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let gateway = FakeGateway::new();
//! gateway.on_json(Method::Get, "datasets/", json!([]));
//!
//! let resp = gateway.send(ApiRequest::get("datasets/")).await.unwrap();
//! assert_eq!(resp.into_json::<Vec<serde_json::Value>>().unwrap().len(), 0);
//! assert_eq!(gateway.request_count(), 1);
//! # }
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use bytes::Bytes;

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::{ApiRequest, ApiResponse, Gateway, Method};

type Route = (Method, String);

#[derive(Debug, Default)]
struct FakeState {
    scripted: HashMap<Route, VecDeque<GatewayResult<ApiResponse>>>,
    requests: Vec<ApiRequest>,
}

/// Scripted gateway; see the module docs for the serving rules.
#[derive(Debug, Default)]
pub struct FakeGateway {
    state: Mutex<FakeState>,
}

impl FakeGateway {
    /// Create a gateway with no scripted routes
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Script one outcome for `method path`
    pub fn respond(&self, method: Method, path: &str, outcome: GatewayResult<ApiResponse>) {
        self.lock()
            .scripted
            .entry((method, path.to_string()))
            .or_default()
            .push_back(outcome);
    }

    /// Script a JSON success
    pub fn on_json(&self, method: Method, path: &str, body: serde_json::Value) {
        self.respond(method, path, Ok(ApiResponse::Json(body)));
    }

    /// Script a binary success
    pub fn on_bytes(&self, method: Method, path: &str, body: impl Into<Bytes>) {
        self.respond(method, path, Ok(ApiResponse::Binary(body.into())));
    }

    /// Script a non-2xx rejection
    pub fn on_reject(&self, method: Method, path: &str, status: u16, message: Option<&str>) {
        self.respond(
            method,
            path,
            Err(GatewayError::Rejected {
                status,
                message: message.map(str::to_string),
            }),
        );
    }

    /// Script a transport failure
    pub fn on_transport_error(&self, method: Method, path: &str) {
        self.respond(
            method,
            path,
            Err(GatewayError::Transport("connection refused".to_string())),
        );
    }

    /// Every request received so far, oldest first
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.lock().requests.clone()
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Number of requests received for one route
    pub fn count_for(&self, method: Method, path: &str) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

#[async_trait::async_trait]
impl Gateway for FakeGateway {
    async fn send(&self, request: ApiRequest) -> GatewayResult<ApiResponse> {
        let mut state = self.lock();
        let route = (request.method, request.path.clone());
        state.requests.push(request);

        let Some(queue) = state.scripted.get_mut(&route) else {
            return Err(GatewayError::Transport(format!(
                "no scripted response for {} {}",
                route.0, route.1
            )));
        };

        if queue.len() > 1 {
            queue
                .pop_front()
                .unwrap_or_else(|| Err(GatewayError::Transport("empty script".to_string())))
        } else {
            queue
                .front()
                .cloned()
                .unwrap_or_else(|| Err(GatewayError::Transport("empty script".to_string())))
        }
    }
}
