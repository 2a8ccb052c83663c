//! Remote gateway abstraction and implementations
//!
//! The [`Gateway`] trait is the only place network I/O happens. Every call
//! goes through one uniform method taking an [`ApiRequest`] (method, path,
//! optional body, expected response kind) and returning either an
//! [`ApiResponse`] or a typed [`GatewayError`].
//!
//! - [`http::HttpGateway`] -- reqwest-backed implementation used by the binary
//! - [`fake::FakeGateway`] -- in-process scripted implementation for tests
//! - [`api`] -- typed wrappers for each endpoint of the visualizer API
//!
//! Gateways perform no retries and no caching: one call, one request, one
//! response or one failure.

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{GatewayError, GatewayResult};

pub mod api;
pub mod fake;
pub mod http;

pub use fake::FakeGateway;
pub use http::HttpGateway;

/// HTTP method of a gateway call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// Body attached to a request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// JSON document
    Json(serde_json::Value),
    /// Single-file multipart form
    Multipart {
        /// Form field name
        field: String,
        /// File name reported to the server
        file_name: String,
        /// File contents
        bytes: Bytes,
    },
}

/// What the caller expects back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseKind {
    /// Structured JSON body
    #[default]
    Json,
    /// Opaque binary artifact
    Binary,
    /// Body is ignored
    Empty,
}

/// One gateway call
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the configured API base, e.g. `datasets/3/`
    pub path: String,
    pub body: Option<RequestBody>,
    pub expect: ResponseKind,
}

impl ApiRequest {
    /// GET expecting JSON
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
            expect: ResponseKind::Json,
        }
    }

    /// POST without a body
    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: None,
            expect: ResponseKind::Json,
        }
    }

    /// Attach a JSON body
    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(value));
        self
    }

    /// Attach a single-file multipart body
    pub fn multipart(
        mut self,
        field: impl Into<String>,
        file_name: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        self.body = Some(RequestBody::Multipart {
            field: field.into(),
            file_name: file_name.into(),
            bytes: bytes.into(),
        });
        self
    }

    /// Set the expected response kind
    pub fn expect(mut self, kind: ResponseKind) -> Self {
        self.expect = kind;
        self
    }
}

/// Successful gateway response
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Json(serde_json::Value),
    Binary(Bytes),
    Empty,
}

impl ApiResponse {
    /// Decode a JSON response into `T`
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Decode`] when the response is not JSON or does
    /// not match `T`.
    pub fn into_json<T: DeserializeOwned>(self) -> GatewayResult<T> {
        match self {
            ApiResponse::Json(value) => {
                serde_json::from_value(value).map_err(|e| GatewayError::Decode(e.to_string()))
            }
            other => Err(GatewayError::Decode(format!(
                "expected JSON response, got {}",
                other.kind_name()
            ))),
        }
    }

    /// Take the bytes of a binary response
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Decode`] when the response is not binary.
    pub fn into_bytes(self) -> GatewayResult<Bytes> {
        match self {
            ApiResponse::Binary(bytes) => Ok(bytes),
            other => Err(GatewayError::Decode(format!(
                "expected binary response, got {}",
                other.kind_name()
            ))),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            ApiResponse::Json(_) => "json",
            ApiResponse::Binary(_) => "binary",
            ApiResponse::Empty => "empty",
        }
    }
}

/// Boundary through which every component talks to the remote API.
///
/// Implementations must map any non-2xx status to
/// [`GatewayError::Rejected`] and any failure to obtain a response to
/// [`GatewayError::Transport`].
#[async_trait::async_trait]
pub trait Gateway: Send + Sync + std::fmt::Debug {
    /// Issue one request and return its response.
    async fn send(&self, request: ApiRequest) -> GatewayResult<ApiResponse>;
}

/// Pull a human-readable message out of an error body
///
/// Looks at `error` first, then `detail`, then `message`. Non-string values
/// are rendered as compact JSON.
pub fn extract_server_message(body: &serde_json::Value) -> Option<String> {
    ["error", "detail", "message"].iter().find_map(|key| {
        body.get(key).and_then(|v| match v {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.is_empty() => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
    })
}
