//! reqwest-backed gateway
//!
//! [`HttpGateway`] resolves every request path against a configured API base
//! URL and keeps an in-memory cookie store, so the session cookie set by a
//! successful login is replayed on later calls for as long as the gateway
//! lives. Nothing is written to disk.
//!
//! # Status handling
//!
//! - `2xx`: body decoded according to the request's [`ResponseKind`]
//! - any other status: [`GatewayError::Rejected`] carrying the body's
//!   `error`/`detail`/`message` string when the body is JSON
//! - no response at all: [`GatewayError::Transport`]

use std::time::Duration;

use reqwest::multipart;
use url::Url;

use crate::config::ApiConfig;
use crate::error::{ChemvizError, GatewayError, GatewayResult, Result};
use crate::gateway::{extract_server_message, ApiRequest, ApiResponse, Gateway, Method};
use crate::gateway::{RequestBody, ResponseKind};

/// Gateway speaking HTTP to the visualizer API.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use chemviz::gateway::HttpGateway;
///
/// let gateway = HttpGateway::new("http://localhost:8000/api/", Duration::from_secs(30)).unwrap();
/// assert_eq!(gateway.base_url().as_str(), "http://localhost:8000/api/");
/// ```
#[derive(Debug, Clone)]
pub struct HttpGateway {
    /// Underlying reqwest client; holds the cookie jar.
    http_client: reqwest::Client,
    /// API base, always ending in `/`.
    base_url: Url,
}

impl HttpGateway {
    /// Construct a gateway for `base_url` with a per-request `timeout`.
    ///
    /// A missing trailing slash on the base is added so relative paths
    /// resolve underneath it.
    ///
    /// # Errors
    ///
    /// Returns [`ChemvizError::Config`] if the URL does not parse or the
    /// HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = normalize_base(base_url)?;
        let http_client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .user_agent(concat!("chemviz/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ChemvizError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Build from the `api` section of the configuration
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_seconds))
    }

    /// Configured API base
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for a relative request path
    pub fn resolve(&self, path: &str) -> GatewayResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| GatewayError::Transport(format!("invalid request path {}: {}", path, e)))
    }
}

fn normalize_base(base_url: &str) -> Result<Url> {
    let mut owned = base_url.trim().to_string();
    if !owned.ends_with('/') {
        owned.push('/');
    }
    Url::parse(&owned).map_err(|e| {
        ChemvizError::Config(format!("Invalid API base URL {}: {}", base_url, e)).into()
    })
}

#[async_trait::async_trait]
impl Gateway for HttpGateway {
    async fn send(&self, request: ApiRequest) -> GatewayResult<ApiResponse> {
        let url = self.resolve(&request.path)?;
        tracing::debug!("{} {}", request.method, url);

        let mut builder = match request.method {
            Method::Get => self.http_client.get(url.clone()),
            Method::Post => self.http_client.post(url.clone()),
        };

        builder = match request.body {
            Some(RequestBody::Json(value)) => builder.json(&value),
            Some(RequestBody::Multipart {
                field,
                file_name,
                bytes,
            }) => {
                let part = multipart::Part::bytes(bytes.to_vec()).file_name(file_name);
                builder.multipart(multipart::Form::new().part(field, part))
            }
            None => builder,
        };

        let response = builder.send().await.map_err(|e| {
            tracing::warn!("{} {} failed: {}", request.method, url, e);
            GatewayError::Transport(e.to_string())
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(GatewayError::from)?;

        if !status.is_success() {
            let message = serde_json::from_slice::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| extract_server_message(&v));
            tracing::warn!(
                "{} {} returned HTTP {}{}",
                request.method,
                url,
                status.as_u16(),
                message
                    .as_deref()
                    .map(|m| format!(" ({})", m))
                    .unwrap_or_default()
            );
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        match request.expect {
            ResponseKind::Json => {
                if body.is_empty() {
                    return Ok(ApiResponse::Json(serde_json::Value::Null));
                }
                serde_json::from_slice(&body)
                    .map(ApiResponse::Json)
                    .map_err(|e| GatewayError::Decode(e.to_string()))
            }
            ResponseKind::Binary => Ok(ApiResponse::Binary(body)),
            ResponseKind::Empty => Ok(ApiResponse::Empty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_gateway(base: &str) -> HttpGateway {
        HttpGateway::new(base, Duration::from_secs(5)).expect("valid gateway")
    }

    #[test]
    fn test_new_adds_trailing_slash() {
        let gateway = make_gateway("http://localhost:8000/api");
        assert_eq!(gateway.base_url().as_str(), "http://localhost:8000/api/");
    }

    #[test]
    fn test_resolve_relative_path() {
        let gateway = make_gateway("http://localhost:8000/api/");
        let url = gateway.resolve("datasets/4/generate_pdf/").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/datasets/4/generate_pdf/"
        );
    }

    #[test]
    fn test_resolve_strips_leading_slash() {
        let gateway = make_gateway("http://localhost:8000/api/");
        let url = gateway.resolve("/auth/status/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/auth/status/");
    }

    #[test]
    fn test_new_rejects_garbage_url() {
        let result = HttpGateway::new("not a url", Duration::from_secs(5));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let gateway = HttpGateway::new("http://127.0.0.1:9/api/", Duration::from_secs(2)).unwrap();
        let err = gateway
            .send(ApiRequest::get("datasets/"))
            .await
            .expect_err("request should fail");
        assert!(matches!(err, GatewayError::Transport(_)));
        assert_eq!(err.server_message(), None);
    }
}
