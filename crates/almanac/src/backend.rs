//! Backend gateway
//!
//! Relays a tool call to the configured knowledge-base service as a single
//! HTTP POST to `<base_url>/<path>` with the normalized arguments as the JSON
//! body. No retries; the HTTP server's timeout layer bounds how long a call
//! may hang.

use lectern::ExecutionError;
use serde_json::{json, Value};
use thiserror::Error;

/// Rejected response bodies are cut to this many bytes before decoding.
pub const REJECTED_BODY_LIMIT: usize = 4096;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("no backend configured (set backend.base_url or ALMANAC_BACKEND_URL)")]
    Unconfigured,

    #[error("backend unreachable for {path}: {source}")]
    Connectivity {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("backend rejected {path} with status {status}")]
    Rejected {
        path: String,
        status: u16,
        body: String,
    },
}

impl GatewayError {
    /// Stable tag carried into `ExecutionError::reason`.
    pub fn reason(&self) -> &'static str {
        match self {
            GatewayError::Unconfigured => "backend_unconfigured",
            GatewayError::Connectivity { .. } => "backend_unreachable",
            GatewayError::Rejected { .. } => "backend_rejected",
        }
    }
}

impl From<GatewayError> for ExecutionError {
    fn from(err: GatewayError) -> Self {
        let details = match &err {
            GatewayError::Unconfigured => None,
            GatewayError::Connectivity { path, .. } => Some(json!({ "path": path })),
            GatewayError::Rejected { path, status, body } => Some(json!({
                "path": path,
                "status": status,
                "body": body,
            })),
        };

        let converted = ExecutionError::new(err.reason(), err.to_string());
        match details {
            Some(details) => converted.with_details(details),
            None => converted,
        }
    }
}

/// HTTP client for the knowledge-base backend. Cheap to clone.
#[derive(Debug, Clone)]
pub struct BackendGateway {
    base_url: Option<String>,
    client: reqwest::Client,
}

impl BackendGateway {
    /// A blank `base_url` yields an unconfigured gateway.
    pub fn new(base_url: &str) -> Self {
        let trimmed = base_url.trim().trim_end_matches('/');
        Self {
            base_url: (!trimmed.is_empty()).then(|| trimmed.to_string()),
            client: reqwest::Client::new(),
        }
    }

    pub fn unconfigured() -> Self {
        Self::new("")
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// POST `payload` to `<base_url>/<path>` and return the parsed response.
    ///
    /// A 2xx response whose body is empty or not JSON is reported as the
    /// acknowledgment `{"ok": true}`.
    #[tracing::instrument(
        skip(self, payload),
        fields(backend.path = %path, http.status_code = tracing::field::Empty)
    )]
    pub async fn call(&self, path: &str, payload: &Value) -> Result<Value, GatewayError> {
        let base_url = self.base_url.as_deref().ok_or(GatewayError::Unconfigured)?;
        let url = format!("{}/{}", base_url, path.trim_start_matches('/'));

        let connectivity = |source: reqwest::Error| GatewayError::Connectivity {
            path: path.to_string(),
            source,
        };

        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(connectivity)?;

        let status = response.status();
        tracing::Span::current().record("http.status_code", status.as_u16());

        if !status.is_success() {
            let body = response
                .bytes()
                .await
                .map(|bytes| truncated_text(&bytes))
                .unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "backend rejected request");
            return Err(GatewayError::Rejected {
                path: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(connectivity)?;
        if bytes.is_empty() {
            return Ok(acknowledgment());
        }

        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!(error = %e, "backend returned a non-JSON body, treating as acknowledgment");
                Ok(acknowledgment())
            }
        }
    }
}

fn acknowledgment() -> Value {
    json!({ "ok": true })
}

fn truncated_text(bytes: &[u8]) -> String {
    let end = bytes.len().min(REJECTED_BODY_LIMIT);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
