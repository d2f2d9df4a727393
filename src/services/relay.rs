use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::error::{AiError, AiResult};

pub const DEFAULT_RELAY_TIMEOUT: Duration = Duration::from_secs(60);

/// The shapes a relay (n8n-style workflow) may answer with.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayResponse {
    /// `{ ... }`
    Bare(Value),
    /// `[ { ... }, ... ]`
    Array(Vec<Value>),
    /// `{ "data": { ... } }`
    Wrapped(Value),
    /// `{ "data": [ { ... }, ... ] }`
    WrappedArray(Vec<Value>),
    /// Body that is not JSON at all
    Text(String),
}

impl RelayResponse {
    pub fn parse(body: &str) -> Self {
        if body.is_empty() {
            return RelayResponse::Bare(Value::Object(Map::new()));
        }

        match serde_json::from_str::<Value>(body) {
            Ok(json) => Self::classify(json),
            Err(e) => {
                log::warn!("⚠️ Relay response is not JSON ({}), wrapping as text", e);
                RelayResponse::Text(body.to_string())
            }
        }
    }

    pub fn classify(json: Value) -> Self {
        match json {
            Value::Array(items) => RelayResponse::Array(items),
            Value::Object(mut map) => match map.remove("data") {
                Some(Value::Array(items)) => RelayResponse::WrappedArray(items),
                Some(inner) => RelayResponse::Wrapped(inner),
                None => RelayResponse::Bare(Value::Object(map)),
            },
            other => RelayResponse::Bare(other),
        }
    }

    /// Collapses every shape into one result object; arrays yield their
    /// first element.
    pub fn into_result(self) -> Value {
        match self {
            RelayResponse::Bare(value) | RelayResponse::Wrapped(value) => value,
            RelayResponse::Array(items) | RelayResponse::WrappedArray(items) => items
                .into_iter()
                .next()
                .unwrap_or_else(|| Value::Object(Map::new())),
            RelayResponse::Text(text) => json!({ "text": text }),
        }
    }
}

#[async_trait]
pub trait Relay: Send + Sync {
    async fn invoke(&self, endpoint: &str, payload: &Value) -> AiResult<Value>;
}

pub struct RelayClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl RelayClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    fn classify_error(&self, err: reqwest::Error) -> AiError {
        if err.is_timeout() {
            AiError::Timeout(self.timeout)
        } else {
            AiError::Network(err.to_string())
        }
    }
}

impl Default for RelayClient {
    fn default() -> Self {
        Self::new(DEFAULT_RELAY_TIMEOUT)
    }
}

#[async_trait]
impl Relay for RelayClient {
    async fn invoke(&self, endpoint: &str, payload: &Value) -> AiResult<Value> {
        log::info!("🔗 Calling relay endpoint: {}", endpoint);

        let response = self
            .client
            .post(endpoint)
            .header("Content-Type", "application/json")
            .json(payload)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.classify_error(e))?;

        let status = response.status();
        log::debug!("📥 Relay response status: {}", status);

        let body = response.text().await.map_err(|e| self.classify_error(e))?;

        if !status.is_success() {
            let body = if body.is_empty() {
                status.canonical_reason().unwrap_or_default().to_string()
            } else {
                body
            };
            log::error!("❌ Relay error ({}): {}", status, body);
            return Err(AiError::Relay {
                status: status.as_u16(),
                body,
            });
        }

        log::debug!("📄 Relay response size: {} bytes", body.len());
        Ok(RelayResponse::parse(&body).into_result())
    }
}
