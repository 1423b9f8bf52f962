//! HTTP transport for the marketplace REST API.
//!
//! One request path for every call: bearer auth, JSON bodies, status
//! mapping and response envelope handling. A 401 comes back as an ordinary
//! [`ClientError::Api`]; turning it into a session teardown is the
//! provider's job.

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::session::SessionTokens;

/// Keys allowed next to `data` in a response envelope.
const ENVELOPE_KEYS: &[&str] = &["data", "success", "message", "status"];

/// A request to the backend, independent of credentials.
#[derive(Debug, Clone)]
pub(crate) struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            query: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Attach query parameters from a flat struct. `None` fields are skipped.
    pub fn query<Q: Serialize + ?Sized>(mut self, query: &Q) -> Result<Self, ClientError> {
        if let Value::Object(fields) = serde_json::to_value(query)? {
            self.query = fields
                .into_iter()
                .filter(|(_, value)| !value.is_null())
                .map(|(key, value)| {
                    let value = match value {
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    (key, value)
                })
                .collect();
        }
        Ok(self)
    }
}

/// Thin wrapper over `reqwest::Client` bound to one backend.
#[derive(Debug, Clone)]
pub(crate) struct HttpClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send a request and return the unwrapped JSON payload.
    ///
    /// Empty success bodies yield `Value::Null`.
    pub async fn send(
        &self,
        request: &ApiRequest,
        tokens: Option<&SessionTokens>,
    ) -> Result<Value, ClientError> {
        let url = self.config.endpoint(&request.path);
        let mut builder = self.client.request(request.method.clone(), &url);

        if let Some(tokens) = tokens {
            builder = builder.header(reqwest::header::AUTHORIZATION, tokens.bearer());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = error_message(&text);
            // Server errors are reported once, by the caller
            if status.is_server_error() {
                warn!(
                    method = %request.method,
                    path = %request.path,
                    status = %status,
                    body = %text.chars().take(500).collect::<String>(),
                    "Backend returned server error"
                );
            } else {
                warn!(
                    method = %request.method,
                    path = %request.path,
                    status = %status,
                    message = ?message,
                    "Backend returned client error"
                );
            }
            return Err(ClientError::api(status, message));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        let value: Value = serde_json::from_str(&text).map_err(|e| {
            warn!(
                error = %e,
                path = %request.path,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            e
        })?;

        Ok(unwrap_envelope(value))
    }
}

/// Pull the backend's `message` out of an error body.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

/// Strip a `{"data": …}` wrapper when it is only an envelope.
pub(crate) fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut fields)
            if fields.get("data").is_some_and(|d| !d.is_null())
                && fields.keys().all(|k| ENVELOPE_KEYS.contains(&k.as_str())) =>
        {
            fields.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}
