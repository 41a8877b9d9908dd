//! The outbound seam. The pipeline only knows [`ServiceClient`]; the real
//! HTTP implementation lives here and tests inject scripted clients.

use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde_json::Value;
use thiserror::Error;

use crate::descriptor::OperationDescriptor;
use crate::request::ConstructedRequest;
use crate::settings::ProfileSettings;

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resolved endpoint for one process: flag > profile > region template.
#[derive(Clone, Debug, PartialEq)]
pub struct EndpointConfig {
    pub url: String,
    pub region: String,
    pub timeout: Duration,
}

impl EndpointConfig {
    pub fn resolve(
        endpoint_flag: Option<&str>,
        region_flag: Option<&str>,
        profile: Option<&ProfileSettings>,
    ) -> Self {
        let region = region_flag
            .map(str::to_string)
            .or_else(|| profile.and_then(|p| p.region.clone()))
            .unwrap_or_else(|| {
                tracing::warn!("no region configured; falling back to {DEFAULT_REGION}");
                DEFAULT_REGION.to_string()
            });
        let url = endpoint_flag
            .map(str::to_string)
            .or_else(|| profile.and_then(|p| p.endpoint_url.clone()))
            .unwrap_or_else(|| format!("https://medialive.{region}.amazonaws.com"));
        let timeout = Duration::from_secs(
            profile
                .and_then(|p| p.timeout_secs)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        );
        Self {
            url,
            region,
            timeout,
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// The endpoint could not be reached at all: name resolution,
    /// connection, or timeout failures.
    #[error("transport failure: {message}")]
    Transport { message: String },
    /// The service answered with a rejection.
    #[error("service error {status} ({code}): {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },
    #[error("failed to decode response body: {0}")]
    Decode(String),
}

/// One remote call per invocation. Implementations must be safe to share
/// across invocations; the pipeline never mutates them.
#[async_trait]
pub trait ServiceClient: Send + Sync {
    async fn dispatch(
        &self,
        operation: &'static OperationDescriptor,
        request: ConstructedRequest,
    ) -> Result<Value, ClientError>;
}

/// Plain HTTP client against the resolved endpoint. Request signing is the
/// deployment environment's concern (endpoint-side or proxy); this client
/// only speaks the JSON shapes.
pub struct HttpClient {
    endpoint: EndpointConfig,
    agent: ureq::Agent,
}

impl HttpClient {
    pub fn new(endpoint: EndpointConfig) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(endpoint.timeout))
            .http_status_as_error(false)
            .build();
        Self {
            endpoint,
            agent: config.new_agent(),
        }
    }

    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    fn url_for(&self, request: &ConstructedRequest) -> String {
        let mut url = format!("{}{}", self.endpoint.url.trim_end_matches('/'), request.path);
        // Bodyless methods carry their remaining parameters as a query
        // string (pagination tokens, page sizes).
        if matches!(request.method, "GET" | "DELETE") {
            if let Some(fields) = request.body.as_object() {
                let mut separator = '?';
                for (key, value) in fields {
                    let rendered = match value {
                        Value::String(text) => text.clone(),
                        other => other.to_string(),
                    };
                    url.push(separator);
                    url.push_str(&query_encode(key));
                    url.push('=');
                    url.push_str(&query_encode(&rendered));
                    separator = '&';
                }
            }
        }
        url
    }
}

/// RFC 3986 query encoding: everything but unreserved characters.
fn query_encode(input: &str) -> String {
    const QUERY_ENCODE_SET: &AsciiSet = &CONTROLS
        .add(b' ')
        .add(b'"')
        .add(b'#')
        .add(b'%')
        .add(b'&')
        .add(b'\'')
        .add(b'+')
        .add(b',')
        .add(b'/')
        .add(b':')
        .add(b';')
        .add(b'<')
        .add(b'=')
        .add(b'>')
        .add(b'?')
        .add(b'@')
        .add(b'[')
        .add(b'\\')
        .add(b']')
        .add(b'^')
        .add(b'`')
        .add(b'{')
        .add(b'|')
        .add(b'}');
    utf8_percent_encode(input, QUERY_ENCODE_SET).to_string()
}

fn parse_body(raw: &str) -> Result<Value, ClientError> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(raw).map_err(|err| ClientError::Decode(err.to_string()))
}

fn classify_status(status: u16, body: Value) -> Result<Value, ClientError> {
    if status < 400 {
        return Ok(body);
    }
    let code = body
        .get("Code")
        .or_else(|| body.get("__type"))
        .and_then(Value::as_str)
        .unwrap_or("Unknown")
        .to_string();
    let message = body
        .get("Message")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Err(ClientError::Service {
        status,
        code,
        message,
    })
}

#[async_trait]
impl ServiceClient for HttpClient {
    async fn dispatch(
        &self,
        operation: &'static OperationDescriptor,
        request: ConstructedRequest,
    ) -> Result<Value, ClientError> {
        let url = self.url_for(&request);
        let agent = self.agent.clone();
        tracing::debug!(
            operation = operation.name,
            method = request.method,
            %url,
            "dispatching"
        );

        let outcome = tokio::task::spawn_blocking(move || {
            let response = match request.method {
                "GET" => agent.get(&url).call(),
                "DELETE" => agent.delete(&url).call(),
                "PUT" => agent
                    .put(&url)
                    .header("Content-Type", "application/json")
                    .send_json(&request.body),
                _ => agent
                    .post(&url)
                    .header("Content-Type", "application/json")
                    .send_json(&request.body),
            };
            match response {
                Ok(mut resp) => {
                    let status = resp.status().as_u16();
                    let raw = resp
                        .body_mut()
                        .read_to_string()
                        .map_err(|err| ClientError::Decode(err.to_string()))?;
                    classify_status(status, parse_body(&raw)?)
                }
                Err(err) => Err(ClientError::Transport {
                    message: err.to_string(),
                }),
            }
        })
        .await;

        match outcome {
            Ok(result) => result,
            Err(join_err) => Err(ClientError::Transport {
                message: format!("request task failed: {join_err}"),
            }),
        }
    }
}
