#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use medialivectl::client::{ClientError, EndpointConfig, ServiceClient};
use medialivectl::confirm::ConfirmationPrompt;
use medialivectl::descriptor::{ConfirmationImpact, OperationDescriptor};
use medialivectl::pipeline::Pipeline;
use medialivectl::request::ConstructedRequest;

pub enum MockBehavior {
    Respond(Value),
    TransportFailure(String),
    ServiceFailure {
        status: u16,
        code: String,
        message: String,
    },
    /// Never resolves; used to exercise cancellation.
    Hang,
}

/// Scripted client that records every dispatch it receives.
pub struct MockClient {
    behavior: MockBehavior,
    calls: Mutex<Vec<(String, ConstructedRequest)>>,
}

impl MockClient {
    pub fn respond(value: Value) -> Arc<Self> {
        Arc::new(Self {
            behavior: MockBehavior::Respond(value),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn transport_failure(message: &str) -> Arc<Self> {
        Arc::new(Self {
            behavior: MockBehavior::TransportFailure(message.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn service_failure(status: u16, code: &str, message: &str) -> Arc<Self> {
        Arc::new(Self {
            behavior: MockBehavior::ServiceFailure {
                status,
                code: code.to_string(),
                message: message.to_string(),
            },
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn hang() -> Arc<Self> {
        Arc::new(Self {
            behavior: MockBehavior::Hang,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<(String, ConstructedRequest)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ServiceClient for MockClient {
    async fn dispatch(
        &self,
        operation: &'static OperationDescriptor,
        request: ConstructedRequest,
    ) -> Result<Value, ClientError> {
        self.calls
            .lock()
            .unwrap()
            .push((operation.name.to_string(), request));
        match &self.behavior {
            MockBehavior::Respond(value) => Ok(value.clone()),
            MockBehavior::TransportFailure(message) => Err(ClientError::Transport {
                message: message.clone(),
            }),
            MockBehavior::ServiceFailure {
                status,
                code,
                message,
            } => Err(ClientError::Service {
                status: *status,
                code: code.clone(),
                message: message.clone(),
            }),
            MockBehavior::Hang => std::future::pending().await,
        }
    }
}

/// Prompt answering from a script and logging what it was asked.
pub struct ScriptedPrompt {
    answer: bool,
    asked: Mutex<Vec<(String, ConfirmationImpact, String)>>,
}

impl ScriptedPrompt {
    pub fn answering(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            asked: Mutex::new(Vec::new()),
        })
    }

    pub fn asked(&self) -> Vec<(String, ConfirmationImpact, String)> {
        self.asked.lock().unwrap().clone()
    }
}

impl ConfirmationPrompt for ScriptedPrompt {
    fn confirm(
        &self,
        operation: &str,
        impact: ConfirmationImpact,
        description: &str,
    ) -> anyhow::Result<bool> {
        self.asked.lock().unwrap().push((
            operation.to_string(),
            impact,
            description.to_string(),
        ));
        Ok(self.answer)
    }
}

pub fn test_endpoint() -> EndpointConfig {
    EndpointConfig {
        url: "http://localhost:9099".to_string(),
        region: "us-east-1".to_string(),
        timeout: Duration::from_secs(2),
    }
}

pub fn pipeline(client: Arc<MockClient>, prompt: Arc<ScriptedPrompt>) -> Pipeline {
    Pipeline::new(client, prompt, test_endpoint())
}

/// Never-completing cancel future for invocations that should run through.
pub fn no_cancel() -> std::future::Pending<()> {
    std::future::pending()
}
