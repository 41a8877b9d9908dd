//! The invocation pipeline: bind parameters, resolve the selector, gate
//! mutating calls behind confirmation, construct the request, dispatch
//! once, notify the observer, and project the response.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::binder::{self, BindError, RawArgs};
use crate::client::{ClientError, EndpointConfig, ServiceClient};
use crate::confirm::{ConfirmationPrompt, describe_targets};
use crate::descriptor::OperationDescriptor;
use crate::dispatch::{self, DispatchError, DispatchOutcome};
use crate::history::InvocationObserver;
use crate::request::{self, RequestError};
use crate::selector::{Selector, SelectorError};

/// Cross-cutting controls shared by every operation subcommand.
#[derive(Clone, Debug, Default)]
pub struct InvocationControls {
    pub select: Option<String>,
    pub force: bool,
    pub pass_thru: bool,
}

/// Terminal states of one invocation. `Declined` and `Cancelled` are clean
/// non-error outcomes; errors travel through [`InvocationError`].
#[derive(Clone, Debug, PartialEq)]
pub enum InvocationOutcome {
    Success {
        output: Value,
        raw_response: Value,
        warnings: Vec<String>,
    },
    /// Confirmation declined before any request was built; the client was
    /// never invoked.
    Declined,
    Cancelled,
}

#[derive(Debug, Error)]
pub enum InvocationError {
    #[error(transparent)]
    Bind(#[from] BindError),
    #[error(transparent)]
    Selector(#[from] SelectorError),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("unable to reach {url} (region {region}): {message}")]
    Connectivity {
        message: String,
        url: String,
        region: String,
    },
    #[error(transparent)]
    Service(ClientError),
    #[error("confirmation prompt failed: {0}")]
    Prompt(String),
}

pub struct Pipeline {
    client: Arc<dyn ServiceClient>,
    prompt: Arc<dyn ConfirmationPrompt>,
    observer: Option<Arc<dyn InvocationObserver>>,
    endpoint: EndpointConfig,
}

impl Pipeline {
    pub fn new(
        client: Arc<dyn ServiceClient>,
        prompt: Arc<dyn ConfirmationPrompt>,
        endpoint: EndpointConfig,
    ) -> Self {
        Self {
            client,
            prompt,
            observer: None,
            endpoint,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn InvocationObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    /// Run one invocation end to end. `cancel` completes to abandon an
    /// in-flight dispatch.
    pub async fn invoke(
        &self,
        descriptor: &'static OperationDescriptor,
        raw: &RawArgs,
        controls: &InvocationControls,
        cancel: impl Future<Output = ()>,
    ) -> Result<InvocationOutcome, InvocationError> {
        let ctx = binder::bind(descriptor, raw)?;
        let selector =
            Selector::resolve(controls.select.as_deref(), controls.pass_thru, descriptor)?;

        if descriptor.mutating && !controls.force {
            let description = describe_targets(descriptor, &ctx);
            let approved = self
                .prompt
                .confirm(descriptor.name, descriptor.impact, &description)
                .map_err(|err| InvocationError::Prompt(err.to_string()))?;
            if !approved {
                tracing::info!(
                    operation = descriptor.name,
                    "confirmation declined; nothing dispatched"
                );
                return Ok(InvocationOutcome::Declined);
            }
        }

        let constructed = request::build(descriptor, &ctx)?;
        let request_body = constructed.body.clone();

        let outcome = dispatch::dispatch(
            self.client.as_ref(),
            descriptor,
            constructed,
            &self.endpoint,
            cancel,
        )
        .await;

        let response = match outcome {
            Ok(DispatchOutcome::Response(response)) => response,
            Ok(DispatchOutcome::Cancelled) => return Ok(InvocationOutcome::Cancelled),
            Err(DispatchError::Connectivity {
                message,
                url,
                region,
            }) => {
                return Err(InvocationError::Connectivity {
                    message,
                    url,
                    region,
                });
            }
            Err(DispatchError::Service(err)) => return Err(InvocationError::Service(err)),
        };

        if let Some(observer) = &self.observer {
            observer.record(descriptor.name, &request_body, &response);
        }

        let output = selector.project(&response, &ctx);
        Ok(InvocationOutcome::Success {
            output,
            raw_response: response,
            warnings: ctx.warnings,
        })
    }
}
