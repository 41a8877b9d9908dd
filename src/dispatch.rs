//! Issues exactly one client call per invocation, racing it against a
//! cancellation signal, and classifies the outcome. No retries here:
//! retry policy is the transport's concern.

use std::future::Future;

use serde_json::Value;
use thiserror::Error;

use crate::client::{ClientError, EndpointConfig, ServiceClient};
use crate::descriptor::OperationDescriptor;
use crate::request::ConstructedRequest;

#[derive(Clone, Debug, PartialEq)]
pub enum DispatchOutcome {
    Response(Value),
    /// The cancel signal won the race. Distinct from any error; the
    /// in-flight call was dropped and partial results discarded.
    Cancelled,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The endpoint could not be reached. Carries the resolved endpoint so
    /// the operator can see what was actually attempted.
    #[error("unable to reach {url} (region {region}): {message}")]
    Connectivity {
        message: String,
        url: String,
        region: String,
    },
    #[error(transparent)]
    Service(ClientError),
}

/// Run the single remote call. `cancel` is any future that completes when
/// the invocation should be abandoned (Ctrl-C at the CLI boundary, a
/// channel in tests).
pub async fn dispatch(
    client: &dyn ServiceClient,
    descriptor: &'static OperationDescriptor,
    request: ConstructedRequest,
    endpoint: &EndpointConfig,
    cancel: impl Future<Output = ()>,
) -> Result<DispatchOutcome, DispatchError> {
    tokio::select! {
        result = client.dispatch(descriptor, request) => match result {
            Ok(response) => Ok(DispatchOutcome::Response(response)),
            Err(ClientError::Transport { message }) => Err(DispatchError::Connectivity {
                message,
                url: endpoint.url.clone(),
                region: endpoint.region.clone(),
            }),
            Err(other) => Err(DispatchError::Service(other)),
        },
        () = cancel => {
            tracing::warn!(operation = descriptor.name, "invocation cancelled");
            Ok(DispatchOutcome::Cancelled)
        }
    }
}
