//! Binds externally supplied arguments onto an [`InvocationContext`].
//!
//! Binding is deliberately lenient about required parameters: a missing or
//! null required value records a diagnostic warning and the call proceeds,
//! leaving final rejection to the remote service. The warning keeps the
//! operator informed without the tool hard-coding requirements the API may
//! relax later.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::descriptor::OperationDescriptor;

/// Raw argument map as delivered by the CLI layer or a library caller.
/// Presence of a key means the parameter was supplied; `Value::Null` is an
/// explicit null, distinct from an absent entry.
pub type RawArgs = BTreeMap<String, Value>;

/// Per-invocation state. Created fresh for every command execution and
/// discarded afterwards; nothing here outlives the call.
#[derive(Clone, Debug)]
pub struct InvocationContext {
    pub invocation_id: Uuid,
    /// Canonical parameter name to bound value. Only supplied parameters
    /// appear; a `Value::Null` entry is an explicit null binding.
    pub bound: BTreeMap<&'static str, Value>,
    pub warnings: Vec<String>,
}

impl InvocationContext {
    pub fn bound_value(&self, name: &str) -> Option<&Value> {
        self.bound.get(name)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum BindError {
    #[error("operation {operation} has no parameter named {parameter}")]
    UnknownParameter {
        operation: &'static str,
        parameter: String,
    },
}

/// Resolve raw arguments against the descriptor's parameter specs.
///
/// Alias precedence: the canonical name wins when both the canonical name
/// and an alias were supplied; otherwise the first bound alias (in spec
/// order) is used.
pub fn bind(
    descriptor: &'static OperationDescriptor,
    raw: &RawArgs,
) -> Result<InvocationContext, BindError> {
    for supplied in raw.keys() {
        if descriptor.find_parameter(supplied).is_none() {
            return Err(BindError::UnknownParameter {
                operation: descriptor.name,
                parameter: supplied.clone(),
            });
        }
    }

    let mut ctx = InvocationContext {
        invocation_id: Uuid::new_v4(),
        bound: BTreeMap::new(),
        warnings: Vec::new(),
    };

    for spec in descriptor.parameters {
        let supplied = raw.get(spec.name).or_else(|| {
            spec.aliases
                .iter()
                .find_map(|alias| raw.get(*alias))
        });

        match supplied {
            Some(Value::Null) if !spec.allows_null => {
                let warning = format!(
                    "parameter {} does not accept null; value ignored",
                    spec.name
                );
                tracing::warn!(operation = descriptor.name, "{warning}");
                ctx.warnings.push(warning);
            }
            Some(value) => {
                ctx.bound.insert(spec.name, value.clone());
            }
            None => {}
        }

        let effectively_unset = match ctx.bound.get(spec.name) {
            None => true,
            Some(Value::Null) => true,
            Some(_) => false,
        };
        if spec.required && effectively_unset {
            let warning = format!(
                "required parameter {} was not supplied; the service may reject the request",
                spec.name
            );
            tracing::warn!(operation = descriptor.name, "{warning}");
            ctx.warnings.push(warning);
        }
    }

    tracing::debug!(
        operation = descriptor.name,
        invocation = %ctx.invocation_id,
        bound = ctx.bound.len(),
        "parameters bound"
    );
    Ok(ctx)
}
