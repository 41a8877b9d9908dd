//! Pre-dispatch confirmation for mutating operations. This is the only
//! point in the pipeline that can short-circuit an invocation.

use std::io::{self, IsTerminal, Write};

use crate::binder::InvocationContext;
use crate::descriptor::{ConfirmationImpact, OperationDescriptor};

/// Asks the operator to approve a mutating call. Tests supply scripted
/// implementations.
pub trait ConfirmationPrompt: Send + Sync {
    fn confirm(
        &self,
        operation: &str,
        impact: ConfirmationImpact,
        description: &str,
    ) -> anyhow::Result<bool>;
}

/// Interactive prompt on stderr/stdin. A non-interactive stdin declines,
/// so scripted runs must pass `--force` for mutating operations.
pub struct StdinPrompt;

impl ConfirmationPrompt for StdinPrompt {
    fn confirm(
        &self,
        operation: &str,
        impact: ConfirmationImpact,
        description: &str,
    ) -> anyhow::Result<bool> {
        if !io::stdin().is_terminal() {
            tracing::warn!(
                operation,
                "stdin is not a terminal; declining (pass --force to bypass)"
            );
            return Ok(false);
        }
        eprint!("{operation} ({impact} impact) on {description}. Proceed? [y/N]: ");
        io::stderr().flush()?;
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        let value = line.trim().to_ascii_lowercase();
        Ok(matches!(value.as_str(), "y" | "yes"))
    }
}

/// Human-readable description of the resource(s) an invocation touches,
/// built from the bound pipeline-input parameter(s).
pub fn describe_targets(
    descriptor: &OperationDescriptor,
    ctx: &InvocationContext,
) -> String {
    let mut parts = Vec::new();
    for spec in descriptor.parameters.iter().filter(|s| s.pipeline_input) {
        if let Some(value) = ctx.bound_value(spec.name) {
            let rendered = match value.as_str() {
                Some(text) => text.to_string(),
                None => value.to_string(),
            };
            parts.push(format!("{}={}", spec.name, rendered));
        }
    }
    if parts.is_empty() {
        return format!("operation {}", descriptor.name);
    }
    parts.join(", ")
}
