//! Response projection. A selector is resolved before anything is sent so
//! that a bad expression can never follow a remote side effect.

use serde_json::Value;
use thiserror::Error;

use crate::binder::InvocationContext;
use crate::descriptor::OperationDescriptor;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    /// `"*"`: emit the whole response.
    Identity,
    /// `"Field"` or `"Field.Sub"`: project a path out of the response.
    /// Only the root segment is validated against the operation's known
    /// response fields; deeper segments are response-dependent.
    Path(Vec<String>),
    /// `"^ParameterName"`: ignore the response and emit the value bound to
    /// the named input parameter.
    InputParameter(&'static str),
}

#[derive(Debug, Error, PartialEq)]
pub enum SelectorError {
    #[error("--select and --pass-thru are mutually exclusive")]
    Conflict,
    #[error("selector expression is empty")]
    Empty,
    #[error("operation {operation} has no response field {field}")]
    UnknownField {
        operation: &'static str,
        field: String,
    },
    #[error("operation {operation} has no parameter {parameter} to select with ^")]
    UnknownParameter {
        operation: &'static str,
        parameter: String,
    },
    #[error("operation {operation} has no identifying parameter for --pass-thru")]
    NoPipelineInput { operation: &'static str },
}

impl Selector {
    /// Resolve the effective selector for one invocation.
    ///
    /// `--pass-thru` is a legacy spelling of `^<primary identifier>`; it is
    /// translated here so the rest of the pipeline knows only selectors.
    /// Asking for both at once is a construction-time error.
    pub fn resolve(
        select: Option<&str>,
        pass_thru: bool,
        descriptor: &'static OperationDescriptor,
    ) -> Result<Self, SelectorError> {
        match (select, pass_thru) {
            (Some(_), true) => Err(SelectorError::Conflict),
            (Some(expression), false) => Self::parse(expression, descriptor),
            (None, true) => {
                let primary = descriptor
                    .primary_identifier()
                    .ok_or(SelectorError::NoPipelineInput {
                        operation: descriptor.name,
                    })?;
                Ok(Selector::InputParameter(primary.name))
            }
            (None, false) => Self::parse(descriptor.default_selector, descriptor),
        }
    }

    pub fn parse(
        expression: &str,
        descriptor: &'static OperationDescriptor,
    ) -> Result<Self, SelectorError> {
        let expression = expression.trim();
        if expression.is_empty() {
            return Err(SelectorError::Empty);
        }
        if expression == "*" {
            return Ok(Selector::Identity);
        }
        if let Some(parameter) = expression.strip_prefix('^') {
            let spec = descriptor.find_parameter(parameter).ok_or_else(|| {
                SelectorError::UnknownParameter {
                    operation: descriptor.name,
                    parameter: parameter.to_string(),
                }
            })?;
            return Ok(Selector::InputParameter(spec.name));
        }

        let segments: Vec<String> = expression.split('.').map(str::to_string).collect();
        let root = segments[0].as_str();
        if !descriptor.response_fields.contains(&root) {
            return Err(SelectorError::UnknownField {
                operation: descriptor.name,
                field: root.to_string(),
            });
        }
        Ok(Selector::Path(segments))
    }

    /// Apply the selector to a raw response. Missing leaves on an otherwise
    /// valid path project to JSON null, matching optional response fields.
    pub fn project(&self, response: &Value, ctx: &InvocationContext) -> Value {
        match self {
            Selector::Identity => response.clone(),
            Selector::InputParameter(name) => {
                ctx.bound_value(name).cloned().unwrap_or(Value::Null)
            }
            Selector::Path(segments) => {
                let mut current = response;
                for segment in segments {
                    match current.get(segment.as_str()) {
                        Some(next) => current = next,
                        None => return Value::Null,
                    }
                }
                current.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::{RawArgs, bind};
    use crate::registry;
    use serde_json::json;

    fn ctx_for(operation: &str, entries: &[(&str, Value)]) -> InvocationContext {
        let descriptor = registry::find(operation).unwrap();
        let raw: RawArgs = entries
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        bind(descriptor, &raw).unwrap()
    }

    #[test]
    fn star_projects_whole_response() {
        let descriptor = registry::find("DescribeInputDevice").unwrap();
        let selector = Selector::resolve(Some("*"), false, descriptor).unwrap();
        let response = json!({"Id": "hd-1", "Name": "camera"});
        let ctx = ctx_for("DescribeInputDevice", &[]);
        assert_eq!(selector.project(&response, &ctx), response);
    }

    #[test]
    fn field_path_projects_nested_value() {
        let descriptor = registry::find("DescribeInputDevice").unwrap();
        let selector =
            Selector::resolve(Some("NetworkSettings.IpAddress"), false, descriptor).unwrap();
        let response = json!({"NetworkSettings": {"IpAddress": "10.0.0.5"}});
        let ctx = ctx_for("DescribeInputDevice", &[]);
        assert_eq!(selector.project(&response, &ctx), json!("10.0.0.5"));
    }

    #[test]
    fn missing_leaf_projects_null() {
        let descriptor = registry::find("DescribeInputDevice").unwrap();
        let selector = Selector::resolve(Some("Name"), false, descriptor).unwrap();
        let ctx = ctx_for("DescribeInputDevice", &[]);
        assert_eq!(selector.project(&json!({"Id": "hd-1"}), &ctx), Value::Null);
    }

    #[test]
    fn caret_projects_bound_input_regardless_of_response() {
        let descriptor = registry::find("DescribeInputDevice").unwrap();
        let selector = Selector::resolve(Some("^InputDeviceId"), false, descriptor).unwrap();
        let ctx = ctx_for("DescribeInputDevice", &[("InputDeviceId", json!("hd-9"))]);
        assert_eq!(
            selector.project(&json!({"Id": "other"}), &ctx),
            json!("hd-9")
        );
    }

    #[test]
    fn unknown_field_is_rejected() {
        let descriptor = registry::find("DescribeInputDevice").unwrap();
        let err = Selector::resolve(Some("Bogus"), false, descriptor).unwrap_err();
        assert_eq!(
            err,
            SelectorError::UnknownField {
                operation: "DescribeInputDevice",
                field: "Bogus".into(),
            }
        );
    }

    #[test]
    fn unknown_caret_parameter_is_rejected() {
        let descriptor = registry::find("DescribeInputDevice").unwrap();
        let err = Selector::resolve(Some("^ChannelId"), false, descriptor).unwrap_err();
        assert!(matches!(err, SelectorError::UnknownParameter { .. }));
    }

    #[test]
    fn select_and_pass_thru_conflict() {
        let descriptor = registry::find("TransferInputDevice").unwrap();
        let err = Selector::resolve(Some("*"), true, descriptor).unwrap_err();
        assert_eq!(err, SelectorError::Conflict);
    }

    #[test]
    fn pass_thru_translates_to_primary_identifier() {
        let descriptor = registry::find("TransferInputDevice").unwrap();
        let selector = Selector::resolve(None, true, descriptor).unwrap();
        assert_eq!(selector, Selector::InputParameter("InputDeviceId"));
    }

    #[test]
    fn pass_thru_without_identifier_is_rejected() {
        let descriptor = registry::find("BatchDelete").unwrap();
        let err = Selector::resolve(None, true, descriptor).unwrap_err();
        assert_eq!(
            err,
            SelectorError::NoPipelineInput {
                operation: "BatchDelete"
            }
        );
    }

    #[test]
    fn default_selector_used_when_unset() {
        let descriptor = registry::find("DescribeInputDeviceThumbnail").unwrap();
        let selector = Selector::resolve(None, false, descriptor).unwrap();
        assert_eq!(selector, Selector::Path(vec!["Body".to_string()]));
    }
}
