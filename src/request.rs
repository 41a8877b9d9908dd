//! Maps a bound invocation context onto the outgoing request: body fields,
//! nested groups, and the HTTP route.

use serde_json::{Map as JsonMap, Value};
use thiserror::Error;

use crate::binder::InvocationContext;
use crate::descriptor::OperationDescriptor;

/// A fully constructed request, ready for the client.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstructedRequest {
    pub method: &'static str,
    /// Route with all placeholders substituted.
    pub path: String,
    /// Body object keyed by wire field names. Path parameters are not
    /// repeated here.
    pub body: Value,
}

#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("operation {operation} requires {parameter} to build its request path")]
    MissingPathParameter {
        operation: &'static str,
        parameter: &'static str,
    },
}

/// Build the request for one invocation.
///
/// Bound values are copied; unbound parameters leave their field absent.
/// A nested group whose members are all unbound is omitted entirely, never
/// sent as an empty object.
pub fn build(
    descriptor: &'static OperationDescriptor,
    ctx: &InvocationContext,
) -> Result<ConstructedRequest, RequestError> {
    let placeholders = descriptor.route.placeholders();

    let mut body = JsonMap::new();
    let mut groups: Vec<(&'static str, JsonMap<String, Value>)> = Vec::new();

    for spec in descriptor.parameters {
        let Some(value) = ctx.bound_value(spec.name) else {
            continue;
        };
        if placeholders.contains(&spec.name) {
            continue;
        }
        match spec.group {
            Some(group) => {
                let idx = match groups.iter().position(|(name, _)| *name == group) {
                    Some(idx) => idx,
                    None => {
                        groups.push((group, JsonMap::new()));
                        groups.len() - 1
                    }
                };
                groups[idx]
                    .1
                    .insert(spec.member_name().to_string(), value.clone());
            }
            None => {
                body.insert(spec.name.to_string(), value.clone());
            }
        }
    }

    for (group, members) in groups {
        if !members.is_empty() {
            body.insert(group.to_string(), Value::Object(members));
        }
    }

    let mut path = descriptor.route.path.to_string();
    for placeholder in placeholders {
        let value = ctx
            .bound_value(placeholder)
            .filter(|value| !value.is_null())
            .ok_or(RequestError::MissingPathParameter {
                operation: descriptor.name,
                parameter: placeholder,
            })?;
        let rendered = match value.as_str() {
            Some(text) => text.to_string(),
            None => value.to_string(),
        };
        path = path.replace(&format!("{{{placeholder}}}"), &rendered);
    }

    Ok(ConstructedRequest {
        method: descriptor.route.method,
        path,
        body: Value::Object(body),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::{RawArgs, bind};
    use crate::registry;
    use serde_json::json;

    fn build_for(operation: &str, entries: &[(&str, Value)]) -> ConstructedRequest {
        let descriptor = registry::find(operation).unwrap();
        let raw: RawArgs = entries
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        let ctx = bind(descriptor, &raw).unwrap();
        build(descriptor, &ctx).unwrap()
    }

    #[test]
    fn path_parameter_is_substituted_and_removed_from_body() {
        let request = build_for(
            "DescribeInputDevice",
            &[("InputDeviceId", json!("hd-123456789abcdef"))],
        );
        assert_eq!(request.method, "GET");
        assert_eq!(request.path, "/prod/inputDevices/hd-123456789abcdef");
        assert_eq!(request.body, json!({}));
    }

    #[test]
    fn missing_path_parameter_fails_construction() {
        let descriptor = registry::find("DeleteInput").unwrap();
        let ctx = bind(descriptor, &RawArgs::new()).unwrap();
        let err = build(descriptor, &ctx).unwrap_err();
        assert_eq!(
            err,
            RequestError::MissingPathParameter {
                operation: "DeleteInput",
                parameter: "InputId",
            }
        );
    }

    #[test]
    fn tag_map_is_copied_with_exact_keys() {
        let request = build_for(
            "CreateNetwork",
            &[
                ("Name", json!("edge")),
                ("Tags", json!({"env": "prod", "Env": "staging"})),
            ],
        );
        assert_eq!(
            request.body,
            json!({
                "Name": "edge",
                "Tags": {"env": "prod", "Env": "staging"},
            })
        );
    }

    #[test]
    fn list_order_and_duplicates_preserved() {
        let request = build_for(
            "BatchDelete",
            &[("ChannelIds", json!(["2", "1", "2"]))],
        );
        assert_eq!(request.body, json!({"ChannelIds": ["2", "1", "2"]}));
    }

    #[test]
    fn unbound_group_is_omitted_not_empty() {
        let request = build_for("UpdateAccountConfiguration", &[]);
        assert_eq!(request.body, json!({}));
        assert!(request.body.get("AccountConfiguration").is_none());
    }

    #[test]
    fn bound_group_member_assembles_nested_structure() {
        let request = build_for(
            "UpdateAccountConfiguration",
            &[("AccountConfiguration_KmsKeyId", json!("arn:aws:kms:key/1"))],
        );
        assert_eq!(
            request.body,
            json!({"AccountConfiguration": {"KmsKeyId": "arn:aws:kms:key/1"}})
        );
    }

    #[test]
    fn explicit_null_group_member_still_emits_group() {
        let request = build_for(
            "UpdateAccountConfiguration",
            &[("AccountConfiguration_KmsKeyId", Value::Null)],
        );
        assert_eq!(
            request.body,
            json!({"AccountConfiguration": {"KmsKeyId": null}})
        );
    }

    #[test]
    fn explicit_null_is_sent_where_allowed() {
        let request = build_for(
            "UpdateSdiSource",
            &[("SdiSourceId", json!("sdi-1")), ("Name", Value::Null)],
        );
        assert_eq!(request.path, "/prod/sdiSources/sdi-1");
        assert_eq!(request.body, json!({"Name": null}));
    }
}
