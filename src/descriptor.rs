use std::fmt;

/// How strongly the operator should be warned before a mutating call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfirmationImpact {
    Low,
    Medium,
    High,
}

impl fmt::Display for ConfirmationImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfirmationImpact::Low => "low",
            ConfirmationImpact::Medium => "medium",
            ConfirmationImpact::High => "high",
        };
        f.write_str(label)
    }
}

/// Shape of a single parameter value as it crosses the CLI boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Boolean,
    /// Repeated string values, order preserved.
    StringList,
    /// Repeated `key=value` entries assembled into a JSON object.
    Map,
    /// Inline JSON, parsed verbatim (lists of structures, nested settings).
    Document,
}

/// Static description of one operation parameter.
#[derive(Clone, Copy, Debug)]
pub struct ParameterSpec {
    /// Canonical API name, e.g. `InputDeviceId`. Grouped members carry the
    /// group prefix: `AccountConfiguration_KmsKeyId`.
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub kind: ParamKind,
    pub required: bool,
    /// Whether an explicit null is meaningful ("clear this value" on the wire).
    pub allows_null: bool,
    /// Primary identifying parameter; feeds the confirmation description
    /// and the `--pass-thru` selector.
    pub pipeline_input: bool,
    /// Nested-structure group this member belongs to, if any.
    pub group: Option<&'static str>,
    /// CLI flag override for names that would collide with a cross-cutting
    /// control (`--force`, `--select`, ...).
    pub cli_override: Option<&'static str>,
    pub help: &'static str,
}

impl ParameterSpec {
    pub const fn new(name: &'static str, kind: ParamKind, help: &'static str) -> Self {
        Self {
            name,
            aliases: &[],
            kind,
            required: false,
            allows_null: false,
            pipeline_input: false,
            group: None,
            cli_override: None,
            help,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn nullable(mut self) -> Self {
        self.allows_null = true;
        self
    }

    pub const fn pipeline_input(mut self) -> Self {
        self.pipeline_input = true;
        self
    }

    pub const fn aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    pub const fn grouped(mut self, group: &'static str) -> Self {
        self.group = Some(group);
        self
    }

    pub const fn cli(mut self, name: &'static str) -> Self {
        self.cli_override = Some(name);
        self
    }

    /// Wire member name inside the parameter's group, e.g. `KmsKeyId` for
    /// `AccountConfiguration_KmsKeyId`.
    pub fn member_name(&self) -> &'static str {
        match self.group {
            Some(group) => self
                .name
                .strip_prefix(group)
                .and_then(|rest| rest.strip_prefix('_'))
                .unwrap_or(self.name),
            None => self.name,
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.aliases.contains(&name)
    }

    pub fn cli_name(&self) -> String {
        match self.cli_override {
            Some(name) => name.to_string(),
            None => to_kebab(self.name),
        }
    }
}

/// HTTP binding of an operation: method plus a path template whose
/// `{Placeholder}` segments name parameters of the operation.
#[derive(Clone, Copy, Debug)]
pub struct HttpRoute {
    pub method: &'static str,
    pub path: &'static str,
}

impl HttpRoute {
    pub const fn new(method: &'static str, path: &'static str) -> Self {
        Self { method, path }
    }

    /// Parameter names referenced by the path template.
    pub fn placeholders(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        let mut rest = self.path;
        while let Some(start) = rest.find('{') {
            let Some(end) = rest[start..].find('}') else {
                break;
            };
            names.push(&rest[start + 1..start + end]);
            rest = &rest[start + end + 1..];
        }
        names
    }
}

/// Static metadata for one remote API operation. Built once at startup,
/// never mutated per call.
#[derive(Clone, Copy, Debug)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub about: &'static str,
    pub parameters: &'static [ParameterSpec],
    pub mutating: bool,
    pub impact: ConfirmationImpact,
    /// Applied when no `--select` is given: `"*"`, a response field, or
    /// `"^Param"`.
    pub default_selector: &'static str,
    /// Top-level response fields valid as selector roots.
    pub response_fields: &'static [&'static str],
    /// Response field carrying base64-encoded binary data (thumbnail
    /// bodies); `--outfile` decodes only this field.
    pub binary_field: Option<&'static str>,
    pub route: HttpRoute,
}

impl OperationDescriptor {
    /// Subcommand name at the CLI surface: `DescribeInputDevice` becomes
    /// `describe-input-device`.
    pub fn command_name(&self) -> String {
        to_kebab(self.name)
    }

    pub fn find_parameter(&self, name: &str) -> Option<&'static ParameterSpec> {
        self.parameters.iter().find(|spec| spec.matches(name))
    }

    /// First parameter flagged as pipeline input, if any.
    pub fn primary_identifier(&self) -> Option<&'static ParameterSpec> {
        self.parameters.iter().find(|spec| spec.pipeline_input)
    }
}

/// `DescribeInputDevice` -> `describe-input-device`,
/// `AccountConfiguration_KmsKeyId` -> `account-configuration-kms-key-id`.
pub fn to_kebab(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_boundary = true;
    for ch in name.chars() {
        if ch == '_' {
            out.push('-');
            prev_boundary = true;
            continue;
        }
        if ch.is_ascii_uppercase() {
            if !prev_boundary {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
            prev_boundary = true;
        } else {
            out.push(ch);
            prev_boundary = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kebab_handles_pascal_and_group_names() {
        assert_eq!(to_kebab("DescribeInputDevice"), "describe-input-device");
        assert_eq!(
            to_kebab("AccountConfiguration_KmsKeyId"),
            "account-configuration-kms-key-id"
        );
        assert_eq!(to_kebab("IpPools"), "ip-pools");
    }

    #[test]
    fn member_name_strips_group_prefix() {
        let spec = ParameterSpec::new(
            "AccountConfiguration_KmsKeyId",
            ParamKind::String,
            "KMS key",
        )
        .grouped("AccountConfiguration");
        assert_eq!(spec.member_name(), "KmsKeyId");
    }

    #[test]
    fn route_placeholders_in_order() {
        let route = HttpRoute::new("POST", "/prod/channels/{ChannelId}/start");
        assert_eq!(route.placeholders(), vec!["ChannelId"]);
        let none = HttpRoute::new("GET", "/prod/inputs");
        assert!(none.placeholders().is_empty());
    }
}
