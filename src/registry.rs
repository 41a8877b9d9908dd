//! The declarative operation table. Every subcommand the CLI exposes is one
//! row here; the pipeline, request constructor, and CLI builder all read
//! from these descriptors and carry no per-operation code.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::descriptor::{
    ConfirmationImpact, HttpRoute, OperationDescriptor, ParamKind, ParameterSpec,
};

use crate::descriptor::ConfirmationImpact::{High, Low, Medium};
use crate::descriptor::ParamKind::{Document, Integer, Map, String as Str, StringList};

const fn p(name: &'static str, kind: ParamKind, help: &'static str) -> ParameterSpec {
    ParameterSpec::new(name, kind, help)
}

const fn op(
    name: &'static str,
    about: &'static str,
    parameters: &'static [ParameterSpec],
    route: HttpRoute,
) -> OperationDescriptor {
    OperationDescriptor {
        name,
        about,
        parameters,
        mutating: false,
        impact: Low,
        default_selector: "*",
        response_fields: &[],
        binary_field: None,
        route,
    }
}

const fn binary(descriptor: OperationDescriptor, field: &'static str) -> OperationDescriptor {
    let mut descriptor = descriptor;
    descriptor.binary_field = Some(field);
    descriptor
}

const fn mutating(
    descriptor: OperationDescriptor,
    impact: ConfirmationImpact,
) -> OperationDescriptor {
    let mut descriptor = descriptor;
    descriptor.mutating = true;
    descriptor.impact = impact;
    descriptor
}

const fn selects(
    descriptor: OperationDescriptor,
    default_selector: &'static str,
    response_fields: &'static [&'static str],
) -> OperationDescriptor {
    let mut descriptor = descriptor;
    descriptor.default_selector = default_selector;
    descriptor.response_fields = response_fields;
    descriptor
}

const GET: &str = "GET";
const POST: &str = "POST";
const PUT: &str = "PUT";
const DELETE: &str = "DELETE";

pub static OPERATIONS: &[OperationDescriptor] = &[
    selects(
        op(
            "DescribeInputDevice",
            "Show details for an input device",
            &[p("InputDeviceId", Str, "Unique id of the input device")
                .required()
                .pipeline_input()],
            HttpRoute::new(GET, "/prod/inputDevices/{InputDeviceId}"),
        ),
        "*",
        &[
            "Arn",
            "AvailabilityZone",
            "ConnectionState",
            "DeviceSettingsSyncState",
            "DeviceUpdateStatus",
            "HdDeviceSettings",
            "Id",
            "MacAddress",
            "Name",
            "NetworkSettings",
            "SerialNumber",
            "Tags",
            "Type",
            "UhdDeviceSettings",
        ],
    ),
    binary(
        selects(
            op(
                "DescribeInputDeviceThumbnail",
                "Fetch the latest thumbnail for an input device",
                &[
                    p("InputDeviceId", Str, "Unique id of the input device")
                        .required()
                        .pipeline_input(),
                    p("Accept", Str, "Accepted thumbnail media type, e.g. image/jpeg")
                        .required(),
                ],
                HttpRoute::new(GET, "/prod/inputDevices/{InputDeviceId}/thumbnailData"),
            ),
            "Body",
            &["Body", "ContentLength", "ContentType", "ETag", "LastModified"],
        ),
        "Body",
    ),
    selects(
        op(
            "ListInputDevices",
            "List input devices attached to the account",
            &[
                p("MaxResults", Integer, "Page size"),
                p("NextToken", Str, "Pagination token from a previous call"),
            ],
            HttpRoute::new(GET, "/prod/inputDevices"),
        ),
        "InputDevices",
        &["InputDevices", "NextToken"],
    ),
    selects(
        mutating(
            op(
                "UpdateInputDevice",
                "Update settings of an input device",
                &[
                    p("InputDeviceId", Str, "Unique id of the input device")
                        .required()
                        .pipeline_input(),
                    p("Name", Str, "New device name").nullable(),
                    p("AvailabilityZone", Str, "Target availability zone"),
                    p("HdDeviceSettings", Document, "HD stream settings (JSON)"),
                    p("UhdDeviceSettings", Document, "UHD stream settings (JSON)"),
                ],
                HttpRoute::new(PUT, "/prod/inputDevices/{InputDeviceId}"),
            ),
            Medium,
        ),
        "*",
        &[
            "Arn",
            "AvailabilityZone",
            "ConnectionState",
            "HdDeviceSettings",
            "Id",
            "MacAddress",
            "Name",
            "NetworkSettings",
            "SerialNumber",
            "Type",
            "UhdDeviceSettings",
        ],
    ),
    mutating(
        op(
            "TransferInputDevice",
            "Start transfer of an input device to another customer or region",
            &[
                p("InputDeviceId", Str, "Unique id of the input device")
                    .required()
                    .pipeline_input(),
                p("TargetCustomerId", Str, "AWS account id of the target customer"),
                p("TargetRegion", Str, "Target region for the transfer"),
                p("TransferMessage", Str, "Message shown to the transfer target"),
            ],
            HttpRoute::new(POST, "/prod/inputDevices/{InputDeviceId}/transfer"),
        ),
        Medium,
    ),
    mutating(
        op(
            "RebootInputDevice",
            "Reboot an input device",
            &[
                p("InputDeviceId", Str, "Unique id of the input device")
                    .required()
                    .pipeline_input(),
                p("Force", Str, "NO to defer until idle, YES to reboot immediately")
                    .cli("force-reboot"),
            ],
            HttpRoute::new(POST, "/prod/inputDevices/{InputDeviceId}/reboot"),
        ),
        Medium,
    ),
    selects(
        mutating(
            op(
                "CreateInput",
                "Create an input",
                &[
                    p("Name", Str, "Name of the input").pipeline_input(),
                    p("Type", Str, "Input type, e.g. UDP_PUSH, URL_PULL"),
                    p("RequestId", Str, "Idempotency token"),
                    p("RoleArn", Str, "Role assumed when creating the input"),
                    p("Destinations", Document, "Destination settings (JSON list)"),
                    p("Sources", Document, "Pull source settings (JSON list)"),
                    p("InputSecurityGroups", StringList, "Security group ids to attach"),
                    p("Tags", Map, "Resource tags as key=value").aliases(&["Tag"]),
                ],
                HttpRoute::new(POST, "/prod/inputs"),
            ),
            Low,
        ),
        "Input",
        &["Input"],
    ),
    selects(
        op(
            "DescribeInput",
            "Show details for an input",
            &[p("InputId", Str, "Unique id of the input")
                .required()
                .pipeline_input()],
            HttpRoute::new(GET, "/prod/inputs/{InputId}"),
        ),
        "*",
        &[
            "Arn",
            "AttachedChannels",
            "Destinations",
            "Id",
            "InputClass",
            "InputSourceType",
            "Name",
            "SecurityGroups",
            "Sources",
            "State",
            "Tags",
            "Type",
        ],
    ),
    selects(
        op(
            "ListInputs",
            "List inputs in the account",
            &[
                p("MaxResults", Integer, "Page size"),
                p("NextToken", Str, "Pagination token from a previous call"),
            ],
            HttpRoute::new(GET, "/prod/inputs"),
        ),
        "Inputs",
        &["Inputs", "NextToken"],
    ),
    mutating(
        op(
            "DeleteInput",
            "Delete an input",
            &[p("InputId", Str, "Unique id of the input")
                .required()
                .pipeline_input()],
            HttpRoute::new(DELETE, "/prod/inputs/{InputId}"),
        ),
        High,
    ),
    selects(
        mutating(
            op(
                "CreateInputSecurityGroup",
                "Create an input security group",
                &[
                    p(
                        "WhitelistRules",
                        Document,
                        "Allowed CIDR rules (JSON list)",
                    )
                    .aliases(&["WhitelistRule"]),
                    p("Tags", Map, "Resource tags as key=value").aliases(&["Tag"]),
                ],
                HttpRoute::new(POST, "/prod/inputSecurityGroups"),
            ),
            Low,
        ),
        "SecurityGroup",
        &["SecurityGroup"],
    ),
    mutating(
        op(
            "DeleteInputSecurityGroup",
            "Delete an input security group",
            &[p(
                "InputSecurityGroupId",
                Str,
                "Unique id of the input security group",
            )
            .required()
            .pipeline_input()],
            HttpRoute::new(
                DELETE,
                "/prod/inputSecurityGroups/{InputSecurityGroupId}",
            ),
        ),
        High,
    ),
    selects(
        mutating(
            op(
                "CreateNetwork",
                "Create a network for on-prem resources",
                &[
                    p("Name", Str, "Name of the network").pipeline_input(),
                    p("IpPools", Document, "IP address pools (JSON list)"),
                    p("Routes", Document, "Routes (JSON list)"),
                    p("RequestId", Str, "Idempotency token"),
                    p("Tags", Map, "Resource tags as key=value").aliases(&["Tag"]),
                ],
                HttpRoute::new(POST, "/prod/networks"),
            ),
            Low,
        ),
        "*",
        &[
            "Arn",
            "AssociatedClusterIds",
            "Id",
            "IpPools",
            "Name",
            "Routes",
            "State",
        ],
    ),
    selects(
        op(
            "DescribeNetwork",
            "Show details for a network",
            &[p("NetworkId", Str, "Unique id of the network")
                .required()
                .pipeline_input()],
            HttpRoute::new(GET, "/prod/networks/{NetworkId}"),
        ),
        "*",
        &[
            "Arn",
            "AssociatedClusterIds",
            "Id",
            "IpPools",
            "Name",
            "Routes",
            "State",
        ],
    ),
    selects(
        op(
            "ListNetworks",
            "List networks in the account",
            &[
                p("MaxResults", Integer, "Page size"),
                p("NextToken", Str, "Pagination token from a previous call"),
            ],
            HttpRoute::new(GET, "/prod/networks"),
        ),
        "Networks",
        &["Networks", "NextToken"],
    ),
    mutating(
        op(
            "DeleteNetwork",
            "Delete a network",
            &[p("NetworkId", Str, "Unique id of the network")
                .required()
                .pipeline_input()],
            HttpRoute::new(DELETE, "/prod/networks/{NetworkId}"),
        ),
        High,
    ),
    selects(
        mutating(
            op(
                "CreateSdiSource",
                "Create an SDI source",
                &[
                    p("Name", Str, "Name of the SDI source").pipeline_input(),
                    p("Mode", Str, "SDI mode, e.g. QUADRANT, INTERLEAVE"),
                    p("Type", Str, "SDI type, e.g. SINGLE, QUAD"),
                    p("RequestId", Str, "Idempotency token"),
                    p("Tags", Map, "Resource tags as key=value").aliases(&["Tag"]),
                ],
                HttpRoute::new(POST, "/prod/sdiSources"),
            ),
            Low,
        ),
        "SdiSource",
        &["SdiSource"],
    ),
    selects(
        mutating(
            op(
                "UpdateSdiSource",
                "Update an SDI source",
                &[
                    p("SdiSourceId", Str, "Unique id of the SDI source")
                        .required()
                        .pipeline_input(),
                    p("Mode", Str, "SDI mode, e.g. QUADRANT, INTERLEAVE"),
                    p("Name", Str, "New name").nullable(),
                    p("Type", Str, "SDI type, e.g. SINGLE, QUAD"),
                ],
                HttpRoute::new(PUT, "/prod/sdiSources/{SdiSourceId}"),
            ),
            Medium,
        ),
        "SdiSource",
        &["SdiSource"],
    ),
    selects(
        mutating(
            op(
                "DeleteSdiSource",
                "Delete an SDI source",
                &[p("SdiSourceId", Str, "Unique id of the SDI source")
                    .required()
                    .pipeline_input()],
                HttpRoute::new(DELETE, "/prod/sdiSources/{SdiSourceId}"),
            ),
            High,
        ),
        "SdiSource",
        &["SdiSource"],
    ),
    selects(
        op(
            "DescribeAccountConfiguration",
            "Show the account-level configuration",
            &[],
            HttpRoute::new(GET, "/prod/accountConfiguration"),
        ),
        "AccountConfiguration",
        &["AccountConfiguration"],
    ),
    selects(
        mutating(
            op(
                "UpdateAccountConfiguration",
                "Update the account-level configuration",
                &[p(
                    "AccountConfiguration_KmsKeyId",
                    Str,
                    "KMS key used for stored content",
                )
                .nullable()
                .grouped("AccountConfiguration")],
                HttpRoute::new(PUT, "/prod/accountConfiguration"),
            ),
            Medium,
        ),
        "AccountConfiguration",
        &["AccountConfiguration"],
    ),
    selects(
        mutating(
            op(
                "StartChannel",
                "Start a channel",
                &[p("ChannelId", Str, "Unique id of the channel")
                    .required()
                    .pipeline_input()],
                HttpRoute::new(POST, "/prod/channels/{ChannelId}/start"),
            ),
            Medium,
        ),
        "*",
        &[
            "Arn",
            "ChannelClass",
            "Destinations",
            "Id",
            "Name",
            "PipelineDetails",
            "PipelinesRunningCount",
            "RoleArn",
            "State",
            "Tags",
        ],
    ),
    selects(
        mutating(
            op(
                "StopChannel",
                "Stop a running channel",
                &[p("ChannelId", Str, "Unique id of the channel")
                    .required()
                    .pipeline_input()],
                HttpRoute::new(POST, "/prod/channels/{ChannelId}/stop"),
            ),
            Medium,
        ),
        "*",
        &[
            "Arn",
            "ChannelClass",
            "Destinations",
            "Id",
            "Name",
            "PipelineDetails",
            "PipelinesRunningCount",
            "RoleArn",
            "State",
            "Tags",
        ],
    ),
    selects(
        mutating(
            op(
                "BatchDelete",
                "Delete channels, inputs, security groups, and multiplexes in bulk",
                &[
                    p("ChannelIds", StringList, "Channel ids to delete"),
                    p("InputIds", StringList, "Input ids to delete"),
                    p(
                        "InputSecurityGroupIds",
                        StringList,
                        "Input security group ids to delete",
                    ),
                    p("MultiplexIds", StringList, "Multiplex ids to delete"),
                ],
                HttpRoute::new(POST, "/prod/batch/delete"),
            ),
            High,
        ),
        "*",
        &["Failed", "Successful"],
    ),
];

static BY_COMMAND: Lazy<BTreeMap<String, &'static OperationDescriptor>> = Lazy::new(|| {
    OPERATIONS
        .iter()
        .map(|descriptor| (descriptor.command_name(), descriptor))
        .collect()
});

pub fn find(name: &str) -> Option<&'static OperationDescriptor> {
    OPERATIONS.iter().find(|descriptor| descriptor.name == name)
}

pub fn find_command(command: &str) -> Option<&'static OperationDescriptor> {
    BY_COMMAND.get(command).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::Selector;

    #[test]
    fn operation_names_are_unique() {
        let mut names: Vec<_> = OPERATIONS.iter().map(|op| op.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), OPERATIONS.len());
    }

    #[test]
    fn command_lookup_round_trips() {
        for descriptor in OPERATIONS {
            let found = find_command(&descriptor.command_name())
                .unwrap_or_else(|| panic!("no command for {}", descriptor.name));
            assert_eq!(found.name, descriptor.name);
        }
    }

    #[test]
    fn default_selectors_resolve() {
        for descriptor in OPERATIONS {
            Selector::resolve(None, false, descriptor)
                .unwrap_or_else(|err| panic!("{}: {err}", descriptor.name));
        }
    }

    #[test]
    fn route_placeholders_name_declared_parameters() {
        for descriptor in OPERATIONS {
            for placeholder in descriptor.route.placeholders() {
                assert!(
                    descriptor.find_parameter(placeholder).is_some(),
                    "{}: route placeholder {placeholder} is not a parameter",
                    descriptor.name
                );
            }
        }
    }

    #[test]
    fn binary_fields_are_declared_response_fields() {
        for descriptor in OPERATIONS {
            if let Some(field) = descriptor.binary_field {
                assert!(
                    descriptor.response_fields.contains(&field),
                    "{}: binary field {field} is not a response field",
                    descriptor.name
                );
            }
        }
    }

    #[test]
    fn mutating_operations_never_use_get() {
        for descriptor in OPERATIONS {
            if descriptor.mutating {
                assert_ne!(descriptor.route.method, "GET", "{}", descriptor.name);
            }
        }
    }

    #[test]
    fn named_rows_match_expected_policy() {
        let delete = find("DeleteInputSecurityGroup").unwrap();
        assert!(delete.mutating);
        assert_eq!(delete.impact, crate::descriptor::ConfirmationImpact::High);

        let thumbnail = find("DescribeInputDeviceThumbnail").unwrap();
        assert!(!thumbnail.mutating);
        assert_eq!(thumbnail.default_selector, "Body");
        assert_eq!(thumbnail.binary_field, Some("Body"));

        let describe = find("DescribeInputDevice").unwrap();
        assert_eq!(describe.default_selector, "*");
    }
}
