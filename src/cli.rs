//! Command surface. Subcommands are generated from the operation registry;
//! there is no per-operation argument code.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, anyhow};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::Value;
use tokio::runtime::Runtime;

use crate::binder::RawArgs;
use crate::client::{EndpointConfig, HttpClient};
use crate::confirm::StdinPrompt;
use crate::descriptor::{ParamKind, ParameterSpec, to_kebab};
use crate::history::InvocationHistory;
use crate::pipeline::{InvocationControls, InvocationOutcome, Pipeline};
use crate::registry;
use crate::selector::Selector;
use crate::settings;

/// clap v4 wants 'static identifiers; registry-derived names are interned
/// once at startup.
fn leak(name: String) -> &'static str {
    Box::leak(name.into_boxed_str())
}

pub fn build_cli() -> Command {
    let mut root = Command::new("medialivectl")
        .about("AWS Elemental MediaLive operations")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Verbosity (-v, -vv)"),
        )
        .arg(
            Arg::new("profile")
                .long("profile")
                .value_name("NAME")
                .global(true)
                .help("Settings profile to use"),
        )
        .arg(
            Arg::new("region")
                .long("region")
                .value_name("REGION")
                .global(true)
                .help("Service region"),
        )
        .arg(
            Arg::new("endpoint-url")
                .long("endpoint-url")
                .value_name("URL")
                .global(true)
                .help("Override the service endpoint"),
        );

    for descriptor in registry::OPERATIONS {
        let mut command = Command::new(leak(descriptor.command_name())).about(descriptor.about);
        for spec in descriptor.parameters {
            let name = leak(spec.cli_name());
            let mut arg = Arg::new(name)
                .long(name)
                .value_name("VALUE")
                .help(spec.help);
            if matches!(spec.kind, ParamKind::StringList | ParamKind::Map) {
                arg = arg.action(ArgAction::Append);
            }
            for alias in spec.aliases {
                arg = arg.alias(leak(to_kebab(alias)));
            }
            command = command.arg(arg);
        }
        command = command
            .arg(
                Arg::new("select")
                    .long("select")
                    .value_name("EXPR")
                    .help("Response selector: *, Field[.Sub], or ^Parameter"),
            )
            .arg(
                Arg::new("force")
                    .long("force")
                    .action(ArgAction::SetTrue)
                    .help("Skip the confirmation prompt for mutating operations"),
            )
            .arg(
                Arg::new("pass-thru")
                    .long("pass-thru")
                    .action(ArgAction::SetTrue)
                    .help("Emit the primary identifier instead of the response (legacy; prefer --select ^Parameter)"),
            )
            .arg(
                Arg::new("outfile")
                    .long("outfile")
                    .value_name("PATH")
                    .help("Write the projected output to a file; base64 strings are decoded"),
            );
        root = root.subcommand(command);
    }

    root
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("MEDIALIVECTL_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_scalar(spec: &ParameterSpec, raw: &str) -> anyhow::Result<Value> {
    if raw == "null" && spec.allows_null {
        return Ok(Value::Null);
    }
    match spec.kind {
        ParamKind::Integer => raw
            .parse::<i64>()
            .map(Value::from)
            .with_context(|| format!("{} expects an integer, got {raw:?}", spec.name)),
        ParamKind::Boolean => match raw {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            other => Err(anyhow!("{} expects true or false, got {other:?}", spec.name)),
        },
        ParamKind::Document => serde_json::from_str(raw)
            .with_context(|| format!("{} expects inline JSON", spec.name)),
        _ => Ok(Value::String(raw.to_string())),
    }
}

/// Pull the parameters the caller actually supplied out of the matches.
/// Unsupplied parameters stay absent so the binder can tell unset apart
/// from explicit null.
fn collect_raw_args(
    descriptor: &'static crate::descriptor::OperationDescriptor,
    matches: &ArgMatches,
) -> anyhow::Result<RawArgs> {
    let mut raw = RawArgs::new();
    for spec in descriptor.parameters {
        let id = spec.cli_name();
        match spec.kind {
            ParamKind::StringList => {
                if let Some(values) = matches.get_many::<String>(&id) {
                    raw.insert(
                        spec.name.to_string(),
                        Value::Array(values.map(|v| Value::String(v.clone())).collect()),
                    );
                }
            }
            ParamKind::Map => {
                if let Some(values) = matches.get_many::<String>(&id) {
                    let mut map = serde_json::Map::new();
                    for entry in values {
                        let (key, value) = entry.split_once('=').ok_or_else(|| {
                            anyhow!("{} entries must be key=value, got {entry:?}", spec.name)
                        })?;
                        map.insert(key.to_string(), Value::String(value.to_string()));
                    }
                    raw.insert(spec.name.to_string(), Value::Object(map));
                }
            }
            _ => {
                if let Some(value) = matches.get_one::<String>(&id) {
                    raw.insert(spec.name.to_string(), parse_scalar(spec, value)?);
                }
            }
        }
    }
    Ok(raw)
}

/// Whether `--outfile` should base64-decode the projected output: only
/// when the effective selector projects the operation's declared binary
/// field (thumbnail bodies). Unrelated string projections are written
/// verbatim.
fn wants_binary_decode(
    descriptor: &'static crate::descriptor::OperationDescriptor,
    controls: &InvocationControls,
) -> bool {
    let Some(field) = descriptor.binary_field else {
        return false;
    };
    matches!(
        Selector::resolve(controls.select.as_deref(), controls.pass_thru, descriptor),
        Ok(Selector::Path(segments)) if segments.len() == 1 && segments[0] == field
    )
}

fn emit(output: &Value, outfile: Option<&Path>, decode_base64: bool) -> anyhow::Result<()> {
    match outfile {
        Some(path) => {
            let bytes = match output {
                Value::String(text) if decode_base64 => {
                    BASE64
                        .decode(text.as_bytes())
                        .with_context(|| "projected output is not valid base64")?
                }
                Value::String(text) => text.clone().into_bytes(),
                other => serde_json::to_vec_pretty(other)?,
            };
            std::fs::write(path, bytes)
                .with_context(|| format!("failed to write {}", path.display()))
        }
        None => {
            println!("{}", serde_json::to_string_pretty(output)?);
            Ok(())
        }
    }
}

/// Parse, run one invocation, and map the outcome to an exit code.
pub fn run() -> anyhow::Result<i32> {
    let matches = build_cli().get_matches();
    init_tracing(matches.get_count("verbose"));

    let Some((command, sub)) = matches.subcommand() else {
        return Err(anyhow!("a subcommand is required"));
    };
    let descriptor = registry::find_command(command)
        .ok_or_else(|| anyhow!("unknown operation: {command}"))?;

    let raw = collect_raw_args(descriptor, sub)?;
    let controls = InvocationControls {
        select: sub.get_one::<String>("select").cloned(),
        force: sub.get_flag("force"),
        pass_thru: sub.get_flag("pass-thru"),
    };
    let outfile = sub.get_one::<String>("outfile").map(PathBuf::from);

    let loaded = settings::load_settings()?;
    let profile_name = sub.get_one::<String>("profile").map(String::as_str);
    let profile = loaded.profile(profile_name);
    if profile_name.is_some() && profile.is_none() {
        tracing::warn!(profile = profile_name, "profile not found in settings");
    }
    let endpoint = EndpointConfig::resolve(
        sub.get_one::<String>("endpoint-url").map(String::as_str),
        sub.get_one::<String>("region").map(String::as_str),
        profile,
    );

    let client = Arc::new(HttpClient::new(endpoint.clone()));
    let pipeline = Pipeline::new(client, Arc::new(StdinPrompt), endpoint)
        .with_observer(Arc::new(InvocationHistory::new()));

    let runtime = Runtime::new().context("failed to start async runtime")?;
    let outcome = runtime.block_on(pipeline.invoke(descriptor, &raw, &controls, async {
        let _ = tokio::signal::ctrl_c().await;
    }))?;

    match outcome {
        InvocationOutcome::Success { output, .. } => {
            emit(
                &output,
                outfile.as_deref(),
                wants_binary_decode(descriptor, &controls),
            )?;
            Ok(0)
        }
        InvocationOutcome::Declined => {
            eprintln!("{}: confirmation declined; nothing done", descriptor.name);
            Ok(0)
        }
        InvocationOutcome::Cancelled => {
            eprintln!("{}: cancelled", descriptor.name);
            Ok(130)
        }
    }
}
