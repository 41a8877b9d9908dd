//! Generic invocation pipeline for AWS Elemental MediaLive operations.
//!
//! Every operation the CLI exposes is one row in [`registry::OPERATIONS`];
//! the pipeline binds parameters, gates mutating calls behind confirmation,
//! dispatches exactly one client call, and projects the response through a
//! caller-selectable selector.

pub mod binder;
pub mod cli;
pub mod client;
pub mod confirm;
pub mod descriptor;
pub mod dispatch;
pub mod history;
pub mod pipeline;
pub mod registry;
pub mod request;
pub mod selector;
pub mod settings;
