//! Orchestrator error types

use stackpush_cloud::CloudError;
use stackpush_config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

pub const INTERRUPTED_WHILE_POLLING: &str = "Interrupted while polling";

/// Failures while deploying or waiting on a stack
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Provider request failed for stack {stack_name}: {source}")]
    Provider {
        stack_name: String,
        #[source]
        source: CloudError,
    },

    #[error("Stack push failed - {status}")]
    StackFailed { stack_name: String, status: String },

    #[error("{}", INTERRUPTED_WHILE_POLLING)]
    Interrupted,

    #[error("Stack {stack_name} did not reach a terminal state after {polls} status checks")]
    PollLimitExceeded { stack_name: String, polls: u32 },
}

/// Any failure that aborts a deployment
#[derive(Error, Debug)]
pub enum PushError {
    #[error("Stack template not found in {root}. Valid file names: {candidates}")]
    TemplateNotFound { root: PathBuf, candidates: String },

    #[error("Multiple stack templates found in {root}: {found}. Keep exactly one")]
    AmbiguousTemplate { root: PathBuf, found: String },

    #[error("Failed to read template {path}: {message}")]
    TemplateRead { path: PathBuf, message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Variable broker {target} failed: {source}")]
    Broker {
        target: String,
        #[source]
        source: CloudError,
    },

    #[error("Unable to parse variables from broker {target}: {source}")]
    MalformedBrokerResponse {
        target: String,
        response: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Deploy(#[from] DeployError),
}

pub type Result<T> = std::result::Result<T, PushError>;
