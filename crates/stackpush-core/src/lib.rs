//! stackpush deployment orchestrator
//!
//! Runs one deployment end to end:
//!
//! 1. [`layer`]: merge prior output, environment properties, pipeline
//!    context and variable broker values into a [`ConfigSet`]
//! 2. [`template`]: locate and read the stack template
//! 3. [`binder`]: derive parameters and tags
//! 4. [`deployer`]: create, update or no-op
//! 5. [`poller`]: wait for a terminal stack status
//! 6. [`collector`]: record physical resource ids for later stages
//!
//! [`StackPush`] wires the steps together.
//!
//! [`ConfigSet`]: stackpush_config::ConfigSet

pub mod binder;
pub mod cancel;
pub mod collector;
pub mod deployer;
pub mod error;
pub mod layer;
pub mod naming;
pub mod poller;
pub mod push;
pub mod template;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use binder::{Binding, TagContext};
pub use cancel::CancelToken;
pub use collector::{OutputCollector, OutputSet, StackOutputs};
pub use deployer::{DeployOutcome, StackDeployer};
pub use error::{DeployError, PushError, Result};
pub use layer::ConfigLayer;
pub use naming::derive_stack_name;
pub use poller::{CompletionPoller, PollConfig, PollSummary};
pub use push::{PushReport, StackPush};
pub use template::{Template, TemplateResolver};
