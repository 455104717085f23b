//! Create-or-update decision

use crate::error::DeployError;
use serde::{Deserialize, Serialize};
use stackpush_cloud::{CreateOutcome, StackProvider, StackRequest, UpdateOutcome};
use tracing::{debug, error, info, instrument};

/// What a deploy request did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployOutcome {
    Created,
    Updated,
    /// The stack already matches the template and parameters
    NoChanges,
}

impl std::fmt::Display for DeployOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeployOutcome::Created => write!(f, "created"),
            DeployOutcome::Updated => write!(f, "updated"),
            DeployOutcome::NoChanges => write!(f, "no changes"),
        }
    }
}

pub struct StackDeployer<'a> {
    provider: &'a dyn StackProvider,
}

impl<'a> StackDeployer<'a> {
    pub fn new(provider: &'a dyn StackProvider) -> Self {
        Self { provider }
    }

    /// Create the stack, falling back to an update when it already exists
    ///
    /// An update the provider rejects as "nothing to change" is reported as
    /// [`DeployOutcome::NoChanges`]. Any other provider error is fatal.
    #[instrument(skip_all, fields(stack = %request.stack_name))]
    pub async fn deploy(&self, request: &StackRequest) -> Result<DeployOutcome, DeployError> {
        let created = self
            .provider
            .create_stack(request)
            .await
            .map_err(|source| self.fail(request, source))?;

        match created {
            CreateOutcome::Created => {
                info!("Creating stack {}", request.stack_name);
                Ok(DeployOutcome::Created)
            }
            CreateOutcome::AlreadyExists => {
                debug!("Stack already exists: {}", request.stack_name);
                self.update(request).await
            }
        }
    }

    async fn update(&self, request: &StackRequest) -> Result<DeployOutcome, DeployError> {
        let updated = self
            .provider
            .update_stack(request)
            .await
            .map_err(|source| self.fail(request, source))?;

        match updated {
            UpdateOutcome::Updated => {
                info!("Updating stack {}", request.stack_name);
                Ok(DeployOutcome::Updated)
            }
            UpdateOutcome::NoUpdatesNeeded => {
                info!("No stack updates to apply, skipping push...");
                Ok(DeployOutcome::NoChanges)
            }
        }
    }

    fn fail(&self, request: &StackRequest, source: stackpush_cloud::CloudError) -> DeployError {
        error!("{}", source);
        DeployError::Provider {
            stack_name: request.stack_name.clone(),
            source,
        }
    }
}
