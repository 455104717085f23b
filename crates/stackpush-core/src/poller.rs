//! Waiting for a stack to reach a terminal status

use crate::cancel::CancelToken;
use crate::error::{DeployError, INTERRUPTED_WHILE_POLLING};
use stackpush_cloud::{StackProvider, StackStatus, StackStatusReport};
use stackpush_config::PushSettings;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    /// Maximum number of status checks; `None` polls until terminal
    pub max_polls: Option<u32>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_polls: None,
        }
    }
}

impl PollConfig {
    pub fn from_settings(settings: &PushSettings) -> Self {
        Self {
            interval: settings.poll_interval(),
            max_polls: settings.max_polls,
        }
    }
}

/// What the poller saw before returning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSummary {
    pub polls: u32,
    pub statuses: Vec<StackStatusReport>,
}

pub struct CompletionPoller<'a> {
    provider: &'a dyn StackProvider,
    config: PollConfig,
}

impl<'a> CompletionPoller<'a> {
    pub fn new(provider: &'a dyn StackProvider, config: PollConfig) -> Self {
        Self { provider, config }
    }

    /// Poll until every instance of the stack is terminal
    ///
    /// Sleeps one interval before the first check. Returns on the first
    /// failed status, once no instance is in progress, or when `cancel`
    /// fires during a wait.
    #[instrument(skip(self, cancel), fields(interval = ?self.config.interval))]
    pub async fn await_completion(
        &self,
        stack_name: &str,
        cancel: &CancelToken,
    ) -> Result<PollSummary, DeployError> {
        info!("Waiting for stack {} to complete", stack_name);
        let mut polls = 0u32;

        loop {
            if let Some(max_polls) = self.config.max_polls
                && polls >= max_polls
            {
                warn!(polls, "Giving up on stack {}", stack_name);
                return Err(DeployError::PollLimitExceeded {
                    stack_name: stack_name.to_string(),
                    polls,
                });
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    warn!("{}", INTERRUPTED_WHILE_POLLING);
                    return Err(DeployError::Interrupted);
                }
                _ = tokio::time::sleep(self.config.interval) => {}
            }

            polls += 1;
            let statuses = self
                .provider
                .describe_stack_status(stack_name)
                .await
                .map_err(|source| DeployError::Provider {
                    stack_name: stack_name.to_string(),
                    source,
                })?;

            for report in &statuses {
                info!("{}", report.describe());
            }

            if statuses.is_empty() {
                warn!("No stack instances reported for {}, assuming complete", stack_name);
                return Ok(PollSummary { polls, statuses });
            }

            if let Some(failed) = statuses
                .iter()
                .find(|report| report.classify() == StackStatus::Failed)
            {
                return Err(DeployError::StackFailed {
                    stack_name: stack_name.to_string(),
                    status: failed.status.clone(),
                });
            }

            if let Some(pending) = statuses
                .iter()
                .find(|report| !report.classify().is_terminal())
            {
                debug!(polls, status = %pending.classify(), "Stack not settled yet");
                continue;
            }

            info!("done");
            return Ok(PollSummary { polls, statuses });
        }
    }
}
