//! Deployment orchestrator

use crate::binder::{self, TagContext};
use crate::cancel::CancelToken;
use crate::collector::{OutputCollector, StackOutputs};
use crate::deployer::{DeployOutcome, StackDeployer};
use crate::error::Result;
use crate::layer::ConfigLayer;
use crate::naming::derive_stack_name;
use crate::poller::{CompletionPoller, PollConfig};
use crate::template::TemplateResolver;
use stackpush_cloud::{StackProvider, StackRequest, VariableBroker};
use stackpush_config::{PipelineContext, PushSettings};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Result of one successful push
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushReport {
    pub stack_name: String,
    pub outcome: DeployOutcome,
    pub outputs: StackOutputs,
    /// Where the outputs were persisted
    pub output_file: PathBuf,
}

/// Runs a complete deployment against one provider
pub struct StackPush {
    provider: Arc<dyn StackProvider>,
    broker: Option<Arc<dyn VariableBroker>>,
    settings: PushSettings,
    region: String,
    work_dir: Option<PathBuf>,
    cancel: CancelToken,
}

impl StackPush {
    pub fn new(
        provider: Arc<dyn StackProvider>,
        region: impl Into<String>,
        settings: PushSettings,
    ) -> Self {
        Self {
            provider,
            broker: None,
            settings,
            region: region.into(),
            work_dir: None,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_broker(mut self, broker: Arc<dyn VariableBroker>) -> Self {
        self.broker = Some(broker);
        self
    }

    /// Directory holding `stackoutput.properties`; defaults to the deployment root
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(work_dir.into());
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn settings(&self) -> &PushSettings {
        &self.settings
    }

    #[instrument(skip_all, fields(
        project = %context.project_name,
        environment = %context.environment_name,
        region = %self.region,
    ))]
    pub async fn push(&self, context: &PipelineContext) -> Result<PushReport> {
        let context = context.clone().resolve_variables();
        let work_dir = self
            .work_dir
            .clone()
            .unwrap_or_else(|| context.root_dir.clone());
        let output_file = work_dir.join(&self.settings.output_file);

        let config = ConfigLayer::new(
            &output_file,
            context.environment_properties_path(),
            &self.region,
        )
        .with_broker(self.broker.as_deref())
        .build(&context)
        .await?;

        let stack_name = derive_stack_name(
            &context.project_name,
            &context.environment_name,
            &self.region,
        );
        info!("Stack name: {}", stack_name);

        let template =
            TemplateResolver::new(&context.root_dir, self.settings.template_selection).resolve()?;

        // The env tag follows the same environment as the stack name
        let binding = binder::bind(
            &config,
            &template,
            &TagContext {
                stack_name: &stack_name,
                deploy_environment: &context.environment_name,
                artifact: &context.artifact,
                settings: &self.settings,
            },
        );
        debug!(
            parameters = binding.parameters.len(),
            tags = binding.tags.len(),
            "Request bound"
        );

        let request = StackRequest::new(
            &stack_name,
            template.body(),
            binding.parameters,
            binding.tags,
        );
        let outcome = StackDeployer::new(self.provider.as_ref())
            .deploy(&request)
            .await?;
        info!("Stack triggered...");

        if outcome == DeployOutcome::NoChanges && !self.settings.poll_after_no_changes {
            debug!("Nothing in progress, skipping status polling");
        } else {
            CompletionPoller::new(
                self.provider.as_ref(),
                PollConfig::from_settings(&self.settings),
            )
            .await_completion(&stack_name, &self.cancel)
            .await?;
        }

        let collected = OutputCollector::new(self.provider.as_ref())
            .collect(&stack_name)
            .await?;
        collected.outputs.persist(&output_file)?;

        Ok(PushReport {
            stack_name,
            outcome,
            outputs: collected,
            output_file,
        })
    }
}
