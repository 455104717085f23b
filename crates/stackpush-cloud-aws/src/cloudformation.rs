//! CloudFormation stack provider

use crate::error::{AwsError, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_cloudformation::Client;
use aws_sdk_cloudformation::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_cloudformation::types::{
    Capability as CfnCapability, Parameter as CfnParameter, Tag as CfnTag,
};
use stackpush_cloud::{
    Capability, CreateOutcome, Parameter, StackProvider, StackRequest, StackResource,
    StackStatusReport, Tag, UpdateOutcome,
};

/// Message CloudFormation returns when an update would change nothing
const NO_UPDATES_MESSAGE: &str = "No updates are to be performed";

/// CloudFormation-backed stack provider
pub struct CloudFormationProvider {
    client: Client,
}

impl CloudFormationProvider {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

fn to_cfn_parameters(parameters: &[Parameter]) -> Vec<CfnParameter> {
    parameters
        .iter()
        .map(|p| {
            CfnParameter::builder()
                .parameter_key(&p.key)
                .parameter_value(&p.value)
                .build()
        })
        .collect()
}

fn to_cfn_tags(tags: &[Tag]) -> Result<Vec<CfnTag>> {
    tags.iter()
        .map(|t| {
            Ok(CfnTag::builder().key(&t.key).value(&t.value).build())
        })
        .collect()
}

fn to_cfn_capabilities(capabilities: &[Capability]) -> Vec<CfnCapability> {
    capabilities
        .iter()
        .map(|c| match c {
            Capability::CapabilityIam => CfnCapability::CapabilityIam,
            Capability::CapabilityNamedIam => CfnCapability::CapabilityNamedIam,
        })
        .collect()
}

/// Whether an update error is CloudFormation's "nothing to change" answer
///
/// CloudFormation reports this as a plain validation error, so the message
/// text is the only signal.
fn is_no_updates_message(message: Option<&str>) -> bool {
    message.is_some_and(|m| m.contains(NO_UPDATES_MESSAGE))
}

#[async_trait]
impl StackProvider for CloudFormationProvider {
    fn name(&self) -> &str {
        "aws"
    }

    async fn create_stack(&self, request: &StackRequest) -> stackpush_cloud::Result<CreateOutcome> {
        tracing::debug!("Requesting stack creation: {}", request.stack_name);

        let result = self
            .client
            .create_stack()
            .stack_name(&request.stack_name)
            .template_body(&request.template_body)
            .set_parameters(Some(to_cfn_parameters(&request.parameters)))
            .set_tags(Some(to_cfn_tags(&request.tags)?))
            .set_capabilities(Some(to_cfn_capabilities(&request.capabilities)))
            .send()
            .await;

        match result {
            Ok(output) => {
                tracing::debug!(
                    stack_id = output.stack_id().unwrap_or_default(),
                    "Stack creation accepted"
                );
                Ok(CreateOutcome::Created)
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_already_exists_exception() {
                    tracing::debug!("Stack already exists: {}", request.stack_name);
                    return Ok(CreateOutcome::AlreadyExists);
                }
                Err(AwsError::CloudFormation(DisplayErrorContext(&service_err).to_string()).into())
            }
        }
    }

    async fn update_stack(&self, request: &StackRequest) -> stackpush_cloud::Result<UpdateOutcome> {
        tracing::debug!("Requesting stack update: {}", request.stack_name);

        let result = self
            .client
            .update_stack()
            .stack_name(&request.stack_name)
            .template_body(&request.template_body)
            .set_parameters(Some(to_cfn_parameters(&request.parameters)))
            .set_tags(Some(to_cfn_tags(&request.tags)?))
            .set_capabilities(Some(to_cfn_capabilities(&request.capabilities)))
            .send()
            .await;

        match result {
            Ok(output) => {
                tracing::debug!(
                    stack_id = output.stack_id().unwrap_or_default(),
                    "Stack update accepted"
                );
                Ok(UpdateOutcome::Updated)
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if is_no_updates_message(service_err.message()) {
                    tracing::debug!("Stack has no updates: {}", request.stack_name);
                    return Ok(UpdateOutcome::NoUpdatesNeeded);
                }
                Err(AwsError::CloudFormation(DisplayErrorContext(&service_err).to_string()).into())
            }
        }
    }

    async fn describe_stack_status(
        &self,
        stack_name: &str,
    ) -> stackpush_cloud::Result<Vec<StackStatusReport>> {
        let output = self
            .client
            .describe_stacks()
            .stack_name(stack_name)
            .send()
            .await
            .map_err(|e| AwsError::CloudFormation(DisplayErrorContext(&e).to_string()))?;

        let reports = output
            .stacks()
            .iter()
            .map(|stack| {
                // Required members come back as plain references on newer SDK
                // releases and as Option on older ones.
                let name: Option<&str> = stack.stack_name().into();
                let status: Option<&aws_sdk_cloudformation::types::StackStatus> =
                    stack.stack_status().into();
                let report = StackStatusReport::new(
                    name.unwrap_or(stack_name),
                    status.map(|s| s.as_str()).unwrap_or("UNKNOWN"),
                );
                match stack.stack_status_reason() {
                    Some(reason) => report.with_reason(reason),
                    None => report,
                }
            })
            .collect();

        Ok(reports)
    }

    async fn describe_stack_resources(
        &self,
        stack_name: &str,
    ) -> stackpush_cloud::Result<Vec<StackResource>> {
        let output = self
            .client
            .describe_stack_resources()
            .stack_name(stack_name)
            .send()
            .await
            .map_err(|e| AwsError::CloudFormation(DisplayErrorContext(&e).to_string()))?;

        let resources = output
            .stack_resources()
            .iter()
            .map(|r| {
                let logical_id: Option<&str> = r.logical_resource_id().into();
                let resource_type: Option<&str> = r.resource_type().into();
                StackResource::new(
                    logical_id.unwrap_or_default(),
                    r.physical_resource_id().map(str::to_string),
                    resource_type.unwrap_or_default(),
                )
            })
            .collect();

        Ok(resources)
    }
}
