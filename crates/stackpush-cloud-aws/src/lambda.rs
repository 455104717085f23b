//! Lambda-backed variable broker

use crate::error::{AwsError, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_lambda::Client;
use aws_sdk_lambda::error::DisplayErrorContext;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::InvocationType;
use stackpush_cloud::VariableBroker;

/// Variable broker that invokes a Lambda function in request/response mode
pub struct LambdaBroker {
    client: Client,
    function_name: String,
}

impl LambdaBroker {
    pub fn new(sdk_config: &SdkConfig, function_name: impl Into<String>) -> Self {
        Self {
            client: Client::new(sdk_config),
            function_name: function_name.into(),
        }
    }

    async fn invoke_raw(&self, payload: &str) -> Result<String> {
        // Lambda expects a JSON document, so the bare string is quoted
        let body = encode_payload(payload)?;

        let output = self
            .client
            .invoke()
            .function_name(&self.function_name)
            .invocation_type(InvocationType::RequestResponse)
            .payload(Blob::new(body.into_bytes()))
            .send()
            .await
            .map_err(|e| AwsError::Lambda(DisplayErrorContext(&e).to_string()))?;

        if let Some(kind) = output.function_error() {
            return Err(AwsError::FunctionError {
                function: self.function_name.clone(),
                kind: kind.to_string(),
            });
        }

        let bytes = output
            .payload()
            .map(|blob| blob.as_ref().to_vec())
            .unwrap_or_default();
        Ok(String::from_utf8(bytes)?)
    }
}

fn encode_payload(payload: &str) -> Result<String> {
    Ok(serde_json::to_string(payload)?)
}

#[async_trait]
impl VariableBroker for LambdaBroker {
    fn target(&self) -> &str {
        &self.function_name
    }

    async fn invoke(&self, payload: &str) -> stackpush_cloud::Result<String> {
        tracing::debug!("Invoking {} with payload {}", self.function_name, payload);
        Ok(self.invoke_raw(payload).await?)
    }
}
