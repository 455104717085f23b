//! AWS provider error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("CloudFormation request failed: {0}")]
    CloudFormation(String),

    #[error("Lambda invocation failed: {0}")]
    Lambda(String),

    #[error("Lambda function {function} returned an error: {kind}")]
    FunctionError { function: String, kind: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Response payload is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<AwsError> for stackpush_cloud::CloudError {
    fn from(err: AwsError) -> Self {
        match err {
            AwsError::InvalidRequest(message) => stackpush_cloud::CloudError::InvalidRequest(message),
            AwsError::Json(e) => stackpush_cloud::CloudError::Json(e),
            other => stackpush_cloud::CloudError::Api(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AwsError>;
