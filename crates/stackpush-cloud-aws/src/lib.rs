//! AWS provider for stackpush
//!
//! Implements [`StackProvider`](stackpush_cloud::StackProvider) on top of
//! CloudFormation and [`VariableBroker`](stackpush_cloud::VariableBroker) on
//! top of a Lambda function invoked in request/response mode.
//!
//! # Requirements
//!
//! - Credentials are resolved by the default AWS provider chain
//!   (environment, profile, instance role)
//!
//! # Example
//!
//! ```ignore
//! use stackpush_cloud_aws::{CloudFormationProvider, LambdaBroker, load_sdk_config};
//!
//! let sdk_config = load_sdk_config("us-east-1").await;
//! let provider = CloudFormationProvider::new(&sdk_config);
//! let broker = LambdaBroker::new(&sdk_config, "cft-variable-broker");
//! ```

pub mod cloudformation;
pub mod error;
pub mod lambda;

pub use cloudformation::CloudFormationProvider;
pub use error::{AwsError, Result};
pub use lambda::LambdaBroker;

use aws_config::{BehaviorVersion, Region, SdkConfig};

/// Load shared SDK configuration pinned to `region`
pub async fn load_sdk_config(region: impl Into<String>) -> SdkConfig {
    let region = region.into();
    tracing::debug!("Loading AWS configuration for region {}", region);
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region))
        .load()
        .await
}
