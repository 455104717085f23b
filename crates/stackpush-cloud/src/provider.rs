//! Stack provider trait definition

use crate::error::Result;
use crate::stack::{CreateOutcome, StackRequest, StackResource, StackStatusReport, UpdateOutcome};
use async_trait::async_trait;

/// Provisioning service abstraction trait
///
/// Implementations map the provider's "already exists" and "nothing to
/// update" conditions onto [`CreateOutcome`] and [`UpdateOutcome`]. Every
/// other provider failure is returned as an error.
#[async_trait]
pub trait StackProvider: Send + Sync {
    /// Returns the provider name (e.g., "aws"), used as the output key namespace
    fn name(&self) -> &str;

    /// Request creation of a new stack
    async fn create_stack(&self, request: &StackRequest) -> Result<CreateOutcome>;

    /// Request an update of an existing stack
    async fn update_stack(&self, request: &StackRequest) -> Result<UpdateOutcome>;

    /// Current status of every stack instance matching `stack_name`
    async fn describe_stack_status(&self, stack_name: &str) -> Result<Vec<StackStatusReport>>;

    /// All resources belonging to the stack
    async fn describe_stack_resources(&self, stack_name: &str) -> Result<Vec<StackResource>>;
}
