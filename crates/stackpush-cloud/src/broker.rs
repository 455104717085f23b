//! Variable broker trait definition

use crate::error::Result;
use async_trait::async_trait;

/// Remote source of environment-specific configuration
///
/// A broker is invoked once per deployment with a single string payload
/// (the lowercased region code) and answers with a raw response body. The
/// caller decides how to interpret that body.
#[async_trait]
pub trait VariableBroker: Send + Sync {
    /// Identifier of the remote function, used in log output
    fn target(&self) -> &str;

    /// Invoke the broker synchronously and return the raw response body
    async fn invoke(&self, payload: &str) -> Result<String>;
}
