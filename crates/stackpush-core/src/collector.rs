//! Stack output collection

use crate::error::{DeployError, Result};
use stackpush_cloud::StackProvider;
use stackpush_config::properties;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Physical resource ids keyed by `<provider>.stack.<logicalId>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputSet {
    entries: BTreeMap<String, String>,
}

impl OutputSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overwrite `path` with these outputs
    pub fn persist(&self, path: &Path) -> Result<()> {
        properties::store_properties(path, self.iter())?;
        info!(path = %path.display(), entries = self.len(), "Stack outputs written");
        Ok(())
    }
}

/// Everything collected from a deployed stack
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackOutputs {
    pub outputs: OutputSet,
    /// `family-revision` of each task definition in the stack
    pub task_definitions: Vec<String>,
}

pub struct OutputCollector<'a> {
    provider: &'a dyn StackProvider,
}

impl<'a> OutputCollector<'a> {
    pub fn new(provider: &'a dyn StackProvider) -> Self {
        Self { provider }
    }

    #[instrument(skip(self))]
    pub async fn collect(&self, stack_name: &str) -> Result<StackOutputs> {
        let resources = self
            .provider
            .describe_stack_resources(stack_name)
            .await
            .map_err(|source| DeployError::Provider {
                stack_name: stack_name.to_string(),
                source,
            })?;

        let mut collected = StackOutputs::default();
        for resource in &resources {
            let Some(physical_id) = resource.physical_id.as_deref() else {
                debug!(logical_id = %resource.logical_id, "Skipping resource without physical id");
                continue;
            };
            info!("{} : {}", physical_id, resource.resource_type);

            if let Some(revision) = resource.task_definition_revision() {
                debug!(logical_id = %resource.logical_id, revision = %revision, "Task definition");
                collected.task_definitions.push(revision);
            }
            collected.outputs.insert(
                format!("{}.stack.{}", self.provider.name(), resource.logical_id),
                physical_id,
            );
        }

        Ok(collected)
    }
}
