//! Stack request, outcome and status types

use serde::{Deserialize, Serialize};

/// Template input value passed to the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub key: String,
    pub value: String,
}

impl Parameter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Resource tag applied to the stack and propagated to its resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Acknowledgement required before the provider creates identity resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Capability {
    CapabilityIam,
    CapabilityNamedIam,
}

impl Capability {
    /// Capabilities declared on every create and update request
    pub const REQUIRED: [Capability; 2] = [Capability::CapabilityIam, Capability::CapabilityNamedIam];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::CapabilityIam => "CAPABILITY_IAM",
            Capability::CapabilityNamedIam => "CAPABILITY_NAMED_IAM",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A create-or-update request
///
/// The same request is used for both calls so an update after
/// "already exists" carries identical template, parameters and tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackRequest {
    pub stack_name: String,
    pub template_body: String,
    pub parameters: Vec<Parameter>,
    pub tags: Vec<Tag>,
    pub capabilities: Vec<Capability>,
}

impl StackRequest {
    pub fn new(
        stack_name: impl Into<String>,
        template_body: impl Into<String>,
        parameters: Vec<Parameter>,
        tags: Vec<Tag>,
    ) -> Self {
        Self {
            stack_name: stack_name.into(),
            template_body: template_body.into(),
            parameters,
            tags,
            capabilities: Capability::REQUIRED.to_vec(),
        }
    }
}

/// Result of a create request the caller must branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateOutcome {
    /// Creation was accepted and is in progress
    Created,
    /// A stack with that name already exists
    AlreadyExists,
}

/// Result of an update request the caller must branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOutcome {
    /// Update was accepted and is in progress
    Updated,
    /// Template and parameters match the deployed stack
    NoUpdatesNeeded,
}

/// Raw status of one stack instance as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackStatusReport {
    pub stack_name: String,
    pub status: String,
    pub reason: Option<String>,
}

impl StackStatusReport {
    pub fn new(stack_name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            stack_name: stack_name.into(),
            status: status.into(),
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Classified status
    pub fn classify(&self) -> StackStatus {
        StackStatus::classify(&self.status)
    }

    /// Log line for this report: `STATUS` or `STATUS : reason`
    pub fn describe(&self) -> String {
        match &self.reason {
            Some(reason) => format!("{} : {}", self.status, reason),
            None => self.status.clone(),
        }
    }
}

/// Classified stack status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackStatus {
    InProgress,
    Succeeded,
    Failed,
}

impl StackStatus {
    /// Classify a raw provider status string
    ///
    /// `IN_PROGRESS` is checked first, so `UPDATE_ROLLBACK_IN_PROGRESS` is
    /// still in progress; its terminal `UPDATE_ROLLBACK_COMPLETE` is failed.
    pub fn classify(raw: &str) -> Self {
        if raw.contains("IN_PROGRESS") {
            StackStatus::InProgress
        } else if raw.contains("FAILED") || raw.contains("ROLLBACK") {
            StackStatus::Failed
        } else {
            StackStatus::Succeeded
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, StackStatus::InProgress)
    }
}

impl std::fmt::Display for StackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StackStatus::InProgress => write!(f, "in-progress"),
            StackStatus::Succeeded => write!(f, "succeeded"),
            StackStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A resource belonging to a stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackResource {
    pub logical_id: String,
    pub physical_id: Option<String>,
    pub resource_type: String,
}

impl StackResource {
    pub const TASK_DEFINITION_TYPE: &'static str = "AWS::ECS::TaskDefinition";

    pub fn new(
        logical_id: impl Into<String>,
        physical_id: Option<String>,
        resource_type: impl Into<String>,
    ) -> Self {
        Self {
            logical_id: logical_id.into(),
            physical_id,
            resource_type: resource_type.into(),
        }
    }

    /// `family-revision` for ECS task definitions
    ///
    /// `arn:aws:ecs:us-east-1:123:task-definition/web:7` becomes `web-7`.
    pub fn task_definition_revision(&self) -> Option<String> {
        if self.resource_type != Self::TASK_DEFINITION_TYPE {
            return None;
        }
        let (_, task) = self.physical_id.as_deref()?.split_once('/')?;
        let task = task.split('/').next().unwrap_or(task);
        Some(task.replace(':', "-"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_in_progress_before_rollback() {
        assert_eq!(
            StackStatus::classify("UPDATE_IN_PROGRESS"),
            StackStatus::InProgress
        );
        assert_eq!(
            StackStatus::classify("UPDATE_ROLLBACK_IN_PROGRESS"),
            StackStatus::InProgress
        );
        assert_eq!(
            StackStatus::classify("UPDATE_COMPLETE_CLEANUP_IN_PROGRESS"),
            StackStatus::InProgress
        );
    }

    #[test]
    fn test_classify_failed() {
        assert_eq!(StackStatus::classify("CREATE_FAILED"), StackStatus::Failed);
        assert_eq!(
            StackStatus::classify("UPDATE_ROLLBACK_COMPLETE"),
            StackStatus::Failed
        );
        assert_eq!(StackStatus::classify("ROLLBACK_COMPLETE"), StackStatus::Failed);
    }

    #[test]
    fn test_classify_succeeded() {
        assert_eq!(StackStatus::classify("CREATE_COMPLETE"), StackStatus::Succeeded);
        assert_eq!(StackStatus::classify("UPDATE_COMPLETE"), StackStatus::Succeeded);
        assert!(StackStatus::Succeeded.is_terminal());
        assert!(!StackStatus::InProgress.is_terminal());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(StackStatus::InProgress.to_string(), "in-progress");
        assert_eq!(StackStatus::Failed.to_string(), "failed");
        assert!(StackStatus::Failed.is_terminal());
    }

    #[test]
    fn test_status_report_describe() {
        let plain = StackStatusReport::new("web-dev-us-east-1", "CREATE_COMPLETE");
        assert_eq!(plain.describe(), "CREATE_COMPLETE");

        let with_reason = StackStatusReport::new("web-dev-us-east-1", "CREATE_FAILED")
            .with_reason("Resource creation cancelled");
        assert_eq!(
            with_reason.describe(),
            "CREATE_FAILED : Resource creation cancelled"
        );
    }

    #[test]
    fn test_request_declares_iam_capabilities() {
        let request = StackRequest::new("s", "{}", Vec::new(), Vec::new());
        assert_eq!(
            request.capabilities,
            vec![Capability::CapabilityIam, Capability::CapabilityNamedIam]
        );
        assert_eq!(Capability::CapabilityNamedIam.to_string(), "CAPABILITY_NAMED_IAM");
    }

    #[test]
    fn test_task_definition_revision() {
        let task = StackResource::new(
            "WebTask",
            Some("arn:aws:ecs:us-east-1:123456789012:task-definition/web:7".to_string()),
            StackResource::TASK_DEFINITION_TYPE,
        );
        assert_eq!(task.task_definition_revision(), Some("web-7".to_string()));

        let bucket = StackResource::new("Bucket", Some("my-bucket".to_string()), "AWS::S3::Bucket");
        assert_eq!(bucket.task_definition_revision(), None);

        let pending = StackResource::new("WebTask", None, StackResource::TASK_DEFINITION_TYPE);
        assert_eq!(pending.task_definition_revision(), None);
    }
}
