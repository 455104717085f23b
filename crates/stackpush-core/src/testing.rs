//! In-memory provider and broker fakes for tests

use async_trait::async_trait;
use stackpush_cloud::{
    CloudError, CreateOutcome, StackProvider, StackRequest, StackResource, StackStatusReport,
    UpdateOutcome, VariableBroker,
};
use std::sync::{Mutex, MutexGuard};

/// A call received by [`ScriptedProvider`]
#[derive(Debug, Clone)]
pub enum ProviderCall {
    Create(StackRequest),
    Update(StackRequest),
    DescribeStatus(String),
    DescribeResources(String),
}

#[derive(Debug)]
struct Script {
    create: Result<CreateOutcome, String>,
    update: Result<UpdateOutcome, String>,
    statuses: Vec<Vec<StackStatusReport>>,
    status_cursor: usize,
    resources: Vec<StackResource>,
    calls: Vec<ProviderCall>,
}

/// [`StackProvider`] that answers from a script and records every call
///
/// Status rounds are returned in order; the last round repeats. Without
/// any scripted round every status check reports `CREATE_COMPLETE`.
#[derive(Debug)]
pub struct ScriptedProvider {
    name: String,
    script: Mutex<Script>,
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            name: "aws".to_string(),
            script: Mutex::new(Script {
                create: Ok(CreateOutcome::Created),
                update: Ok(UpdateOutcome::Updated),
                statuses: Vec::new(),
                status_cursor: 0,
                resources: Vec::new(),
                calls: Vec::new(),
            }),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_existing_stack(self) -> Self {
        self.lock().create = Ok(CreateOutcome::AlreadyExists);
        self
    }

    pub fn with_create_error(self, message: impl Into<String>) -> Self {
        self.lock().create = Err(message.into());
        self
    }

    pub fn with_update_outcome(self, outcome: UpdateOutcome) -> Self {
        self.lock().update = Ok(outcome);
        self
    }

    pub fn with_update_error(self, message: impl Into<String>) -> Self {
        self.lock().update = Err(message.into());
        self
    }

    /// One status round per entry, each holding a single report
    pub fn with_statuses(self, stack_name: &str, statuses: &[&str]) -> Self {
        let rounds = statuses
            .iter()
            .map(|status| vec![StackStatusReport::new(stack_name, *status)])
            .collect();
        self.with_status_rounds(rounds)
    }

    pub fn with_status_rounds(self, rounds: Vec<Vec<StackStatusReport>>) -> Self {
        self.lock().statuses = rounds;
        self
    }

    pub fn with_resources(self, resources: Vec<StackResource>) -> Self {
        self.lock().resources = resources;
        self
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.lock().calls.clone()
    }

    pub fn create_requests(&self) -> Vec<StackRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ProviderCall::Create(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn update_requests(&self) -> Vec<StackRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ProviderCall::Update(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn status_checks(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, ProviderCall::DescribeStatus(_)))
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl StackProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn create_stack(&self, request: &StackRequest) -> stackpush_cloud::Result<CreateOutcome> {
        let mut script = self.lock();
        script.calls.push(ProviderCall::Create(request.clone()));
        script.create.clone().map_err(CloudError::Api)
    }

    async fn update_stack(&self, request: &StackRequest) -> stackpush_cloud::Result<UpdateOutcome> {
        let mut script = self.lock();
        script.calls.push(ProviderCall::Update(request.clone()));
        script.update.clone().map_err(CloudError::Api)
    }

    async fn describe_stack_status(
        &self,
        stack_name: &str,
    ) -> stackpush_cloud::Result<Vec<StackStatusReport>> {
        let mut script = self.lock();
        script
            .calls
            .push(ProviderCall::DescribeStatus(stack_name.to_string()));

        if script.statuses.is_empty() {
            return Ok(vec![StackStatusReport::new(stack_name, "CREATE_COMPLETE")]);
        }
        let index = script.status_cursor.min(script.statuses.len() - 1);
        script.status_cursor += 1;
        Ok(script.statuses[index].clone())
    }

    async fn describe_stack_resources(
        &self,
        stack_name: &str,
    ) -> stackpush_cloud::Result<Vec<StackResource>> {
        let mut script = self.lock();
        script
            .calls
            .push(ProviderCall::DescribeResources(stack_name.to_string()));
        Ok(script.resources.clone())
    }
}

/// [`VariableBroker`] with a fixed response
#[derive(Debug)]
pub struct StaticBroker {
    target: String,
    response: Result<String, String>,
    payloads: Mutex<Vec<String>>,
}

impl StaticBroker {
    pub fn new(target: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            response: Ok(response.into()),
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            response: Err(message.into()),
            payloads: Mutex::new(Vec::new()),
        }
    }

    /// Payloads received so far
    pub fn payloads(&self) -> Vec<String> {
        self.payloads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl VariableBroker for StaticBroker {
    fn target(&self) -> &str {
        &self.target
    }

    async fn invoke(&self, payload: &str) -> stackpush_cloud::Result<String> {
        self.payloads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(payload.to_string());
        self.response.clone().map_err(CloudError::Api)
    }
}
