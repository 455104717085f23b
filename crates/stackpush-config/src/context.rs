//! Inputs supplied by the calling build/deployment pipeline

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Well-known pipeline variable names
pub const BUILD_NUMBER_VAR: &str = "buildNumber";
pub const GROUP_ID_VAR: &str = "maven.groupId";
pub const ARTIFACT_ID_VAR: &str = "maven.artifactId";
pub const VERSION_VAR: &str = "maven.version";

/// Maven-style artifact coordinates of the build being deployed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactCoordinates {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
}

impl ArtifactCoordinates {
    /// Artifact id when present and non-empty
    pub fn artifact_id(&self) -> Option<&str> {
        self.artifact_id.as_deref().filter(|id| !id.is_empty())
    }

    /// `group:artifact:version`, with missing parts rendered empty
    ///
    /// Returns `None` without an artifact id.
    pub fn gav(&self) -> Option<String> {
        let artifact_id = self.artifact_id()?;
        Some(format!(
            "{}:{}:{}",
            self.group_id.as_deref().unwrap_or_default(),
            artifact_id,
            self.version.as_deref().unwrap_or_default()
        ))
    }
}

/// Read-only pipeline context for one deployment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineContext {
    pub environment_name: String,
    pub project_name: String,
    pub root_dir: PathBuf,
    pub build_number: Option<u64>,
    pub artifact: ArtifactCoordinates,
    /// Arbitrary custom variables from the pipeline
    pub variables: BTreeMap<String, String>,
}

impl PipelineContext {
    pub fn new(
        project_name: impl Into<String>,
        environment_name: impl Into<String>,
        root_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            environment_name: environment_name.into(),
            root_dir: root_dir.into(),
            ..Default::default()
        }
    }

    pub fn with_build_number(mut self, build_number: u64) -> Self {
        self.build_number = Some(build_number);
        self
    }

    pub fn with_artifact(mut self, artifact: ArtifactCoordinates) -> Self {
        self.artifact = artifact;
        self
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// Fill unset build number and artifact fields from custom variables
    ///
    /// Hosts that only pass a flat variable map (`buildNumber`,
    /// `maven.groupId`, `maven.artifactId`, `maven.version`) get the same
    /// typed context as hosts that set the fields directly. A non-numeric
    /// `buildNumber` is ignored.
    pub fn resolve_variables(mut self) -> Self {
        if self.build_number.is_none()
            && let Some(raw) = self.variables.get(BUILD_NUMBER_VAR)
        {
            match raw.trim().parse::<u64>() {
                Ok(n) => self.build_number = Some(n),
                Err(_) => tracing::warn!(value = %raw, "Ignoring non-numeric buildNumber"),
            }
        }
        let lookup = |key: &str| self.variables.get(key).cloned();
        let group_id = self.artifact.group_id.clone().or_else(|| lookup(GROUP_ID_VAR));
        let artifact_id = self
            .artifact
            .artifact_id
            .clone()
            .or_else(|| lookup(ARTIFACT_ID_VAR));
        let version = self.artifact.version.clone().or_else(|| lookup(VERSION_VAR));
        self.artifact = ArtifactCoordinates {
            group_id,
            artifact_id,
            version,
        };
        self
    }

    /// Path of `<environment>.properties` under the deployment root
    pub fn environment_properties_path(&self) -> PathBuf {
        self.root_dir
            .join(format!("{}.properties", self.environment_name))
    }
}
