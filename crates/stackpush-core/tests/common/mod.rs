use stackpush_config::{ArtifactCoordinates, PipelineContext};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn write_template(&self, name: &str, content: &str) {
        fs::write(self.root.path().join(name), content).unwrap();
    }

    pub fn write_env_properties(&self, environment: &str, content: &str) {
        let path = self.root.path().join(format!("{}.properties", environment));
        fs::write(path, content).unwrap();
    }

    #[allow(dead_code)]
    pub fn write_prior_output(&self, content: &str) {
        fs::write(self.output_file(), content).unwrap();
    }

    pub fn output_file(&self) -> PathBuf {
        self.root.path().join("stackoutput.properties")
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    pub fn context(&self, environment: &str) -> PipelineContext {
        PipelineContext::new("Web App", environment, self.path())
            .with_build_number(42)
            .with_artifact(ArtifactCoordinates {
                group_id: Some("com.example".to_string()),
                artifact_id: Some("web-app".to_string()),
                version: Some("3.1.0".to_string()),
            })
    }
}
