//! Configuration layering
//!
//! Sources, lowest precedence first:
//!
//! 1. previous run's `stackoutput.properties`
//! 2. `<environment>.properties`
//! 3. values derived from the pipeline context
//! 4. the variable broker response
//!
//! The broker is called before anything else is read, but its values are
//! layered with the highest precedence, so a key it shares with the
//! pipeline context still resolves to the broker's value.

use crate::error::{PushError, Result};
use rand::Rng;
use rand::distributions::Alphanumeric;
use stackpush_cloud::VariableBroker;
use stackpush_config::{ConfigSet, ConfigSource, PipelineContext, properties};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument};

pub const RANDOM_PASSWORD_KEY: &str = "RandomPassword";
pub const RANDOM_PASSWORD_LENGTH: usize = 20;
pub const BUILD_ID_KEY: &str = "BuildId";
pub const BUILD_ID_PREFIX: &str = "BUILD";
pub const ARTIFACT_ID_KEY: &str = "ArtifactId";
pub const VERSION_KEY: &str = "Version";
pub const DEPLOY_ENVIRONMENT_KEY: &str = "DeployEnvironment";

/// Builds the [`ConfigSet`] for one deployment
pub struct ConfigLayer<'a> {
    prior_output: PathBuf,
    environment_file: PathBuf,
    broker: Option<&'a dyn VariableBroker>,
    region: String,
}

impl<'a> ConfigLayer<'a> {
    pub fn new(
        prior_output: impl Into<PathBuf>,
        environment_file: impl Into<PathBuf>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            prior_output: prior_output.into(),
            environment_file: environment_file.into(),
            broker: None,
            region: region.into(),
        }
    }

    pub fn with_broker(mut self, broker: Option<&'a dyn VariableBroker>) -> Self {
        self.broker = broker;
        self
    }

    #[instrument(skip_all, fields(environment = %context.environment_name))]
    pub async fn build(&self, context: &PipelineContext) -> Result<ConfigSet> {
        let brokered = match self.broker {
            Some(broker) => Some(fetch_broker_variables(broker, &self.region).await?),
            None => None,
        };

        let mut config = ConfigSet::new();
        config = layer_file(config, &self.prior_output, ConfigSource::PriorOutput)?;
        config = layer_file(config, &self.environment_file, ConfigSource::EnvironmentFile)?;
        config = config.layer(ConfigSource::PipelineContext, context_variables(context));

        if let Some(variables) = brokered {
            for (key, value) in &variables {
                info!("Injecting {}", key);
                debug!(key = %key, value = %value, "Broker variable");
            }
            config = config.layer(ConfigSource::Broker, variables);
        }

        info!(
            keys = config.len(),
            sources = ?config.source_counts(),
            "Configuration assembled"
        );
        Ok(config)
    }
}

fn layer_file(config: ConfigSet, path: &Path, source: ConfigSource) -> Result<ConfigSet> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    match properties::load_properties(path)? {
        Some(entries) => {
            info!("Loaded {}", name);
            debug!(path = %path.display(), entries = entries.len(), "Properties loaded");
            Ok(config.layer(source, entries))
        }
        None => {
            info!("No {}", name);
            Ok(config)
        }
    }
}

/// Values derived from the pipeline context
pub fn context_variables(context: &PipelineContext) -> Vec<(String, String)> {
    let mut variables = vec![(
        RANDOM_PASSWORD_KEY.to_string(),
        random_credential(RANDOM_PASSWORD_LENGTH),
    )];

    match context.build_number {
        Some(build_number) => variables.push((
            BUILD_ID_KEY.to_string(),
            format!("{}{}", BUILD_ID_PREFIX, build_number),
        )),
        None => debug!("No build number in pipeline context"),
    }
    if let Some(artifact_id) = &context.artifact.artifact_id {
        variables.push((ARTIFACT_ID_KEY.to_string(), artifact_id.clone()));
    }
    if let Some(version) = &context.artifact.version {
        variables.push((VERSION_KEY.to_string(), version.clone()));
    }
    if !context.environment_name.is_empty() {
        variables.push((
            DEPLOY_ENVIRONMENT_KEY.to_string(),
            context.environment_name.clone(),
        ));
    }

    variables
}

fn random_credential(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

async fn fetch_broker_variables(
    broker: &dyn VariableBroker,
    region: &str,
) -> Result<BTreeMap<String, String>> {
    info!("Getting stack variables from broker: {}", broker.target());

    let payload = region.to_lowercase();
    let response = broker
        .invoke(&payload)
        .await
        .map_err(|source| PushError::Broker {
            target: broker.target().to_string(),
            source,
        })?;

    parse_broker_response(broker.target(), &response)
}

/// Parse a broker response; anything but a JSON object of strings is rejected
pub fn parse_broker_response(target: &str, response: &str) -> Result<BTreeMap<String, String>> {
    serde_json::from_str(response).map_err(|source| {
        error!("Unable to parse variables from {}", response);
        PushError::MalformedBrokerResponse {
            target: target.to_string(),
            response: response.to_string(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticBroker;
    use stackpush_config::ArtifactCoordinates;
    use std::fs;

    fn context(root: &Path) -> PipelineContext {
        PipelineContext::new("web", "dev", root)
            .with_build_number(128)
            .with_artifact(ArtifactCoordinates {
                group_id: Some("com.example".to_string()),
                artifact_id: Some("web".to_string()),
                version: Some("2.0.1".to_string()),
            })
    }

    #[test]
    fn test_context_variables() {
        let temp_dir = tempfile::tempdir().unwrap();
        let variables: BTreeMap<String, String> =
            context_variables(&context(temp_dir.path())).into_iter().collect();

        assert_eq!(variables[BUILD_ID_KEY], "BUILD128");
        assert_eq!(variables[ARTIFACT_ID_KEY], "web");
        assert_eq!(variables[VERSION_KEY], "2.0.1");
        assert_eq!(variables[DEPLOY_ENVIRONMENT_KEY], "dev");

        let password = &variables[RANDOM_PASSWORD_KEY];
        assert_eq!(password.len(), RANDOM_PASSWORD_LENGTH);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_context_variables_omit_missing_fields() {
        let variables: BTreeMap<String, String> =
            context_variables(&PipelineContext::new("web", "", "/tmp"))
                .into_iter()
                .collect();

        assert_eq!(variables.len(), 1);
        assert!(variables.contains_key(RANDOM_PASSWORD_KEY));
    }

    #[test]
    fn test_parse_broker_response() {
        let parsed = parse_broker_response("broker", r#"{"VpcId":"vpc-123","Zone":"a"}"#).unwrap();
        assert_eq!(parsed["VpcId"], "vpc-123");

        for malformed in [r#"["a","b"]"#, r#"{"Port":443}"#, "not json", ""] {
            let result = parse_broker_response("broker", malformed);
            assert!(
                matches!(result, Err(PushError::MalformedBrokerResponse { .. })),
                "{}",
                malformed
            );
        }
    }

    #[tokio::test]
    async fn test_precedence_across_sources() {
        let temp_dir = tempfile::tempdir().unwrap();
        let prior = temp_dir.path().join("stackoutput.properties");
        fs::write(
            &prior,
            "Shared=prior\nPriorOnly=p\nEnvShared=prior\nDeployEnvironment=prior\n",
        )
        .unwrap();
        let env_file = temp_dir.path().join("dev.properties");
        fs::write(&env_file, "Shared=env\nEnvShared=env\nEnvOnly=e\n").unwrap();

        let broker = StaticBroker::new("broker", r#"{"Shared":"broker","DeployEnvironment":"broker"}"#);
        let config = ConfigLayer::new(&prior, &env_file, "US-EAST-1")
            .with_broker(Some(&broker))
            .build(&context(temp_dir.path()))
            .await
            .unwrap();

        assert_eq!(config.get("PriorOnly"), Some("p"));
        assert_eq!(config.get("EnvOnly"), Some("e"));
        assert_eq!(config.get("EnvShared"), Some("env"));
        assert_eq!(config.get("Shared"), Some("broker"));
        assert_eq!(config.get(DEPLOY_ENVIRONMENT_KEY), Some("broker"));
        assert_eq!(config.source_of(BUILD_ID_KEY), Some(ConfigSource::PipelineContext));
        assert_eq!(config.get("Missing"), None);

        assert_eq!(broker.payloads(), vec!["us-east-1".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_files_are_not_errors() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = ConfigLayer::new(
            temp_dir.path().join("stackoutput.properties"),
            temp_dir.path().join("dev.properties"),
            "us-east-1",
        )
        .build(&context(temp_dir.path()))
        .await
        .unwrap();

        assert!(config.contains_key(RANDOM_PASSWORD_KEY));
        assert_eq!(config.source_of(RANDOM_PASSWORD_KEY), Some(ConfigSource::PipelineContext));
    }

    #[tokio::test]
    async fn test_malformed_broker_response_is_fatal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let broker = StaticBroker::new("broker", r#"{"errorMessage":{"nested":true}}"#);

        let result = ConfigLayer::new(
            temp_dir.path().join("stackoutput.properties"),
            temp_dir.path().join("dev.properties"),
            "us-east-1",
        )
        .with_broker(Some(&broker))
        .build(&context(temp_dir.path()))
        .await;

        assert!(matches!(result, Err(PushError::MalformedBrokerResponse { .. })));
    }

    #[tokio::test]
    async fn test_broker_failure_is_fatal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let broker = StaticBroker::failing("broker", "function timed out");

        let result = ConfigLayer::new(
            temp_dir.path().join("stackoutput.properties"),
            temp_dir.path().join("dev.properties"),
            "us-east-1",
        )
        .with_broker(Some(&broker))
        .build(&context(temp_dir.path()))
        .await;

        assert!(matches!(result, Err(PushError::Broker { .. })));
    }
}
