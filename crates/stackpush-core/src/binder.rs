//! Template parameter and tag binding

use crate::template::Template;
use stackpush_cloud::{Parameter, Tag};
use stackpush_config::{ArtifactCoordinates, ConfigSet, PushSettings};
use tracing::debug;

/// Inputs for tag derivation
#[derive(Debug, Clone, Copy)]
pub struct TagContext<'a> {
    pub stack_name: &'a str,
    pub deploy_environment: &'a str,
    pub artifact: &'a ArtifactCoordinates,
    pub settings: &'a PushSettings,
}

/// Parameters and tags for one stack request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binding {
    pub parameters: Vec<Parameter>,
    pub tags: Vec<Tag>,
}

pub fn bind(config: &ConfigSet, template: &Template, tags: &TagContext<'_>) -> Binding {
    Binding {
        parameters: bind_parameters(config, template),
        tags: derive_tags(tags),
    }
}

/// Every config entry whose key appears literally in the template body
///
/// This is a plain substring match, not a parse of the template. A key
/// that happens to occur inside an unrelated token is passed along too;
/// the provider ignores parameters the template does not declare.
pub fn bind_parameters(config: &ConfigSet, template: &Template) -> Vec<Parameter> {
    let parameters: Vec<Parameter> = config
        .iter()
        .filter(|(key, _)| template.mentions(key))
        .map(|(key, value)| Parameter::new(key, value))
        .collect();

    debug!(
        parameters = parameters.len(),
        config_keys = config.len(),
        "Bound template parameters"
    );
    parameters
}

pub fn derive_tags(context: &TagContext<'_>) -> Vec<Tag> {
    let settings = context.settings;
    let app_key = settings.app_tag_key.as_str();

    let mut tags = vec![
        Tag::new("Name", context.stack_name),
        Tag::new(app_key, context.stack_name),
        Tag::new(format!("{}_uid", app_key), settings.app_uid.as_str()),
        Tag::new(format!("{}_env", app_key), context.deploy_environment),
        Tag::new(settings.sbu_tag_key.as_str(), settings.sbu.as_str()),
    ];

    if let Some(gav) = context.artifact.gav() {
        tags.push(Tag::new(format!("{}_gav", settings.company), gav));
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackpush_config::ConfigSource;

    fn tag_context<'a>(
        artifact: &'a ArtifactCoordinates,
        settings: &'a PushSettings,
    ) -> TagContext<'a> {
        TagContext {
            stack_name: "web-dev-us-east-1",
            deploy_environment: "dev",
            artifact,
            settings,
        }
    }

    #[test]
    fn test_parameter_present_in_template() {
        let config = ConfigSet::new().layer(ConfigSource::EnvironmentFile, [("Env", "dev")]);
        let template = Template::new("cft.yml", "Parameters:\n  Env:\n    Type: String\n");

        assert_eq!(
            bind_parameters(&config, &template),
            vec![Parameter::new("Env", "dev")]
        );
    }

    #[test]
    fn test_parameter_absent_from_template() {
        let config = ConfigSet::new().layer(ConfigSource::EnvironmentFile, [("Env", "dev")]);
        let template = Template::new("cft.yml", "Parameters:\n  Stage:\n    Type: String\n");

        assert!(bind_parameters(&config, &template).is_empty());
    }

    #[test]
    fn test_parameter_match_is_case_sensitive_substring() {
        let config = ConfigSet::new().layer(
            ConfigSource::EnvironmentFile,
            [("Env", "dev"), ("env", "lower"), ("Port", "80")],
        );
        // "Env" matches inside "DeployEnvironment"; "env" and "Port" do not occur
        let template = Template::new("cft.json", r#"{"Parameters":{"DeployEnvironment":{}}}"#);

        let parameters = bind_parameters(&config, &template);
        assert_eq!(parameters, vec![Parameter::new("Env", "dev")]);
    }

    #[test]
    fn test_parameters_subset_of_config() {
        let config = ConfigSet::new().layer(
            ConfigSource::Broker,
            [("VpcId", "vpc-1"), ("SubnetIds", "a,b"), ("Unused", "x")],
        );
        let template = Template::new("cft.yml", "VpcId SubnetIds");

        for parameter in bind_parameters(&config, &template) {
            assert_eq!(config.get(&parameter.key), Some(parameter.value.as_str()));
        }
    }

    #[test]
    fn test_unconditional_tags() {
        let artifact = ArtifactCoordinates::default();
        let settings = PushSettings {
            sbu: "retail".to_string(),
            ..Default::default()
        };

        let tags = derive_tags(&tag_context(&artifact, &settings));
        assert_eq!(
            tags,
            vec![
                Tag::new("Name", "web-dev-us-east-1"),
                Tag::new("app", "web-dev-us-east-1"),
                Tag::new("app_uid", "app-e312c4299a"),
                Tag::new("app_env", "dev"),
                Tag::new("sbu", "retail"),
            ]
        );
    }

    #[test]
    fn test_gav_tag_with_artifact() {
        let artifact = ArtifactCoordinates {
            group_id: Some("com.example".to_string()),
            artifact_id: Some("web".to_string()),
            version: Some("1.4.0".to_string()),
        };
        let settings = PushSettings {
            company: "acme".to_string(),
            ..Default::default()
        };

        let tags = derive_tags(&tag_context(&artifact, &settings));
        assert_eq!(tags.len(), 6);
        assert_eq!(tags[5], Tag::new("acme_gav", "com.example:web:1.4.0"));
    }

    #[test]
    fn test_no_gav_tag_for_empty_artifact() {
        let artifact = ArtifactCoordinates {
            artifact_id: Some(String::new()),
            ..Default::default()
        };
        let settings = PushSettings::default();

        let binding = bind(
            &ConfigSet::new(),
            &Template::new("cft.yml", ""),
            &tag_context(&artifact, &settings),
        );
        assert!(binding.parameters.is_empty());
        assert_eq!(binding.tags.len(), 5);
        assert!(binding.tags.iter().all(|t| !t.key.ends_with("_gav")));
    }
}
