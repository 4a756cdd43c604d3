//! API state management for the REST server.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::api::{BitriseClient, BitriseDestination, GitHubSource};
use crate::config::{Config, WizardConfig};
use crate::deliver::blocks::Presentation;
use crate::deliver::ports::SharedDestination;
use crate::deliver::{WizardEngine, WizardRegistry, WizardSettings};
use crate::rest::error::ApiError;

/// Slack drops requests that are not answered within three seconds
pub const ACK_TIMEOUT: Duration = Duration::from_secs(3);

/// Shared state for the REST API
#[derive(Clone)]
pub struct ApiState {
    pub registry: WizardRegistry,
    pub config: Arc<Config>,
    /// Client used for `response_url` posts
    pub http: reqwest::Client,
    /// How long a handler waits for the wizard's acknowledgement
    pub ack_timeout: Duration,
}

impl ApiState {
    pub fn new(config: Config, registry: WizardRegistry) -> Self {
        Self {
            registry,
            config: Arc::new(config),
            http: reqwest::Client::new(),
            ack_timeout: ACK_TIMEOUT,
        }
    }

    /// Build every configured wizard with its GitHub source and Bitrise destinations
    pub fn from_config(config: Config) -> Result<Self> {
        let bitrise = BitriseClient::new(config.bitrise.token.clone(), &config.bitrise.api_base);

        let engines = config
            .wizards
            .iter()
            .map(|wizard| build_engine(&config, wizard, &bitrise))
            .collect::<Result<Vec<_>>>()?;

        if config.github.token.is_none() {
            tracing::warn!("No GitHub token configured, only public repositories will resolve");
        }
        if config.bitrise.token.is_none() {
            tracing::warn!("No Bitrise token configured, build triggers will fail");
        }

        Ok(Self::new(config, WizardRegistry::new(engines)))
    }

    /// Reject requests whose token differs from the configured one
    pub fn verify_token(&self, token: &str) -> Result<(), ApiError> {
        match self.config.slack.verification_token.as_deref() {
            Some(expected) if !expected.is_empty() && expected != token => Err(
                ApiError::Unauthorized("verification token mismatch".to_string()),
            ),
            _ => Ok(()),
        }
    }
}

fn build_engine(config: &Config, wizard: &WizardConfig, bitrise: &BitriseClient) -> Result<WizardEngine> {
    let source = GitHubSource::new(
        config.github.token.clone(),
        &config.github.api_base,
        wizard.repository.clone(),
    )
    .with_context(|| format!("Failed to create GitHub client for {}", wizard.command))?;

    let destinations = wizard
        .destinations
        .iter()
        .map(|d| Arc::new(BitriseDestination::new(d.clone(), bitrise.clone())) as SharedDestination)
        .collect();

    let settings = WizardSettings {
        command: wizard.command.clone(),
        default_branch: wizard.default_branch.clone(),
        presentation: Presentation {
            title: wizard.title.clone(),
            action_prefix: wizard.action_prefix.clone(),
            response_type: wizard.response_type,
        },
    };

    tracing::debug!(
        wizard = %wizard.command,
        repo = %format!("{}/{}", wizard.repository.owner, wizard.repository.repo),
        destinations = wizard.destinations.len(),
        "Wizard configured"
    );
    Ok(WizardEngine::new(settings, Arc::new(source), destinations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DestinationConfig, RepositoryConfig};
    use crate::slack::message::ResponseType;

    fn sample_config() -> Config {
        let mut config = Config::default();
        config.wizards.push(WizardConfig {
            command: "/deliver".to_string(),
            title: "Deliver".to_string(),
            action_prefix: "deliver".to_string(),
            response_type: ResponseType::InChannel,
            default_branch: "main".to_string(),
            repository: RepositoryConfig {
                owner: "acme".to_string(),
                repo: "app".to_string(),
                version_file: "version.json".to_string(),
                version_key: "version".to_string(),
                build_version_key: "buildVersion".to_string(),
            },
            destinations: vec![DestinationConfig {
                id: "d1".to_string(),
                name: "prod".to_string(),
                app_slug: "abc123".to_string(),
                workflow_id: "deploy".to_string(),
                version_env: "VERSION".to_string(),
                build_version_env: "BUILD_VERSION".to_string(),
            }],
        });
        config
    }

    #[test]
    fn test_from_config_builds_wizards() {
        let state = ApiState::from_config(sample_config()).unwrap();
        assert_eq!(state.registry.len(), 1);

        let engine = state.registry.by_command("/deliver").unwrap();
        assert_eq!(engine.title(), "Deliver");
        let names: Vec<String> = engine.destinations().map(|d| d.name).collect();
        assert_eq!(names, vec!["prod"]);
    }

    #[test]
    fn test_verify_token() {
        let mut config = sample_config();
        assert!(ApiState::new(config.clone(), WizardRegistry::default())
            .verify_token("anything")
            .is_ok());

        config.slack.verification_token = Some("expected".to_string());
        let state = ApiState::new(config, WizardRegistry::default());
        assert!(state.verify_token("expected").is_ok());
        assert!(matches!(
            state.verify_token("other"),
            Err(ApiError::Unauthorized(_))
        ));
    }
}
