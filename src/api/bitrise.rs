//! Bitrise build trigger

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::config::DestinationConfig;
use crate::deliver::models::BuildParameters;
use crate::deliver::ports::Destination;

const PROVIDER_NAME: &str = "bitrise";

/// Build parameters accepted by `POST /apps/{slug}/builds`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildParams {
    pub branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub environments: Vec<Environment>,
}

/// Environment variable handed to the workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Environment {
    pub mapped_to: String,
    pub value: String,
    pub is_expand: bool,
}

impl Environment {
    pub fn literal(mapped_to: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            mapped_to: mapped_to.into(),
            value: value.into(),
            is_expand: false,
        }
    }
}

#[derive(Debug, Serialize)]
struct HookInfo {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct TriggerRequest<'a> {
    build_params: &'a BuildParams,
    hook_info: HookInfo,
}

/// A build queued by Bitrise
#[derive(Debug, Clone, Deserialize)]
pub struct Build {
    #[serde(default)]
    pub build_number: Option<u64>,
    #[serde(default)]
    pub build_slug: Option<String>,
    #[serde(default)]
    pub build_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub triggered_workflow: Option<String>,
}

/// Thin client over the Bitrise REST API
#[derive(Clone)]
pub struct BitriseClient {
    token: Option<String>,
    client: reqwest::Client,
    base_url: String,
}

impl BitriseClient {
    pub fn new(token: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn builds_url(&self, app_slug: &str) -> String {
        format!("{}/apps/{}/builds", self.base_url, app_slug)
    }

    /// Trigger a new build of `app_slug`
    pub async fn trigger_build(&self, app_slug: &str, params: &BuildParams) -> Result<Build, ApiError> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| ApiError::not_configured(PROVIDER_NAME))?;

        let body = TriggerRequest {
            build_params: params,
            hook_info: HookInfo { kind: "bitrise" },
        };

        let response = self
            .client
            .post(self.builds_url(app_slug))
            .header("Authorization", token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::network(PROVIDER_NAME, e.to_string()))?;

        if !response.status().is_success() {
            return Err(ApiError::from_response(PROVIDER_NAME, app_slug, response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::invalid_content(PROVIDER_NAME, e.to_string()))
    }
}

/// A configured workflow of one Bitrise app
pub struct BitriseDestination {
    config: DestinationConfig,
    client: BitriseClient,
}

impl BitriseDestination {
    pub fn new(config: DestinationConfig, client: BitriseClient) -> Self {
        Self { config, client }
    }

    /// Request body for a completed parameter set
    pub fn build_params(&self, params: &BuildParameters) -> Result<BuildParams, ApiError> {
        let (Some(branch), Some(version), Some(build_version)) =
            (&params.branch, &params.version, params.build_version)
        else {
            return Err(ApiError::invalid_content(
                PROVIDER_NAME,
                "build parameters are incomplete",
            ));
        };

        Ok(BuildParams {
            branch: branch.clone(),
            workflow_id: Some(self.config.workflow_id.clone()),
            environments: vec![
                Environment::literal(&self.config.version_env, version),
                Environment::literal(&self.config.build_version_env, build_version.to_string()),
            ],
        })
    }
}

#[async_trait]
impl Destination for BitriseDestination {
    fn id(&self) -> &str {
        &self.config.id
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    async fn run(&self, params: &BuildParameters) -> Result<(), ApiError> {
        let request = self.build_params(params)?;
        let build = self.client.trigger_build(&self.config.app_slug, &request).await?;

        tracing::info!(
            destination = %self.config.id,
            app = %self.config.app_slug,
            workflow = %self.config.workflow_id,
            build_number = ?build.build_number,
            build_url = build.build_url.as_deref().unwrap_or("-"),
            "Build triggered"
        );
        Ok(())
    }
}
