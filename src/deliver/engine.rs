//! The wizard state machine.
//!
//! ```text
//! Start --command--> AwaitingDestination --destination--> AwaitingBranch
//!   --branch--> AwaitingVersion --version--> AwaitingBuildVersion
//!   --build number--> AwaitingConfirm --ok--> Started
//!                                     --cancel--> Cancelled
//! ```
//!
//! No state is kept between events. Each action carries the token rendered
//! into the element that was clicked, so clicking an older message resumes
//! from exactly that message's state.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use super::action::{parse_action_id, ElementKind, Step};
use super::blocks::{self, Presentation};
use super::codec::{self, DecodeError};
use super::models::{Branches, BuildParameters, Deployment, Stage};
use super::planner;
use super::ports::{ChatGateway, SharedDestination, SourceControl};
use crate::api::ApiError;
use crate::slack::message::SlackMessage;
use crate::slack::payload::BlockAction;

/// Everything that can end a transition early
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("Invalid Parameter: {0}")]
    Decode(#[from] DecodeError),
    #[error("Unknown deployment destination '{0}'")]
    UnknownDestination(String),
    #[error(transparent)]
    Upstream(#[from] ApiError),
    #[error("Invalid Parameter: {step} does not accept {found}")]
    InvalidPayloadShape { step: Step, found: ElementKind },
    /// The trigger call failed; the build may still have been queued
    #[error("Build trigger for {destination} did not confirm, the build may or may not have started: {source}")]
    TriggerOutcomeUnknown {
        destination: String,
        source: ApiError,
    },
}

/// Wizard states that wait for a click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Awaiting {
    Destination,
    Branch,
    Version,
    BuildVersion,
    Confirm,
}

/// How an event was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The next step was rendered
    Presented(Awaiting),
    /// The destination accepted the build
    Started,
    Cancelled,
    /// An error notice was rendered
    Failed,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Presented(state) => write!(f, "awaiting {:?}", state),
            Outcome::Started => write!(f, "started"),
            Outcome::Cancelled => write!(f, "cancelled"),
            Outcome::Failed => write!(f, "failed"),
        }
    }
}

/// An inbound event routed to one wizard
#[derive(Debug, Clone)]
pub enum WizardEvent {
    Command {
        user_id: String,
    },
    Action {
        user_id: String,
        step: Step,
        action: BlockAction,
    },
}

/// Static settings of one wizard
#[derive(Debug, Clone)]
pub struct WizardSettings {
    pub command: String,
    pub default_branch: String,
    pub presentation: Presentation,
}

pub struct WizardEngine {
    settings: WizardSettings,
    source: Arc<dyn SourceControl>,
    destinations: Vec<SharedDestination>,
}

impl WizardEngine {
    pub fn new(
        settings: WizardSettings,
        source: Arc<dyn SourceControl>,
        destinations: Vec<SharedDestination>,
    ) -> Self {
        Self {
            settings,
            source,
            destinations,
        }
    }

    pub fn command(&self) -> &str {
        &self.settings.command
    }

    pub fn action_prefix(&self) -> &str {
        &self.settings.presentation.action_prefix
    }

    pub fn title(&self) -> &str {
        &self.settings.presentation.title
    }

    pub fn destinations(&self) -> impl Iterator<Item = Deployment> + '_ {
        self.destinations.iter().map(|d| d.deployment())
    }

    /// Turn a block action into an event for this wizard, if its id is ours
    pub fn route_action(&self, user_id: &str, action: BlockAction) -> Option<WizardEvent> {
        let step = parse_action_id(self.action_prefix(), &action.action_id)?;
        Some(WizardEvent::Action {
            user_id: user_id.to_string(),
            step,
            action,
        })
    }

    /// Run one transition: acknowledge, compute, respond.
    ///
    /// Never fails. Errors are rendered back to the user and delivery
    /// problems are logged, since there is nobody else to report them to.
    pub async fn handle(&self, event: WizardEvent, gateway: &dyn ChatGateway) -> Outcome {
        if let Err(e) = gateway.ack().await {
            tracing::warn!(wizard = %self.command(), error = %e, "Failed to acknowledge event");
        }

        let (outcome, message) = match self.transition(&event).await {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(wizard = %self.command(), error = %err, "Wizard step failed");
                let message = match err {
                    WizardError::InvalidPayloadShape { .. } => {
                        blocks::invalid_parameter(&self.settings.presentation)
                    }
                    other => blocks::failure(&self.settings.presentation, &other),
                };
                (Outcome::Failed, message)
            }
        };

        if let Err(e) = gateway.respond(&message).await {
            tracing::error!(wizard = %self.command(), error = %e, "Failed to deliver response");
        }

        tracing::debug!(wizard = %self.command(), outcome = %outcome, "Event handled");
        outcome
    }

    async fn transition(
        &self,
        event: &WizardEvent,
    ) -> Result<(Outcome, SlackMessage), WizardError> {
        let p = &self.settings.presentation;

        let (user_id, step, action) = match event {
            WizardEvent::Command { user_id } => {
                tracing::info!(wizard = %self.command(), user = %user_id, "Wizard started");
                let deployments: Vec<Deployment> = self.destinations().collect();
                return Ok((
                    Outcome::Presented(Awaiting::Destination),
                    blocks::deployment_select(p, &deployments),
                ));
            }
            WizardEvent::Action {
                user_id,
                step,
                action,
            } => (user_id, *step, action),
        };

        let value = read_value(step, action)?;

        match step {
            Step::DeploymentSelect => {
                let deployment = self.destination(value)?.deployment();
                let params = BuildParameters::new(deployment.id, deployment.name);
                let branches = Branches {
                    default: self.settings.default_branch.clone(),
                    branches: self.source.fetch_branches().await?,
                };
                Ok((
                    Outcome::Presented(Awaiting::Branch),
                    blocks::branch_select(p, &branches, &params),
                ))
            }
            Step::BranchSelect => {
                let params = decode_at(value, Stage::Branch)?;
                let branch = params
                    .branch
                    .clone()
                    .ok_or(DecodeError::Incomplete(Stage::Branch))?;
                let current = self.source.fetch_version(&branch).await?;
                tracing::info!(
                    wizard = %self.command(),
                    deployment = %params.deployment.id,
                    branch = %branch,
                    version = %current.version,
                    build_version = current.build_version,
                    "Looked up current version"
                );

                let versions = planner::version_candidates(&current.version);
                let params = params.with_current(current.version, current.build_version);
                Ok((
                    Outcome::Presented(Awaiting::Version),
                    blocks::version_select(p, &versions, &params),
                ))
            }
            Step::VersionSelect => {
                let params = decode_at(value, Stage::Version)?;
                let current = params
                    .current_build_version
                    .ok_or(DecodeError::Incomplete(Stage::Current))?;
                let builds = planner::build_version_candidates(current);
                Ok((
                    Outcome::Presented(Awaiting::BuildVersion),
                    blocks::build_version_select(p, &builds, &params),
                ))
            }
            Step::BuildVersionSelect => {
                let params = decode_at(value, Stage::BuildVersion)?;
                Ok((
                    Outcome::Presented(Awaiting::Confirm),
                    blocks::build_confirm(p, &params),
                ))
            }
            Step::ConfirmOk => {
                let params = decode_at(value, Stage::BuildVersion)?;
                let destination = self.destination(&params.deployment.id)?;

                destination
                    .run(&params)
                    .await
                    .map_err(|source| WizardError::TriggerOutcomeUnknown {
                        destination: destination.name().to_string(),
                        source,
                    })?;

                tracing::info!(
                    wizard = %self.command(),
                    user = %user_id,
                    deployment = %params.deployment.id,
                    branch = params.branch.as_deref().unwrap_or_default(),
                    version = params.version.as_deref().unwrap_or_default(),
                    build_version = params.build_version.unwrap_or_default(),
                    "Build started"
                );
                Ok((Outcome::Started, blocks::build_started(p, user_id, &params)))
            }
            Step::ConfirmCancel => {
                // cancelling must work even for a token we can no longer read
                match codec::decode(value) {
                    Ok(params) => tracing::info!(
                        wizard = %self.command(),
                        user = %user_id,
                        deployment = %params.deployment.id,
                        "Build cancelled"
                    ),
                    Err(_) => tracing::info!(wizard = %self.command(), user = %user_id, "Build cancelled"),
                }
                Ok((Outcome::Cancelled, blocks::build_cancelled(p)))
            }
        }
    }

    fn destination(&self, id: &str) -> Result<&SharedDestination, WizardError> {
        self.destinations
            .iter()
            .find(|d| d.id() == id)
            .ok_or_else(|| WizardError::UnknownDestination(id.to_string()))
    }
}

/// Check the element shape against the step and pull out its value
fn read_value(step: Step, action: &BlockAction) -> Result<&str, WizardError> {
    let found = action.kind();
    if !step.accepts(found) {
        return Err(WizardError::InvalidPayloadShape { step, found });
    }
    action
        .selected_value()
        .ok_or(WizardError::InvalidPayloadShape { step, found })
}

/// Decode a token that must have reached `stage`
fn decode_at(token: &str, stage: Stage) -> Result<BuildParameters, DecodeError> {
    let params = codec::decode(token)?;
    if !params.has_reached(stage) {
        return Err(DecodeError::Incomplete(stage));
    }
    Ok(params)
}
