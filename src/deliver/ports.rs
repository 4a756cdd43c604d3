//! Interfaces the wizard needs from the outside world.

use std::sync::Arc;

use async_trait::async_trait;

use super::models::{BuildParameters, CurrentVersion, Deployment};
use crate::api::ApiError;
use crate::slack::message::SlackMessage;

/// Branch listing and deployed-version lookup for one repository
#[async_trait]
pub trait SourceControl: Send + Sync {
    async fn fetch_branches(&self) -> Result<Vec<String>, ApiError>;

    /// Version and build number currently recorded on `branch`
    async fn fetch_version(&self, branch: &str) -> Result<CurrentVersion, ApiError>;
}

/// A deployable target with a build trigger
#[async_trait]
pub trait Destination: Send + Sync {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    /// Start a build with the completed parameters.
    ///
    /// Called at most once per confirm click, never retried.
    async fn run(&self, params: &BuildParameters) -> Result<(), ApiError>;

    fn deployment(&self) -> Deployment {
        Deployment {
            id: self.id().to_string(),
            name: self.name().to_string(),
        }
    }
}

pub type SharedDestination = Arc<dyn Destination>;

/// Chat channel for a single inbound event
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Tell the platform the event was received
    async fn ack(&self) -> anyhow::Result<()>;

    /// Post a message for this event; may be called more than once
    async fn respond(&self, message: &SlackMessage) -> anyhow::Result<()>;
}
