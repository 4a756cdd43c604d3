//! Data Transfer Objects for the REST API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::deliver::WizardEngine;

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Service status with the configured wizards
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    pub wizards: Vec<WizardSummary>,
}

/// One configured wizard
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WizardSummary {
    pub command: String,
    pub title: String,
    pub action_prefix: String,
    /// Destination names in menu order
    pub destinations: Vec<String>,
}

impl From<&WizardEngine> for WizardSummary {
    fn from(engine: &WizardEngine) -> Self {
        Self {
            command: engine.command().to_string(),
            title: engine.title().to_string(),
            action_prefix: engine.action_prefix().to_string(),
            destinations: engine.destinations().map(|d| d.name).collect(),
        }
    }
}
