//! OpenAPI specification builder using utoipa.

use utoipa::OpenApi;

use crate::rest::dto::{HealthResponse, StatusResponse, WizardSummary};
use crate::rest::error::ErrorResponse;

/// OpenAPI documentation for the deliver HTTP surface
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Deliver API",
        description = "Slack endpoints of the deploy wizard plus health and status.",
        license(name = "MIT")
    ),
    paths(
        crate::rest::routes::health::health,
        crate::rest::routes::health::status,
        crate::rest::routes::slack::command,
        crate::rest::routes::slack::action,
    ),
    components(schemas(HealthResponse, StatusResponse, WizardSummary, ErrorResponse)),
    tags(
        (name = "Health", description = "Health check and status endpoints"),
        (name = "Slack", description = "Slash command and interactivity webhooks"),
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate the OpenAPI specification as a JSON string
    pub fn json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}
