//! Slack slash command and interactivity endpoints.
//!
//! Each request spawns a wizard task. The handler answers Slack as soon as the
//! task acknowledges, or after [`ApiState::ack_timeout`], whichever is first;
//! the task keeps running and posts its result to the `response_url`.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Form};

use crate::deliver::{WizardEngine, WizardEvent};
use crate::rest::error::ApiError;
use crate::rest::state::ApiState;
use crate::slack::payload::{InteractionForm, InteractionPayload, SlashCommand};
use crate::slack::ResponseUrlGateway;

/// Start a wizard
#[utoipa::path(
    post,
    path = "/slack/commands",
    tag = "Slack",
    responses(
        (status = 200, description = "Command accepted"),
        (status = 401, description = "Verification token mismatch", body = crate::rest::error::ErrorResponse),
        (status = 404, description = "No wizard for this command", body = crate::rest::error::ErrorResponse)
    )
)]
pub async fn command(
    State(state): State<ApiState>,
    Form(command): Form<SlashCommand>,
) -> Result<StatusCode, ApiError> {
    state.verify_token(&command.token)?;

    let engine = state
        .registry
        .by_command(&command.command)
        .ok_or_else(|| ApiError::NotFound(format!("No wizard for command '{}'", command.command)))?;

    tracing::debug!(
        wizard = %command.command,
        user = %command.user_id,
        channel = %command.channel_id,
        "Slash command received"
    );

    let event = WizardEvent::Command {
        user_id: command.user_id,
    };
    dispatch(&state, engine, event, command.response_url).await;
    Ok(StatusCode::OK)
}

/// Advance a wizard after a button click or menu selection
#[utoipa::path(
    post,
    path = "/slack/actions",
    tag = "Slack",
    responses(
        (status = 200, description = "Interaction accepted"),
        (status = 400, description = "Malformed payload", body = crate::rest::error::ErrorResponse),
        (status = 401, description = "Verification token mismatch", body = crate::rest::error::ErrorResponse)
    )
)]
pub async fn action(
    State(state): State<ApiState>,
    Form(form): Form<InteractionForm>,
) -> Result<StatusCode, ApiError> {
    let payload: InteractionPayload = serde_json::from_str(&form.payload)?;
    state.verify_token(&payload.token)?;

    if payload.kind != "block_actions" {
        tracing::debug!(kind = %payload.kind, "Ignoring interaction");
        return Ok(StatusCode::OK);
    }

    let Some(response_url) = payload.response_url else {
        return Err(ApiError::BadRequest(
            "block_actions payload without response_url".to_string(),
        ));
    };
    let Some(action) = payload.actions.into_iter().next() else {
        return Ok(StatusCode::OK);
    };

    let action_id = action.action_id.clone();
    let Some((engine, event)) = state.registry.route_action(&payload.user.id, action) else {
        tracing::debug!(action_id = %action_id, "No wizard owns this action");
        return Ok(StatusCode::OK);
    };

    dispatch(&state, engine, event, response_url).await;
    Ok(StatusCode::OK)
}

/// Run `event` in its own task and wait for the acknowledgement
async fn dispatch(state: &ApiState, engine: Arc<WizardEngine>, event: WizardEvent, response_url: String) {
    let (gateway, acked) = ResponseUrlGateway::new(state.http.clone(), response_url);

    tokio::spawn(async move {
        engine.handle(event, &gateway).await;
    });

    match tokio::time::timeout(state.ack_timeout, acked).await {
        Ok(Ok(())) => {}
        Ok(Err(_)) => tracing::warn!("Wizard task ended without acknowledging"),
        Err(_) => tracing::warn!(
            timeout_ms = state.ack_timeout.as_millis() as u64,
            "Acknowledgement deadline passed"
        ),
    }
}
