//! Inbound Slack request bodies.

use serde::Deserialize;

use crate::deliver::action::ElementKind;

/// Form body of a slash command request
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct SlashCommand {
    pub command: String,
    #[serde(default)]
    pub text: String,
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub channel_id: String,
    pub response_url: String,
    /// Legacy verification token
    #[serde(default)]
    pub token: String,
}

/// Form body of an interactivity request; `payload` holds JSON
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct InteractionForm {
    pub payload: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlackUser {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// `block_actions` interaction payload
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub user: SlackUser,
    #[serde(default)]
    pub response_url: Option<String>,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub actions: Vec<BlockAction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectedOption {
    pub value: String,
}

/// One element interaction.
///
/// Slack sends a different object per element type; the fields the wizard
/// reads are flattened here and the shape is recovered with [`BlockAction::kind`].
#[derive(Debug, Clone, Deserialize)]
pub struct BlockAction {
    pub action_id: String,
    #[serde(rename = "type")]
    pub element_type: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub selected_option: Option<SelectedOption>,
}

impl BlockAction {
    pub fn button(action_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            action_id: action_id.into(),
            element_type: "button".to_string(),
            value: Some(value.into()),
            selected_option: None,
        }
    }

    pub fn static_select(action_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            action_id: action_id.into(),
            element_type: "static_select".to_string(),
            value: None,
            selected_option: Some(SelectedOption {
                value: value.into(),
            }),
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self.element_type.as_str() {
            "button" => ElementKind::Button,
            "static_select" => ElementKind::StaticSelect,
            _ => ElementKind::Other,
        }
    }

    /// The value carried by the element, read according to its shape
    pub fn selected_value(&self) -> Option<&str> {
        match self.kind() {
            ElementKind::Button => self.value.as_deref(),
            ElementKind::StaticSelect => self.selected_option.as_ref().map(|o| o.value.as_str()),
            ElementKind::Other => None,
        }
    }
}
