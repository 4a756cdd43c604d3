//! Outbound Slack message model (the subset of Block Kit the bot renders).

use serde::{Deserialize, Serialize};

/// Where a response is visible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    #[default]
    InChannel,
    Ephemeral,
}

/// Text composition object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Text {
    PlainText { text: String, emoji: bool },
    Mrkdwn { text: String },
}

impl Text {
    pub fn plain(text: impl Into<String>) -> Self {
        Text::PlainText {
            text: text.into(),
            emoji: true,
        }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Text::Mrkdwn { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Text::PlainText { text, .. } | Text::Mrkdwn { text } => text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    Primary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub text: Text,
    pub value: String,
}

/// Interactive element inside an actions block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Button {
        text: Text,
        action_id: String,
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<ButtonStyle>,
    },
    StaticSelect {
        placeholder: Text,
        action_id: String,
        options: Vec<SelectOption>,
    },
}

impl Element {
    pub fn action_id(&self) -> &str {
        match self {
            Element::Button { action_id, .. } | Element::StaticSelect { action_id, .. } => {
                action_id
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header {
        text: Text,
    },
    Section {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<Text>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        fields: Vec<Text>,
    },
    Actions {
        elements: Vec<Element>,
    },
}

/// Legacy attachment, used for its colored side bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Attachment {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Body posted to a `response_url`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SlackMessage {
    pub response_type: ResponseType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mrkdwn: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl SlackMessage {
    /// Every interactive element in the message, in render order
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.attachments
            .iter()
            .flat_map(|a| a.blocks.iter())
            .flat_map(|b| match b {
                Block::Actions { elements } => elements.as_slice(),
                _ => &[][..],
            })
    }

    /// Find an element by its action id
    pub fn element(&self, action_id: &str) -> Option<&Element> {
        self.elements().find(|e| e.action_id() == action_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_serializes_as_block_kit() {
        let button = Element::Button {
            text: Text::plain("Deploy"),
            action_id: "x_build_confirm_ok-action".to_string(),
            value: "abc".to_string(),
            style: Some(ButtonStyle::Primary),
        };
        let json = serde_json::to_value(&button).unwrap();
        assert_eq!(json["type"], "button");
        assert_eq!(json["style"], "primary");
        assert_eq!(json["text"]["type"], "plain_text");
        assert_eq!(json["text"]["emoji"], true);
    }

    #[test]
    fn test_message_skips_empty_fields() {
        let message = SlackMessage {
            response_type: ResponseType::Ephemeral,
            text: Some("hi".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json, serde_json::json!({"response_type": "ephemeral", "text": "hi"}));
    }

    #[test]
    fn test_section_without_fields() {
        let block = Block::Section {
            text: Some(Text::mrkdwn("*Deployment*:")),
            fields: Vec::new(),
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "section", "text": {"type": "mrkdwn", "text": "*Deployment*:"}})
        );
    }
}
