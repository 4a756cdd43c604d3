//! Slack messages for each wizard state.
//!
//! Everything here is a pure function of its arguments. Elements whose click
//! advances the wizard carry the full re-encoded `BuildParameters` as their
//! value, since that value is the only state the next step receives.

use std::collections::HashSet;
use std::fmt::Display;

use super::action::{action_id, Step};
use super::codec::{self, BUTTON_VALUE_LIMIT, OPTION_VALUE_LIMIT};
use super::models::{Branches, BuildParameters, BuildVersions, Deployment, Versions};
use crate::slack::message::{
    Attachment, Block, ButtonStyle, Element, ResponseType, SelectOption, SlackMessage, Text,
};

/// Slack rejects static selects with more options than this
pub const MAX_SELECT_OPTIONS: usize = 100;

/// Per-wizard rendering settings
#[derive(Debug, Clone)]
pub struct Presentation {
    pub title: String,
    pub action_prefix: String,
    pub response_type: ResponseType,
}

fn header(title: &str) -> Block {
    Block::Header {
        text: Text::plain(title),
    }
}

fn markdown(text: impl Into<String>) -> Block {
    Block::Section {
        text: Some(Text::mrkdwn(text)),
        fields: Vec::new(),
    }
}

fn button(label: impl Into<String>, action_id: String, value: String, primary: bool) -> Element {
    if value.len() > BUTTON_VALUE_LIMIT {
        tracing::warn!(action_id = %action_id, len = value.len(), "Button value exceeds Slack limit");
    }
    Element::Button {
        text: Text::plain(label),
        action_id,
        value,
        style: primary.then_some(ButtonStyle::Primary),
    }
}

fn or_unknown<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "?".to_string())
}

/// `current(build) -> version(build)` with `?` for what is not chosen yet
fn version_line(params: &BuildParameters) -> String {
    let target = match &params.version {
        Some(v) => v.clone(),
        None => "?.?.?".to_string(),
    };
    format!(
        "*Version*: `{}({})` -> `{}({})`",
        or_unknown(params.current_version.as_deref()),
        or_unknown(params.current_build_version),
        target,
        or_unknown(params.build_version),
    )
}

fn summary(params: &BuildParameters) -> String {
    format!(
        "*Deployment*: {}\n*Branch*: {}\n{}",
        params.deployment.name,
        or_unknown(params.branch.as_deref()),
        version_line(params)
    )
}

fn step_message(p: &Presentation, blocks: Vec<Block>) -> SlackMessage {
    SlackMessage {
        response_type: p.response_type,
        attachments: vec![Attachment {
            blocks,
            ..Default::default()
        }],
        ..Default::default()
    }
}

/// First step: one button per destination, valued with its id
pub fn deployment_select(p: &Presentation, destinations: &[Deployment]) -> SlackMessage {
    let elements = destinations
        .iter()
        .map(|d| {
            button(
                &d.name,
                action_id(&p.action_prefix, Step::DeploymentSelect, &d.id),
                d.id.clone(),
                false,
            )
        })
        .collect();

    step_message(
        p,
        vec![
            header(&p.title),
            markdown("*Deployment*:"),
            Block::Actions { elements },
        ],
    )
}

/// Default branch as the primary button, every branch in a select
pub fn branch_select(p: &Presentation, branches: &Branches, params: &BuildParameters) -> SlackMessage {
    let default_button = button(
        &branches.default,
        action_id(&p.action_prefix, Step::BranchSelect, "button"),
        codec::encode(&params.clone().with_branch(&branches.default)),
        true,
    );

    if branches.branches.len() > MAX_SELECT_OPTIONS {
        tracing::warn!(
            count = branches.branches.len(),
            shown = MAX_SELECT_OPTIONS,
            "Too many branches for a select, truncating"
        );
    }

    // Slack rejects the whole message if any option value is too long
    let options: Vec<SelectOption> = branches
        .branches
        .iter()
        .filter_map(|branch| {
            let value = codec::encode(&params.clone().with_branch(branch));
            if value.len() > OPTION_VALUE_LIMIT {
                tracing::warn!(branch = %branch, len = value.len(), "Branch token exceeds Slack option limit, leaving it out");
                return None;
            }
            Some(SelectOption {
                text: Text::plain(branch),
                value,
            })
        })
        .take(MAX_SELECT_OPTIONS)
        .collect();

    let mut elements = vec![default_button];
    if !options.is_empty() {
        elements.push(Element::StaticSelect {
            placeholder: Text::plain("Other branch..."),
            action_id: action_id(&p.action_prefix, Step::BranchSelect, "static_select"),
            options,
        });
    }

    step_message(
        p,
        vec![
            header(&p.title),
            markdown(format!(
                "*Deployment*: {}\n*Branch*:",
                params.deployment.name
            )),
            Block::Actions { elements },
        ],
    )
}

/// Current version as the primary button, then each bump candidate
pub fn version_select(p: &Presentation, versions: &Versions, params: &BuildParameters) -> SlackMessage {
    let mut seen = HashSet::new();
    let elements = std::iter::once(&versions.current)
        .chain(versions.updated_versions.iter())
        .filter(|v| seen.insert(*v))
        .enumerate()
        .map(|(i, v)| {
            button(
                v,
                action_id(&p.action_prefix, Step::VersionSelect, v),
                codec::encode(&params.clone().with_version(v)),
                i == 0,
            )
        })
        .collect();

    step_message(
        p,
        vec![
            header(&p.title),
            markdown(summary(params)),
            Block::Actions { elements },
        ],
    )
}

/// Next build number as the primary button, then the other candidates
pub fn build_version_select(
    p: &Presentation,
    builds: &BuildVersions,
    params: &BuildParameters,
) -> SlackMessage {
    let elements = std::iter::once(builds.next)
        .chain(builds.updated_versions.iter().copied())
        .enumerate()
        .map(|(i, n)| {
            button(
                n.to_string(),
                action_id(&p.action_prefix, Step::BuildVersionSelect, &n.to_string()),
                codec::encode(&params.clone().with_build_version(n)),
                i == 0,
            )
        })
        .collect();

    step_message(
        p,
        vec![
            header(&p.title),
            markdown(summary(params)),
            Block::Actions { elements },
        ],
    )
}

/// Full summary with Deploy / Cancel
pub fn build_confirm(p: &Presentation, params: &BuildParameters) -> SlackMessage {
    let token = codec::encode(params);
    let elements = vec![
        button(
            "Deploy",
            action_id(&p.action_prefix, Step::ConfirmOk, ""),
            token.clone(),
            true,
        ),
        button(
            "Cancel",
            action_id(&p.action_prefix, Step::ConfirmCancel, ""),
            token,
            false,
        ),
    ];

    step_message(
        p,
        vec![
            header(&p.title),
            markdown(summary(params)),
            Block::Actions { elements },
        ],
    )
}

/// Posted once the destination accepted the build
pub fn build_started(p: &Presentation, user_id: &str, params: &BuildParameters) -> SlackMessage {
    let fields = vec![
        Text::mrkdwn(format!("*Deployment:*\n{}", params.deployment.name)),
        Text::mrkdwn(format!("*Branch:*\n{}", or_unknown(params.branch.as_deref()))),
        Text::mrkdwn(format!(
            "*Version:*\n{}({})",
            or_unknown(params.version.as_deref()),
            or_unknown(params.build_version)
        )),
        Text::mrkdwn(format!(
            "*Current version:*\n{}({})",
            or_unknown(params.current_version.as_deref()),
            or_unknown(params.current_build_version)
        )),
    ];

    SlackMessage {
        response_type: p.response_type,
        text: Some(format!("*{} Started!*", p.title)),
        mrkdwn: Some(true),
        attachments: vec![Attachment {
            blocks: vec![
                markdown(format!("triggered by <@{user_id}>")),
                Block::Section { text: None, fields },
            ],
            color: Some("good".to_string()),
            ..Default::default()
        }],
    }
}

pub fn build_cancelled(p: &Presentation) -> SlackMessage {
    SlackMessage {
        response_type: p.response_type,
        text: Some(format!("{} Cancelled.", p.title)),
        ..Default::default()
    }
}

/// Uniform failure notice with the error detail
pub fn failure(p: &Presentation, error: &dyn Display) -> SlackMessage {
    SlackMessage {
        response_type: p.response_type,
        text: Some(format!("*{} Failed!*", p.title)),
        mrkdwn: Some(true),
        attachments: vec![Attachment {
            text: Some(error.to_string()),
            color: Some("danger".to_string()),
            ..Default::default()
        }],
    }
}

pub fn invalid_parameter(p: &Presentation) -> SlackMessage {
    SlackMessage {
        response_type: p.response_type,
        text: Some("Invalid Parameter :(".to_string()),
        ..Default::default()
    }
}
