//! Action identifiers and the element shapes each step accepts.
//!
//! Every interactive element the wizard renders gets an id of the form
//! `<prefix>_<step>_<qualifier>-action`. The engine routes purely on that id,
//! so there is no routing table to keep in sync with posted messages.

use std::fmt;

/// Wizard steps that can be triggered by a block action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    DeploymentSelect,
    BranchSelect,
    VersionSelect,
    BuildVersionSelect,
    ConfirmOk,
    ConfirmCancel,
}

impl Step {
    /// The `<step>` segment of the action id
    pub fn segment(&self) -> &'static str {
        match self {
            Step::DeploymentSelect => "deployment_select",
            Step::BranchSelect => "branch_select",
            Step::VersionSelect => "version_select",
            Step::BuildVersionSelect => "build_version_select",
            Step::ConfirmOk | Step::ConfirmCancel => "build_confirm",
        }
    }

    /// Element shapes this step knows how to read a value from
    pub fn accepts(&self, kind: ElementKind) -> bool {
        match self {
            Step::BranchSelect | Step::BuildVersionSelect => {
                matches!(kind, ElementKind::Button | ElementKind::StaticSelect)
            }
            Step::DeploymentSelect
            | Step::VersionSelect
            | Step::ConfirmOk
            | Step::ConfirmCancel => kind == ElementKind::Button,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::ConfirmOk => write!(f, "build_confirm_ok"),
            Step::ConfirmCancel => write!(f, "build_confirm_cancel"),
            other => write!(f, "{}", other.segment()),
        }
    }
}

/// Shape of the element that produced a block action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Button,
    StaticSelect,
    Other,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Button => write!(f, "button"),
            ElementKind::StaticSelect => write!(f, "static_select"),
            ElementKind::Other => write!(f, "unsupported element"),
        }
    }
}

/// Build the id for an element of `step`
pub fn action_id(prefix: &str, step: Step, qualifier: &str) -> String {
    match step {
        Step::ConfirmOk => format!("{prefix}_build_confirm_ok-action"),
        Step::ConfirmCancel => format!("{prefix}_build_confirm_cancel-action"),
        _ => format!("{prefix}_{}_{qualifier}-action", step.segment()),
    }
}

/// Parse an action id rendered for the wizard with `prefix`.
///
/// Returns `None` for ids that belong to another prefix or do not follow the
/// grammar.
pub fn parse_action_id(prefix: &str, id: &str) -> Option<Step> {
    let rest = id.strip_prefix(prefix)?.strip_prefix('_')?;
    let rest = rest.strip_suffix("-action")?;

    match rest {
        "build_confirm_ok" => return Some(Step::ConfirmOk),
        "build_confirm_cancel" => return Some(Step::ConfirmCancel),
        _ => {}
    }

    // build_version_select must be tried before version_select
    [
        Step::DeploymentSelect,
        Step::BranchSelect,
        Step::BuildVersionSelect,
        Step::VersionSelect,
    ]
    .into_iter()
    .find(|step| {
        rest.strip_prefix(step.segment())
            .and_then(|q| q.strip_prefix('_'))
            .is_some_and(|qualifier| !qualifier.is_empty())
    })
}
