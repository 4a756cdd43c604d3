//! Wizard domain types.
//!
//! `BuildParameters` is the only state a wizard run has. It is never stored
//! server-side; every step receives it back from the clicked element and
//! hands an extended copy to the next message.

use serde::{Deserialize, Serialize};

/// The destination picked at the first step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub id: String,
    pub name: String,
}

/// How far a `BuildParameters` value has progressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// Only the deployment is known
    Deployment,
    /// Branch chosen
    Branch,
    /// Currently deployed version looked up for the branch
    Current,
    /// Target version chosen
    Version,
    /// Target build number chosen, ready to confirm
    BuildVersion,
}

/// Accumulated wizard state.
///
/// Fields fill in strict step order. The `with_*` constructors are the only
/// way to extend a value and they consume `self`, so a step never mutates the
/// value an older message still carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildParameters {
    pub deployment: Deployment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_build_version: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_version: Option<u64>,
}

impl BuildParameters {
    /// Start a run for the chosen destination
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            deployment: Deployment {
                id: id.into(),
                name: name.into(),
            },
            branch: None,
            current_version: None,
            current_build_version: None,
            version: None,
            build_version: None,
        }
    }

    pub fn with_branch(self, branch: impl Into<String>) -> Self {
        Self {
            branch: Some(branch.into()),
            current_version: None,
            current_build_version: None,
            version: None,
            build_version: None,
            ..self
        }
    }

    pub fn with_current(self, version: impl Into<String>, build_version: u64) -> Self {
        Self {
            current_version: Some(version.into()),
            current_build_version: Some(build_version),
            version: None,
            build_version: None,
            ..self
        }
    }

    pub fn with_version(self, version: impl Into<String>) -> Self {
        Self {
            version: Some(version.into()),
            build_version: None,
            ..self
        }
    }

    pub fn with_build_version(self, build_version: u64) -> Self {
        Self {
            build_version: Some(build_version),
            ..self
        }
    }

    /// The stage this value has reached, or `None` if the fields are not
    /// populated in step order (a later field without an earlier one).
    pub fn stage(&self) -> Option<Stage> {
        let current = match (&self.current_version, self.current_build_version) {
            (Some(_), Some(_)) => true,
            (None, None) => false,
            _ => return None,
        };
        let filled = [
            self.branch.is_some(),
            current,
            self.version.is_some(),
            self.build_version.is_some(),
        ];

        // once a field is missing, every later one must be missing too
        let reached = filled.iter().take_while(|f| **f).count();
        if filled[reached..].iter().any(|f| *f) {
            return None;
        }

        Some(match reached {
            0 => Stage::Deployment,
            1 => Stage::Branch,
            2 => Stage::Current,
            3 => Stage::Version,
            _ => Stage::BuildVersion,
        })
    }

    /// Whether this value has reached at least `stage`
    pub fn has_reached(&self, stage: Stage) -> bool {
        self.stage().is_some_and(|s| s >= stage)
    }
}

/// Snapshot of selectable branches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branches {
    /// Offered as the primary choice regardless of its position in `branches`
    pub default: String,
    pub branches: Vec<String>,
}

/// Semantic version candidates derived from `current`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versions {
    pub current: String,
    pub updated_versions: Vec<String>,
}

/// Build number candidates derived from `current`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildVersions {
    pub current: u64,
    pub next: u64,
    /// Ascending, no duplicates, never contains `next`
    pub updated_versions: Vec<u64>,
}

/// What the version lookup reports for a branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentVersion {
    pub version: String,
    pub build_version: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> BuildParameters {
        BuildParameters::new("d1", "prod")
            .with_branch("main")
            .with_current("2.3.1", 4)
            .with_version("2.4.0")
            .with_build_version(5)
    }

    #[test]
    fn test_stage_progression() {
        let params = BuildParameters::new("d1", "prod");
        assert_eq!(params.stage(), Some(Stage::Deployment));

        let params = params.with_branch("main");
        assert_eq!(params.stage(), Some(Stage::Branch));

        let params = params.with_current("2.3.1", 4);
        assert_eq!(params.stage(), Some(Stage::Current));

        let params = params.with_version("2.4.0");
        assert_eq!(params.stage(), Some(Stage::Version));

        let params = params.with_build_version(5);
        assert_eq!(params.stage(), Some(Stage::BuildVersion));
    }

    #[test]
    fn test_extending_keeps_earlier_fields() {
        let params = complete();
        assert_eq!(params.deployment.id, "d1");
        assert_eq!(params.deployment.name, "prod");
        assert_eq!(params.branch.as_deref(), Some("main"));
        assert_eq!(params.current_version.as_deref(), Some("2.3.1"));
        assert_eq!(params.current_build_version, Some(4));
        assert_eq!(params.version.as_deref(), Some("2.4.0"));
        assert_eq!(params.build_version, Some(5));
    }

    #[test]
    fn test_rechoosing_branch_clears_later_fields() {
        let params = complete().with_branch("develop");
        assert_eq!(params.stage(), Some(Stage::Branch));
        assert!(params.version.is_none());
        assert!(params.build_version.is_none());
    }

    #[test]
    fn test_out_of_order_fields_have_no_stage() {
        let mut params = BuildParameters::new("d1", "prod");
        params.version = Some("1.0.0".to_string());
        assert_eq!(params.stage(), None);

        let mut params = BuildParameters::new("d1", "prod").with_branch("main");
        params.current_version = Some("1.0.0".to_string());
        assert_eq!(params.stage(), None);
    }

    #[test]
    fn test_has_reached() {
        let params = BuildParameters::new("d1", "prod").with_branch("main");
        assert!(params.has_reached(Stage::Deployment));
        assert!(params.has_reached(Stage::Branch));
        assert!(!params.has_reached(Stage::Current));
    }
}
