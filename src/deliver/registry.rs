//! Routing between configured wizards.

use std::sync::Arc;

use super::engine::{WizardEngine, WizardEvent};
use crate::slack::payload::BlockAction;

/// All wizards served by this process, looked up by command or action id
#[derive(Clone, Default)]
pub struct WizardRegistry {
    wizards: Vec<Arc<WizardEngine>>,
}

impl WizardRegistry {
    pub fn new(wizards: Vec<WizardEngine>) -> Self {
        Self {
            wizards: wizards.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.wizards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wizards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<WizardEngine>> {
        self.wizards.iter()
    }

    /// The wizard started by slash command `command`
    pub fn by_command(&self, command: &str) -> Option<Arc<WizardEngine>> {
        self.wizards
            .iter()
            .find(|w| w.command() == command)
            .cloned()
    }

    /// The wizard that rendered `action`, with the event it maps to
    pub fn route_action(
        &self,
        user_id: &str,
        action: BlockAction,
    ) -> Option<(Arc<WizardEngine>, WizardEvent)> {
        self.wizards.iter().find_map(|w| {
            w.route_action(user_id, action.clone())
                .map(|event| (w.clone(), event))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::deliver::action::Step;
    use crate::deliver::blocks::Presentation;
    use crate::deliver::engine::WizardSettings;
    use crate::deliver::models::CurrentVersion;
    use crate::deliver::ports::SourceControl;
    use crate::slack::message::ResponseType;
    use async_trait::async_trait;

    struct NoSource;

    #[async_trait]
    impl SourceControl for NoSource {
        async fn fetch_branches(&self) -> Result<Vec<String>, ApiError> {
            Ok(Vec::new())
        }

        async fn fetch_version(&self, _branch: &str) -> Result<CurrentVersion, ApiError> {
            Err(ApiError::not_configured("test"))
        }
    }

    fn wizard(command: &str, prefix: &str) -> WizardEngine {
        WizardEngine::new(
            WizardSettings {
                command: command.to_string(),
                default_branch: "main".to_string(),
                presentation: Presentation {
                    title: command.to_string(),
                    action_prefix: prefix.to_string(),
                    response_type: ResponseType::Ephemeral,
                },
            },
            Arc::new(NoSource),
            Vec::new(),
        )
    }

    #[test]
    fn test_by_command() {
        let registry = WizardRegistry::new(vec![
            wizard("/deliver-ios", "ios"),
            wizard("/deliver-android", "android"),
        ]);
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.by_command("/deliver-android").unwrap().action_prefix(),
            "android"
        );
        assert!(registry.by_command("/other").is_none());
    }

    #[test]
    fn test_route_action_by_prefix() {
        let registry = WizardRegistry::new(vec![wizard("/a", "deliver"), wizard("/b", "deliver-ios")]);

        let action = BlockAction::button("deliver-ios_version_select_1.0.0-action", "tok");
        let (engine, event) = registry.route_action("U1", action).unwrap();
        assert_eq!(engine.command(), "/b");
        match event {
            WizardEvent::Action { step, .. } => assert_eq!(step, Step::VersionSelect),
            other => panic!("unexpected {other:?}"),
        }

        let action = BlockAction::button("nobody_version_select_1.0.0-action", "tok");
        assert!(registry.route_action("U1", action).is_none());
    }
}
