// SPDX-License-Identifier: LGPL-3.0-only
//! Action group contract.
//!
//! Menu items reference actions by name through the `action` attribute. An
//! action group answers queries about those actions and reports lifecycle
//! changes as [`ActionEvent`]s.

use crate::variant::Variant;

/// Description of a single action as returned by `query_action`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActionInfo {
    /// Whether the action may currently be activated.
    pub enabled: bool,
    /// Signature of the activation parameter, `None` for parameterless actions.
    pub parameter_type: Option<String>,
    /// Signature of the state, `None` for stateless actions.
    pub state_type: Option<String>,
    /// Optional hint about the allowed states.
    pub state_hint: Option<Variant>,
    /// Current state.
    pub state: Option<Variant>,
}

impl ActionInfo {
    /// A plain enabled action without parameter or state.
    pub fn stateless(enabled: bool) -> Self {
        Self {
            enabled,
            ..Default::default()
        }
    }

    /// A stateful action whose state has `state`'s type.
    pub fn stateful(enabled: bool, parameter_type: Option<&str>, state: Variant) -> Self {
        Self {
            enabled,
            parameter_type: parameter_type.map(str::to_owned),
            state_type: Some(state.type_string()),
            state_hint: None,
            state: Some(state),
        }
    }
}

/// Action lifecycle notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionEvent {
    Added(String),
    Removed(String),
    EnabledChanged(String, bool),
    StateChanged(String, Option<Variant>),
}

impl ActionEvent {
    /// The name of the action the event refers to.
    pub fn action_name(&self) -> &str {
        match self {
            ActionEvent::Added(name)
            | ActionEvent::Removed(name)
            | ActionEvent::EnabledChanged(name, _)
            | ActionEvent::StateChanged(name, _) => name,
        }
    }
}

/// A pre-existing action group that an exporter forwards unknown actions to.
///
/// Toolkits carrying their own actions alongside menu items plug them in here.
pub trait LegacyActionGroup: Send {
    fn has_action(&self, name: &str) -> bool;

    fn list_actions(&self) -> Vec<String>;

    fn query_action(&self, name: &str) -> Option<ActionInfo>;

    fn activate_action(&mut self, name: &str, parameter: Option<&Variant>);

    fn change_action_state(&mut self, name: &str, value: &Variant);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stateful_info_derives_state_type() {
        let info = ActionInfo::stateful(true, Some("s"), Variant::from("+"));
        assert_eq!(info.state_type.as_deref(), Some("s"));
        assert_eq!(info.parameter_type.as_deref(), Some("s"));
        assert!(ActionInfo::stateless(false).state.is_none());
    }

    #[test]
    fn test_event_action_name() {
        let event = ActionEvent::StateChanged("open".into(), Some(Variant::from(true)));
        assert_eq!(event.action_name(), "open");
    }
}
