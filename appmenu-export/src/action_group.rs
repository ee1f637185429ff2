// SPDX-License-Identifier: LGPL-3.0-only
//! Collects the actions of every item of the shells connected to one group.
//!
//! Plain and check items get a dedicated action named after their label.
//! Radio items linked into one radio group share a single action whose state
//! names the active member. Items with a submenu also get a boolean-stated
//! pseudo-action reporting submenu open and close.
//!
//! The collector only tracks widget handles. Queries that depend on widget
//! state read it through the [`MenuSource`] passed in, and requests that must
//! change widget state are returned as [`SourceCommand`]s.

use std::collections::HashMap;

use appmenu_core::{ActionEvent, ActionInfo, LegacyActionGroup, MenuError, Variant};
use indexmap::IndexMap;

use crate::source::{MenuSource, WidgetId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ActionId(u32);

/// What an action refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    /// One item.
    Simple(WidgetId),
    /// Radio members keyed by state name.
    Radio(IndexMap<String, WidgetId>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub name: String,
    /// Name of the submenu open/close pseudo-action.
    pub subname: Option<String>,
    pub kind: ActionKind,
}

impl Action {
    /// State name of `widget` in a radio action.
    pub fn state_name_of(&self, widget: WidgetId) -> Option<&str> {
        match &self.kind {
            ActionKind::Radio(items) => items
                .iter()
                .find(|(_, member)| **member == widget)
                .map(|(name, _)| name.as_str()),
            ActionKind::Simple(_) => None,
        }
    }
}

/// A widget state change requested by the remote side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceCommand {
    Activate(WidgetId),
    SetActive(WidgetId, bool),
    ShowSubmenu(WidgetId, bool),
}

/// Replace every non-alphanumeric character with `-`.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

pub struct ActionGroupCollector {
    actions: HashMap<ActionId, Action>,
    /// Names and subnames alike.
    actions_by_name: IndexMap<String, ActionId>,
    names_by_radio_item: HashMap<WidgetId, String>,
    item_actions: HashMap<WidgetId, ActionId>,
    next_action: u32,
    legacy: Option<Box<dyn LegacyActionGroup>>,
    events: Vec<ActionEvent>,
}

impl std::fmt::Debug for ActionGroupCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionGroupCollector")
            .field("actions", &self.actions_by_name.keys().collect::<Vec<_>>())
            .field("legacy", &self.legacy.is_some())
            .finish()
    }
}

impl Default for ActionGroupCollector {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ActionGroupCollector {
    /// Create a collector forwarding unknown actions to `legacy`.
    pub fn new(legacy: Option<Box<dyn LegacyActionGroup>>) -> Self {
        let mut collector = Self {
            actions: HashMap::new(),
            actions_by_name: IndexMap::new(),
            names_by_radio_item: HashMap::new(),
            item_actions: HashMap::new(),
            next_action: 0,
            legacy: None,
            events: Vec::new(),
        };
        collector.set_legacy(legacy);
        collector
    }

    /// Replace the fallback group, announcing its actions as removed and added.
    pub fn set_legacy(&mut self, legacy: Option<Box<dyn LegacyActionGroup>>) {
        if let Some(old) = self.legacy.take() {
            for name in old.list_actions() {
                self.events.push(ActionEvent::Removed(name));
            }
        }
        if let Some(new) = legacy.as_ref() {
            for name in new.list_actions() {
                self.events.push(ActionEvent::Added(name));
            }
        }
        self.legacy = legacy;
    }

    pub fn take_events(&mut self) -> Vec<ActionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Whether `widget` currently has an action in this group.
    pub fn tracks(&self, widget: WidgetId) -> bool {
        self.item_actions.contains_key(&widget)
    }

    /// The action of `widget`.
    pub fn action_of(&self, widget: WidgetId) -> Option<&Action> {
        self.item_actions
            .get(&widget)
            .and_then(|id| self.actions.get(id))
    }

    /// The action registered under `name` (or as its subname).
    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions_by_name
            .get(name)
            .and_then(|id| self.actions.get(id))
    }

    /// Names of every action, the legacy group's first.
    pub fn list_actions(&self) -> Vec<String> {
        let mut names = self
            .legacy
            .as_ref()
            .map(|legacy| legacy.list_actions())
            .unwrap_or_default();
        names.extend(self.actions_by_name.keys().cloned());
        names
    }

    fn has_name(&self, name: &str) -> bool {
        self.actions_by_name.contains_key(name)
            || self
                .legacy
                .as_ref()
                .map(|legacy| legacy.has_action(name))
                .unwrap_or(false)
    }

    /// A fresh action name derived from `label`.
    fn mint_name(&self, label: Option<&str>) -> String {
        let normalized = label.filter(|label| !label.is_empty()).map(normalize_name);
        if let Some(name) = normalized.as_ref() {
            if !self.has_name(name) {
                return name.clone();
            }
        }
        (0..)
            .map(|i| match normalized.as_ref() {
                Some(name) => format!("{name}-{i}"),
                None => i.to_string(),
            })
            .find(|candidate| !self.has_name(candidate))
            .unwrap_or_default()
    }

    /// The raw label the action name of `widget` is derived from.
    ///
    /// Radio members are named after the first member that joined the group.
    fn name_source<S: MenuSource>(source: &S, widget: WidgetId) -> Option<String> {
        let named = source.radio_group(widget).last().copied().unwrap_or(widget);
        source.label(named).filter(|label| !label.is_empty())
    }

    fn state_name(items: &IndexMap<String, WidgetId>, label: Option<&str>, widget: WidgetId) -> String {
        let base = match label.filter(|label| !label.is_empty()) {
            Some(label) => normalize_name(label),
            None => format!("item-{}", widget.0),
        };
        if !items.contains_key(&base) {
            return base;
        }
        let suffixed = (0..)
            .map(|i| format!("{base}-{i}"))
            .find(|candidate| !items.contains_key(candidate));
        suffixed.unwrap_or(base)
    }

    fn insert_action(&mut self, action: Action) -> ActionId {
        let id = ActionId(self.next_action);
        self.next_action += 1;
        self.actions_by_name.insert(action.name.clone(), id);
        self.events.push(ActionEvent::Added(action.name.clone()));
        self.actions.insert(id, action);
        id
    }

    /// Create or join the action of a visible item.
    ///
    /// `label` is the exported label of the item, used for radio state names.
    pub fn connect_item<S: MenuSource>(&mut self, source: &S, widget: WidgetId, label: Option<&str>) {
        if self.tracks(widget) {
            return;
        }

        let (id, created) = if source.is_radio(widget) {
            let name = match self.names_by_radio_item.get(&widget) {
                Some(name) => name.clone(),
                None => {
                    let found = source
                        .radio_group(widget)
                        .into_iter()
                        .find_map(|member| self.names_by_radio_item.get(&member).cloned());
                    let name = match found {
                        Some(name) => name,
                        None => self.mint_name(Self::name_source(source, widget).as_deref()),
                    };
                    self.names_by_radio_item.insert(widget, name.clone());
                    name
                },
            };

            match self.actions_by_name.get(&name).copied() {
                Some(id) => (id, false),
                None => {
                    let id = self.insert_action(Action {
                        name,
                        subname: None,
                        kind: ActionKind::Radio(IndexMap::new()),
                    });
                    (id, true)
                },
            }
        } else if !source.is_separator(widget) {
            let name = self.mint_name(Self::name_source(source, widget).as_deref());
            let id = self.insert_action(Action {
                name,
                subname: None,
                kind: ActionKind::Simple(widget),
            });
            (id, true)
        } else {
            return;
        };

        if let Some(Action {
            kind: ActionKind::Radio(items),
            ..
        }) = self.actions.get_mut(&id)
        {
            let state = Self::state_name(items, label, widget);
            items.insert(state, widget);
        }
        self.item_actions.insert(widget, id);

        if created && source.submenu(widget).is_some() {
            let subname = self.mint_name(Self::name_source(source, widget).as_deref());
            self.actions_by_name.insert(subname.clone(), id);
            if let Some(action) = self.actions.get_mut(&id) {
                action.subname = Some(subname.clone());
            }
            self.events.push(ActionEvent::Added(subname));
        }
    }

    fn remove_action(&mut self, id: ActionId) {
        if let Some(action) = self.actions.remove(&id) {
            if let Some(subname) = action.subname {
                self.actions_by_name.shift_remove(&subname);
                self.events.push(ActionEvent::Removed(subname));
            }
            self.actions_by_name.shift_remove(&action.name);
            self.events.push(ActionEvent::Removed(action.name));
        }
    }

    /// Exact inverse of [`connect_item`](Self::connect_item).
    pub fn disconnect_item(&mut self, widget: WidgetId) {
        let Some(id) = self.item_actions.remove(&widget) else {
            return;
        };
        let now_empty = match self.actions.get_mut(&id).map(|action| &mut action.kind) {
            Some(ActionKind::Radio(items)) => {
                items.retain(|_, member| *member != widget);
                self.names_by_radio_item.remove(&widget);
                items.is_empty()
            },
            Some(ActionKind::Simple(_)) => true,
            None => false,
        };
        if now_empty {
            self.remove_action(id);
        }
    }

    /// Report the sensitivity of `widget` as the enabled state of its action.
    pub fn item_sensitive_changed<S: MenuSource>(&mut self, source: &S, widget: WidgetId) {
        if let Some(action) = self.action_of(widget) {
            let event = ActionEvent::EnabledChanged(action.name.clone(), source.is_sensitive(widget));
            self.events.push(event);
        }
    }

    /// Report the active state of `widget` as the state of its action.
    pub fn item_active_changed<S: MenuSource>(&mut self, source: &S, widget: WidgetId) {
        let Some(action) = self.action_of(widget) else {
            return;
        };
        let event = match &action.kind {
            ActionKind::Radio(items) => {
                let state = items
                    .iter()
                    .find(|(_, member)| source.is_active(**member))
                    .map(|(name, _)| Variant::from(name.as_str()));
                ActionEvent::StateChanged(action.name.clone(), state)
            },
            ActionKind::Simple(item) if source.is_check(*item) => {
                ActionEvent::StateChanged(action.name.clone(), Some(Variant::from(source.is_active(*item))))
            },
            ActionKind::Simple(_) => return,
        };
        self.events.push(event);
    }

    /// Describe the action `name`.
    pub fn query_action<S: MenuSource>(&self, source: &S, name: &str) -> Option<ActionInfo> {
        let Some(action) = self.action(name) else {
            return self.legacy.as_ref().and_then(|legacy| legacy.query_action(name));
        };

        if action.subname.as_deref() == Some(name) {
            return Some(ActionInfo {
                enabled: true,
                parameter_type: None,
                state_type: Some("b".into()),
                state_hint: Some(Variant::Tuple(vec![Variant::from(false), Variant::from(true)])),
                state: Some(Variant::from(true)),
            });
        }

        let info = match &action.kind {
            ActionKind::Radio(items) => ActionInfo {
                enabled: items.values().any(|&member| source.is_sensitive(member)),
                parameter_type: Some("s".into()),
                state_type: Some("s".into()),
                state_hint: Some(Variant::Array(
                    items.keys().map(|key| Variant::from(key.as_str())).collect(),
                )),
                state: items
                    .iter()
                    .find(|(_, member)| source.is_active(**member))
                    .map(|(key, _)| Variant::from(key.as_str())),
            },
            ActionKind::Simple(item) => {
                let item = *item;
                let check = source.is_check(item);
                let radio_drawn = source.draw_as_radio(item);
                ActionInfo {
                    enabled: source.is_sensitive(item),
                    parameter_type: radio_drawn.then(|| "s".into()),
                    state_type: if radio_drawn {
                        Some("s".into())
                    } else if check {
                        Some("b".into())
                    } else {
                        None
                    },
                    state_hint: match (check, radio_drawn) {
                        (true, true) => Some(Variant::Array(vec![Variant::from(action.name.as_str())])),
                        (true, false) => Some(Variant::Tuple(vec![Variant::from(false), Variant::from(true)])),
                        _ => None,
                    },
                    state: match (check, radio_drawn) {
                        (true, true) if source.is_active(item) => Some(Variant::from(action.name.as_str())),
                        (true, true) => Some(Variant::from("")),
                        (true, false) => Some(Variant::from(source.is_active(item))),
                        _ => None,
                    },
                }
            },
        };
        Some(info)
    }

    /// Resolve a remote state change request.
    pub fn change_action_state<S: MenuSource>(
        &mut self,
        source: &S,
        name: &str,
        value: Option<&Variant>,
    ) -> Result<Vec<SourceCommand>, MenuError> {
        let Some(action) = self.action(name) else {
            return self.forward_state(name, value);
        };

        if action.subname.as_deref() == Some(name) {
            let shown = value.and_then(Variant::as_bool).ok_or_else(|| MenuError::InvalidState {
                action: name.to_string(),
                expected: "b".into(),
            })?;
            let item = match &action.kind {
                ActionKind::Simple(item) => Some(*item),
                ActionKind::Radio(items) => items.values().next().copied(),
            };
            return Ok(item.map(|item| SourceCommand::ShowSubmenu(item, shown)).into_iter().collect());
        }

        match &action.kind {
            ActionKind::Radio(items) => {
                let state = match value {
                    Some(value) => Some(value.as_str().ok_or_else(|| MenuError::InvalidState {
                        action: name.to_string(),
                        expected: "s".into(),
                    })?),
                    None => None,
                };
                let target = state
                    .and_then(|state| items.get(state).copied())
                    .filter(|&item| source.is_check(item));
                if state.is_some() && target.is_none() {
                    log::warn!("Unknown state {:?} for action '{}'", state, name);
                }
                match target {
                    Some(item) => Ok(vec![SourceCommand::SetActive(item, true)]),
                    None => Ok(items
                        .values()
                        .filter(|&&item| source.is_check(item))
                        .map(|&item| SourceCommand::SetActive(item, false))
                        .collect()),
                }
            },
            ActionKind::Simple(item) if source.is_check(*item) => {
                let active = value.and_then(Variant::as_bool).ok_or_else(|| MenuError::InvalidState {
                    action: name.to_string(),
                    expected: "b".into(),
                })?;
                Ok(vec![SourceCommand::SetActive(*item, active)])
            },
            ActionKind::Simple(_) => Ok(Vec::new()),
        }
    }

    fn forward_state(&mut self, name: &str, value: Option<&Variant>) -> Result<Vec<SourceCommand>, MenuError> {
        match (self.legacy.as_mut(), value) {
            (Some(legacy), Some(value)) => {
                legacy.change_action_state(name, value);
                Ok(Vec::new())
            },
            (Some(_), None) => Ok(Vec::new()),
            (None, _) => {
                log::warn!("No action '{}' to change the state of", name);
                Err(MenuError::UnknownAction(name.to_string()))
            },
        }
    }

    /// Resolve a remote activation request.
    pub fn activate_action(
        &mut self,
        name: &str,
        parameter: Option<&Variant>,
    ) -> Result<Vec<SourceCommand>, MenuError> {
        let resolved = self
            .action(name)
            .filter(|action| action.name == name)
            .map(|action| (action.name.clone(), action.kind.clone()));

        match resolved {
            Some((action_name, ActionKind::Radio(items))) => {
                let state = parameter.and_then(Variant::as_str).ok_or_else(|| MenuError::InvalidState {
                    action: action_name.clone(),
                    expected: "s".into(),
                })?;
                let commands = items
                    .get(state)
                    .map(|&item| SourceCommand::Activate(item))
                    .into_iter()
                    .collect();
                self.events.push(ActionEvent::StateChanged(action_name, Some(Variant::from(state))));
                Ok(commands)
            },
            Some((_, ActionKind::Simple(item))) => Ok(vec![SourceCommand::Activate(item)]),
            None => match self.legacy.as_mut() {
                Some(legacy) => {
                    legacy.activate_action(name, parameter);
                    Ok(Vec::new())
                },
                None => {
                    log::warn!("No action '{}' to activate", name);
                    Err(MenuError::UnknownAction(name.to_string()))
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{ItemSpec, MenuTree};

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("_Save As..."), "-Save-As---");
        assert_eq!(normalize_name("Zoom 100%"), "Zoom-100-");
    }

    #[test]
    fn test_name_collisions_get_suffixes() {
        let mut tree = MenuTree::new();
        let bar = tree.new_container();
        let first = tree.append(bar, ItemSpec::normal("Open"));
        let second = tree.append(bar, ItemSpec::normal("Open"));
        let unnamed = tree.append(bar, ItemSpec::normal(""));

        let mut collector = ActionGroupCollector::default();
        for widget in [first, second, unnamed] {
            collector.connect_item(&tree, widget, None);
        }

        assert_eq!(collector.action_of(first).map(|a| a.name.as_str()), Some("Open"));
        assert_eq!(collector.action_of(second).map(|a| a.name.as_str()), Some("Open-0"));
        assert_eq!(collector.action_of(unnamed).map(|a| a.name.as_str()), Some("0"));
    }

    #[test]
    fn test_separators_have_no_action() {
        let mut tree = MenuTree::new();
        let bar = tree.new_container();
        let separator = tree.append(bar, ItemSpec::separator());

        let mut collector = ActionGroupCollector::default();
        collector.connect_item(&tree, separator, None);
        assert!(!collector.tracks(separator));
        assert!(collector.take_events().is_empty());
    }

    #[test]
    fn test_submenu_pseudo_action_lifecycle() {
        let mut tree = MenuTree::new();
        let bar = tree.new_container();
        let menu = tree.new_container();
        let file = tree.append(bar, ItemSpec::normal("File"));
        tree.set_submenu(file, Some(menu));

        let mut collector = ActionGroupCollector::default();
        collector.connect_item(&tree, file, None);
        assert_eq!(
            collector.take_events(),
            vec![ActionEvent::Added("File".into()), ActionEvent::Added("File-0".into())]
        );

        let info = collector.query_action(&tree, "File-0").unwrap();
        assert_eq!(info.state_type.as_deref(), Some("b"));

        assert_eq!(
            collector.change_action_state(&tree, "File-0", Some(&Variant::from(true))),
            Ok(vec![SourceCommand::ShowSubmenu(file, true)])
        );

        collector.disconnect_item(file);
        assert_eq!(
            collector.take_events(),
            vec![ActionEvent::Removed("File-0".into()), ActionEvent::Removed("File".into())]
        );
        assert!(collector.list_actions().is_empty());
    }

    #[test]
    fn test_radio_members_share_one_action() {
        let mut tree = MenuTree::new();
        let bar = tree.new_container();
        let group = tree.new_radio_group();
        let small = tree.append(bar, ItemSpec::radio("Small", group).active(true));
        let large = tree.append(bar, ItemSpec::radio("Large", group));

        let mut collector = ActionGroupCollector::default();
        collector.connect_item(&tree, large, Some("Large"));
        collector.connect_item(&tree, small, Some("Small"));

        let action = collector.action_of(small).unwrap();
        assert_eq!(action.name, "Small");
        assert_eq!(action.state_name_of(large), Some("Large"));
        assert_eq!(collector.list_actions(), vec!["Small".to_string()]);

        let info = collector.query_action(&tree, "Small").unwrap();
        assert_eq!(info.state, Some(Variant::from("Small")));

        collector.disconnect_item(small);
        assert!(collector.action("Small").is_some());
        collector.disconnect_item(large);
        assert!(collector.action("Small").is_none());
    }

    #[test]
    fn test_radio_names_kept_only_for_connected_members() {
        let mut tree = MenuTree::new();
        let bar = tree.new_container();
        let group = tree.new_radio_group();
        let small = tree.append(bar, ItemSpec::radio("Small", group).active(true));
        tree.append(bar, ItemSpec::radio("Large", group));

        let mut collector = ActionGroupCollector::default();
        collector.connect_item(&tree, small, Some("Small"));
        assert_eq!(collector.names_by_radio_item.len(), 1);

        collector.disconnect_item(small);
        assert!(collector.names_by_radio_item.is_empty());
        assert!(collector.list_actions().is_empty());
    }

    #[test]
    fn test_unknown_action_without_legacy_group() {
        let tree = MenuTree::new();
        let mut collector = ActionGroupCollector::default();
        assert_eq!(
            collector.activate_action("missing", None),
            Err(MenuError::UnknownAction("missing".into()))
        );
        assert!(collector.query_action(&tree, "missing").is_none());
    }
}
