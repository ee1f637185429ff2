// SPDX-License-Identifier: LGPL-3.0-only
//! Actions derived from imported items.

use indexmap::IndexMap;

use appmenu_core::{ActionEvent, ActionInfo, Variant};

use crate::item::{ActionType, RemoteItem, RADIO_SELECTED, RADIO_UNSELECTED};
use crate::model::ModelId;

/// One action exported for an imported item.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportAction {
    pub(crate) model: ModelId,
    pub(crate) item_id: i32,
    pub(crate) kind: ActionType,
    pub(crate) enabled: bool,
    pub(crate) state: Option<Variant>,
}

impl ImportAction {
    fn for_item(model: ModelId, item: &RemoteItem) -> Option<(String, Self)> {
        let name = item.action_name()?;
        let state = match item.action_type {
            ActionType::Checkmark | ActionType::Submenu => Some(Variant::from(item.toggled)),
            ActionType::Radio => Some(Variant::from(radio_state(item.toggled))),
            ActionType::Normal | ActionType::Section => None,
        };
        let enabled = match item.action_type {
            ActionType::Submenu => true,
            _ => item.enabled,
        };
        Some((
            name,
            Self {
                model,
                item_id: item.id,
                kind: item.action_type,
                enabled,
                state,
            },
        ))
    }

    pub fn model(&self) -> ModelId {
        self.model
    }

    pub fn item_id(&self) -> i32 {
        self.item_id
    }

    pub fn kind(&self) -> ActionType {
        self.kind
    }

    pub fn info(&self) -> ActionInfo {
        match (self.kind, &self.state) {
            (ActionType::Radio, Some(state)) => ActionInfo::stateful(self.enabled, Some("s"), state.clone()),
            (_, Some(state)) => ActionInfo::stateful(self.enabled, None, state.clone()),
            (_, None) => ActionInfo::stateless(self.enabled),
        }
    }
}

pub(crate) fn radio_state(selected: bool) -> &'static str {
    if selected {
        RADIO_SELECTED
    } else {
        RADIO_UNSELECTED
    }
}

/// The `dbusmenu` action group of one importer.
#[derive(Debug, Default)]
pub struct ImportActions {
    actions: IndexMap<String, ImportAction>,
    events: Vec<ActionEvent>,
}

impl ImportActions {
    pub fn get(&self, name: &str) -> Option<&ImportAction> {
        self.actions.get(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.actions.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Bring the actions of `model` in line with its items.
    pub(crate) fn sync_model<'a>(&mut self, model: ModelId, items: impl IntoIterator<Item = &'a RemoteItem>) {
        let wanted: IndexMap<String, ImportAction> = items
            .into_iter()
            .filter_map(|item| ImportAction::for_item(model, item))
            .collect();

        let stale: Vec<String> = self
            .actions
            .iter()
            .filter(|(name, action)| action.model == model && !wanted.contains_key(*name))
            .map(|(name, _)| name.clone())
            .collect();
        for name in stale {
            self.actions.shift_remove(&name);
            self.events.push(ActionEvent::Removed(name));
        }

        for (name, action) in wanted {
            match self.actions.get_mut(&name) {
                Some(current) => {
                    if current.enabled != action.enabled {
                        self.events.push(ActionEvent::EnabledChanged(name.clone(), action.enabled));
                    }
                    if current.state != action.state {
                        self.events.push(ActionEvent::StateChanged(name.clone(), action.state.clone()));
                    }
                    *current = action;
                },
                None => {
                    self.actions.insert(name.clone(), action);
                    self.events.push(ActionEvent::Added(name));
                },
            }
        }
    }

    /// Drop every action of `model`.
    pub(crate) fn remove_model(&mut self, model: ModelId) {
        self.sync_model(model, std::iter::empty());
    }

    pub(crate) fn take_events(&mut self) -> Vec<ActionEvent> {
        std::mem::take(&mut self.events)
    }
}
