// SPDX-License-Identifier: LGPL-3.0-only
//! The import engine.
//!
//! [`Importer`] never talks to the bus itself. Operations that need remote
//! data hand out requests ([`FetchRequest`], [`ItemFetchRequest`],
//! [`RemoteCall`]); the caller performs them and feeds the replies back
//! through the matching `complete_*` method. [`ImportSession`](crate::ImportSession)
//! does exactly that against a [`LayoutTransport`](crate::LayoutTransport).

use std::collections::BTreeMap;

use indexmap::IndexMap;
use log::{debug, warn};

use appmenu_core::{ActionEvent, ActionInfo, MenuError, PendingChanges, UpdateMode, Variant};
use appmenu_services::ImportPolicy;

use crate::actions::ImportActions;
use crate::item::{action_name, ActionType, PropsChange, RemoteItem};
use crate::layout::{LayoutNode, PROPERTY_FILTER};
use crate::model::{ModelId, RemoteModel};
use crate::reconcile::reconcile;
use crate::transport::TransportError;
use crate::view::{ImportModel, ImportView};

/// Remote id of the root node of every menu.
pub const ROOT_ID: i32 = 0;

/// Fetch the children of `parent_id` into `model`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub model: ModelId,
    pub parent_id: i32,
    pub depth: i32,
    pub properties: &'static [&'static str],
}

/// Refetch the properties of the single node `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFetchRequest {
    pub model: ModelId,
    pub id: i32,
    pub depth: i32,
    pub properties: &'static [&'static str],
}

/// Work triggered by a `LayoutUpdated` signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    Layout(FetchRequest),
    Item(ItemFetchRequest),
}

/// A call to send to the remote menu.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    Event {
        id: i32,
        event: &'static str,
        data: Variant,
        timestamp: u32,
    },
    AboutToShow {
        id: i32,
    },
}

impl RemoteCall {
    fn event(id: i32, event: &'static str, timestamp: u32) -> Self {
        RemoteCall::Event {
            id,
            event,
            data: Variant::Int32(0),
            timestamp,
        }
    }
}

/// Notifications produced by one operation and how to emit them.
#[derive(Debug)]
pub struct ChangeSet {
    pub changes: PendingChanges<ImportModel>,
    pub mode: UpdateMode,
}

impl ChangeSet {
    fn new(mode: UpdateMode) -> Self {
        Self {
            changes: PendingChanges::new(),
            mode,
        }
    }
}

/// Result of applying a fetched layout.
#[derive(Debug)]
pub struct LayoutOutcome {
    pub changes: PendingChanges<ImportModel>,
    pub mode: UpdateMode,
    /// Freshly linked submenu models worth fetching ahead of time.
    pub preload: Vec<ModelId>,
    /// Follow-up fetch for an update requested while this one was running.
    pub retry: Option<FetchRequest>,
}

/// Reply handling for an opened submenu.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmenuOpened {
    /// Layout refresh of the submenu, when one is due.
    pub fetch: Option<FetchRequest>,
    /// The `opened` event to send.
    pub event: RemoteCall,
}

/// Arena of reconciled menu levels and their actions.
#[derive(Debug)]
pub struct Importer {
    policy: ImportPolicy,
    models: BTreeMap<ModelId, RemoteModel>,
    next_model: u32,
    serials: u64,
    root: ModelId,
    actions: ImportActions,
}

impl Importer {
    pub fn new(policy: ImportPolicy) -> Self {
        let mut importer = Self {
            policy,
            models: BTreeMap::new(),
            next_model: 0,
            serials: 0,
            root: ModelId(0),
            actions: ImportActions::default(),
        };
        importer.root = importer.insert_model(ROOT_ID);
        importer
    }

    fn insert_model(&mut self, parent_id: i32) -> ModelId {
        let id = ModelId(self.next_model);
        self.next_model += 1;
        self.serials += 1;
        self.models.insert(id, RemoteModel::new(id, parent_id, self.serials));
        id
    }

    pub fn policy(&self) -> &ImportPolicy {
        &self.policy
    }

    pub fn root(&self) -> ModelId {
        self.root
    }

    pub fn model(&self, id: ModelId) -> Option<&RemoteModel> {
        self.models.get(&id)
    }

    pub fn models(&self) -> impl Iterator<Item = &RemoteModel> {
        self.models.values()
    }

    /// The model mirroring the children of remote node `parent_id`.
    pub fn model_for_parent(&self, parent_id: i32) -> Option<ModelId> {
        self.models
            .values()
            .find(|model| model.parent_id == parent_id)
            .map(|model| model.id)
    }

    pub fn view(&self, model: ImportModel) -> ImportView<'_> {
        ImportView { importer: self, model }
    }

    pub fn actions(&self) -> &ImportActions {
        &self.actions
    }

    /// Ask for a fresh layout of `model`.
    ///
    /// While a fetch of the same model is outstanding no second one is issued;
    /// the update is remembered and handed out as
    /// [`LayoutOutcome::retry`] when the outstanding fetch completes.
    pub fn update_layout(&mut self, model: ModelId) -> Option<FetchRequest> {
        let remote = self.models.get_mut(&model)?;
        if remote.layout_update_in_progress {
            remote.layout_update_required = true;
            return None;
        }
        remote.layout_update_in_progress = true;
        remote.layout_update_required = false;
        Some(FetchRequest {
            model,
            parent_id: remote.parent_id,
            depth: 1,
            properties: PROPERTY_FILTER,
        })
    }

    /// Apply the reply to a [`FetchRequest`].
    pub fn complete_layout(
        &mut self,
        model: ModelId,
        result: Result<(u32, LayoutNode), TransportError>,
    ) -> LayoutOutcome {
        let mut outcome = LayoutOutcome {
            changes: PendingChanges::new(),
            mode: UpdateMode::Full,
            preload: Vec::new(),
            retry: None,
        };
        let Some(remote) = self.models.get_mut(&model) else {
            debug!("dropping layout for released model {:?}", model);
            return outcome;
        };
        remote.layout_update_in_progress = false;

        match result {
            Ok((revision, layout)) => {
                remote.current_revision = revision;
                let reconciled = reconcile(remote, &layout, &self.policy, &mut self.serials);
                outcome.changes = reconciled.changes;
                self.release_items(reconciled.released);
                outcome.preload = self.attach_submenus(model);
                self.sync_actions(model);
            },
            Err(TransportError::Cancelled) => {
                debug!("layout fetch of {:?} cancelled", model);
                return outcome;
            },
            Err(err) => warn!("failed to fetch layout of {:?}: {}", model, err),
        }

        let required = self
            .models
            .get(&model)
            .is_some_and(|remote| remote.layout_update_required);
        if required {
            outcome.retry = self.update_layout(model);
        }
        outcome
    }

    /// Handle `LayoutUpdated(revision, parent)`.
    ///
    /// The model mirroring the children of `parent` refetches its layout when
    /// `revision` is newer. The model holding node `parent` as an item
    /// refetches that node's properties.
    pub fn layout_updated(&mut self, revision: u32, parent: i32) -> Vec<FollowUp> {
        let mut follow_ups = Vec::new();

        if let Some(model) = self.model_for_parent(parent) {
            let newer = match self.models.get_mut(&model) {
                Some(remote) if revision > remote.current_revision => {
                    debug!(
                        "layout of {} changed: revision {} -> {}",
                        parent, remote.current_revision, revision
                    );
                    remote.current_revision = revision;
                    true
                },
                _ => false,
            };
            if newer {
                follow_ups.extend(self.update_layout(model).map(FollowUp::Layout));
            }
        }

        let owner = self
            .models
            .values()
            .find(|model| model.find(parent).is_some())
            .map(|model| model.id);
        if let Some(owner) = owner {
            follow_ups.push(FollowUp::Item(ItemFetchRequest {
                model: owner,
                id: parent,
                depth: 0,
                properties: PROPERTY_FILTER,
            }));
        }
        follow_ups
    }

    /// Handle the remote bus name appearing or vanishing.
    ///
    /// A vanished menu keeps its last known layout. A new owner numbers its
    /// revisions afresh, so every level forgets its revision and the root
    /// level is fetched again.
    pub fn name_owner_changed(&mut self, present: bool) -> Option<FetchRequest> {
        if !present {
            debug!("remote menu vanished");
            return None;
        }
        for remote in self.models.values_mut() {
            remote.current_revision = 0;
        }
        self.update_layout(self.root)
    }

    /// Apply the reply to an [`ItemFetchRequest`].
    pub fn complete_item_fetch(
        &mut self,
        request: &ItemFetchRequest,
        result: Result<(u32, LayoutNode), TransportError>,
    ) -> ChangeSet {
        let mut set = ChangeSet::new(UpdateMode::Deferred);
        match result {
            Ok((_, node)) => {
                self.apply_props(request.id, &mut set.changes, |item| item.merge_props(&node.properties));
            },
            Err(TransportError::Cancelled) => debug!("property fetch of {} cancelled", request.id),
            Err(err) => warn!("failed to fetch properties of {}: {}", request.id, err),
        }
        set
    }

    /// Handle `ItemsPropertiesUpdated(updated, removed)`.
    pub fn items_properties_updated(
        &mut self,
        updated: &[(i32, IndexMap<String, Variant>)],
        removed: &[(i32, Vec<String>)],
    ) -> ChangeSet {
        let mut set = ChangeSet::new(UpdateMode::Deferred);
        for (id, properties) in updated {
            self.apply_props(*id, &mut set.changes, |item| item.update_props(properties));
        }
        for (id, names) in removed {
            self.apply_props(*id, &mut set.changes, |item| item.remove_props(names));
        }
        set
    }

    fn apply_props(
        &mut self,
        id: i32,
        changes: &mut PendingChanges<ImportModel>,
        apply: impl FnOnce(&mut RemoteItem) -> PropsChange,
    ) {
        let Some(remote) = self.models.values_mut().find(|model| model.find(id).is_some()) else {
            return;
        };
        if remote.layout_update_in_progress {
            return;
        }
        let model = remote.id;
        let Some(item) = remote.find_mut(id) else {
            return;
        };
        let change = apply(item);
        if change.attributes {
            changes.add(
                ImportModel::Section(model, item.section_num),
                item.place as usize,
                1,
                1,
            );
        }
        if change.enabled || change.toggled {
            self.sync_actions(model);
        }
    }

    /// Link a child model to every submenu node that lacks one.
    fn attach_submenus(&mut self, model: ModelId) -> Vec<ModelId> {
        let Some(remote) = self.models.get(&model) else {
            return Vec::new();
        };
        let pending: Vec<i32> = remote
            .items
            .iter()
            .filter(|item| item.action_type == ActionType::Submenu && item.submenu.is_none())
            .map(|item| item.id)
            .collect();

        let mut attached = Vec::with_capacity(pending.len());
        for id in pending {
            let child = self.insert_model(id);
            if let Some(item) = self.models.get_mut(&model).and_then(|remote| remote.find_mut(id)) {
                item.submenu = Some(child);
            }
            attached.push(child);
        }
        if self.policy.preload_delay.is_zero() {
            attached.clear();
        }
        attached
    }

    fn release_items(&mut self, items: Vec<RemoteItem>) {
        for child in items.into_iter().filter_map(|item| item.submenu) {
            self.remove_model(child);
        }
    }

    /// Drop `model` and every submenu model below it.
    pub(crate) fn remove_model(&mut self, model: ModelId) {
        let Some(remote) = self.models.remove(&model) else {
            return;
        };
        self.actions.remove_model(model);
        for child in remote.submenus() {
            self.remove_model(child);
        }
    }

    fn sync_actions(&mut self, model: ModelId) {
        if let Some(remote) = self.models.get(&model) {
            self.actions.sync_model(model, remote.items.iter());
        }
    }

    fn set_toggled(&mut self, model: ModelId, id: i32, toggled: bool) {
        if let Some(item) = self.models.get_mut(&model).and_then(|remote| remote.find_mut(id)) {
            item.toggled = toggled;
        }
        self.sync_actions(model);
    }

    pub fn list_actions(&self) -> Vec<String> {
        self.actions.names()
    }

    pub fn query_action(&self, name: &str) -> Option<ActionInfo> {
        self.actions.get(name).map(|action| action.info())
    }

    /// Action lifecycle events since the last call.
    pub fn take_action_events(&mut self) -> Vec<ActionEvent> {
        self.actions.take_events()
    }

    /// Activate an imported action.
    pub fn activate_action(&mut self, name: &str) -> Result<Vec<RemoteCall>, MenuError> {
        self.activate_at(name, 0)
    }

    /// Handle `ItemActivationRequested(id, timestamp)`.
    pub fn item_activation_requested(&mut self, id: i32, timestamp: u32) -> Result<Vec<RemoteCall>, MenuError> {
        self.activate_at(&action_name(id), timestamp)
    }

    fn activate_at(&mut self, name: &str, timestamp: u32) -> Result<Vec<RemoteCall>, MenuError> {
        let action = self
            .actions
            .get(name)
            .cloned()
            .ok_or_else(|| MenuError::UnknownAction(name.to_string()))?;

        match action.kind {
            ActionType::Submenu => {
                let open = !action.state.as_ref().and_then(Variant::as_bool).unwrap_or(false);
                self.change_action_state(name, &Variant::from(open))
            },
            ActionType::Checkmark => {
                let toggled = action.state.as_ref().and_then(Variant::as_bool).unwrap_or(false);
                self.set_toggled(action.model, action.item_id, !toggled);
                Ok(vec![RemoteCall::event(action.item_id, "clicked", timestamp)])
            },
            ActionType::Normal | ActionType::Radio | ActionType::Section => {
                Ok(vec![RemoteCall::event(action.item_id, "clicked", timestamp)])
            },
        }
    }

    /// Request a state change of an imported action.
    ///
    /// Opening a submenu yields an `AboutToShow` call; pass its reply to
    /// [`submenu_opened`](Self::submenu_opened).
    pub fn change_action_state(&mut self, name: &str, value: &Variant) -> Result<Vec<RemoteCall>, MenuError> {
        let action = self
            .actions
            .get(name)
            .cloned()
            .ok_or_else(|| MenuError::UnknownAction(name.to_string()))?;
        let invalid = |expected: &str| MenuError::InvalidState {
            action: name.to_string(),
            expected: expected.to_string(),
        };

        match action.kind {
            ActionType::Radio => {
                let state = value.as_str().ok_or_else(|| invalid("s"))?;
                if state == crate::item::RADIO_SELECTED {
                    Ok(vec![RemoteCall::event(action.item_id, "clicked", 0)])
                } else {
                    Ok(Vec::new())
                }
            },
            ActionType::Checkmark => {
                let toggled = value.as_bool().ok_or_else(|| invalid("b"))?;
                if action.state == Some(Variant::from(toggled)) {
                    return Ok(Vec::new());
                }
                self.set_toggled(action.model, action.item_id, toggled);
                Ok(vec![RemoteCall::event(action.item_id, "clicked", 0)])
            },
            ActionType::Submenu => {
                let open = value.as_bool().ok_or_else(|| invalid("b"))?;
                self.set_toggled(action.model, action.item_id, open);
                if open {
                    Ok(vec![RemoteCall::AboutToShow { id: action.item_id }])
                } else {
                    Ok(vec![RemoteCall::event(action.item_id, "closed", 0)])
                }
            },
            ActionType::Normal | ActionType::Section => Err(invalid("")),
        }
    }

    /// Continue opening submenu `id` once `AboutToShow` returned `need_update`.
    pub fn submenu_opened(&mut self, id: i32, need_update: bool) -> SubmenuOpened {
        let fetch = match self.model_for_parent(id) {
            Some(child) => {
                let populated = self.models.get(&child).is_some_and(RemoteModel::is_populated);
                if need_update || !populated {
                    self.update_layout(child)
                } else {
                    None
                }
            },
            None => None,
        };
        SubmenuOpened {
            fetch,
            event: RemoteCall::event(id, "opened", 0),
        }
    }
}
