// SPDX-License-Identifier: LGPL-3.0-only
//! Projects a [`MenuSource`] into sectioned menu models.
//!
//! The exporter owns every [`ShellModel`] and every [`ActionGroupCollector`].
//! The host reports widget changes through [`Exporter::handle_item_event`] and
//! [`Exporter::handle_container_insert`]; the resulting structural and action
//! notifications are queued and drained with [`Exporter::take_events`].

use std::collections::{BTreeMap, HashMap};

use appmenu_core::model::{
    ATTRIBUTE_ACCEL, ATTRIBUTE_ACCEL_TEXT, ATTRIBUTE_ACTION, ATTRIBUTE_ICON, ATTRIBUTE_LABEL,
    ATTRIBUTE_SUBMENU_ACTION, ATTRIBUTE_TARGET, LINK_SECTION, LINK_SUBMENU,
};
use appmenu_core::{
    ActionEvent, ActionInfo, Attributes, ItemsChanged, LegacyActionGroup, Links, MenuError, MenuModel, Variant,
};
use appmenu_services::ExportPolicy;

use crate::action_group::{ActionGroupCollector, SourceCommand};
use crate::shell::{SectionId, ShellModel};
use crate::source::{Accel, ContainerId, MenuSource, WidgetId};

/// Handle of a shell owned by an [`Exporter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShellId(pub(crate) u32);

/// Handle of an action group owned by an [`Exporter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub(crate) u32);

/// An exported menu model: a shell, or one section of a shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportModel {
    Shell(ShellId),
    Section(ShellId, SectionId),
}

/// A notification produced by the exporter.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportEvent {
    ItemsChanged(ItemsChanged<ExportModel>),
    Action { group: GroupId, event: ActionEvent },
}

/// Widget properties the exporter reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemProperty {
    Visible,
    Sensitive,
    Label,
    UseUnderline,
    AccelPath,
    Active,
    Parent,
    Submenu,
}

impl ItemProperty {
    /// Map a canonical property name such as `use-underline`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "visible" => Some(Self::Visible),
            "sensitive" => Some(Self::Sensitive),
            "label" => Some(Self::Label),
            "use-underline" => Some(Self::UseUnderline),
            "accel-path" => Some(Self::AccelPath),
            "active" => Some(Self::Active),
            "parent" => Some(Self::Parent),
            "submenu" => Some(Self::Submenu),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Sensitive => "sensitive",
            Self::Label => "label",
            Self::UseUnderline => "use-underline",
            Self::AccelPath => "accel-path",
            Self::Active => "active",
            Self::Parent => "parent",
            Self::Submenu => "submenu",
        }
    }
}

fn changed(model: ExportModel, position: usize, removed: usize, added: usize) -> ExportEvent {
    ExportEvent::ItemsChanged(ItemsChanged::new(model, position, removed, added))
}

/// The export engine.
pub struct Exporter<S: MenuSource> {
    source: S,
    policy: ExportPolicy,
    shells: BTreeMap<ShellId, ShellModel>,
    next_shell: u32,
    groups: HashMap<GroupId, ActionGroupCollector>,
    next_group: u32,
    events: Vec<ExportEvent>,
}

impl<S: MenuSource> Exporter<S> {
    pub fn new(source: S, policy: ExportPolicy) -> Self {
        Self {
            source,
            policy,
            shells: BTreeMap::new(),
            next_shell: 0,
            groups: HashMap::new(),
            next_group: 0,
            events: Vec::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the widgets.
    ///
    /// Every change made here must be reported back through
    /// [`handle_item_event`](Self::handle_item_event) or
    /// [`handle_container_insert`](Self::handle_container_insert).
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn policy(&self) -> &ExportPolicy {
        &self.policy
    }

    /// Drain queued notifications in emission order.
    pub fn take_events(&mut self) -> Vec<ExportEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn shell(&self, shell: ShellId) -> Option<&ShellModel> {
        self.shells.get(&shell)
    }

    fn allocate_shell(&mut self, container: ContainerId, has_mnemonics: bool) -> ShellId {
        let id = ShellId(self.next_shell);
        self.next_shell += 1;
        self.shells
            .insert(id, ShellModel::build(&self.source, container, has_mnemonics));
        id
    }

    /// Start exporting `container`, typically a menu bar.
    pub fn create_shell(&mut self, container: ContainerId) -> ShellId {
        self.allocate_shell(container, self.policy.mnemonics)
    }

    /// Stop exporting `shell` and every submenu shell below it.
    pub fn remove_shell(&mut self, shell: ShellId) {
        self.disconnect_shell(shell);
        self.drop_shell(shell);
    }

    fn drop_shell(&mut self, shell: ShellId) {
        let Some(model) = self.shells.remove(&shell) else {
            return;
        };
        for item in model.items {
            if let Some(child) = item.child_shell {
                self.drop_shell(child);
            }
        }
    }

    /// Create an action group, optionally backed by a legacy group for
    /// actions no item provides.
    pub fn create_group(&mut self, legacy: Option<Box<dyn LegacyActionGroup>>) -> GroupId {
        let id = GroupId(self.next_group);
        self.next_group += 1;
        self.groups.insert(id, ActionGroupCollector::new(legacy));
        self.drain_group(id);
        id
    }

    /// Drop a group, disconnecting every shell connected to it.
    pub fn remove_group(&mut self, group: GroupId) {
        let connected: Vec<ShellId> = self
            .shells
            .iter()
            .filter(|(_, model)| model.action_group == Some(group))
            .map(|(&id, _)| id)
            .collect();
        for shell in connected {
            self.disconnect_shell(shell);
        }
        self.groups.remove(&group);
    }

    /// Replace the legacy fallback of `group`.
    pub fn set_legacy_group(&mut self, group: GroupId, legacy: Option<Box<dyn LegacyActionGroup>>) {
        if let Some(collector) = self.groups.get_mut(&group) {
            collector.set_legacy(legacy);
            self.drain_group(group);
        }
    }

    pub fn group(&self, group: GroupId) -> Option<&ActionGroupCollector> {
        self.groups.get(&group)
    }

    fn drain_group(&mut self, group: GroupId) {
        if let Some(collector) = self.groups.get_mut(&group) {
            self.events.extend(
                collector
                    .take_events()
                    .into_iter()
                    .map(|event| ExportEvent::Action { group, event }),
            );
        }
    }

    /// Connect the visible items of `shell`, and of its submenu shells, to `group`.
    pub fn connect_shell(&mut self, group: GroupId, shell: ShellId) {
        if !self.groups.contains_key(&group) {
            return;
        }
        let Some(model) = self.shells.get(&shell) else {
            return;
        };
        let current = model.action_group;
        match current {
            Some(current) if current == group => return,
            Some(_) => self.disconnect_shell(shell),
            None => {},
        }

        let Some(model) = self.shells.get_mut(&shell) else {
            return;
        };
        model.action_group = Some(group);
        let visible = model.partition.visible().to_vec();
        for index in visible {
            self.connect_item(group, shell, index);
            if let Some(child) = self.valid_child_shell(shell, index) {
                self.connect_shell(group, child);
            }
        }
    }

    /// Inverse of [`connect_shell`](Self::connect_shell).
    pub fn disconnect_shell(&mut self, shell: ShellId) {
        let Some(model) = self.shells.get_mut(&shell) else {
            return;
        };
        let Some(group) = model.action_group.take() else {
            return;
        };
        let visible = model.partition.visible().to_vec();
        for index in visible {
            if let Some(child) = self.valid_child_shell(shell, index) {
                self.disconnect_shell(child);
            }
            self.disconnect_item(group, shell, index);
        }
    }

    fn valid_child_shell(&self, shell: ShellId, index: u32) -> Option<ShellId> {
        self.shells
            .get(&shell)
            .and_then(|model| model.item(index))
            .filter(|item| item.child_shell_valid)
            .and_then(|item| item.child_shell)
    }

    fn connect_item(&mut self, group: GroupId, shell: ShellId, index: u32) {
        let Some(model) = self.shells.get(&shell) else {
            return;
        };
        let Some(item) = model.item(index) else {
            return;
        };
        let widget = item.widget;
        debug_assert!(
            self.groups
                .iter()
                .all(|(&id, collector)| id == group || !collector.tracks(widget)),
            "item {widget:?} is owned by two action groups"
        );
        let Some(collector) = self.groups.get_mut(&group) else {
            return;
        };
        let label = item.label(&self.source, model.has_mnemonics);
        collector.connect_item(&self.source, widget, label);
        self.drain_group(group);
    }

    fn disconnect_item(&mut self, group: GroupId, shell: ShellId, index: u32) {
        let Some(widget) = self
            .shells
            .get(&shell)
            .and_then(|model| model.item(index))
            .map(|item| item.widget)
        else {
            return;
        };
        if let Some(collector) = self.groups.get_mut(&group) {
            collector.disconnect_item(widget);
            self.drain_group(group);
        }
    }

    /// Every `(shell, item index)` currently wrapping `widget`.
    fn locate_widget(&self, widget: WidgetId) -> Vec<(ShellId, u32)> {
        self.shells
            .iter()
            .filter_map(|(&id, model)| model.index_of(widget).map(|index| (id, index)))
            .collect()
    }

    /// React to a property change of `widget`.
    pub fn handle_item_event(&mut self, widget: WidgetId, property: ItemProperty) {
        for (shell, index) in self.locate_widget(widget) {
            match property {
                ItemProperty::Visible => self.visibility_changed(shell, index),
                ItemProperty::Sensitive => {
                    if let Some(group) = self.shell_group(shell) {
                        if let Some(collector) = self.groups.get_mut(&group) {
                            collector.item_sensitive_changed(&self.source, widget);
                        }
                        self.drain_group(group);
                    }
                },
                ItemProperty::Label | ItemProperty::UseUnderline => {
                    if let Some(item) = self.shells.get_mut(&shell).and_then(|model| model.item_mut(index)) {
                        item.invalidate_label();
                    }
                    self.update_item(shell, index);
                },
                ItemProperty::AccelPath => self.update_item(shell, index),
                ItemProperty::Active => {
                    if let Some(group) = self.shell_group(shell) {
                        if let Some(collector) = self.groups.get_mut(&group) {
                            collector.item_active_changed(&self.source, widget);
                        }
                        self.drain_group(group);
                    }
                },
                ItemProperty::Parent => {
                    let container = self.shells.get(&shell).map(|model| model.container);
                    if self.source.parent(widget) != container {
                        self.remove_item(shell, index);
                    }
                },
                ItemProperty::Submenu => self.submenu_changed(shell, index),
            }
        }
    }

    /// React to `widget` being added to `container`.
    ///
    /// `position` is the index of the new child; `None` or an index past the
    /// end appends.
    pub fn handle_container_insert(&mut self, container: ContainerId, widget: WidgetId, position: Option<usize>) {
        let shells: Vec<ShellId> = self
            .shells
            .iter()
            .filter(|(_, model)| model.container == container)
            .map(|(&id, _)| id)
            .collect();
        for shell in shells {
            let Some(model) = self.shells.get_mut(&shell) else {
                continue;
            };
            let len = model.items.len();
            let position = position.filter(|&position| position <= len).unwrap_or(len);
            model.insert_item(position, widget);
            if self.source.is_visible(widget) {
                self.show_item(shell, position as u32);
            }
        }
    }

    fn shell_group(&self, shell: ShellId) -> Option<GroupId> {
        self.shells.get(&shell).and_then(|model| model.action_group)
    }

    fn visibility_changed(&mut self, shell: ShellId, index: u32) {
        let Some(model) = self.shells.get(&shell) else {
            return;
        };
        let Some(item) = model.item(index) else {
            return;
        };
        let visible = self.source.is_visible(item.widget);
        match (model.partition.is_visible(index), visible) {
            (false, true) => self.show_item(shell, index),
            (true, false) => self.hide_item(shell, index),
            _ => {},
        }
    }

    fn show_item(&mut self, shell: ShellId, index: u32) {
        let Some(model) = self.shells.get_mut(&shell) else {
            return;
        };
        let Some(widget) = model.item(index).map(|item| item.widget) else {
            return;
        };
        let visible_position = model.partition.insert_visible(index);

        if self.source.is_separator(widget) {
            let k = model.partition.section_of(index);
            let position = visible_position - model.partition.begin(k);
            model.partition.insert_separator(index);
            let removed = model.partition.count(k + 1);
            let split = model.section_id(k);
            model.insert_section(k + 1);
            model.check_invariants();

            if let (Some(split), true) = (split, removed > 0) {
                self.events
                    .push(changed(ExportModel::Section(shell, split), position, removed, 0));
            }
            self.events.push(changed(ExportModel::Shell(shell), k + 1, 0, 1));
        } else {
            let Some((k, position)) = model.partition.locate(index) else {
                return;
            };
            if let Some(section) = model.section_id(k) {
                self.events
                    .push(changed(ExportModel::Section(shell, section), position, 0, 1));
            }
            if let Some(group) = model.action_group {
                self.connect_item(group, shell, index);
                if let Some(child) = self.valid_child_shell(shell, index) {
                    self.connect_shell(group, child);
                }
            }
        }
    }

    fn hide_item(&mut self, shell: ShellId, index: u32) {
        if let Some(group) = self.shell_group(shell) {
            if let Some(child) = self.valid_child_shell(shell, index) {
                self.disconnect_shell(child);
            }
            self.disconnect_item(group, shell, index);
        }

        let Some(model) = self.shells.get_mut(&shell) else {
            return;
        };
        if let Some(k) = model.partition.separator_position(index) {
            let position = model.partition.count(k);
            let added = model.partition.count(k + 1);
            let merged = model.section_id(k);
            model.remove_section(k + 1);
            model.partition.remove_separator(index);
            model.partition.remove_visible(index);
            model.check_invariants();

            self.events.push(changed(ExportModel::Shell(shell), k + 1, 1, 0));
            if let (Some(merged), true) = (merged, added > 0) {
                self.events
                    .push(changed(ExportModel::Section(shell, merged), position, 0, added));
            }
        } else {
            let Some((k, position)) = model.partition.locate(index) else {
                return;
            };
            let section = model.section_id(k);
            model.partition.remove_visible(index);
            if let Some(section) = section {
                self.events
                    .push(changed(ExportModel::Section(shell, section), position, 1, 0));
            }
        }
    }

    fn remove_item(&mut self, shell: ShellId, index: u32) {
        let visible = self
            .shells
            .get(&shell)
            .map(|model| model.partition.is_visible(index))
            .unwrap_or(false);
        if visible {
            self.hide_item(shell, index);
        }
        let Some(model) = self.shells.get_mut(&shell) else {
            return;
        };
        let node = model.remove_item(index);
        if let Some(child) = node.child_shell {
            self.remove_shell(child);
        }
    }

    /// Announce a one-for-one replacement of a visible item.
    fn update_item(&mut self, shell: ShellId, index: u32) {
        let Some(model) = self.shells.get(&shell) else {
            return;
        };
        if let Some((k, position)) = model.partition.locate(index) {
            if let Some(section) = model.section_id(k) {
                self.events
                    .push(changed(ExportModel::Section(shell, section), position, 1, 1));
            }
        }
    }

    /// Drop a stale child shell and rebuild the item's action.
    ///
    /// Without a built child shell the previous submenu is unknown, so every
    /// change event is taken as a change of identity.
    fn submenu_changed(&mut self, shell: ShellId, index: u32) {
        let Some(model) = self.shells.get(&shell) else {
            return;
        };
        let Some(item) = model.item(index) else {
            return;
        };
        if item.child_shell_valid {
            let cached = item
                .child_shell
                .and_then(|child| self.shells.get(&child))
                .map(|child| child.container);
            if self.source.submenu(item.widget) == cached {
                return;
            }
        }
        let group = model.action_group;
        let visible = model.partition.is_visible(index);

        let stale = self
            .shells
            .get_mut(&shell)
            .and_then(|model| model.item_mut(index))
            .and_then(|item| {
                item.child_shell_valid = false;
                item.child_shell.take()
            });
        if let Some(stale) = stale {
            self.remove_shell(stale);
        }
        if let (Some(group), true) = (group, visible) {
            self.disconnect_item(group, shell, index);
            self.connect_item(group, shell, index);
        }
        self.update_item(shell, index);
    }

    /// The submenu shell of an item, built on first use.
    fn child_shell(&mut self, shell: ShellId, index: u32) -> Option<ShellId> {
        let model = self.shells.get(&shell)?;
        let item = model.item(index)?;
        if item.child_shell_valid {
            return item.child_shell;
        }
        let submenu = self.source.submenu(item.widget);
        let has_mnemonics = model.has_mnemonics;
        let group = model.action_group;
        let visible = model.partition.is_visible(index);

        let child = submenu.map(|container| self.allocate_shell(container, has_mnemonics));
        let item = self.shells.get_mut(&shell)?.item_mut(index)?;
        item.child_shell = child;
        item.child_shell_valid = true;

        if let (Some(child), Some(group), true) = (child, group, visible) {
            self.connect_shell(group, child);
        }
        child
    }

    /// Switch mnemonic handling for the labels of `shell`.
    pub fn set_has_mnemonics(&mut self, shell: ShellId, has_mnemonics: bool) {
        let Some(model) = self.shells.get_mut(&shell) else {
            return;
        };
        model.has_mnemonics = has_mnemonics;
        for item in model.items.iter_mut() {
            item.invalidate_label();
        }
        let count = model.items.len() as u32;
        for index in 0..count {
            self.update_item(shell, index);
        }
    }

    /// Number of items in an exported model.
    pub fn item_count(&self, model: ExportModel) -> usize {
        match model {
            ExportModel::Shell(shell) => self
                .shells
                .get(&shell)
                .map(|model| model.partition.section_count())
                .unwrap_or(0),
            ExportModel::Section(shell, section) => self
                .shells
                .get(&shell)
                .and_then(|model| {
                    let k = model.section_index(section)?;
                    Some(model.partition.count(k))
                })
                .unwrap_or(0),
        }
    }

    pub fn section_count(&self, shell: ShellId) -> usize {
        self.item_count(ExportModel::Shell(shell))
    }

    fn section_item(&self, shell: ShellId, section: SectionId, position: usize) -> Option<(&ShellModel, u32)> {
        let model = self.shells.get(&shell)?;
        let k = model.section_index(section)?;
        let index = model.partition.item_at(k, position)?;
        Some((model, index))
    }

    /// Attributes of the item at `position` in `model`.
    pub fn item_attributes(&self, model: ExportModel, position: usize) -> Attributes {
        let mut attributes = Attributes::new();
        let ExportModel::Section(shell, section) = model else {
            return attributes;
        };
        let Some((shell_model, index)) = self.section_item(shell, section, position) else {
            return attributes;
        };
        let Some(item) = shell_model.item(index) else {
            return attributes;
        };
        let widget = item.widget;

        if let Some(label) = item.label(&self.source, shell_model.has_mnemonics) {
            attributes.insert(ATTRIBUTE_LABEL.into(), Variant::from(label));
        }
        if let Some(icon) = self.source.icon(widget) {
            attributes.insert(ATTRIBUTE_ICON.into(), icon.serialize());
        }

        let action = shell_model
            .action_group
            .and_then(|group| self.groups.get(&group))
            .and_then(|collector| collector.action_of(widget));
        if let Some(action) = action {
            attributes.insert(ATTRIBUTE_ACTION.into(), Variant::from(self.policy.qualify(&action.name)));
            if let Some(state) = action.state_name_of(widget) {
                attributes.insert(ATTRIBUTE_TARGET.into(), Variant::from(state));
            } else if self.source.draw_as_radio(widget) {
                attributes.insert(ATTRIBUTE_TARGET.into(), Variant::from(action.name.as_str()));
            }
            if let Some(subname) = &action.subname {
                attributes.insert(ATTRIBUTE_SUBMENU_ACTION.into(), Variant::from(self.policy.qualify(subname)));
            }
        }

        match self.source.accel(widget) {
            Some(Accel::Name(accel)) => {
                attributes.insert(ATTRIBUTE_ACCEL.into(), Variant::from(accel));
            },
            Some(Accel::Text(text)) => {
                attributes.insert(ATTRIBUTE_ACCEL_TEXT.into(), Variant::from(text));
            },
            None => {},
        }
        attributes
    }

    /// Links of the item at `position` in `model`.
    ///
    /// Reading the links of an item with a submenu builds its shell.
    pub fn item_links(&mut self, model: ExportModel, position: usize) -> Links<ExportModel> {
        let mut links = Links::new();
        match model {
            ExportModel::Shell(shell) => {
                if let Some(section) = self.shells.get(&shell).and_then(|model| model.section_id(position)) {
                    links.insert(LINK_SECTION.into(), ExportModel::Section(shell, section));
                }
            },
            ExportModel::Section(shell, section) => {
                let index = self.section_item(shell, section, position).map(|(_, index)| index);
                if let Some(child) = index.and_then(|index| self.child_shell(shell, index)) {
                    links.insert(LINK_SUBMENU.into(), ExportModel::Shell(child));
                }
            },
        }
        links
    }

    /// A [`MenuModel`] view of one exported model.
    pub fn view(&mut self, model: ExportModel) -> ExportView<'_, S> {
        ExportView { exporter: self, model }
    }

    fn collector(&self, group: GroupId) -> Result<&ActionGroupCollector, MenuError> {
        self.groups.get(&group).ok_or(MenuError::UnknownModel)
    }

    pub fn list_actions(&self, group: GroupId) -> Result<Vec<String>, MenuError> {
        Ok(self.collector(group)?.list_actions())
    }

    pub fn query_action(&self, group: GroupId, name: &str) -> Result<Option<ActionInfo>, MenuError> {
        Ok(self.collector(group)?.query_action(&self.source, name))
    }

    /// Apply a remote state change to the action `name` of `group`.
    pub fn change_action_state(&mut self, group: GroupId, name: &str, value: Option<&Variant>) -> Result<(), MenuError> {
        let collector = self.groups.get_mut(&group).ok_or(MenuError::UnknownModel)?;
        let result = collector.change_action_state(&self.source, name, value);
        self.drain_group(group);
        self.apply(result?);
        Ok(())
    }

    /// Apply a remote activation of the action `name` of `group`.
    pub fn activate_action(&mut self, group: GroupId, name: &str, parameter: Option<&Variant>) -> Result<(), MenuError> {
        let collector = self.groups.get_mut(&group).ok_or(MenuError::UnknownModel)?;
        let result = collector.activate_action(name, parameter);
        self.drain_group(group);
        self.apply(result?);
        Ok(())
    }

    fn apply(&mut self, commands: Vec<SourceCommand>) {
        for command in commands {
            match command {
                SourceCommand::Activate(widget) => {
                    // Radio activations already announced their new state.
                    let radio = self.source.is_radio(widget);
                    if self.source.activate(widget) && !radio {
                        self.handle_item_event(widget, ItemProperty::Active);
                    }
                },
                SourceCommand::SetActive(widget, active) => {
                    if self.source.set_active(widget, active) {
                        self.handle_item_event(widget, ItemProperty::Active);
                    }
                },
                SourceCommand::ShowSubmenu(widget, shown) => {
                    if let Some(container) = self.source.submenu(widget) {
                        self.source.set_submenu_shown(container, shown);
                    }
                },
            }
        }
    }
}

/// A borrowed [`MenuModel`] over one shell or section of an [`Exporter`].
pub struct ExportView<'a, S: MenuSource> {
    exporter: &'a mut Exporter<S>,
    model: ExportModel,
}

impl<S: MenuSource> ExportView<'_, S> {
    pub fn model(&self) -> ExportModel {
        self.model
    }
}

impl<S: MenuSource> MenuModel for ExportView<'_, S> {
    type Link = ExportModel;

    fn item_count(&self) -> usize {
        self.exporter.item_count(self.model)
    }

    fn item_attributes(&self, position: usize) -> Attributes {
        self.exporter.item_attributes(self.model, position)
    }

    fn item_links(&mut self, position: usize) -> Links<ExportModel> {
        self.exporter.item_links(self.model, position)
    }
}
