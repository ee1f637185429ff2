// SPDX-License-Identifier: LGPL-3.0-only
//! An in-memory [`MenuSource`].
//!
//! Hosts that build their menus without a widget toolkit describe them with a
//! [`MenuTree`] and report every mutation to the exporter themselves:
//!
//! ```
//! use appmenu_export::{ItemProperty, ItemSpec, MenuTree};
//!
//! let mut tree = MenuTree::new();
//! let bar = tree.new_container();
//! let file = tree.append(bar, ItemSpec::normal("_File"));
//! tree.set_visible(file, false);
//! // exporter.handle_item_event(file, ItemProperty::Visible);
//! # let _ = ItemProperty::Visible;
//! ```

use std::collections::HashMap;

use appmenu_core::Icon;

use crate::source::{Accel, ContainerId, MenuSource, WidgetId};

/// Handle of a radio group in a [`MenuTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RadioGroupId(pub u32);

/// Widget kind of a [`MenuTree`] item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Normal,
    Separator,
    Check,
    Radio(RadioGroupId),
    Tearoff,
}

/// Description of a new item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSpec {
    pub kind: ItemKind,
    pub label: Option<String>,
    pub use_underline: bool,
    pub visible: bool,
    pub sensitive: bool,
    pub active: bool,
    pub draw_as_radio: bool,
    pub icon: Option<Icon>,
    pub accel: Option<Accel>,
}

impl ItemSpec {
    fn new(kind: ItemKind, label: Option<String>) -> Self {
        Self {
            kind,
            label,
            use_underline: true,
            visible: true,
            sensitive: true,
            active: false,
            draw_as_radio: false,
            icon: None,
            accel: None,
        }
    }

    pub fn normal(label: impl Into<String>) -> Self {
        Self::new(ItemKind::Normal, Some(label.into()))
    }

    pub fn separator() -> Self {
        Self::new(ItemKind::Separator, None)
    }

    pub fn check(label: impl Into<String>) -> Self {
        Self::new(ItemKind::Check, Some(label.into()))
    }

    pub fn radio(label: impl Into<String>, group: RadioGroupId) -> Self {
        Self::new(ItemKind::Radio(group), Some(label.into()))
    }

    pub fn tearoff() -> Self {
        Self::new(ItemKind::Tearoff, None)
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn insensitive(mut self) -> Self {
        self.sensitive = false;
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn draw_as_radio(mut self) -> Self {
        self.draw_as_radio = true;
        self
    }

    /// Treat underscores in the label literally.
    pub fn without_underline(mut self) -> Self {
        self.use_underline = false;
        self
    }

    pub fn icon(mut self, icon: Icon) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn accel(mut self, accel: Accel) -> Self {
        self.accel = Some(accel);
        self
    }
}

#[derive(Debug)]
struct Widget {
    spec: ItemSpec,
    parent: Option<ContainerId>,
    submenu: Option<ContainerId>,
}

/// Arena of widgets and containers.
#[derive(Debug, Default)]
pub struct MenuTree {
    widgets: Vec<Widget>,
    containers: Vec<Vec<WidgetId>>,
    /// Members in join order.
    radio_groups: HashMap<RadioGroupId, Vec<WidgetId>>,
    next_radio_group: u32,
    shown_submenus: Vec<ContainerId>,
    activations: Vec<WidgetId>,
}

impl MenuTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_container(&mut self) -> ContainerId {
        self.containers.push(Vec::new());
        ContainerId(self.containers.len() as u32 - 1)
    }

    pub fn new_radio_group(&mut self) -> RadioGroupId {
        let id = RadioGroupId(self.next_radio_group);
        self.next_radio_group += 1;
        self.radio_groups.insert(id, Vec::new());
        id
    }

    /// Append an item to `container`.
    pub fn append(&mut self, container: ContainerId, spec: ItemSpec) -> WidgetId {
        let position = self.children(container).len();
        self.insert(container, position, spec)
    }

    /// Insert an item into `container` at `position`, clamped to the end.
    pub fn insert(&mut self, container: ContainerId, position: usize, spec: ItemSpec) -> WidgetId {
        let id = WidgetId(self.widgets.len() as u32);
        if let ItemKind::Radio(group) = spec.kind {
            self.radio_groups.entry(group).or_default().push(id);
        }
        self.widgets.push(Widget {
            spec,
            parent: Some(container),
            submenu: None,
        });
        if let Some(children) = self.containers.get_mut(container.0 as usize) {
            let position = position.min(children.len());
            children.insert(position, id);
        }
        id
    }

    /// Detach `widget` from its container.
    ///
    /// Returns the container and the position the widget occupied.
    pub fn remove(&mut self, widget: WidgetId) -> Option<(ContainerId, usize)> {
        let node = self.widgets.get_mut(widget.0 as usize)?;
        let container = node.parent.take()?;
        let children = self.containers.get_mut(container.0 as usize)?;
        let position = children.iter().position(|&child| child == widget)?;
        children.remove(position);
        Some((container, position))
    }

    pub fn set_visible(&mut self, widget: WidgetId, visible: bool) {
        if let Some(node) = self.widget_mut(widget) {
            node.spec.visible = visible;
        }
    }

    pub fn set_sensitive(&mut self, widget: WidgetId, sensitive: bool) {
        if let Some(node) = self.widget_mut(widget) {
            node.spec.sensitive = sensitive;
        }
    }

    pub fn set_label(&mut self, widget: WidgetId, label: Option<&str>) {
        if let Some(node) = self.widget_mut(widget) {
            node.spec.label = label.map(str::to_owned);
        }
    }

    pub fn set_use_underline(&mut self, widget: WidgetId, use_underline: bool) {
        if let Some(node) = self.widget_mut(widget) {
            node.spec.use_underline = use_underline;
        }
    }

    pub fn set_accel(&mut self, widget: WidgetId, accel: Option<Accel>) {
        if let Some(node) = self.widget_mut(widget) {
            node.spec.accel = accel;
        }
    }

    pub fn set_submenu(&mut self, widget: WidgetId, submenu: Option<ContainerId>) {
        if let Some(node) = self.widget_mut(widget) {
            node.submenu = submenu;
        }
    }

    /// Containers currently shown on request of the remote side.
    pub fn shown_submenus(&self) -> &[ContainerId] {
        &self.shown_submenus
    }

    /// Every activation in order.
    pub fn activations(&self) -> &[WidgetId] {
        &self.activations
    }

    fn widget(&self, widget: WidgetId) -> Option<&Widget> {
        self.widgets.get(widget.0 as usize)
    }

    fn widget_mut(&mut self, widget: WidgetId) -> Option<&mut Widget> {
        self.widgets.get_mut(widget.0 as usize)
    }

    fn kind(&self, widget: WidgetId) -> Option<ItemKind> {
        self.widget(widget).map(|node| node.spec.kind)
    }
}

impl MenuSource for MenuTree {
    fn children(&self, container: ContainerId) -> Vec<WidgetId> {
        self.containers
            .get(container.0 as usize)
            .cloned()
            .unwrap_or_default()
    }

    fn parent(&self, widget: WidgetId) -> Option<ContainerId> {
        self.widget(widget).and_then(|node| node.parent)
    }

    fn is_visible(&self, widget: WidgetId) -> bool {
        self.widget(widget)
            .map(|node| node.spec.visible && node.spec.kind != ItemKind::Tearoff)
            .unwrap_or(false)
    }

    fn is_sensitive(&self, widget: WidgetId) -> bool {
        self.widget(widget).map(|node| node.spec.sensitive).unwrap_or(false)
    }

    fn is_active(&self, widget: WidgetId) -> bool {
        self.is_check(widget) && self.widget(widget).map(|node| node.spec.active).unwrap_or(false)
    }

    fn is_separator(&self, widget: WidgetId) -> bool {
        self.kind(widget) == Some(ItemKind::Separator)
    }

    fn is_check(&self, widget: WidgetId) -> bool {
        matches!(self.kind(widget), Some(ItemKind::Check | ItemKind::Radio(_)))
    }

    fn is_radio(&self, widget: WidgetId) -> bool {
        matches!(self.kind(widget), Some(ItemKind::Radio(_)))
    }

    fn draw_as_radio(&self, widget: WidgetId) -> bool {
        self.is_check(widget) && self.widget(widget).map(|node| node.spec.draw_as_radio).unwrap_or(false)
    }

    fn label(&self, widget: WidgetId) -> Option<String> {
        self.widget(widget).and_then(|node| node.spec.label.clone())
    }

    fn use_underline(&self, widget: WidgetId) -> bool {
        self.widget(widget).map(|node| node.spec.use_underline).unwrap_or(false)
    }

    fn icon(&self, widget: WidgetId) -> Option<Icon> {
        self.widget(widget).and_then(|node| node.spec.icon.clone())
    }

    fn accel(&self, widget: WidgetId) -> Option<Accel> {
        self.widget(widget).and_then(|node| node.spec.accel.clone())
    }

    fn submenu(&self, widget: WidgetId) -> Option<ContainerId> {
        self.widget(widget).and_then(|node| node.submenu)
    }

    fn radio_group(&self, widget: WidgetId) -> Vec<WidgetId> {
        match self.kind(widget) {
            Some(ItemKind::Radio(group)) => self
                .radio_groups
                .get(&group)
                .map(|members| members.iter().rev().copied().collect())
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    fn activate(&mut self, widget: WidgetId) -> bool {
        self.activations.push(widget);
        match self.kind(widget) {
            Some(ItemKind::Check) => {
                let active = self.is_active(widget);
                self.set_active(widget, !active)
            },
            Some(ItemKind::Radio(_)) => self.set_active(widget, true),
            _ => false,
        }
    }

    fn set_active(&mut self, widget: WidgetId, active: bool) -> bool {
        let Some(kind) = self.kind(widget) else {
            return false;
        };
        if self.is_active(widget) == active {
            return false;
        }
        if let (ItemKind::Radio(group), true) = (kind, active) {
            let members = self.radio_groups.get(&group).cloned().unwrap_or_default();
            for member in members {
                if let Some(node) = self.widget_mut(member) {
                    node.spec.active = false;
                }
            }
        }
        match self.widget_mut(widget) {
            Some(node) => {
                node.spec.active = active;
                true
            },
            None => false,
        }
    }

    fn set_submenu_shown(&mut self, container: ContainerId, shown: bool) {
        self.shown_submenus.retain(|&c| c != container);
        if shown {
            self.shown_submenus.push(container);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_remove_positions() {
        let mut tree = MenuTree::new();
        let bar = tree.new_container();
        let a = tree.append(bar, ItemSpec::normal("A"));
        let c = tree.append(bar, ItemSpec::normal("C"));
        let b = tree.insert(bar, 1, ItemSpec::normal("B"));
        assert_eq!(tree.children(bar), vec![a, b, c]);

        assert_eq!(tree.remove(b), Some((bar, 1)));
        assert_eq!(tree.parent(b), None);
        assert_eq!(tree.children(bar), vec![a, c]);
        assert_eq!(tree.remove(b), None);
    }

    #[test]
    fn test_radio_group_is_exclusive() {
        let mut tree = MenuTree::new();
        let bar = tree.new_container();
        let group = tree.new_radio_group();
        let first = tree.append(bar, ItemSpec::radio("Small", group).active(true));
        let second = tree.append(bar, ItemSpec::radio("Large", group));

        assert_eq!(tree.radio_group(first), vec![second, first]);
        assert!(tree.set_active(second, true));
        assert!(!tree.is_active(first));
        assert!(tree.is_active(second));
        assert!(!tree.set_active(second, true));
    }

    #[test]
    fn test_tearoff_is_never_visible() {
        let mut tree = MenuTree::new();
        let bar = tree.new_container();
        let tearoff = tree.append(bar, ItemSpec::tearoff());
        assert!(!tree.is_visible(tearoff));
    }

    #[test]
    fn test_activate_toggles_check_items() {
        let mut tree = MenuTree::new();
        let bar = tree.new_container();
        let check = tree.append(bar, ItemSpec::check("Wrap"));
        let plain = tree.append(bar, ItemSpec::normal("Quit"));

        assert!(tree.activate(check));
        assert!(tree.is_active(check));
        assert!(!tree.activate(plain));
        assert_eq!(tree.activations(), &[check, plain]);
    }
}
