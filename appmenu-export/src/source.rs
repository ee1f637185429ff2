// SPDX-License-Identifier: LGPL-3.0-only
//! The live widget tree an [`Exporter`](crate::Exporter) projects.

use appmenu_core::Icon;

/// Handle of one menu item widget in a [`MenuSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(pub u32);

/// Handle of one menu container (a menu bar or a submenu) in a [`MenuSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(pub u32);

/// Keyboard accelerator of an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accel {
    /// Accelerator in toolkit syntax, e.g. `<Control>q`.
    Name(String),
    /// Display text only, e.g. `Ctrl+Q`.
    Text(String),
}

/// Read and write access to a toolkit's menu widgets.
///
/// Every query is answered from the live widgets on each call. Changes are
/// not polled; the host reports them through
/// [`Exporter::handle_item_event`](crate::Exporter::handle_item_event) and
/// [`Exporter::handle_container_insert`](crate::Exporter::handle_container_insert).
pub trait MenuSource {
    /// Items of `container` in display order.
    fn children(&self, container: ContainerId) -> Vec<WidgetId>;

    /// The container currently holding `widget`, `None` once detached.
    fn parent(&self, widget: WidgetId) -> Option<ContainerId>;

    /// Whether the widget is shown. Tearoff items are never visible.
    fn is_visible(&self, widget: WidgetId) -> bool;

    fn is_sensitive(&self, widget: WidgetId) -> bool;

    /// Whether a check or radio item is toggled on.
    fn is_active(&self, widget: WidgetId) -> bool;

    fn is_separator(&self, widget: WidgetId) -> bool;

    /// Whether the widget is a check item. Radio items are check items too.
    fn is_check(&self, widget: WidgetId) -> bool;

    fn is_radio(&self, widget: WidgetId) -> bool;

    /// Whether a check item is drawn with a radio indicator.
    fn draw_as_radio(&self, widget: WidgetId) -> bool;

    /// Raw label text, including mnemonic underscores.
    fn label(&self, widget: WidgetId) -> Option<String>;

    /// Whether underscores in the label mark mnemonics.
    fn use_underline(&self, widget: WidgetId) -> bool;

    fn icon(&self, widget: WidgetId) -> Option<Icon>;

    fn accel(&self, widget: WidgetId) -> Option<Accel>;

    /// The submenu container attached to `widget`.
    fn submenu(&self, widget: WidgetId) -> Option<ContainerId>;

    /// Members of the radio group of `widget`, most recently joined first.
    ///
    /// Empty for non-radio items.
    fn radio_group(&self, widget: WidgetId) -> Vec<WidgetId>;

    /// Activate the item as if the user clicked it.
    ///
    /// Returns whether the active state of `widget` changed as a result.
    fn activate(&mut self, widget: WidgetId) -> bool;

    /// Toggle a check or radio item. Returns whether the state changed.
    fn set_active(&mut self, widget: WidgetId, active: bool) -> bool;

    /// Show or hide a submenu on request of the remote side.
    fn set_submenu_shown(&mut self, container: ContainerId, shown: bool);
}
