// SPDX-License-Identifier: LGPL-3.0-only
//! The generic menu-model read contract.
//!
//! Both the export side (a live widget tree projected into sections) and the
//! import side (a remote layout reconciled into local nodes) present their
//! state through [`MenuModel`]. A model is a flat list of items; each item has
//! a map of attributes and a map of links to other models. Structural changes
//! are announced as [`ItemsChanged`](crate::changes::ItemsChanged) values.

use indexmap::IndexMap;

use crate::variant::Variant;

/// Attribute map of a single menu item.
pub type Attributes = IndexMap<String, Variant>;

/// Link map of a single menu item, keyed by [`LINK_SECTION`] or [`LINK_SUBMENU`].
pub type Links<L> = IndexMap<String, L>;

/// Display label.
pub const ATTRIBUTE_LABEL: &str = "label";
/// Serialized [`Icon`](crate::variant::Icon).
pub const ATTRIBUTE_ICON: &str = "icon";
/// Fully qualified action name.
pub const ATTRIBUTE_ACTION: &str = "action";
/// State discriminator for stateful actions.
pub const ATTRIBUTE_TARGET: &str = "target";
/// Accelerator in toolkit syntax.
pub const ATTRIBUTE_ACCEL: &str = "accel";
/// Human readable accelerator text when no accelerator is known.
pub const ATTRIBUTE_ACCEL_TEXT: &str = "accel-text";
/// When to hide the item, e.g. [`HIDDEN_WHEN_ACTION_MISSING`].
pub const ATTRIBUTE_HIDDEN_WHEN: &str = "hidden-when";
/// Boolean-stated action toggled when a submenu opens or closes.
pub const ATTRIBUTE_SUBMENU_ACTION: &str = "submenu-action";

/// Hide the item when its action is not present in the action group.
pub const HIDDEN_WHEN_ACTION_MISSING: &str = "action-missing";

/// Link to the section model containing the items of a section.
pub const LINK_SECTION: &str = "section";
/// Link to the model of a submenu.
pub const LINK_SUBMENU: &str = "submenu";

/// The read side of a menu model.
///
/// `Link` is the handle type used to refer to other models of the same family.
/// Resolving a link may materialize the linked model, which is why
/// [`item_links`](MenuModel::item_links) takes `&mut self`.
pub trait MenuModel {
    /// Handle to a linked model.
    type Link;

    /// Whether the model may change after it was first read.
    fn is_mutable(&self) -> bool {
        true
    }

    /// Number of items.
    fn item_count(&self) -> usize;

    /// Attributes of the item at `position`.
    ///
    /// Returns an empty map for positions out of range.
    fn item_attributes(&self, position: usize) -> Attributes;

    /// Links of the item at `position`.
    fn item_links(&mut self, position: usize) -> Links<Self::Link>;

    /// Convenience accessor for a string attribute.
    fn item_attribute_str(&self, position: usize, key: &str) -> Option<String> {
        self.item_attributes(position)
            .get(key)
            .and_then(|value| value.as_str().map(str::to_owned))
    }
}
