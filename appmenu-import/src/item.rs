// SPDX-License-Identifier: LGPL-3.0-only
//! Local mirror of a single remote menu item.

use indexmap::IndexMap;
use log::debug;

use appmenu_core::model::{
    ATTRIBUTE_ACCEL, ATTRIBUTE_ACTION, ATTRIBUTE_HIDDEN_WHEN, ATTRIBUTE_ICON, ATTRIBUTE_LABEL,
    ATTRIBUTE_SUBMENU_ACTION, ATTRIBUTE_TARGET, HIDDEN_WHEN_ACTION_MISSING,
};
use appmenu_core::{Attributes, Icon, Variant};

use crate::model::ModelId;

/// Name of the action group imported actions live in.
pub const ACTION_GROUP: &str = "dbusmenu";
/// Action an invisible item points at; never present in any group.
pub const DISABLED_ACTION: &str = "ls.disabled";
/// Radio state of the selected member.
pub const RADIO_SELECTED: &str = "+";
/// Radio state of an unselected member.
pub const RADIO_UNSELECTED: &str = "-";

/// Properties that fix the kind of a node and are never merged.
const CLASSIFYING_PROPERTIES: &[&str] = &["type", "children-display", "toggle-type", "x-kde-title"];

/// The immutable kind of a remote item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    /// Section header; starts a new section.
    Section,
    Normal,
    Checkmark,
    Radio,
    Submenu,
}

impl ActionType {
    /// Classify a node by its properties.
    pub fn classify(properties: &IndexMap<String, Variant>) -> Self {
        let string = |key: &str| properties.get(key).and_then(Variant::as_str);

        if string("children-display") == Some("submenu") {
            return ActionType::Submenu;
        }
        match string("toggle-type") {
            Some("checkmark") => return ActionType::Checkmark,
            Some("radio") => return ActionType::Radio,
            _ => {},
        }
        if string("type") == Some("separator") || properties.contains_key("x-kde-title") {
            return ActionType::Section;
        }
        ActionType::Normal
    }
}

/// Which facets of an item a property update touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropsChange {
    /// Exported attributes differ.
    pub attributes: bool,
    /// The enabled flag flipped.
    pub enabled: bool,
    /// The toggled flag flipped.
    pub toggled: bool,
}

impl PropsChange {
    pub fn any(&self) -> bool {
        self.attributes || self.enabled || self.toggled
    }

    fn merge(&mut self, other: PropsChange) {
        self.attributes |= other.attributes;
        self.enabled |= other.enabled;
        self.toggled |= other.toggled;
    }
}

/// A remote item placed at `(section_num, place)` of its model.
///
/// `serial` is the local identity of the node: it survives in-place merges
/// and changes whenever the node is replaced. For submenus `toggled` tracks
/// whether the submenu is open locally; remote `toggle-state` values do not
/// apply to them.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteItem {
    pub(crate) serial: u64,
    pub(crate) id: i32,
    pub(crate) action_type: ActionType,
    pub(crate) attributes: Attributes,
    pub(crate) submenu: Option<ModelId>,
    pub(crate) enabled: bool,
    pub(crate) toggled: bool,
    pub(crate) section_num: u32,
    /// `-1` for section headers.
    pub(crate) place: i32,
}

impl RemoteItem {
    /// The synthetic header of section 0.
    pub(crate) fn first_section(serial: u64, parent_id: i32) -> Self {
        Self {
            serial,
            id: parent_id,
            action_type: ActionType::Section,
            attributes: Attributes::new(),
            submenu: None,
            enabled: true,
            toggled: false,
            section_num: 0,
            place: -1,
        }
    }

    /// Build a node from a layout entry.
    pub(crate) fn new(serial: u64, id: i32, properties: &IndexMap<String, Variant>) -> Self {
        let action_type = ActionType::classify(properties);
        let mut item = Self {
            serial,
            id,
            action_type,
            attributes: Attributes::new(),
            submenu: None,
            enabled: true,
            toggled: false,
            section_num: 0,
            place: 0,
        };

        match action_type {
            ActionType::Section => {
                if let Some(title) = properties.get("x-kde-title").and_then(Variant::as_str) {
                    item.attributes.insert(ATTRIBUTE_LABEL.into(), Variant::from(title));
                }
            },
            ActionType::Submenu => {
                item.attributes.insert(
                    ATTRIBUTE_SUBMENU_ACTION.into(),
                    Variant::from(format!("{ACTION_GROUP}.{}", submenu_action_name(id))),
                );
            },
            ActionType::Radio => {
                item.attributes
                    .insert(ATTRIBUTE_ACTION.into(), Variant::from(qualified_action(id)));
                item.attributes
                    .insert(ATTRIBUTE_TARGET.into(), Variant::from(RADIO_SELECTED));
            },
            ActionType::Normal | ActionType::Checkmark => {
                item.attributes
                    .insert(ATTRIBUTE_ACTION.into(), Variant::from(qualified_action(id)));
            },
        }

        item.update_props(properties);
        item
    }

    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn action_type(&self) -> ActionType {
        self.action_type
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn submenu(&self) -> Option<ModelId> {
        self.submenu
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn toggled(&self) -> bool {
        self.toggled
    }

    pub fn section_num(&self) -> u32 {
        self.section_num
    }

    pub fn place(&self) -> i32 {
        self.place
    }

    pub fn label(&self) -> Option<&str> {
        self.attributes.get(ATTRIBUTE_LABEL).and_then(Variant::as_str)
    }

    pub fn is_header(&self) -> bool {
        self.place < 0
    }

    pub fn is_visible(&self) -> bool {
        !self.attributes.contains_key(ATTRIBUTE_HIDDEN_WHEN)
    }

    /// Name of the item's own action inside [`ACTION_GROUP`], if it has one.
    pub fn action_name(&self) -> Option<String> {
        match self.action_type {
            ActionType::Normal | ActionType::Checkmark | ActionType::Radio => Some(action_name(self.id)),
            ActionType::Submenu => Some(submenu_action_name(self.id)),
            ActionType::Section => None,
        }
    }

    /// Whether two nodes can be merged into one another.
    pub fn compare_immutable(&self, other: &RemoteItem) -> bool {
        self.id == other.id && self.action_type == other.action_type
    }

    /// A disabled, unlabeled, hidden placeholder.
    pub fn is_placeholder_stub(&self) -> bool {
        !self.enabled
            && self.label().map_or(true, str::is_empty)
            && self.attributes.contains_key(ATTRIBUTE_HIDDEN_WHEN)
    }

    /// Apply remote property values.
    pub fn update_props(&mut self, properties: &IndexMap<String, Variant>) -> PropsChange {
        let mut change = PropsChange::default();
        for (name, value) in properties {
            match name.as_str() {
                "enabled" => {
                    let enabled = value.as_bool().unwrap_or(true);
                    change.enabled |= self.enabled != enabled;
                    self.enabled = enabled;
                },
                "label" => {
                    let label = value.as_str().map(Variant::from);
                    change.attributes |= self.set_attribute(ATTRIBUTE_LABEL, label);
                },
                "shortcut" => {
                    let accel = shortcut_to_accel(value).map(Variant::from);
                    change.attributes |= self.set_attribute(ATTRIBUTE_ACCEL, accel);
                },
                "toggle-state" if self.action_type != ActionType::Submenu => {
                    let toggled = value.as_i32().is_some_and(|state| state > 0);
                    change.toggled |= self.toggled != toggled;
                    self.toggled = toggled;
                },
                "visible" => {
                    let visible = value.as_bool().unwrap_or(true);
                    change.attributes |= self.set_visible(visible);
                },
                "icon-name" => {
                    let icon = value
                        .as_str()
                        .filter(|name| !name.is_empty())
                        .map(|name| Icon::Themed(name.to_string()).serialize());
                    change.attributes |= self.set_attribute(ATTRIBUTE_ICON, icon);
                },
                "icon-data" => {
                    let icon = icon_bytes(value).map(|data| Icon::Bytes(data).serialize());
                    change.attributes |= self.set_attribute(ATTRIBUTE_ICON, icon);
                },
                name if CLASSIFYING_PROPERTIES.contains(&name) || name == "toggle-state" => {},
                name => debug!("updating unsupported property - '{}'", name),
            }
        }
        change
    }

    /// Reset the named properties to their defaults.
    pub fn remove_props<S: AsRef<str>>(&mut self, names: &[S]) -> PropsChange {
        let mut change = PropsChange::default();
        for name in names {
            match name.as_ref() {
                "enabled" => {
                    change.enabled |= !self.enabled;
                    self.enabled = true;
                },
                "label" => change.attributes |= self.set_attribute(ATTRIBUTE_LABEL, None),
                "shortcut" => change.attributes |= self.set_attribute(ATTRIBUTE_ACCEL, None),
                "icon-name" | "icon-data" => change.attributes |= self.set_attribute(ATTRIBUTE_ICON, None),
                "visible" => change.attributes |= self.set_visible(true),
                "toggle-state" if self.action_type != ActionType::Submenu => {
                    change.toggled |= self.toggled;
                    self.toggled = false;
                },
                "toggle-state" => {},
                name => debug!("removing unsupported property - '{}'", name),
            }
        }
        change
    }

    /// Make the item match a full property snapshot.
    ///
    /// Properties absent from the snapshot fall back to their defaults.
    pub fn merge_props(&mut self, properties: &IndexMap<String, Variant>) -> PropsChange {
        const MERGED: &[&str] = &["enabled", "label", "shortcut", "toggle-state", "visible"];

        let mut change = self.update_props(properties);
        let mut absent: Vec<&str> = MERGED
            .iter()
            .copied()
            .filter(|name| !properties.contains_key(*name))
            .collect();
        if !properties.contains_key("icon-name") && !properties.contains_key("icon-data") {
            absent.push("icon-name");
        }
        change.merge(self.remove_props(&absent));
        change
    }

    fn set_visible(&mut self, visible: bool) -> bool {
        if visible {
            let restored = match self.action_type {
                ActionType::Normal | ActionType::Checkmark | ActionType::Radio => {
                    Some(Variant::from(qualified_action(self.id)))
                },
                ActionType::Section | ActionType::Submenu => None,
            };
            let hidden = self.set_attribute(ATTRIBUTE_HIDDEN_WHEN, None);
            let action = self.set_attribute(ATTRIBUTE_ACTION, restored);
            hidden || action
        } else {
            let hidden = self.set_attribute(
                ATTRIBUTE_HIDDEN_WHEN,
                Some(Variant::from(HIDDEN_WHEN_ACTION_MISSING)),
            );
            let action = self.set_attribute(ATTRIBUTE_ACTION, Some(Variant::from(DISABLED_ACTION)));
            hidden || action
        }
    }

    /// Store or clear an attribute. Returns whether the stored value changed.
    fn set_attribute(&mut self, key: &str, value: Option<Variant>) -> bool {
        match value {
            Some(value) => {
                if self.attributes.get(key) == Some(&value) {
                    return false;
                }
                self.attributes.insert(key.to_string(), value);
                true
            },
            None => self.attributes.shift_remove(key).is_some(),
        }
    }
}

/// Action name of a plain, check or radio item inside [`ACTION_GROUP`].
pub fn action_name(id: i32) -> String {
    format!("id-{id}")
}

/// Name of the boolean pseudo-action tracking whether a submenu is open.
pub fn submenu_action_name(id: i32) -> String {
    format!("submenu-{id}")
}

fn qualified_action(id: i32) -> String {
    format!("{ACTION_GROUP}.{}", action_name(id))
}

/// Convert a `aas` shortcut into accelerator syntax.
///
/// Only the first key chord is used; `[["Control", "Shift", "n"]]` becomes
/// `<Control><Shift>n`.
pub fn shortcut_to_accel(value: &Variant) -> Option<String> {
    let Variant::Array(chords) = value.unboxed() else {
        return None;
    };
    let Variant::Array(keys) = chords.first()?.unboxed() else {
        return None;
    };
    let keys: Vec<&str> = keys.iter().filter_map(Variant::as_str).collect();
    let (key, modifiers) = keys.split_last()?;

    let mut accel = String::new();
    for modifier in modifiers {
        let modifier = match *modifier {
            "Ctrl" | "Control" => "Control",
            other => other,
        };
        accel.push('<');
        accel.push_str(modifier);
        accel.push('>');
    }
    accel.push_str(key);
    Some(accel)
}

fn icon_bytes(value: &Variant) -> Option<Vec<u8>> {
    match value.unboxed() {
        Variant::Bytes(data) if !data.is_empty() => Some(data.clone()),
        Variant::Array(items) if !items.is_empty() => items
            .iter()
            .map(|item| match item {
                Variant::Byte(b) => Some(*b),
                _ => None,
            })
            .collect(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(entries: &[(&str, Variant)]) -> IndexMap<String, Variant> {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_classify_precedence() {
        let submenu = props(&[
            ("children-display", Variant::from("submenu")),
            ("toggle-type", Variant::from("checkmark")),
        ]);
        assert_eq!(ActionType::classify(&submenu), ActionType::Submenu);
        assert_eq!(
            ActionType::classify(&props(&[("toggle-type", Variant::from("radio"))])),
            ActionType::Radio
        );
        assert_eq!(
            ActionType::classify(&props(&[("type", Variant::from("separator"))])),
            ActionType::Section
        );
        assert_eq!(
            ActionType::classify(&props(&[("x-kde-title", Variant::from("Recent"))])),
            ActionType::Section
        );
        assert_eq!(ActionType::classify(&IndexMap::new()), ActionType::Normal);
    }

    #[test]
    fn test_new_radio_item_attributes() {
        let item = RemoteItem::new(1, 7, &props(&[
            ("toggle-type", Variant::from("radio")),
            ("toggle-state", Variant::from(1)),
            ("label", Variant::from("Large")),
        ]));
        assert_eq!(item.action_type(), ActionType::Radio);
        assert_eq!(item.attributes().get(ATTRIBUTE_ACTION), Some(&Variant::from("dbusmenu.id-7")));
        assert_eq!(item.attributes().get(ATTRIBUTE_TARGET), Some(&Variant::from("+")));
        assert!(item.toggled());
        assert_eq!(item.action_name().as_deref(), Some("id-7"));
    }

    #[test]
    fn test_visibility_swaps_action() {
        let mut item = RemoteItem::new(1, 3, &props(&[("label", Variant::from("Edit"))]));
        let change = item.update_props(&props(&[("visible", Variant::from(false))]));
        assert!(change.attributes);
        assert!(!item.is_visible());
        assert_eq!(item.attributes().get(ATTRIBUTE_ACTION), Some(&Variant::from(DISABLED_ACTION)));

        let change = item.update_props(&props(&[("visible", Variant::from(true))]));
        assert!(change.attributes);
        assert!(item.is_visible());
        assert_eq!(item.attributes().get(ATTRIBUTE_ACTION), Some(&Variant::from("dbusmenu.id-3")));
    }

    #[test]
    fn test_unchanged_values_report_nothing() {
        let mut item = RemoteItem::new(1, 3, &props(&[("label", Variant::from("Edit"))]));
        let change = item.update_props(&props(&[
            ("label", Variant::from("Edit")),
            ("enabled", Variant::from(true)),
            ("accessible-desc", Variant::from("ignored")),
        ]));
        assert!(!change.any());
    }

    #[test]
    fn test_remove_props_restores_defaults() {
        let mut item = RemoteItem::new(1, 4, &props(&[
            ("label", Variant::from("Quit")),
            ("enabled", Variant::from(false)),
            ("icon-name", Variant::from("application-exit")),
        ]));
        let change = item.remove_props(&["enabled", "label", "icon-name"]);
        assert!(change.enabled);
        assert!(change.attributes);
        assert!(item.enabled());
        assert!(item.label().is_none());
        assert!(!item.attributes().contains_key(ATTRIBUTE_ICON));
    }

    #[test]
    fn test_placeholder_stub() {
        let stub = RemoteItem::new(1, 9, &props(&[
            ("enabled", Variant::from(false)),
            ("label", Variant::from("")),
            ("visible", Variant::from(false)),
        ]));
        assert!(stub.is_placeholder_stub());

        let labeled = RemoteItem::new(2, 10, &props(&[
            ("enabled", Variant::from(false)),
            ("label", Variant::from("Recent")),
            ("visible", Variant::from(false)),
        ]));
        assert!(!labeled.is_placeholder_stub());
    }

    #[test]
    fn test_shortcut_to_accel() {
        let shortcut = Variant::Array(vec![Variant::Array(vec![
            Variant::from("Ctrl"),
            Variant::from("Shift"),
            Variant::from("n"),
        ])]);
        assert_eq!(shortcut_to_accel(&shortcut).as_deref(), Some("<Control><Shift>n"));
        assert_eq!(shortcut_to_accel(&Variant::Array(Vec::new())), None);
    }
}
