// SPDX-License-Identifier: LGPL-3.0-only
//! Decoded remote layout snapshots.

use indexmap::IndexMap;

use appmenu_core::{MenuError, Variant};

/// Type signature of one layout node on the wire.
pub const LAYOUT_SIGNATURE: &str = "(ia{sv}av)";

/// Properties requested with every layout fetch.
pub const PROPERTY_FILTER: &[&str] = &[
    "accessible-desc",
    "children-display",
    "disposition",
    "enabled",
    "icon-data",
    "icon-name",
    "label",
    "shortcut",
    "toggle-type",
    "toggle-state",
    "type",
    "visible",
];

/// One node of a remote layout: `(id, properties, children)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutNode {
    pub id: i32,
    pub properties: IndexMap<String, Variant>,
    pub children: Vec<LayoutNode>,
}

impl LayoutNode {
    pub fn new(id: i32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Builder-style property setter.
    pub fn with(mut self, key: &str, value: impl Into<Variant>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    /// Builder-style child append.
    pub fn child(mut self, child: LayoutNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn property(&self, key: &str) -> Option<&Variant> {
        self.properties.get(key)
    }

    /// Encode the node back into its `(ia{sv}av)` form.
    pub fn to_variant(&self) -> Variant {
        Variant::Tuple(vec![
            Variant::Int32(self.id),
            Variant::Dict(self.properties.clone()),
            Variant::Array(
                self.children
                    .iter()
                    .map(|child| Variant::boxed(child.to_variant()))
                    .collect(),
            ),
        ])
    }
}

/// Decode a fetched layout.
///
/// Fails with [`MenuError::LayoutShape`] when the value, or any nested child,
/// is not a `(ia{sv}av)` tuple.
pub fn parse_layout(value: &Variant) -> Result<LayoutNode, MenuError> {
    let shape_error = || MenuError::LayoutShape {
        expected: LAYOUT_SIGNATURE.to_string(),
        found: value.type_string(),
    };

    let Variant::Tuple(fields) = value.unboxed() else {
        return Err(shape_error());
    };
    let [Variant::Int32(id), Variant::Dict(properties), Variant::Array(children)] = fields.as_slice() else {
        return Err(shape_error());
    };

    let children = children
        .iter()
        .map(parse_layout)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(LayoutNode {
        id: *id,
        properties: properties.clone(),
        children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_layout() {
        let root = LayoutNode::new(0)
            .with("children-display", "submenu")
            .child(LayoutNode::new(1).with("label", "_File"))
            .child(LayoutNode::new(2).with("type", "separator"));

        let parsed = parse_layout(&root.to_variant()).unwrap();
        assert_eq!(parsed.children.len(), 2);
        assert_eq!(parsed.children[0].property("label").and_then(Variant::as_str), Some("_File"));
        assert_eq!(parsed, root);
    }

    #[test]
    fn test_reject_wrong_shape() {
        let err = parse_layout(&Variant::Tuple(vec![Variant::from("0"), Variant::from(true)])).unwrap_err();
        assert_eq!(
            err,
            MenuError::LayoutShape {
                expected: LAYOUT_SIGNATURE.to_string(),
                found: "(sb)".to_string(),
            }
        );
    }

    #[test]
    fn test_reject_malformed_child() {
        let layout = Variant::Tuple(vec![
            Variant::Int32(0),
            Variant::Dict(IndexMap::new()),
            Variant::Array(vec![Variant::boxed(Variant::Int32(7))]),
        ]);
        assert!(matches!(parse_layout(&layout), Err(MenuError::LayoutShape { .. })));
    }
}
