// SPDX-License-Identifier: LGPL-3.0-only
//! Conversions between zvariant values and [`Variant`].

use std::collections::HashMap;

use indexmap::IndexMap;
use zbus::zvariant::{OwnedValue, Value};

use appmenu_core::Variant;

/// Convert a wire value.
///
/// Types without a [`Variant`] counterpart (file descriptors) become an empty
/// tuple.
pub fn to_variant(value: &Value<'_>) -> Variant {
    match value {
        Value::U8(b) => Variant::Byte(*b),
        Value::Bool(b) => Variant::Bool(*b),
        Value::I16(i) => Variant::Int32(i32::from(*i)),
        Value::U16(u) => Variant::UInt32(u32::from(*u)),
        Value::I32(i) => Variant::Int32(*i),
        Value::U32(u) => Variant::UInt32(*u),
        Value::I64(i) => Variant::Int64(*i),
        Value::U64(u) => Variant::UInt64(*u),
        Value::F64(d) => Variant::Double(*d),
        Value::Str(s) => Variant::Str(s.as_str().to_string()),
        Value::Signature(s) => Variant::Str(s.to_string()),
        Value::ObjectPath(path) => Variant::Str(path.as_str().to_string()),
        Value::Value(inner) => Variant::boxed(to_variant(inner)),
        Value::Array(array) => {
            let items: Vec<Variant> = array.iter().map(to_variant).collect();
            let bytes: Option<Vec<u8>> = items
                .iter()
                .map(|item| match item {
                    Variant::Byte(b) => Some(*b),
                    _ => None,
                })
                .collect();
            match bytes {
                Some(bytes) if !bytes.is_empty() => Variant::Bytes(bytes),
                _ => Variant::Array(items),
            }
        },
        Value::Dict(dict) => Variant::Dict(
            dict.iter()
                .filter_map(|(key, value)| Some((key_string(key)?, to_variant(value))))
                .collect(),
        ),
        Value::Structure(structure) => Variant::Tuple(structure.fields().iter().map(to_variant).collect()),
        #[allow(unreachable_patterns)]
        _ => Variant::Tuple(Vec::new()),
    }
}

fn key_string(key: &Value<'_>) -> Option<String> {
    match key {
        Value::Str(s) => Some(s.as_str().to_string()),
        Value::Value(inner) => key_string(inner),
        _ => None,
    }
}

/// Convert an `a{sv}` property map.
pub(crate) fn properties(map: &HashMap<String, OwnedValue>) -> IndexMap<String, Variant> {
    let mut properties: IndexMap<String, Variant> = map
        .iter()
        .map(|(key, value)| (key.clone(), to_variant(value)))
        .collect();
    properties.sort_keys();
    properties
}

/// Convert a value for an outgoing call.
///
/// Arrays, dictionaries and tuples are sent as their textual form.
pub fn from_variant(value: &Variant) -> Value<'static> {
    match value {
        Variant::Bool(b) => Value::from(*b),
        Variant::Byte(b) => Value::from(*b),
        Variant::Int32(i) => Value::from(*i),
        Variant::UInt32(u) => Value::from(*u),
        Variant::Int64(i) => Value::from(*i),
        Variant::UInt64(u) => Value::from(*u),
        Variant::Double(d) => Value::from(*d),
        Variant::Str(s) => Value::from(s.clone()),
        Variant::Bytes(data) => Value::from(data.clone()),
        Variant::Boxed(inner) => Value::Value(Box::new(from_variant(inner))),
        other => Value::from(other.to_string()),
    }
}
