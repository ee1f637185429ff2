// SPDX-License-Identifier: LGPL-3.0-only
//! Dynamically typed values carried by menu attributes and remote layouts.

use indexmap::IndexMap;
use std::fmt;

/// A dynamically typed value.
///
/// This is the value type of menu attributes and of everything decoded from a
/// remote layout. The set of shapes mirrors the DBus type system closely enough
/// to validate fetched layouts (`(ia{sv}av)`) without dragging a bus library
/// into the core.
#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
    /// `b`
    Bool(bool),
    /// `y`
    Byte(u8),
    /// `i`
    Int32(i32),
    /// `u`
    UInt32(u32),
    /// `x`
    Int64(i64),
    /// `t`
    UInt64(u64),
    /// `d`
    Double(f64),
    /// `s`
    Str(String),
    /// `ay`
    Bytes(Vec<u8>),
    /// `a*`; the element signature is derived from the first element.
    Array(Vec<Variant>),
    /// `a{sv}`
    Dict(IndexMap<String, Variant>),
    /// `(...)`
    Tuple(Vec<Variant>),
    /// `v`
    Boxed(Box<Variant>),
}

impl Variant {
    /// Wrap a value into a `v`.
    pub fn boxed(value: impl Into<Variant>) -> Self {
        Variant::Boxed(Box::new(value.into()))
    }

    /// The DBus-style type signature of this value.
    pub fn type_string(&self) -> String {
        match self {
            Variant::Bool(_) => "b".into(),
            Variant::Byte(_) => "y".into(),
            Variant::Int32(_) => "i".into(),
            Variant::UInt32(_) => "u".into(),
            Variant::Int64(_) => "x".into(),
            Variant::UInt64(_) => "t".into(),
            Variant::Double(_) => "d".into(),
            Variant::Str(_) => "s".into(),
            Variant::Bytes(_) => "ay".into(),
            Variant::Array(items) => match items.first() {
                Some(first) => format!("a{}", first.type_string()),
                None => "av".into(),
            },
            Variant::Dict(_) => "a{sv}".into(),
            Variant::Tuple(fields) => {
                let inner: String = fields.iter().map(Variant::type_string).collect();
                format!("({inner})")
            },
            Variant::Boxed(_) => "v".into(),
        }
    }

    /// Strip any number of `v` wrappers.
    pub fn unboxed(&self) -> &Variant {
        let mut value = self;
        while let Variant::Boxed(inner) = value {
            value = inner;
        }
        value
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.unboxed() {
            Variant::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self.unboxed() {
            Variant::Int32(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.unboxed() {
            Variant::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Bool(b) => write!(f, "{b}"),
            Variant::Byte(b) => write!(f, "0x{b:02x}"),
            Variant::Int32(i) => write!(f, "{i}"),
            Variant::UInt32(u) => write!(f, "{u}"),
            Variant::Int64(i) => write!(f, "{i}"),
            Variant::UInt64(u) => write!(f, "{u}"),
            Variant::Double(d) => write!(f, "{d}"),
            Variant::Str(s) => write!(f, "'{s}'"),
            Variant::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Variant::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            },
            Variant::Dict(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "'{key}': {value}")?;
                }
                write!(f, "}}")
            },
            Variant::Tuple(fields) => {
                write!(f, "(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{field}")?;
                }
                write!(f, ")")
            },
            Variant::Boxed(inner) => write!(f, "<{inner}>"),
        }
    }
}

impl From<bool> for Variant {
    fn from(value: bool) -> Self {
        Variant::Bool(value)
    }
}

impl From<i32> for Variant {
    fn from(value: i32) -> Self {
        Variant::Int32(value)
    }
}

impl From<u32> for Variant {
    fn from(value: u32) -> Self {
        Variant::UInt32(value)
    }
}

impl From<String> for Variant {
    fn from(value: String) -> Self {
        Variant::Str(value)
    }
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Variant::Str(value.to_string())
    }
}

impl From<Vec<u8>> for Variant {
    fn from(value: Vec<u8>) -> Self {
        Variant::Bytes(value)
    }
}

/// An icon as exported in the `icon` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Icon {
    /// A named icon resolved through the icon theme.
    Themed(String),
    /// Encoded image data, decoded by an external collaborator.
    Bytes(Vec<u8>),
}

impl Icon {
    /// Serialize the icon in the `(sv)` form used by menu attributes.
    pub fn serialize(&self) -> Variant {
        match self {
            Icon::Themed(name) => Variant::Tuple(vec![
                Variant::from("themed"),
                Variant::boxed(Variant::Array(vec![Variant::from(name.as_str())])),
            ]),
            Icon::Bytes(data) => Variant::Tuple(vec![
                Variant::from("bytes"),
                Variant::boxed(Variant::Bytes(data.clone())),
            ]),
        }
    }
}
