//! Host values
//!
//! Primitives and strings are plain values. Lists and records live behind
//! [`Shared`] handles: cloning a handle shares the object, and the handle's
//! [`Identity`] is what the conversion contexts use to tell "the same object"
//! from "an equal object". Graphs built from handles may contain cycles.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::json;

use crate::error::ConversionError;
use crate::types::HostType;

/// Non-owning identity of a shared host object.
///
/// Only valid while the object is alive, which the caller guarantees for the
/// duration of one conversion call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(usize);

/// A shared, lockable host object.
pub struct Shared<T>(Arc<RwLock<T>>);

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    pub fn identity(&self) -> Identity {
        Identity(Arc::as_ptr(&self.0) as *const () as usize)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> PartialEq for Shared<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

// Contents are not printed: a cyclic graph would never finish.
impl<T> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shared({:#x})", self.identity().0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub elem_type: HostType,
    pub items: Vec<HostValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub type_name: String,
    pub fields: Vec<(String, HostValue)>,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&HostValue> {
        self.fields.iter().find(|(key, _)| key == name).map(|(_, v)| v)
    }

    /// Set a field, replacing an existing one of the same name in place.
    pub fn set(&mut self, name: impl Into<String>, value: HostValue) {
        let name = name.into();
        match self.fields.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }
}

/// A value in the host type system.
///
/// Equality is structural for primitives and strings and by identity for
/// lists and records.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Null,
    Bool(bool),
    Char(char),
    S8(i8),
    S16(i16),
    S32(i32),
    S64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    List(Shared<List>),
    Record(Shared<Record>),
}

impl HostValue {
    pub fn list(elem_type: HostType, items: Vec<HostValue>) -> Self {
        HostValue::List(Shared::new(List { elem_type, items }))
    }

    pub fn record<K: Into<String>>(
        type_name: impl Into<String>,
        fields: impl IntoIterator<Item = (K, HostValue)>,
    ) -> Self {
        HostValue::Record(Shared::new(Record {
            type_name: type_name.into(),
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, HostValue::Null)
    }

    /// The runtime type, used for outbound dispatch. `None` for null.
    pub fn host_type(&self) -> Option<HostType> {
        let ty = match self {
            HostValue::Null => return None,
            HostValue::Bool(_) => HostType::Bool,
            HostValue::Char(_) => HostType::Char,
            HostValue::S8(_) => HostType::S8,
            HostValue::S16(_) => HostType::S16,
            HostValue::S32(_) => HostType::S32,
            HostValue::S64(_) => HostType::S64,
            HostValue::U8(_) => HostType::U8,
            HostValue::U16(_) => HostType::U16,
            HostValue::U32(_) => HostType::U32,
            HostValue::U64(_) => HostType::U64,
            HostValue::F32(_) => HostType::F32,
            HostValue::F64(_) => HostType::F64,
            HostValue::String(_) => HostType::String,
            HostValue::List(list) => HostType::list(list.read().elem_type.clone()),
            HostValue::Record(record) => HostType::record(record.read().type_name.clone()),
        };
        Some(ty)
    }

    /// Identity of lists and records; `None` for values without one.
    pub fn identity(&self) -> Option<Identity> {
        match self {
            HostValue::List(list) => Some(list.identity()),
            HostValue::Record(record) => Some(record.identity()),
            _ => None,
        }
    }

    /// Build a host value from JSON. Objects become `Object` records, arrays
    /// become lists typed after their first element. Nothing is shared.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => HostValue::Null,
            serde_json::Value::Bool(b) => HostValue::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    HostValue::S64(i)
                } else if let Some(u) = n.as_u64() {
                    HostValue::U64(u)
                } else {
                    HostValue::F64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => HostValue::String(s.clone()),
            serde_json::Value::Array(items) => {
                let items: Vec<HostValue> = items.iter().map(HostValue::from_json).collect();
                let elem_type = items
                    .iter()
                    .find_map(HostValue::host_type)
                    .unwrap_or(HostType::String);
                HostValue::list(elem_type, items)
            }
            serde_json::Value::Object(map) => HostValue::record(
                "Object",
                map.iter().map(|(k, v)| (k.clone(), HostValue::from_json(v))),
            ),
        }
    }

    /// Render as JSON for display. A back-edge into an object that is
    /// still being rendered becomes `{"$cycle": "<type>"}`.
    pub fn to_json(&self) -> serde_json::Value {
        let mut path = HashSet::new();
        self.to_json_inner(&mut path)
    }

    fn to_json_inner(&self, path: &mut HashSet<Identity>) -> serde_json::Value {
        match self {
            HostValue::Null => serde_json::Value::Null,
            HostValue::Bool(b) => json!(b),
            HostValue::Char(c) => json!(c.to_string()),
            HostValue::S8(n) => json!(n),
            HostValue::S16(n) => json!(n),
            HostValue::S32(n) => json!(n),
            HostValue::S64(n) => json!(n),
            HostValue::U8(n) => json!(n),
            HostValue::U16(n) => json!(n),
            HostValue::U32(n) => json!(n),
            HostValue::U64(n) => json!(n),
            HostValue::F32(n) => json!(n),
            HostValue::F64(n) => json!(n),
            HostValue::String(s) => json!(s),
            HostValue::List(list) => {
                if !path.insert(list.identity()) {
                    return json!({ "$cycle": "list" });
                }
                let items = list.read().items.clone();
                let out = items.iter().map(|item| item.to_json_inner(path)).collect();
                path.remove(&list.identity());
                serde_json::Value::Array(out)
            }
            HostValue::Record(record) => {
                let (type_name, fields) = {
                    let guard = record.read();
                    (guard.type_name.clone(), guard.fields.clone())
                };
                if !path.insert(record.identity()) {
                    return json!({ "$cycle": type_name });
                }
                let mut out = serde_json::Map::new();
                for (key, value) in &fields {
                    out.insert(key.clone(), value.to_json_inner(path));
                }
                path.remove(&record.identity());
                serde_json::Value::Object(out)
            }
        }
    }
}

// ============================================================================
// From implementations for Rust values
// ============================================================================

macro_rules! host_value_primitives {
    ($($rust:ty => $variant:ident, $host:ident;)*) => {
        $(
            impl From<$rust> for HostValue {
                fn from(v: $rust) -> Self {
                    HostValue::$variant(v)
                }
            }

            impl TryFrom<HostValue> for $rust {
                type Error = ConversionError;
                fn try_from(v: HostValue) -> Result<Self, Self::Error> {
                    match v {
                        HostValue::$variant(x) => Ok(x),
                        _ => Err(ConversionError::mismatch(&HostType::$host)),
                    }
                }
            }
        )*
    };
}

host_value_primitives! {
    bool => Bool, Bool;
    char => Char, Char;
    i8 => S8, S8;
    i16 => S16, S16;
    i32 => S32, S32;
    i64 => S64, S64;
    u8 => U8, U8;
    u16 => U16, U16;
    u32 => U32, U32;
    u64 => U64, U64;
    f32 => F32, F32;
    f64 => F64, F64;
    String => String, String;
}

impl From<&str> for HostValue {
    fn from(v: &str) -> Self {
        HostValue::String(v.to_string())
    }
}

impl<T: Into<HostValue>> From<Option<T>> for HostValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(HostValue::Null)
    }
}

// ============================================================================
// FromHost - extraction into Rust types
// ============================================================================

/// Convert a host value into a Rust value.
///
/// Separate from `TryFrom` so that `Option<T>` can be implemented without
/// running into the blanket `TryFrom` coherence rules.
pub trait FromHost: Sized {
    fn from_host(v: HostValue) -> Result<Self, ConversionError>;
}

impl<T: TryFrom<HostValue, Error = ConversionError>> FromHost for T {
    fn from_host(v: HostValue) -> Result<Self, ConversionError> {
        T::try_from(v)
    }
}

impl<T: FromHost> FromHost for Option<T> {
    fn from_host(v: HostValue) -> Result<Self, ConversionError> {
        match v {
            HostValue::Null => Ok(None),
            other => T::from_host(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_follows_sharing_not_equality() {
        let a = HostValue::record("Point", [("x", HostValue::S32(1))]);
        let b = HostValue::record("Point", [("x", HostValue::S32(1))]);
        let a2 = a.clone();
        assert_eq!(a.identity(), a2.identity());
        assert_ne!(a.identity(), b.identity());
        assert_ne!(a, b);
        assert_eq!(HostValue::S32(3).identity(), None);
    }

    #[test]
    fn extraction() {
        assert_eq!(i32::from_host(HostValue::S32(7)), Ok(7));
        assert_eq!(Option::<u8>::from_host(HostValue::Null), Ok(None));
        assert_eq!(
            i64::from_host(HostValue::S32(7)),
            Err(ConversionError::mismatch(&HostType::S64))
        );
    }

    #[test]
    fn cyclic_json_terminates() {
        let node = Shared::new(Record::new("Node"));
        node.write().set("next", HostValue::Record(node.clone()));
        let json = HostValue::Record(node).to_json();
        assert_eq!(json, json!({ "next": { "$cycle": "Node" } }));
    }

    #[test]
    fn from_json_builds_records_and_lists() {
        let value = HostValue::from_json(&json!({ "tags": ["a", "b"], "n": 2 }));
        assert_eq!(value.host_type(), Some(HostType::record("Object")));
        let HostValue::Record(record) = value else {
            panic!("expected record");
        };
        let tags = record.read().field("tags").cloned();
        assert_eq!(
            tags.and_then(|t| t.host_type()),
            Some(HostType::list(HostType::String))
        );
    }
}
