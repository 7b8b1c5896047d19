//! Runtime values.
//!
//! [`Value`] is the closed tagged union every step operates on. Exactly one
//! variant is active at a time and nothing coerces implicitly: a step that
//! needs a bool and finds anything else reports a defect, not a conversion.
//! Heavy payloads sit behind shared handles so cloning a value is cheap and
//! a program can be shared across concurrent evaluations.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;

use crate::adapter::HostRecord;
use crate::error::EvalError;

/// A single runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Double(f64),
    String(Arc<str>),
    Bytes(Arc<[u8]>),
    Duration(Duration),
    Timestamp(DateTime<Utc>),
    List(Arc<[Value]>),
    Map(Arc<MapValue>),
    /// Opaque host record, accessed only through the adapter capability.
    Message(Arc<dyn HostRecord>),
    /// A propagatable failure riding the stack.
    Error(Arc<EvalError>),
    /// Partial-evaluation marker.
    Unknown(Arc<UnknownSet>),
}

impl Value {
    /// Wrap an evaluation error as a stack value.
    pub fn error(err: EvalError) -> Self {
        Value::Error(Arc::new(err))
    }

    /// Name of the active variant, used in defect messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Duration(_) => "duration",
            Value::Timestamp(_) => "timestamp",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Message(_) => "message",
            Value::Error(_) => "error",
            Value::Unknown(_) => "unknown",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Value::UInt(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&EvalError> {
        match self {
            Value::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            // Host records have no value semantics of their own; two
            // messages are equal only when they are the same record.
            (Value::Message(a), Value::Message(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            (Value::Error(a), Value::Error(b)) => a == b,
            (Value::Unknown(a), Value::Unknown(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(Arc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(Arc::from(v.as_str()))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(Arc::from(items))
    }
}

impl From<MapValue> for Value {
    fn from(map: MapValue) -> Self {
        Value::Map(Arc::new(map))
    }
}

impl From<EvalError> for Value {
    fn from(err: EvalError) -> Self {
        Value::error(err)
    }
}

/// Key of a [`Value::Map`] entry. Restricted to the hashable scalar
/// variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
    Bool(bool),
    Int(i64),
    UInt(u64),
    String(Arc<str>),
}

impl From<MapKey> for Value {
    fn from(key: MapKey) -> Self {
        match key {
            MapKey::Bool(b) => Value::Bool(b),
            MapKey::Int(v) => Value::Int(v),
            MapKey::UInt(v) => Value::UInt(v),
            MapKey::String(s) => Value::String(s),
        }
    }
}

impl From<&str> for MapKey {
    fn from(s: &str) -> Self {
        MapKey::String(Arc::from(s))
    }
}

impl From<i64> for MapKey {
    fn from(v: i64) -> Self {
        MapKey::Int(v)
    }
}

/// Insertion-ordered map payload.
#[derive(Debug, Default, PartialEq)]
pub struct MapValue {
    entries: IndexMap<MapKey, Value>,
}

impl MapValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: MapKey, value: Value) {
        self.entries.insert(key, value);
    }

    pub fn get(&self, key: &MapKey) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The keys as a list value, in insertion order.
    pub fn keys_list(&self) -> Value {
        let keys: Vec<Value> = self.entries.keys().cloned().map(Value::from).collect();
        Value::from(keys)
    }
}

impl FromIterator<(MapKey, Value)> for MapValue {
    fn from_iter<I: IntoIterator<Item = (MapKey, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Set of expression ids whose values were unavailable during partial
/// evaluation. Riding the stack like an error, but mergeable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnknownSet {
    ids: Vec<i64>,
}

impl UnknownSet {
    pub fn new(mut ids: Vec<i64>) -> Self {
        ids.sort_unstable();
        ids.dedup();
        Self { ids }
    }

    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    pub fn merge(&self, other: &UnknownSet) -> UnknownSet {
        let mut ids = self.ids.clone();
        ids.extend_from_slice(&other.ids);
        UnknownSet::new(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::from(1i64).type_name(), "int");
        assert_eq!(Value::from("hi").type_name(), "string");
        assert_eq!(Value::error(EvalError::NoMatchingOverload).type_name(), "error");
    }

    #[test]
    fn test_no_cross_variant_equality() {
        assert_ne!(Value::Int(1), Value::UInt(1));
        assert_ne!(Value::Bool(false), Value::Null);
        assert_eq!(Value::from(vec![Value::Int(1)]), Value::from(vec![Value::Int(1)]));
    }

    #[test]
    fn test_map_keys_list_preserves_order() {
        let map: MapValue = [
            (MapKey::from("b"), Value::Int(2)),
            (MapKey::from("a"), Value::Int(1)),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            map.keys_list(),
            Value::from(vec![Value::from("b"), Value::from("a")])
        );
    }

    #[test]
    fn test_unknown_merge_dedups() {
        let a = UnknownSet::new(vec![3, 1]);
        let b = UnknownSet::new(vec![2, 3]);
        assert_eq!(a.merge(&b).ids(), &[1, 2, 3]);
    }
}
