//! Core value types and operations.

use crate::error::{PatchError, Result};
use std::collections::BTreeMap;

/// Value is one node of a document tree.
///
/// `Map` is the generic nested object: the diff engine recurses into it key by
/// key. Every other variant, `List` and `TypedMap` included, is an atomic leaf
/// that is compared as a whole and replaced as a whole.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    /// Unsigned integers above `i64::MAX`; smaller ones are always `Int`.
    Uint(u64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(Map),
    TypedMap(TypedMap),
}

/// Map is a generic nested object with string keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Map {
    pub fields: BTreeMap<String, Value>,
}

/// TypedMap is a flat key to scalar mapping treated as a single value.
///
/// The diff never merges entries key by key; two typed maps are either equal
/// or the desired one replaces the observed one. On the wire it is a plain
/// object, so applying a patch does merge it (see `patch::merge_patch`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypedMap {
    entries: BTreeMap<String, Value>,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Uint(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Returns true for the generic nested object representation.
    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn is_typed_map(&self) -> bool {
        matches!(self, Value::TypedMap(_))
    }

    /// Returns true for null, booleans, numbers and strings.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Null
                | Value::Bool(_)
                | Value::Int(_)
                | Value::Uint(_)
                | Value::Float(_)
                | Value::String(_)
        )
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_typed_map(&self) -> Option<&TypedMap> {
        match self {
            Value::TypedMap(m) => Some(m),
            _ => None,
        }
    }

    /// Returns a short human readable name of the variant, used in errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) | Value::Uint(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "object",
            Value::TypedMap(_) => "typed map",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Uint(a), Value::Uint(b)) => a == b,
            // Bitwise, so equality agrees with the encoded form (0.0 vs -0.0).
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::TypedMap(a), Value::TypedMap(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        match i64::try_from(u) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::Uint(u),
        }
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Map> for Value {
    fn from(m: Map) -> Self {
        Value::Map(m)
    }
}

impl From<TypedMap> for Value {
    fn from(m: TypedMap) -> Self {
        Value::TypedMap(m)
    }
}

impl Map {
    pub fn new() -> Self {
        Map {
            fields: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.fields.get_mut(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Builder form of [`Map::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn delete(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Map {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Map {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl TypedMap {
    pub fn new() -> Self {
        TypedMap {
            entries: BTreeMap::new(),
        }
    }

    /// Builds a typed map, rejecting any entry that is not a scalar.
    pub fn from_entries<K, I>(entries: I) -> Result<TypedMap>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut map = TypedMap::new();
        for (key, value) in entries {
            let key = key.into();
            if !value.is_scalar() {
                return Err(PatchError::malformed(
                    format!("[{:?}]", key),
                    format!("typed map entries must be scalars, got {}", value.type_name()),
                ));
            }
            map.entries.insert(key, value);
        }
        Ok(map)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Copies the entries into a generic object, the shape it has on the wire.
    pub fn to_map(&self) -> Map {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Collects string pairs, the common `map[string]string` shape.
impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TypedMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        TypedMap {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), Value::String(v.into())))
                .collect(),
        }
    }
}
