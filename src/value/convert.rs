//! Conversion between decoded wire data and [`Value`] trees.
//!
//! Decoding is bounded by a nesting depth limit. Owned trees cannot be cyclic,
//! so the limit is what keeps hostile input from exhausting the stack.

use super::value::{Map, Value};
use crate::error::{PatchError, Result};
use crate::fieldpath::{Path, PathElement};

/// Default nesting limit, the same as serde_json's parser recursion limit.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Parses a value from JSON text.
pub fn from_json_str(json: &str) -> Result<Value> {
    let decoded: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| PatchError::malformed(Path::new().to_string(), format!("invalid JSON: {}", e)))?;
    from_json_value(&decoded)
}

/// Parses a value from YAML text.
pub fn from_yaml_str(yaml: &str) -> Result<Value> {
    let decoded: serde_yaml::Value = serde_yaml::from_str(yaml)
        .map_err(|e| PatchError::malformed(Path::new().to_string(), format!("invalid YAML: {}", e)))?;
    from_yaml_value(&decoded)
}

/// Converts a decoded JSON value.
pub fn from_json_value(v: &serde_json::Value) -> Result<Value> {
    Decoder::new(DEFAULT_MAX_DEPTH).json(v, &mut Path::new())
}

/// Converts a decoded JSON value with an explicit depth limit.
pub fn from_json_value_with_depth(v: &serde_json::Value, max_depth: usize) -> Result<Value> {
    Decoder::new(max_depth).json(v, &mut Path::new())
}

/// Converts a decoded YAML value.
pub fn from_yaml_value(v: &serde_yaml::Value) -> Result<Value> {
    Decoder::new(DEFAULT_MAX_DEPTH).yaml(v, &mut Path::new())
}

struct Decoder {
    max_depth: usize,
}

impl Decoder {
    fn new(max_depth: usize) -> Self {
        Decoder { max_depth }
    }

    fn check_depth(&self, path: &Path) -> Result<()> {
        if path.len() > self.max_depth {
            return Err(PatchError::malformed(
                path.to_string(),
                format!("nesting depth exceeds limit of {}", self.max_depth),
            ));
        }
        Ok(())
    }

    fn json(&self, v: &serde_json::Value, path: &mut Path) -> Result<Value> {
        self.check_depth(path)?;
        let value = match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::Uint(u)
                } else if let Some(f) = n.as_f64() {
                    Value::Float(f)
                } else {
                    return Err(PatchError::malformed(
                        path.to_string(),
                        format!("unrepresentable number {}", n),
                    ));
                }
            }
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                let mut list = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    path.push(PathElement::index(i));
                    list.push(self.json(item, path)?);
                    path.pop();
                }
                Value::List(list)
            }
            serde_json::Value::Object(obj) => {
                let mut map = Map::new();
                for (k, item) in obj {
                    path.push(PathElement::field_name(k.clone()));
                    let converted = self.json(item, path)?;
                    path.pop();
                    map.fields.insert(k.clone(), converted);
                }
                Value::Map(map)
            }
        };
        Ok(value)
    }

    fn yaml(&self, v: &serde_yaml::Value, path: &mut Path) -> Result<Value> {
        self.check_depth(path)?;
        let value = match v {
            serde_yaml::Value::Null => Value::Null,
            serde_yaml::Value::Bool(b) => Value::Bool(*b),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::Uint(u)
                } else {
                    match n.as_f64() {
                        Some(f) if f.is_finite() => Value::Float(f),
                        _ => {
                            return Err(PatchError::malformed(
                                path.to_string(),
                                format!("unrepresentable number {}", n),
                            ))
                        }
                    }
                }
            }
            serde_yaml::Value::String(s) => Value::String(s.clone()),
            serde_yaml::Value::Sequence(items) => {
                let mut list = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    path.push(PathElement::index(i));
                    list.push(self.yaml(item, path)?);
                    path.pop();
                }
                Value::List(list)
            }
            serde_yaml::Value::Mapping(mapping) => {
                let mut map = Map::new();
                for (k, item) in mapping {
                    let key = match k {
                        serde_yaml::Value::String(s) => s.clone(),
                        other => {
                            return Err(PatchError::malformed(
                                path.to_string(),
                                format!("object keys must be strings, got {:?}", other),
                            ))
                        }
                    };
                    path.push(PathElement::field_name(key.clone()));
                    let converted = self.yaml(item, path)?;
                    path.pop();
                    map.fields.insert(key, converted);
                }
                Value::Map(map)
            }
            serde_yaml::Value::Tagged(tagged) => {
                return Err(PatchError::malformed(
                    path.to_string(),
                    format!("unsupported tagged value {}", tagged.tag),
                ))
            }
        };
        Ok(value)
    }
}

/// Converts a value to serde_json::Value.
///
/// Typed maps become plain JSON objects; keys come out sorted.
pub fn to_json_value(v: &Value) -> Result<serde_json::Value> {
    let json = match v {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::Number((*i).into()),
        Value::Uint(u) => serde_json::Value::Number((*u).into()),
        Value::Float(f) => match serde_json::Number::from_f64(*f) {
            Some(n) => serde_json::Value::Number(n),
            None => {
                return Err(PatchError::EncodingFailure(format!(
                    "non-finite float {} has no JSON representation",
                    f
                )))
            }
        },
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::List(items) => serde_json::Value::Array(
            items.iter().map(to_json_value).collect::<Result<Vec<_>>>()?,
        ),
        Value::Map(map) => map_to_json_value(map)?,
        Value::TypedMap(map) => {
            let mut obj = serde_json::Map::new();
            for (k, item) in map.iter() {
                obj.insert(k.clone(), to_json_value(item)?);
            }
            serde_json::Value::Object(obj)
        }
    };
    Ok(json)
}

/// Converts a map to a serde_json object.
pub fn map_to_json_value(map: &Map) -> Result<serde_json::Value> {
    let mut obj = serde_json::Map::new();
    for (k, item) in map.iter() {
        obj.insert(k.clone(), to_json_value(item)?);
    }
    Ok(serde_json::Value::Object(obj))
}

/// Serializes a value to compact JSON.
pub fn to_json(v: &Value) -> Result<String> {
    let json = to_json_value(v)?;
    serde_json::to_string(&json).map_err(|e| PatchError::EncodingFailure(e.to_string()))
}

/// Serializes a value to YAML.
pub fn to_yaml(v: &Value) -> Result<String> {
    let json = to_json_value(v)?;
    serde_yaml::to_string(&json).map_err(|e| PatchError::EncodingFailure(e.to_string()))
}
