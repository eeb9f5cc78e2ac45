use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Result;

/// Suffix marking a field the server must reset to null.
pub const NULL_SUFFIX: &str = "__null";

/// An enum exposed by the API, sent either as its string or integer value.
pub trait ApiEnum {
    /// Wire value of this variant
    fn to_param(&self) -> Value;
}

/// Params is the ordered parameter container forming a request body.
///
/// Null values never reach the body: `add` drops them and `add_object`
/// strips null fields recursively. Use [`Params::add_null`] to ask the
/// server to clear a field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: IndexMap<String, Value>,
}

impl Params {
    /// Create an empty container
    pub fn new() -> Self {
        Params::default()
    }

    /// Insert or overwrite a value. Null values are omitted.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();
        match strip_nulls(value.into()) {
            Value::Null => tracing::trace!(key = %key, "omitting null parameter"),
            value => {
                self.entries.insert(key, value);
            }
        }
        self
    }

    /// Builder-style variant of [`Params::add`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.add(key, value);
        self
    }

    /// Insert an API enum value
    pub fn add_enum<E: ApiEnum>(&mut self, key: impl Into<String>, value: &E) -> &mut Self {
        self.add(key, value.to_param())
    }

    /// Insert any serializable object, such as a typed entity
    pub fn add_object<S: Serialize>(&mut self, key: impl Into<String>, value: &S) -> Result<&mut Self> {
        let value = serde_json::to_value(value)?;
        Ok(self.add(key, value))
    }

    /// Insert a nested container
    pub fn add_params(&mut self, key: impl Into<String>, value: Params) -> &mut Self {
        self.add(key, value.into_value())
    }

    /// Ask the server to reset `key` to null
    pub fn add_null(&mut self, key: &str) -> &mut Self {
        self.entries.shift_remove(key);
        self.entries
            .insert(format!("{}{}", key, NULL_SUFFIX), Value::String(String::new()));
        self
    }

    /// Merge every entry of `other` into this container, overwriting on collision
    pub fn put_all(&mut self, other: &Params) -> &mut Self {
        for (key, value) in &other.entries {
            self.entries.insert(key.clone(), value.clone());
        }
        self
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Get a string value by key
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Remove a key, returning its value
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    /// Check if a key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the container has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Render the canonical request body.
    ///
    /// Keys are emitted sorted, so the output depends on the container
    /// content only and is stable enough to be signed.
    pub fn serialize(&self) -> String {
        self.to_value().to_string()
    }

    /// Canonical JSON value of this container
    pub fn to_value(&self) -> Value {
        self.clone().into_value()
    }

    fn into_value(self) -> Value {
        let mut entries: Vec<(String, Value)> = self.entries.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Value::Object(entries.into_iter().map(|(k, v)| (k, sort_keys(v))).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.add(key, value);
        }
        params
    }
}

impl From<Params> for Value {
    fn from(params: Params) -> Self {
        params.into_value()
    }
}

fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .filter(|v| !v.is_null())
                .map(strip_nulls)
                .collect(),
        ),
        other => other,
    }
}

// Rebuilds objects in key order; a no-op unless serde_json keeps insertion order.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (k, v) in entries {
                sorted.insert(k, sort_keys(v));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
