//! Ordered configuration documents.
//!
//! A [`Document`] is an insertion-ordered mapping from string keys to
//! [`Value`]s. Values are a tagged variant: scalars (null, bool, number,
//! string), sequences, or nested mappings. Ordering is observable: keys
//! keep the position they were first inserted at, and re-assigning a key
//! replaces its value in place.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Whether a [`walk`] should descend into the value just visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Descend into the value if it is a nested mapping.
    Continue,
    /// Do not descend into this value.
    Skip,
}

/// An ordered key-value configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn get_sequence(&self, key: &str) -> Option<&[Value]> {
        self.get(key).and_then(Value::as_array).map(Vec::as_slice)
    }

    /// Get a nested mapping by key.
    pub fn get_map(&self, key: &str) -> Option<&Map<String, Value>> {
        self.get(key).and_then(Value::as_object)
    }

    /// Get a copy of a nested mapping as its own document.
    pub fn section(&self, key: &str) -> Option<Document> {
        self.get_map(key).cloned().map(Document)
    }

    /// Look up a value by dotted path, e.g. `"server.tls.port"`.
    ///
    /// Each segment except the last must name a nested mapping. An empty
    /// path returns `None`.
    pub fn lookup(&self, dotted: &str) -> Option<&Value> {
        let mut segments = dotted.split('.');
        let mut current = self.0.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Assign a value, replacing any previous value at the same position.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Remove a key, keeping the relative order of the remaining keys.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Shallow per-key assignment of every top-level key of `other`.
    ///
    /// Keys already present are overwritten entirely (no deep merge) and
    /// keep their position; new keys are appended.
    pub fn assign(&mut self, other: Document) {
        for (key, value) in other.0 {
            self.0.insert(key, value);
        }
    }

    /// Delete every key whose value is null, at any depth.
    ///
    /// Nested mappings are swept recursively. Sequences are values, not
    /// keyed nodes, so their elements are left alone.
    pub fn remove_tombstones(&mut self) {
        remove_nulls(&mut self.0);
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Convert into a plain JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn remove_nulls(map: &mut Map<String, Value>) {
    map.retain(|_, value| !value.is_null());
    for value in map.values_mut() {
        if let Value::Object(child) = value {
            remove_nulls(child);
        }
    }
}

/// Top-down walk over a mapping and every nested mapping below it.
///
/// Keys are visited in document order. For each key the visitor receives
/// the path of the enclosing node (keys from the root), the key, and its
/// value. A nested mapping is descended into right after its key is
/// visited, unless the visitor returns [`Walk::Skip`]. Sequences are not
/// descended into.
pub fn walk<'a, F>(map: &'a Map<String, Value>, visit: &mut F)
where
    F: FnMut(&[&'a str], &'a str, &'a Value) -> Walk,
{
    let mut parents = Vec::new();
    walk_inner(map, &mut parents, visit);
}

fn walk_inner<'a, F>(map: &'a Map<String, Value>, parents: &mut Vec<&'a str>, visit: &mut F)
where
    F: FnMut(&[&'a str], &'a str, &'a Value) -> Walk,
{
    for (key, value) in map {
        if visit(parents.as_slice(), key.as_str(), value) == Walk::Skip {
            continue;
        }
        if let Value::Object(child) = value {
            parents.push(key.as_str());
            walk_inner(child, parents, visit);
            parents.pop();
        }
    }
}

/// Follow a path of keys to a nested mapping.
pub(crate) fn node_at_mut<'a>(
    map: &'a mut Map<String, Value>,
    path: &[String],
) -> Option<&'a mut Map<String, Value>> {
    let mut node = map;
    for key in path {
        node = node.get_mut(key)?.as_object_mut()?;
    }
    Some(node)
}
