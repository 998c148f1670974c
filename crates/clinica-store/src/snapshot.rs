//! Point-in-time view of one store location.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::StoreError;
use crate::path::StorePath;
use crate::Result;

/// The value found at a path when a read or subscription fired.
///
/// A snapshot of a missing location exists as an object but reports
/// `exists() == false`; reads never fail just because nothing is there.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    path: StorePath,
    value: Option<Value>,
}

impl Snapshot {
    pub(crate) fn new(path: StorePath, value: Option<Value>) -> Self {
        Self { path, value }
    }

    pub fn path(&self) -> &StorePath {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.value.is_some()
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Decode the snapshot into a typed record; a missing location is the
    /// [`StoreError::Missing`] error.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        let value = self
            .value
            .clone()
            .ok_or_else(|| StoreError::Missing(self.path.to_string()))?;
        serde_json::from_value(value).map_err(|source| StoreError::Decode {
            path: self.path.to_string(),
            source,
        })
    }

    /// Decode the snapshot as `T`, or fall back to a default when the
    /// location is empty.  Decode failures still surface.
    pub fn decode_or_default<T: DeserializeOwned + Default>(&self) -> Result<T> {
        if self.exists() {
            self.decode()
        } else {
            Ok(T::default())
        }
    }

    /// Iterate the object children in key order.
    ///
    /// Push-generated keys sort chronologically, so key order is insertion
    /// order for pushed collections.  A missing or non-object snapshot
    /// yields nothing.
    pub fn children(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.value
            .as_ref()
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|map| map.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Decode every child as `T`, keyed by its store key.
    pub fn decode_children<T: DeserializeOwned>(&self) -> Result<Vec<(String, T)>> {
        let mut out = Vec::new();
        for (key, value) in self.children() {
            let record =
                serde_json::from_value(value.clone()).map_err(|source| StoreError::Decode {
                    path: format!("{}/{key}", self.path),
                    source,
                })?;
            out.push((key.to_string(), record));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_snapshot_decodes_to_default() {
        let snap = Snapshot::new(StorePath::parse("x").unwrap(), None);
        assert!(!snap.exists());
        let value: Vec<(String, i32)> = snap.decode_children().unwrap();
        assert!(value.is_empty());
        let map: serde_json::Map<String, Value> = snap.decode_or_default().unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn children_iterate_in_key_order() {
        let snap = Snapshot::new(
            StorePath::parse("x").unwrap(),
            Some(json!({"b": 2, "a": 1, "c": 3})),
        );
        let keys: Vec<&str> = snap.children().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }
}
