//! The store client handle.

use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::debug;

use crate::error::StoreError;
use crate::path::StorePath;
use crate::push_id::PushIdGenerator;
use crate::snapshot::Snapshot;
use crate::tree;
use crate::Result;

/// A staged multi-location write, committed all-or-nothing.
///
/// Each operation either sets a value at a path or deletes the path.
/// Overlapping locations are rejected at commit time because applying
/// them would make the outcome depend on staging order.
#[derive(Debug, Default)]
pub struct MultiWrite {
    ops: Vec<(StorePath, Option<Value>)>,
}

impl MultiWrite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, path: StorePath, value: Value) -> Self {
        self.ops.push((path, Some(value)));
        self
    }

    pub fn remove(mut self, path: StorePath) -> Self {
        self.ops.push((path, None));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    fn validate(&self) -> Result<()> {
        if self.ops.is_empty() {
            return Err(StoreError::EmptyCommit);
        }
        for (i, (a, _)) in self.ops.iter().enumerate() {
            for (b, _) in &self.ops[i + 1..] {
                if a.intersects(b) {
                    return Err(StoreError::ConflictingWrite {
                        first: a.to_string(),
                        second: b.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

struct Watcher {
    path: StorePath,
    tx: watch::Sender<Snapshot>,
}

struct StoreInner {
    root: Value,
    watchers: Vec<Watcher>,
    push_ids: PushIdGenerator,
}

/// Clonable handle to the store.
///
/// All mutating calls are async and resolve or reject once; there is no
/// retry or offline queue at this layer.  Every committed write is
/// observed atomically by subscribers.
#[derive(Clone)]
pub struct StoreClient {
    inner: Arc<Mutex<StoreInner>>,
}

impl StoreClient {
    /// An empty store.
    pub fn new() -> Self {
        Self::with_root(Value::Object(Map::new()))
    }

    /// A store seeded with an initial tree (tests and demos).
    pub fn with_root(root: Value) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                root,
                watchers: Vec::new(),
                push_ids: PushIdGenerator::new(),
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(|poison| poison.into_inner())
    }

    /// Read-once at a path.  A missing location yields an empty snapshot.
    pub async fn read(&self, path: &StorePath) -> Snapshot {
        let inner = self.lock();
        Snapshot::new(path.clone(), tree::get(&inner.root, path).cloned())
    }

    /// Subscribe to a path.
    ///
    /// The subscription immediately holds the current snapshot and is
    /// re-delivered whenever a committed write intersects the path.
    /// Dropping the subscription only stops delivery; it does not affect
    /// in-flight writes.
    pub fn subscribe(&self, path: &StorePath) -> Subscription {
        let mut inner = self.lock();
        let initial = Snapshot::new(path.clone(), tree::get(&inner.root, path).cloned());
        let (tx, rx) = watch::channel(initial);
        inner.watchers.push(Watcher { path: path.clone(), tx });
        Subscription { rx }
    }

    /// Replace the value at a path.
    pub async fn set(&self, path: &StorePath, value: Value) -> Result<()> {
        self.apply(MultiWrite::new().set(path.clone(), value))
    }

    /// Delete a path (write nothing there).
    pub async fn remove(&self, path: &StorePath) -> Result<()> {
        self.apply(MultiWrite::new().remove(path.clone()))
    }

    /// Partial update: merge the given fields into the object at `path`.
    /// A `null` field value deletes that child; unnamed children are
    /// untouched.
    pub async fn update(&self, path: &StorePath, fields: Map<String, Value>) -> Result<()> {
        let mut inner = self.lock();
        debug!(path = %path, fields = fields.len(), "update");
        tree::merge_fields(&mut inner.root, path, fields);
        notify(&mut inner, &[path.clone()]);
        Ok(())
    }

    /// Push a new child under `path` with a generated chronological key.
    pub async fn push(&self, path: &StorePath, value: Value) -> Result<String> {
        let key = {
            let mut inner = self.lock();
            let now = chrono::Utc::now().timestamp_millis();
            inner.push_ids.generate(now)
        };
        let child = path.child(&key)?;
        self.apply(MultiWrite::new().set(child, value))?;
        Ok(key)
    }

    /// Generate a push key without writing anything.
    ///
    /// Used when a pushed record and writes referencing its key must land
    /// in one [`MultiWrite`].
    pub fn generate_key(&self) -> String {
        let mut inner = self.lock();
        let now = chrono::Utc::now().timestamp_millis();
        inner.push_ids.generate(now)
    }

    /// Commit a staged multi-location write atomically.
    ///
    /// Validation happens before anything is touched; a rejected commit
    /// leaves the tree exactly as it was and notifies nobody.
    pub async fn commit(&self, write: MultiWrite) -> Result<()> {
        self.apply(write)
    }

    fn apply(&self, write: MultiWrite) -> Result<()> {
        write.validate()?;
        let mut inner = self.lock();
        debug!(ops = write.len(), "commit");
        let mut touched = Vec::with_capacity(write.ops.len());
        for (path, value) in write.ops {
            tree::set(&mut inner.root, &path, value);
            touched.push(path);
        }
        notify(&mut inner, &touched);
        Ok(())
    }

    /// Clone of the whole tree, for diagnostics and tests.
    pub fn export(&self) -> Value {
        self.lock().root.clone()
    }
}

impl Default for StoreClient {
    fn default() -> Self {
        Self::new()
    }
}

fn notify(inner: &mut StoreInner, touched: &[StorePath]) {
    // Split borrow: watchers are re-fed from the committed tree.
    let StoreInner { root, watchers, .. } = inner;
    watchers.retain(|watcher| {
        if touched.iter().any(|path| path.intersects(&watcher.path)) {
            let snapshot = Snapshot::new(watcher.path.clone(), tree::get(root, &watcher.path).cloned());
            watcher.tx.send(snapshot).is_ok()
        } else {
            !watcher.tx.is_closed()
        }
    });
}

/// Live feed of snapshots for one subscribed path.
pub struct Subscription {
    rx: watch::Receiver<Snapshot>,
}

impl Subscription {
    /// The most recently delivered snapshot.
    pub fn current(&self) -> Snapshot {
        self.rx.borrow().clone()
    }

    /// Wait for the next committed change and return its snapshot.
    pub async fn changed(&mut self) -> Result<Snapshot> {
        self.rx.changed().await.map_err(|_| StoreError::Closed)?;
        Ok(self.rx.borrow_and_update().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(raw: &str) -> StorePath {
        StorePath::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn read_missing_is_empty_not_error() {
        let store = StoreClient::new();
        let snap = store.read(&path("appointments")).await;
        assert!(!snap.exists());
    }

    #[tokio::test]
    async fn update_merges_fields() {
        let store = StoreClient::with_root(json!({
            "appointments": {"u1": {"a1": {"approved": false, "price": 100.0}}}
        }));
        let fields = json!({"approved": true}).as_object().cloned().unwrap();
        store.update(&path("appointments/u1/a1"), fields).await.unwrap();

        let snap = store.read(&path("appointments/u1/a1")).await;
        assert_eq!(snap.value(), Some(&json!({"approved": true, "price": 100.0})));
    }

    #[tokio::test]
    async fn subscription_sees_every_commit_on_its_path() {
        let store = StoreClient::new();
        let mut sub = store.subscribe(&path("sales"));
        assert!(!sub.current().exists());

        store.set(&path("sales/s1"), json!({"discount": 0})).await.unwrap();
        let snap = sub.changed().await.unwrap();
        assert!(snap.exists());
        assert!(snap.children().any(|(key, _)| key == "s1"));
    }

    #[tokio::test]
    async fn conflicting_multi_write_changes_nothing() {
        let store = StoreClient::with_root(json!({"vendors": {"v1": {"products": {"p1": {"quantity": 5}}}}}));
        let write = MultiWrite::new()
            .set(path("vendors/v1/products/p1/quantity"), json!(7))
            .remove(path("vendors/v1/products/p1"));

        let err = store.commit(write).await.unwrap_err();
        assert!(matches!(err, StoreError::ConflictingWrite { .. }));

        let snap = store.read(&path("vendors/v1/products/p1/quantity")).await;
        assert_eq!(snap.value(), Some(&json!(5)));
    }

    #[tokio::test]
    async fn multi_write_is_observed_atomically() {
        let store = StoreClient::with_root(json!({
            "sales": {"s1": {"discount": 0}},
            "vendors": {"v1": {"products": {"p1": {"quantity": 3, "sellhistory": {"s1": {"quantity": 2}}}}}}
        }));
        let mut sub = store.subscribe(&StorePath::root());

        let write = MultiWrite::new()
            .set(path("vendors/v1/products/p1/quantity"), json!(5))
            .remove(path("vendors/v1/products/p1/sellhistory/s1"))
            .remove(path("sales/s1"));
        store.commit(write).await.unwrap();

        let snap = sub.changed().await.unwrap();
        let root = snap.value().unwrap();
        assert_eq!(root["vendors"]["v1"]["products"]["p1"]["quantity"], json!(5));
        assert!(root["vendors"]["v1"]["products"]["p1"].get("sellhistory").is_none());
        assert!(root.get("sales").is_none());
    }

    #[tokio::test]
    async fn push_keys_preserve_insertion_order() {
        let store = StoreClient::new();
        let mut keys = Vec::new();
        for i in 0..10 {
            keys.push(store.push(&path("contacts"), json!({"n": i})).await.unwrap());
        }
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);

        let snap = store.read(&path("contacts")).await;
        let order: Vec<String> = snap.children().map(|(k, _)| k.to_string()).collect();
        assert_eq!(order, keys);
    }
}
