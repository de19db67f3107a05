//! In-memory state tree with change notifications.

use crate::subscriptions::{
    SubscriptionConfig, SubscriptionHandle, SubscriptionId, SubscriptionManager,
};
use crate::tree::{value, StateTree};
use crate::types::Path;
use parking_lot::RwLock;
use serde_json::{Map, Value};

/// A process-local state tree backed by a single JSON document.
///
/// Reads clone the value at the requested path under a read lock, so a
/// reader always observes a complete snapshot. Writes replace the subtree
/// at the written path in one lock acquisition; a notifying write then
/// broadcasts the path to overlapping subscribers.
pub struct MemoryTree {
    doc: RwLock<Value>,
    subscriptions: SubscriptionManager,
}

impl MemoryTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::with_document(Value::Object(Map::new()))
    }

    /// Create a tree seeded with an existing document.
    pub fn with_document(doc: Value) -> Self {
        Self {
            doc: RwLock::new(doc),
            subscriptions: SubscriptionManager::new(),
        }
    }

    /// Subscribe to notifying writes overlapping a path prefix.
    pub fn subscribe(&self, config: SubscriptionConfig) -> SubscriptionHandle {
        self.subscriptions.subscribe(config)
    }

    /// Drop a subscription.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscriptions.unsubscribe(id)
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.subscription_count()
    }

    /// Clone the whole document.
    pub fn snapshot(&self) -> Value {
        self.doc.read().clone()
    }

    fn write(&self, path: &Path, value: Value) {
        let mut doc = self.doc.write();
        value::set_in(&mut doc, path, value);
    }
}

impl StateTree for MemoryTree {
    fn get_state(&self, path: &Path) -> Option<Value> {
        value::get_in(&self.doc.read(), path).cloned()
    }

    fn set_state(&self, path: &Path, value: Value) {
        self.write(path, value);
        tracing::trace!(path = %path, "set_state");
        self.subscriptions.broadcast_change(path);
    }

    fn set_state_quiet(&self, path: &Path, value: Value) {
        self.write(path, value);
        tracing::trace!(path = %path, "set_state_quiet");
    }
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_get_absent_path_is_none() {
        let tree = MemoryTree::new();
        assert_eq!(tree.get_state(&Path::root().key("missing")), None);
    }

    #[test]
    fn test_set_then_get_roundtrip() {
        let tree = MemoryTree::new();
        let path = Path::root().key("a").key("b");
        tree.set_state(&path, json!({"x": 1}));
        assert_eq!(tree.get_state(&path), Some(json!({"x": 1})));
        assert_eq!(
            tree.get_state(&Path::root().key("a")),
            Some(json!({"b": {"x": 1}}))
        );
    }

    #[test]
    fn test_loud_write_notifies_quiet_write_does_not() {
        let tree = MemoryTree::new();
        let handle = tree.subscribe(SubscriptionConfig::default());
        let path = Path::root().key("a");

        tree.set_state_quiet(&path, json!(1));
        assert!(handle.recv_timeout(Duration::from_millis(50)).is_err());

        tree.set_state(&path, json!(2));
        let event = handle.recv_timeout(Duration::from_millis(100)).unwrap();
        assert_eq!(
            event,
            crate::subscriptions::TreeEvent::Changed { path: path.clone() }
        );
        assert_eq!(tree.get_state(&path), Some(json!(2)));
    }

    #[test]
    fn test_seeded_document() {
        let tree = MemoryTree::with_document(json!({"seed": true}));
        assert_eq!(tree.get_state(&Path::root().key("seed")), Some(json!(true)));
    }
}
