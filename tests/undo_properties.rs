//! Property tests for the undo protocol.

use normcache::{KeySchema, MemoryTree, ResourceStore};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;

fn users_store() -> (ResourceStore, Arc<MemoryTree>) {
    let tree = Arc::new(MemoryTree::new());
    let store = ResourceStore::new(
        "https://api.example.com",
        Arc::new(KeySchema::new("users")),
        tree.clone(),
    );
    (store, tree)
}

fn record(id: u64, name: &str) -> Value {
    json!({"id": id, "name": name})
}

proptest! {
    /// Deleting a model and replaying its undo log, in order, is an
    /// identity on the whole subtree: the model comes back verbatim and
    /// every collection regains the identifier at its original index.
    #[test]
    fn delete_then_undo_is_identity(
        records in prop::collection::vec((1u64..20, "[a-z]{1,8}"), 1..12),
        stride in 1usize..4,
    ) {
        let (store, tree) = users_store();

        let payload: Vec<Value> = records.iter().map(|(id, name)| record(*id, name)).collect();
        let subset: Vec<Value> = payload.iter().step_by(stride).cloned().collect();

        store.set_collection("/users", payload).unwrap();
        if subset.first().map(|v| v.is_object()).unwrap_or(false) {
            store.set_collection("/users?subset=true", subset).unwrap();
        }

        let target = records[0].0;
        let before = tree.snapshot();

        let undo = store.delete_model(target);
        prop_assert!(!undo.is_empty());
        prop_assert!(store.get_model(target).is_none());

        store.apply_undo(undo);
        prop_assert_eq!(tree.snapshot(), before);
    }

    /// Deleting an identifier that was never cached changes nothing and
    /// produces an empty log, for any prior store contents.
    #[test]
    fn delete_of_absent_id_is_noop(
        records in prop::collection::vec((1u64..20, "[a-z]{1,8}"), 0..8),
    ) {
        let (store, tree) = users_store();

        let payload: Vec<Value> = records.iter().map(|(id, name)| record(*id, name)).collect();
        if payload.first().map(|v| v.is_object()).unwrap_or(false) {
            store.set_collection("/users", payload).unwrap();
        }

        let before = tree.snapshot();
        let undo = store.delete_model(999u64);

        prop_assert!(undo.is_empty());
        prop_assert_eq!(tree.snapshot(), before);
    }
}
