//! The resource store: normalized models, request views, undo-logged
//! mutations.
//!
//! One `ResourceStore` owns the subtree at `["$api", url, resourceType]`
//! of a [`StateTree`]. The subtree has two sections: `models` (id ->
//! record, each record stored exactly once) and `requests` (request path
//! -> pending/error/data/format). Collections reference models by
//! identifier only; deleting a model strips it from every collection in
//! the same commit.
//!
//! Every mutation that touches more than one field clones the subtree,
//! transforms it, and writes it back with a single `set_state`, so
//! concurrent readers observe either the pre- or post-mutation snapshot.

use crate::error::Result;
use crate::schema::ResourceSchema;
use crate::tree::{value, StateTree};
use crate::types::{ModelId, Path, RequestFormat, UndoAction};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Root key under which every resource subtree lives.
const API_ROOT: &str = "$api";

/// Normalized cache for one (base URL, resource type) pair.
pub struct ResourceStore {
    tree: Arc<dyn StateTree>,
    schema: Arc<dyn ResourceSchema>,
    root: Path,
}

impl ResourceStore {
    /// Create a store rooted at `["$api", url, resourceType]`.
    ///
    /// The state tree is an explicit argument rather than a process-wide
    /// singleton, so each test can run against its own isolated tree.
    pub fn new(
        url: impl Into<String>,
        schema: Arc<dyn ResourceSchema>,
        tree: Arc<dyn StateTree>,
    ) -> Self {
        let root = Path::root()
            .key(API_ROOT)
            .key(url.into())
            .key(schema.resource_type());
        Self { tree, schema, root }
    }

    // --- Path Plumbing ---

    /// The root path of this store's subtree, for scoping subscriptions.
    pub fn subscribe_path(&self) -> &Path {
        &self.root
    }

    /// The resource type name this store caches.
    pub fn resource_type(&self) -> &str {
        self.schema.resource_type()
    }

    /// The conventional request path for the resource root,
    /// `/{resourceType}`.
    pub fn default_path(&self) -> String {
        format!("/{}", self.schema.resource_type())
    }

    fn scoped(&self, segments: &[&str]) -> Path {
        let mut path = self.root.clone();
        for segment in segments {
            path.push(*segment);
        }
        path
    }

    /// Clone this store's whole subtree, or an empty object if it has
    /// never been written.
    fn subtree(&self) -> Value {
        match self.tree.get_state(&self.root) {
            Some(v) if v.is_object() => v,
            _ => Value::Object(Map::new()),
        }
    }

    /// Path of a request field relative to the subtree root.
    fn request_field(path: &str, field: &str) -> Path {
        Path::root().key("requests").key(path).key(field)
    }

    /// Path of a model relative to the subtree root.
    fn model_path(id: &ModelId) -> Path {
        Path::root().key("models").key(id.as_str())
    }

    // --- Request Accessors ---

    /// Read a whole request entry.
    pub fn get_request(&self, path: &str) -> Option<Value> {
        self.tree.get_state(&self.scoped(&["requests", path]))
    }

    /// Overwrite a whole request entry (notifying write).
    pub fn set_request(&self, path: &str, entry: Value) {
        self.tree.set_state(&self.scoped(&["requests", path]), entry);
    }

    /// The raw `data` field of a request, uninterpreted.
    pub fn get_requests_data(&self, path: &str) -> Option<Value> {
        self.tree
            .get_state(&self.scoped(&["requests", path, "data"]))
    }

    /// Overwrite a request's raw `data` field (notifying write).
    pub fn set_requests_data(&self, path: &str, data: Value) {
        self.tree
            .set_state(&self.scoped(&["requests", path, "data"]), data);
    }

    /// The format tag of a request's `data`.
    pub fn get_requests_format(&self, path: &str) -> Option<RequestFormat> {
        self.tree
            .get_state(&self.scoped(&["requests", path, "format"]))
            .map(|v| RequestFormat::from_value(Some(&v)))
    }

    /// Set the format tag of a request's `data` (notifying write).
    pub fn set_requests_format(&self, path: &str, format: RequestFormat) {
        self.tree.set_state(
            &self.scoped(&["requests", path, "format"]),
            Value::String(format.as_str().to_string()),
        );
    }

    /// A request's in-flight flag. Absent reads as `None`.
    pub fn get_pending(&self, path: &str) -> Option<bool> {
        self.tree
            .get_state(&self.scoped(&["requests", path, "pending"]))
            .and_then(|v| v.as_bool())
    }

    /// Set the in-flight flag. Always a quiet write: observers of the
    /// collection are not re-notified for the pending bit alone.
    pub fn set_pending(&self, path: &str, pending: bool) {
        self.tree.set_state_quiet(
            &self.scoped(&["requests", path, "pending"]),
            Value::Bool(pending),
        );
    }

    /// The last error value stored for a request.
    pub fn get_error(&self, path: &str) -> Option<Value> {
        self.tree
            .get_state(&self.scoped(&["requests", path, "error"]))
    }

    /// Store an error value for a request (notifying write — error
    /// surfaces typically want to re-render).
    pub fn set_error(&self, path: &str, error: Value) {
        self.tree
            .set_state(&self.scoped(&["requests", path, "error"]), error);
    }

    /// Store an error value without notifying subscribers.
    pub fn set_error_quiet(&self, path: &str, error: Value) {
        self.tree
            .set_state_quiet(&self.scoped(&["requests", path, "error"]), error);
    }

    // --- Model Accessors ---

    /// The whole `models` mapping, empty if never written.
    pub fn get_models(&self) -> Map<String, Value> {
        self.tree
            .get_state(&self.scoped(&["models"]))
            .and_then(|v| v.as_object().cloned())
            .unwrap_or_default()
    }

    /// Overwrite the whole `models` mapping (notifying write).
    pub fn set_models(&self, models: Map<String, Value>) {
        self.tree
            .set_state(&self.scoped(&["models"]), Value::Object(models));
    }

    /// Look up one model by identifier.
    pub fn get_model(&self, id: impl Into<ModelId>) -> Option<Value> {
        let id = id.into();
        self.tree.get_state(&self.scoped(&["models", id.as_str()]))
    }

    /// Overwrite one model (notifying write).
    pub fn set_model(&self, id: impl Into<ModelId>, record: Value) {
        let id = id.into();
        self.tree
            .set_state(&self.scoped(&["models", id.as_str()]), record);
    }

    /// Delete a model and strip its identifier from every collection
    /// referencing it, in one commit.
    ///
    /// Returns the undo log: restoring the model first, then one
    /// re-insertion per affected collection at the index the identifier
    /// held. Replaying it with [`apply_undo`] after further structural
    /// changes to the affected paths is not guaranteed to be safe.
    ///
    /// Deleting an absent model is a no-op with an empty log.
    ///
    /// [`apply_undo`]: ResourceStore::apply_undo
    pub fn delete_model(&self, id: impl Into<ModelId>) -> Vec<UndoAction> {
        let id = id.into();
        let mut snapshot = self.subtree();

        let model_path = Self::model_path(&id);
        let Some(model) = value::get_in(&snapshot, &model_path).cloned() else {
            return Vec::new();
        };

        let mut undo = Vec::new();
        value::delete_in(&mut snapshot, &model_path);
        undo.push(UndoAction::RestoreModel {
            id: id.clone(),
            value: model,
        });
        undo.extend(remove_from_collections(&mut snapshot, &id));

        self.tree.set_state(&self.root, snapshot);
        tracing::debug!(id = %id, undo_len = undo.len(), "deleted model");
        undo
    }

    /// Deep-merge partial values into an existing model.
    ///
    /// Nested objects merge key by key; scalars and arrays overwrite.
    /// Returns a single-action undo log restoring the pre-merge record
    /// verbatim, or an empty log if the model does not exist.
    pub fn update_model(&self, id: impl Into<ModelId>, partial: &Value) -> Vec<UndoAction> {
        let id = id.into();
        let Some(previous) = self.get_model(id.clone()) else {
            return Vec::new();
        };

        let mut merged = previous.clone();
        value::merge_deep(&mut merged, partial);
        self.set_model(id.clone(), merged);

        vec![UndoAction::RestoreModel {
            id,
            value: previous,
        }]
    }

    // --- Collection Accessors ---

    /// The hydrated view of a request's `data`.
    ///
    /// `None` means the request has never been fetched. Scalar-format
    /// data is returned verbatim; identifier-format data resolves each id
    /// against `models`, yielding an empty object for identifiers with no
    /// model. Hydration never fails.
    pub fn get_collection(&self, path: &str) -> Option<Vec<Value>> {
        let data = self.get_requests_data(path)?;
        let items = data.as_array()?.clone();

        if self.get_requests_format(path) == Some(RequestFormat::Scalar) {
            return Some(items);
        }

        let models = self.get_models();
        Some(
            items
                .iter()
                .map(|id| {
                    id.as_str()
                        .and_then(|key| models.get(key).cloned())
                        .unwrap_or_else(|| Value::Object(Map::new()))
                })
                .collect(),
        )
    }

    /// Replace a request's contents wholesale, in one commit.
    ///
    /// An empty payload, or one whose first element is not an object, is
    /// stored verbatim with format `"string"`. Otherwise every element's
    /// identifier is extracted (failure aborts before any mutation), the
    /// elements deep-merge into `models`, and the de-duplicated
    /// identifier list is stored in first-occurrence order. Duplicate
    /// identifiers within one payload merge in order, so later leaves
    /// win.
    ///
    /// Returns the freshly hydrated collection.
    pub fn set_collection(&self, path: &str, data: Vec<Value>) -> Result<Vec<Value>> {
        let mut snapshot = self.subtree();

        let scalar = data.first().map(|v| !v.is_object()).unwrap_or(true);
        if scalar {
            value::set_in(
                &mut snapshot,
                &Self::request_field(path, "data"),
                Value::Array(data),
            );
            value::set_in(
                &mut snapshot,
                &Self::request_field(path, "format"),
                Value::String(RequestFormat::Scalar.as_str().to_string()),
            );
        } else {
            let ids = data
                .iter()
                .map(|item| self.schema.extract_id(item))
                .collect::<Result<Vec<ModelId>>>()?;

            let mut order: Vec<Value> = Vec::with_capacity(ids.len());
            let mut seen = std::collections::HashSet::new();
            for (id, item) in ids.iter().zip(&data) {
                let model_path = Self::model_path(id);
                let mut merged = value::get_in(&snapshot, &model_path)
                    .cloned()
                    .unwrap_or_else(|| Value::Object(Map::new()));
                value::merge_deep(&mut merged, item);
                value::set_in(&mut snapshot, &model_path, merged);

                if seen.insert(id.as_str()) {
                    order.push(Value::String(id.to_string()));
                }
            }

            value::set_in(
                &mut snapshot,
                &Self::request_field(path, "data"),
                Value::Array(order),
            );
            value::set_in(
                &mut snapshot,
                &Self::request_field(path, "format"),
                Value::String(RequestFormat::Models.as_str().to_string()),
            );
        }

        self.tree.set_state(&self.root, snapshot);
        tracing::debug!(path, "set collection");
        Ok(self.get_collection(path).unwrap_or_default())
    }

    /// Append one model to a request's collection, in one commit.
    ///
    /// The model deep-merges into `models` under its identifier and the
    /// identifier is appended to the request's `data` list, created as an
    /// empty list if absent. Appending does not de-duplicate; repeated
    /// appends of the same identifier produce duplicate entries.
    pub fn update_collection(&self, path: &str, model: &Value) -> Result<()> {
        let id = self.schema.extract_id(model)?;
        let mut snapshot = self.subtree();

        let model_path = Self::model_path(&id);
        let mut merged = value::get_in(&snapshot, &model_path)
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        value::merge_deep(&mut merged, model);
        value::set_in(&mut snapshot, &model_path, merged);

        let data_path = Self::request_field(path, "data");
        let mut list = value::get_in(&snapshot, &data_path)
            .and_then(|v| v.as_array().cloned())
            .unwrap_or_default();
        list.push(Value::String(id.to_string()));
        value::set_in(&mut snapshot, &data_path, Value::Array(list));

        self.tree.set_state(&self.root, snapshot);
        Ok(())
    }

    /// Reset the request entry at `path` to empty. Models are untouched;
    /// other requests are unaffected.
    pub fn clear_collection(&self, path: &str) {
        self.set_request(path, Value::Object(Map::new()));
    }

    /// Reset `requests` and `models` to empty. Two notifying writes; no
    /// atomicity requirement between them since both end at empty.
    pub fn clear_all(&self) {
        self.tree
            .set_state(&self.scoped(&["requests"]), Value::Object(Map::new()));
        self.tree
            .set_state(&self.scoped(&["models"]), Value::Object(Map::new()));
        tracing::debug!(root = %self.root, "cleared store");
    }

    // --- Undo ---

    /// Replay a log of compensating actions, in order.
    ///
    /// Each action is one notifying write. Restores put the model back
    /// under its identifier; re-insertions put the identifier back at its
    /// captured index, clamped to the list's current length.
    pub fn apply_undo(&self, actions: impl IntoIterator<Item = UndoAction>) {
        for action in actions {
            match action {
                UndoAction::RestoreModel { id, value } => {
                    self.set_model(id, value);
                }
                UndoAction::ReinsertInCollection { path, index, id } => {
                    let mut list = self
                        .get_requests_data(&path)
                        .and_then(|v| v.as_array().cloned())
                        .unwrap_or_default();
                    let index = index.min(list.len());
                    list.insert(index, Value::String(id.to_string()));
                    self.set_requests_data(&path, Value::Array(list));
                }
            }
        }
    }
}

/// Strip an identifier from every identifier-format request list in the
/// snapshot, recording one re-insertion per removal.
///
/// Only the first occurrence in each list is removed. Scalar-format
/// requests never participate, even when an entry happens to equal the
/// identifier string.
fn remove_from_collections(snapshot: &mut Value, id: &ModelId) -> Vec<UndoAction> {
    let mut undo = Vec::new();
    let Some(requests) = snapshot
        .get_mut("requests")
        .and_then(Value::as_object_mut)
    else {
        return undo;
    };

    for (path, request) in requests.iter_mut() {
        let format = RequestFormat::from_value(request.get("format"));
        if format == RequestFormat::Scalar {
            continue;
        }
        let Some(list) = request.get_mut("data").and_then(Value::as_array_mut) else {
            continue;
        };
        if let Some(index) = list
            .iter()
            .position(|entry| entry.as_str() == Some(id.as_str()))
        {
            list.remove(index);
            undo.push(UndoAction::ReinsertInCollection {
                path: path.clone(),
                index,
                id: id.clone(),
            });
        }
    }

    undo
}
