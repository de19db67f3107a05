//! # Normalized Resource Cache
//!
//! A client-side cache for REST-style API resources: every fetched record
//! ("model") is stored once, keyed by identifier, and each request's
//! result is an ordered list of identifiers ("collection") referencing
//! into the model table.
//!
//! ## Core Concepts
//!
//! - **Models**: Records stored once under their extracted identifier
//! - **Collections**: Per-request identifier lists, hydrated on read
//! - **Undo logs**: Tagged compensating actions for optimistic mutations
//! - **Quiet writes**: Tree updates that skip subscriber notification
//!
//! ## Example
//!
//! ```
//! use normcache::{KeySchema, MemoryTree, ResourceStore};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let tree = Arc::new(MemoryTree::new());
//! let users = ResourceStore::new(
//!     "https://api.example.com",
//!     Arc::new(KeySchema::new("users")),
//!     tree,
//! );
//!
//! users.set_collection("/users", vec![
//!     json!({"id": 1, "name": "a"}),
//!     json!({"id": 2, "name": "b"}),
//! ])?;
//!
//! let undo = users.delete_model(1u64);
//! assert_eq!(users.get_collection("/users").unwrap().len(), 1);
//!
//! users.apply_undo(undo);
//! assert_eq!(users.get_collection("/users").unwrap().len(), 2);
//! # Ok::<(), normcache::StoreError>(())
//! ```

pub mod error;
pub mod schema;
pub mod store;
pub mod subscriptions;
pub mod tree;
pub mod types;

// Re-exports
pub use error::{Result, StoreError};
pub use schema::{KeySchema, ResourceSchema};
pub use store::ResourceStore;
pub use subscriptions::{
    DropReason, SubscriptionConfig, SubscriptionHandle, SubscriptionId, SubscriptionManager,
    TreeEvent,
};
pub use tree::{MemoryTree, StateTree};
pub use types::{ModelId, Path, RequestFormat, UndoAction};
