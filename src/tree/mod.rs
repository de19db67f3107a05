//! The reactive key-path store the cache is built on.
//!
//! [`StateTree`] is the port the resource store writes through: get, set
//! with notification, and set without ("quiet"). [`MemoryTree`] is the
//! in-process implementation; tests and embedders can supply their own.

pub mod memory;
pub mod value;

use crate::types::Path;
use serde_json::Value;

pub use memory::MemoryTree;

/// A reactive key-path store over a persistent document.
///
/// Paths are ordered string segments. A `set_state` notifies subscribers
/// of the written path and of any ancestor or descendant path;
/// `set_state_quiet` performs the same write with no notification.
pub trait StateTree: Send + Sync {
    /// Read the value at a path. Absent paths are `None`, never an error.
    fn get_state(&self, path: &Path) -> Option<Value>;

    /// Write the value at a path and notify subscribers.
    fn set_state(&self, path: &Path, value: Value);

    /// Write the value at a path without notifying subscribers.
    fn set_state_quiet(&self, path: &Path, value: Value);
}
