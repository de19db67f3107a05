//! Live change notifications for the state tree.
//!
//! Subscribers register a path prefix and receive a [`TreeEvent`] for
//! every notifying write whose path overlaps it. Quiet writes bypass this
//! module entirely.

mod manager;
mod types;

pub use manager::SubscriptionManager;
pub use types::{DropReason, SubscriptionConfig, SubscriptionHandle, SubscriptionId, TreeEvent};
