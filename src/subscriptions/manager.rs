//! Subscription manager for broadcasting tree changes.

use crate::types::Path;
use crossbeam_channel::{bounded, Sender};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::types::{DropReason, SubscriptionConfig, SubscriptionHandle, SubscriptionId, TreeEvent};

/// Internal subscription state.
struct Subscription {
    config: SubscriptionConfig,
    sender: Sender<TreeEvent>,
}

impl Subscription {
    /// Try to send an event. Returns false if the buffer is full or the
    /// receiver is gone (subscriber will be dropped).
    fn try_send(&self, event: TreeEvent) -> bool {
        self.sender.try_send(event).is_ok()
    }

    /// Check whether a write at `path` concerns this subscription.
    fn matches(&self, path: &Path) -> bool {
        self.config.path.overlaps(path)
    }
}

/// Manages subscriptions and broadcasts path-change events.
pub struct SubscriptionManager {
    /// Active subscriptions by ID.
    subscriptions: RwLock<HashMap<SubscriptionId, Subscription>>,
    /// Counter for generating subscription IDs.
    next_id: AtomicU64,
}

impl SubscriptionManager {
    /// Create a new subscription manager.
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create a new subscription.
    pub fn subscribe(&self, config: SubscriptionConfig) -> SubscriptionHandle {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (sender, receiver) = bounded(config.buffer_size);

        self.subscriptions
            .write()
            .insert(id, Subscription { config, sender });

        SubscriptionHandle { id, receiver }
    }

    /// Unsubscribe and clean up.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut subs = self.subscriptions.write();
        if let Some(sub) = subs.remove(&id) {
            // Best effort
            let _ = sub.sender.try_send(TreeEvent::Dropped {
                reason: DropReason::Unsubscribed,
            });
        }
    }

    /// Get subscription count.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Broadcast a change at `path` to every overlapping subscription.
    /// Drops subscribers that fail to receive.
    pub fn broadcast_change(&self, path: &Path) {
        let event = TreeEvent::Changed { path: path.clone() };
        let mut to_remove = Vec::new();

        {
            let subs = self.subscriptions.read();
            for (id, sub) in subs.iter() {
                if sub.matches(path) && !sub.try_send(event.clone()) {
                    to_remove.push(*id);
                }
            }
        }

        if !to_remove.is_empty() {
            let mut subs = self.subscriptions.write();
            for id in to_remove {
                if let Some(sub) = subs.remove(&id) {
                    // Might fail, that's ok
                    let _ = sub.sender.try_send(TreeEvent::Dropped {
                        reason: DropReason::BufferOverflow,
                    });
                }
            }
        }
    }
}

impl Default for SubscriptionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn users_path() -> Path {
        Path::root().key("$api").key("url").key("users")
    }

    #[test]
    fn test_subscribe_unsubscribe() {
        let manager = SubscriptionManager::new();

        let handle = manager.subscribe(SubscriptionConfig::default());
        assert_eq!(manager.subscription_count(), 1);

        manager.unsubscribe(handle.id);
        assert_eq!(manager.subscription_count(), 0);

        let event = handle.recv_timeout(Duration::from_millis(100)).unwrap();
        assert_eq!(
            event,
            TreeEvent::Dropped {
                reason: DropReason::Unsubscribed
            }
        );
    }

    #[test]
    fn test_broadcast_reaches_ancestor_subscriber() {
        let manager = SubscriptionManager::new();
        let handle = manager.subscribe(SubscriptionConfig::at(users_path()));

        let written = users_path().key("models").key("1");
        manager.broadcast_change(&written);

        let event = handle.recv_timeout(Duration::from_millis(100)).unwrap();
        assert_eq!(event, TreeEvent::Changed { path: written });
    }

    #[test]
    fn test_broadcast_reaches_descendant_subscriber() {
        let manager = SubscriptionManager::new();
        let deep = users_path().key("models").key("1");
        let handle = manager.subscribe(SubscriptionConfig::at(deep));

        manager.broadcast_change(&users_path());

        assert!(handle.recv_timeout(Duration::from_millis(100)).is_ok());
    }

    #[test]
    fn test_broadcast_skips_disjoint_subscriber() {
        let manager = SubscriptionManager::new();
        let other = Path::root().key("$api").key("url").key("posts");
        let handle = manager.subscribe(SubscriptionConfig::at(other));

        manager.broadcast_change(&users_path());

        assert!(handle.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn test_drop_slow_subscriber() {
        let manager = SubscriptionManager::new();
        let handle = manager.subscribe(SubscriptionConfig {
            buffer_size: 2,
            ..Default::default()
        });

        for _ in 0..10 {
            manager.broadcast_change(&users_path());
        }

        assert_eq!(manager.subscription_count(), 0);
        drop(handle);
    }
}
