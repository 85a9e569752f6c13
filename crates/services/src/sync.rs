//! Publish/subscribe channel propagating "progress changed for user U" to
//! every surface reading the same stores.
//!
//! Dispatch is synchronous and single-threaded per publish: callbacks for a
//! user fire in subscription order. There is no replay buffer; a surface
//! that subscribes after a publish must trigger its own initial recompute.
//! A `publish` issued from inside a callback is deferred until the current
//! dispatch finishes, and deferred publishes for the same user are coalesced
//! into a single trailing firing.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use course_core::model::UserId;
use tracing::debug;

type Callback = Arc<dyn Fn(&UserId) + Send + Sync>;

struct Subscriber {
    id: u64,
    user_id: UserId,
    callback: Callback,
}

#[derive(Default)]
struct ChannelState {
    subscribers: Vec<Subscriber>,
    next_id: u64,
    dispatching: bool,
    deferred: Vec<UserId>,
}

// Callbacks never run while the state lock is held, so state behind a
// poisoned mutex is still consistent and safe to reclaim.
fn lock_state(state: &Mutex<ChannelState>) -> MutexGuard<'_, ChannelState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Broadcast channel for progress-change notifications, keyed by user.
///
/// Cloning is cheap and clones share the same subscriber registry.
#[derive(Clone, Default)]
pub struct ProgressChannel {
    state: Arc<Mutex<ChannelState>>,
}

impl ProgressChannel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ChannelState> {
        lock_state(&self.state)
    }

    /// Register a callback for progress changes of `user_id`.
    ///
    /// Returns a handle that unsubscribes when dropped (or via
    /// [`Subscription::unsubscribe`]). Only events published after this call
    /// are delivered.
    pub fn subscribe(
        &self,
        user_id: UserId,
        callback: impl Fn(&UserId) + Send + Sync + 'static,
    ) -> Subscription {
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.subscribers.push(Subscriber {
            id,
            user_id,
            callback: Arc::new(callback),
        });
        Subscription {
            state: Arc::downgrade(&self.state),
            id,
        }
    }

    /// Notify every subscriber registered for `user_id`, in subscription
    /// order.
    ///
    /// A re-entrant publish (from inside a callback) is queued and dispatched
    /// after the current round completes; queued publishes for the same user
    /// collapse into one firing. At least one firing always follows the last
    /// publish in a rapid sequence.
    pub fn publish(&self, user_id: &UserId) {
        {
            let mut state = self.lock();
            if state.dispatching {
                if !state.deferred.contains(user_id) {
                    state.deferred.push(user_id.clone());
                }
                return;
            }
            state.dispatching = true;
        }

        let mut current = Some(user_id.clone());
        while let Some(user) = current {
            // Snapshot the matching callbacks so subscribe/unsubscribe from
            // inside a callback cannot deadlock or shift the round underway.
            let callbacks: Vec<Callback> = {
                let state = self.lock();
                state
                    .subscribers
                    .iter()
                    .filter(|s| s.user_id == user)
                    .map(|s| Arc::clone(&s.callback))
                    .collect()
            };

            debug!(user = %user, subscribers = callbacks.len(), "dispatching progress notification");
            for callback in &callbacks {
                callback(&user);
            }

            let mut state = self.lock();
            current = if state.deferred.is_empty() {
                state.dispatching = false;
                None
            } else {
                Some(state.deferred.remove(0))
            };
        }
    }

    /// Number of live subscriptions across all users.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }
}

/// Live subscription handle. Dropping it removes the callback.
pub struct Subscription {
    state: Weak<Mutex<ChannelState>>,
    id: u64,
}

impl Subscription {
    /// Explicitly remove the subscription. Equivalent to dropping it.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            lock_state(&state).subscribers.retain(|s| s.id != self.id);
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn user(id: &str) -> UserId {
        UserId::new(id)
    }

    #[test]
    fn delivers_in_subscription_order() {
        let channel = ProgressChannel::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = {
            let order = Arc::clone(&order);
            channel.subscribe(user("u1"), move |_| order.lock().unwrap().push("first"))
        };
        let second = {
            let order = Arc::clone(&order);
            channel.subscribe(user("u1"), move |_| order.lock().unwrap().push("second"))
        };

        channel.publish(&user("u1"));

        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
        drop(first);
        drop(second);
    }

    #[test]
    fn keyed_by_user() {
        let channel = ProgressChannel::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let _sub = {
            let hits = Arc::clone(&hits);
            channel.subscribe(user("u1"), move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };

        channel.publish(&user("u2"));
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        channel.publish(&user("u1"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let channel = ProgressChannel::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let sub = {
            let hits = Arc::clone(&hits);
            channel.subscribe(user("u1"), move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };
        channel.publish(&user("u1"));
        assert_eq!(channel.subscriber_count(), 1);

        sub.unsubscribe();
        assert_eq!(channel.subscriber_count(), 0);

        channel.publish(&user("u1"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn no_replay_for_late_subscribers() {
        let channel = ProgressChannel::new();
        channel.publish(&user("u1"));

        let hits = Arc::new(AtomicUsize::new(0));
        let _sub = {
            let hits = Arc::clone(&hits);
            channel.subscribe(user("u1"), move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };

        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn reentrant_publish_is_deferred_not_recursive() {
        let channel = ProgressChannel::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let _sub = {
            let channel_inner = channel.clone();
            let hits = Arc::clone(&hits);
            channel.subscribe(user("u1"), move |u| {
                // Re-publish once from inside the callback; the channel must
                // defer it rather than recurse.
                if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                    channel_inner.publish(u);
                }
            })
        };

        channel.publish(&user("u1"));

        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn rapid_reentrant_publishes_coalesce_to_one_trailing_round() {
        let channel = ProgressChannel::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let _sub = {
            let channel_inner = channel.clone();
            let hits = Arc::clone(&hits);
            channel.subscribe(user("u1"), move |u| {
                if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                    channel_inner.publish(u);
                    channel_inner.publish(u);
                    channel_inner.publish(u);
                }
            })
        };

        channel.publish(&user("u1"));

        // One initial round plus exactly one coalesced trailing round.
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn deferred_publish_for_another_user_still_delivers() {
        let channel = ProgressChannel::new();
        let u1_hits = Arc::new(AtomicUsize::new(0));
        let u2_hits = Arc::new(AtomicUsize::new(0));

        let _sub1 = {
            let channel_inner = channel.clone();
            let u1_hits = Arc::clone(&u1_hits);
            channel.subscribe(user("u1"), move |_| {
                u1_hits.fetch_add(1, Ordering::SeqCst);
                channel_inner.publish(&UserId::new("u2"));
            })
        };
        let _sub2 = {
            let u2_hits = Arc::clone(&u2_hits);
            channel.subscribe(user("u2"), move |_| {
                u2_hits.fetch_add(1, Ordering::SeqCst);
            })
        };

        channel.publish(&user("u1"));

        assert_eq!(u1_hits.load(Ordering::SeqCst), 1);
        assert_eq!(u2_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clones_share_one_registry() {
        let channel = ProgressChannel::new();
        let clone = channel.clone();
        let hits = Arc::new(AtomicUsize::new(0));

        let _sub = {
            let hits = Arc::clone(&hits);
            channel.subscribe(user("u1"), move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };

        clone.publish(&user("u1"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
