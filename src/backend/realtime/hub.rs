/**
 * Workspace Event Hub
 *
 * In-process publish/subscribe keyed by workspace id. Mutation handlers
 * publish into the hub; every live update stream for the workspace holds one
 * subscription.
 *
 * # Delivery
 *
 * `publish` snapshots the subscriber list for the workspace and invokes each
 * callback in registration order. Callbacks are expected to hand the event to
 * their own queue and return, so the publisher only waits for that hand-off.
 * Subscriptions added or removed while a publish is running do not affect
 * that in-flight delivery.
 *
 * A callback that panics is logged and skipped; the remaining subscribers
 * still receive the event.
 *
 * # Limitations
 *
 * There is no backlog. An event published before a client subscribes is
 * never delivered to it, including one published between the client's
 * initial tree fetch and its stream's `ready` frame. Clients re-fetch state
 * out-of-band after connecting.
 */

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::shared::WorkspaceEvent;

/// Delivery callback registered by a subscriber
pub type EventCallback = Arc<dyn Fn(Arc<WorkspaceEvent>) + Send + Sync>;

struct Subscriber {
    id: u64,
    callback: EventCallback,
}

#[derive(Default)]
struct HubInner {
    next_id: AtomicU64,
    workspaces: Mutex<HashMap<i64, Vec<Subscriber>>>,
}

impl HubInner {
    fn workspaces(&self) -> MutexGuard<'_, HashMap<i64, Vec<Subscriber>>> {
        // Callbacks never run under this lock, so a poisoned map is still consistent.
        self.workspaces.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove(&self, workspace_id: i64, id: u64) -> bool {
        let mut workspaces = self.workspaces();
        let Some(subscribers) = workspaces.get_mut(&workspace_id) else {
            return false;
        };
        let before = subscribers.len();
        subscribers.retain(|subscriber| subscriber.id != id);
        let removed = subscribers.len() != before;
        if subscribers.is_empty() {
            workspaces.remove(&workspace_id);
        }
        removed
    }
}

/// Process-wide workspace event broadcaster
///
/// Created once at startup and shared through `AppState`; cloning is cheap
/// and every clone refers to the same registry.
#[derive(Clone, Default)]
pub struct WorkspaceEventHub {
    inner: Arc<HubInner>,
}

impl std::fmt::Debug for WorkspaceEventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceEventHub")
            .field("workspaces", &self.workspace_count())
            .finish()
    }
}

impl WorkspaceEventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `on_event` for every event published to `workspace_id`
    ///
    /// The returned handle removes exactly this subscription, either through
    /// [`Subscription::unsubscribe`] or when it is dropped.
    pub fn subscribe<F>(&self, workspace_id: i64, on_event: F) -> Subscription
    where
        F: Fn(Arc<WorkspaceEvent>) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let mut workspaces = self.inner.workspaces();
        let subscribers = workspaces.entry(workspace_id).or_default();
        subscribers.push(Subscriber {
            id,
            callback: Arc::new(on_event),
        });
        tracing::debug!(
            "[Hub] Subscription {} added to workspace {} ({} active)",
            id,
            workspace_id,
            subscribers.len()
        );

        Subscription {
            hub: Arc::downgrade(&self.inner),
            workspace_id,
            id,
            released: AtomicBool::new(false),
        }
    }

    /// Deliver `event` to every current subscriber of its workspace
    ///
    /// Returns the number of subscribers that accepted the event. Publishing
    /// to a workspace without subscribers drops the event.
    pub fn publish(&self, event: WorkspaceEvent) -> usize {
        let workspace_id = event.workspace_id;
        let callbacks: Vec<EventCallback> = match self.inner.workspaces().get(&workspace_id) {
            Some(subscribers) => subscribers
                .iter()
                .map(|subscriber| subscriber.callback.clone())
                .collect(),
            None => Vec::new(),
        };

        if callbacks.is_empty() {
            tracing::debug!(
                "[Hub] No subscribers for workspace {}, dropping {}",
                workspace_id,
                event.event_type
            );
            return 0;
        }

        let event = Arc::new(event);
        let mut delivered = 0;
        for callback in callbacks {
            let shared = Arc::clone(&event);
            match catch_unwind(AssertUnwindSafe(|| callback(shared))) {
                Ok(()) => delivered += 1,
                Err(_) => {
                    tracing::error!(
                        "[Hub] Subscriber panicked while handling {} for workspace {}",
                        event.event_type,
                        workspace_id
                    );
                }
            }
        }

        tracing::debug!(
            "[Hub] Event {} delivered to {} subscribers of workspace {}",
            event.event_type,
            delivered,
            workspace_id
        );
        delivered
    }

    /// Number of active subscriptions for a workspace
    pub fn subscriber_count(&self, workspace_id: i64) -> usize {
        self.inner
            .workspaces()
            .get(&workspace_id)
            .map_or(0, Vec::len)
    }

    /// Number of workspaces with at least one subscriber
    pub fn workspace_count(&self) -> usize {
        self.inner.workspaces().len()
    }
}

/// Handle for one hub subscription
///
/// Dropping the handle unsubscribes, so a subscription never outlives its
/// owner.
#[must_use = "dropping a Subscription unsubscribes it immediately"]
pub struct Subscription {
    hub: Weak<HubInner>,
    workspace_id: i64,
    id: u64,
    released: AtomicBool,
}

impl Subscription {
    /// Remove this subscription from the hub
    ///
    /// Returns `true` only for the call that actually removed it; later calls
    /// are no-ops.
    pub fn unsubscribe(&self) -> bool {
        if self.released.swap(true, Ordering::AcqRel) {
            return false;
        }
        let Some(hub) = self.hub.upgrade() else {
            return false;
        };
        let removed = hub.remove(self.workspace_id, self.id);
        if removed {
            tracing::debug!(
                "[Hub] Subscription {} removed from workspace {}",
                self.id,
                self.workspace_id
            );
        }
        removed
    }

    pub fn workspace_id(&self) -> i64 {
        self.workspace_id
    }

    /// Whether `unsubscribe` has not been called yet
    pub fn is_active(&self) -> bool {
        !self.released.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("workspace_id", &self.workspace_id)
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
