//! Batch progress tracking for the notification surface
//!
//! Every batched store operation ("create 5 tokens", "delete 3
//! tokens") gets one [`ActionQueue`]: a description plus one key per
//! sub-item. The view reads `now`/`max` off the running queues to draw
//! progress; a finished queue lingers for a short delay and then
//! removes itself from the registry.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use uuid::Uuid;

use crate::constants::QUEUE_REMOVE_DELAY;

/// Shared handle to one progress entry.
pub type ActionQueueRef = Arc<ActionQueue>;

/// Progress of one batch operation.
pub struct ActionQueue {
    id: Uuid,
    description: String,
    keys: Vec<String>,
    done: Mutex<Vec<bool>>,
    remove_delay: Duration,
    registry: Weak<RegistryInner>,
}

impl ActionQueue {
    fn new(
        registry: Weak<RegistryInner>,
        remove_delay: Duration,
        description: String,
        keys: Vec<String>,
    ) -> ActionQueueRef {
        let done = vec![false; keys.len()];
        Arc::new(ActionQueue {
            id: Uuid::new_v4(),
            description,
            keys,
            done: Mutex::new(done),
            remove_delay,
            registry,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Total number of sub-items in the batch.
    pub fn max(&self) -> usize {
        self.keys.len()
    }

    /// Number of sub-items marked done.
    pub fn now(&self) -> usize {
        self.lock_done().iter().filter(|flag| **flag).count()
    }

    pub fn is_finished(&self) -> bool {
        self.now() == self.max()
    }

    /// Mark one key as done. Unknown keys and keys already done are
    /// no-ops; the transition that completes the batch schedules the
    /// delayed removal from the registry.
    pub fn progress(&self, key: &str) {
        let Some(index) = self.keys.iter().position(|k| k == key) else {
            return;
        };

        let finished = {
            let mut done = self.lock_done();
            if done[index] {
                return;
            }
            done[index] = true;
            done.iter().all(|flag| *flag)
        };

        if finished {
            tracing::debug!(id = %self.id, description = %self.description, "batch finished");
            self.schedule_removal();
        }
    }

    fn schedule_removal(&self) {
        let id = self.id;
        let delay = self.remove_delay;
        let registry = self.registry.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(registry) = registry.upgrade() {
                registry.remove(id);
            }
        });
    }

    fn lock_done(&self) -> MutexGuard<'_, Vec<bool>> {
        self.done
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

struct RegistryInner {
    queues: Mutex<Vec<ActionQueueRef>>,
    remove_delay: Mutex<Duration>,
}

impl RegistryInner {
    fn remove(&self, id: Uuid) {
        self.queues
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .retain(|queue| queue.id() != id);
    }
}

/// Registry of running action queues; the notification surface reads
/// `running()` to render progress bars.
#[derive(Clone)]
pub struct ActionQueueState {
    inner: Arc<RegistryInner>,
}

impl Default for ActionQueueState {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionQueueState {
    pub fn new() -> Self {
        ActionQueueState {
            inner: Arc::new(RegistryInner {
                queues: Mutex::new(Vec::new()),
                remove_delay: Mutex::new(QUEUE_REMOVE_DELAY),
            }),
        }
    }

    /// Construct and register a queue with one key per sub-item. A
    /// queue with zero keys is born finished and scheduled for removal
    /// right away.
    pub fn create(&self, description: &str, keys: Vec<String>) -> ActionQueueRef {
        let queue = ActionQueue::new(
            Arc::downgrade(&self.inner),
            *self.lock_delay(),
            description.to_string(),
            keys,
        );
        self.lock_queues().push(queue.clone());
        if queue.is_finished() {
            queue.schedule_removal();
        }
        queue
    }

    /// Currently registered queues, oldest first.
    pub fn running(&self) -> Vec<ActionQueueRef> {
        self.lock_queues().clone()
    }

    pub fn remove(&self, id: Uuid) {
        self.inner.remove(id);
    }

    /// Override how long finished queues stay visible.
    pub fn set_remove_delay(&self, delay: Duration) {
        *self.lock_delay() = delay;
    }

    fn lock_queues(&self) -> MutexGuard<'_, Vec<ActionQueueRef>> {
        self.inner
            .queues
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_delay(&self) -> MutexGuard<'_, Duration> {
        self.inner
            .remove_delay
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::QUEUE_REMOVE_DELAY;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn test_progress_counts_done_keys() {
        let state = ActionQueueState::new();
        let queue = state.create("Removing 2 accounts", keys(&["a", "b"]));

        assert_eq!(queue.max(), 2);
        assert_eq!(queue.now(), 0);
        assert!(!queue.is_finished());

        queue.progress("a");
        assert_eq!(queue.now(), 1);
        assert!(!queue.is_finished());

        queue.progress("b");
        assert_eq!(queue.now(), 2);
        assert!(queue.is_finished());
    }

    #[tokio::test]
    async fn test_unknown_key_is_a_noop() {
        let state = ActionQueueState::new();
        let queue = state.create("Removing 2 accounts", keys(&["a", "b"]));

        queue.progress("z");
        assert_eq!(queue.now(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_progress_is_a_noop() {
        let state = ActionQueueState::new();
        let queue = state.create("Removing 2 accounts", keys(&["a", "b"]));

        queue.progress("a");
        queue.progress("a");
        assert_eq!(queue.now(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_queue_removes_itself_after_delay() {
        let state = ActionQueueState::new();
        let queue = state.create("Removing 2 accounts", keys(&["a", "b"]));
        assert_eq!(state.running().len(), 1);

        queue.progress("a");
        queue.progress("b");
        // Still visible during the linger window.
        assert_eq!(state.running().len(), 1);

        tokio::time::sleep(QUEUE_REMOVE_DELAY + Duration::from_millis(1)).await;
        assert!(state.running().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unfinished_queue_stays_registered() {
        let state = ActionQueueState::new();
        let queue = state.create("Removing 2 accounts", keys(&["a", "b"]));

        queue.progress("a");
        tokio::time::sleep(QUEUE_REMOVE_DELAY * 4).await;
        assert_eq!(state.running().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_queue_is_born_finished() {
        let state = ActionQueueState::new();
        let queue = state.create("Nothing to do", Vec::new());

        assert!(queue.is_finished());
        tokio::time::sleep(QUEUE_REMOVE_DELAY + Duration::from_millis(1)).await;
        assert!(state.running().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shortened_remove_delay_applies_to_new_queues() {
        let state = ActionQueueState::new();
        state.set_remove_delay(Duration::from_millis(10));
        let queue = state.create("Quick", keys(&["a"]));

        queue.progress("a");
        tokio::time::sleep(Duration::from_millis(11)).await;
        assert!(state.running().is_empty());
    }

    #[tokio::test]
    async fn test_queues_are_listed_in_creation_order() {
        let state = ActionQueueState::new();
        let first = state.create("first", keys(&["a"]));
        let second = state.create("second", keys(&["b"]));

        let running = state.running();
        assert_eq!(running.len(), 2);
        assert_eq!(running[0].id(), first.id());
        assert_eq!(running[1].id(), second.id());
        assert_eq!(running[0].description(), "first");
    }
}
