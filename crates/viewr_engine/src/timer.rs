use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Deferred callbacks grouped by key, each group cancellable on its own and
/// all of them through [`TimerSet::shutdown`].
///
/// Must be used from inside a tokio runtime.
pub struct TimerSet<K> {
    root: CancellationToken,
    groups: HashMap<K, CancellationToken>,
}

impl<K> Default for TimerSet<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> TimerSet<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            root: CancellationToken::new(),
            groups: HashMap::new(),
        }
    }

    /// Runs `fire` once after `after`, unless `key` or the whole set is
    /// cancelled first.
    pub fn schedule<F>(&mut self, key: K, after: Duration, fire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.root.is_cancelled() {
            return;
        }
        let token = self
            .groups
            .entry(key)
            .or_insert_with(|| self.root.child_token())
            .clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(after) => fire(),
            }
        });
    }

    /// Cancels every pending callback of `key`; later schedules for the same
    /// key start a fresh group.
    pub fn cancel(&mut self, key: &K) {
        if let Some(token) = self.groups.remove(key) {
            token.cancel();
        }
    }

    pub fn shutdown(&mut self) {
        self.root.cancel();
        self.groups.clear();
    }

    pub fn is_shut_down(&self) -> bool {
        self.root.is_cancelled()
    }
}
