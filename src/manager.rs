use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

static GLOBAL: Lazy<RepeatManager> = Lazy::new(RepeatManager::new);

/// Registry of in-flight repeat tasks, keyed by task id.
///
/// The registry stores each task's cancellation token, so tasks settling with
/// different value types share one manager. A task is a member exactly while
/// it is unsettled: the engine registers it before the first iteration and
/// deregisters it when it settles.
///
/// Clones share the same registry.
#[derive(Clone, Default)]
pub struct RepeatManager {
    tasks: Arc<Mutex<HashMap<String, CancellationToken>>>,
}

impl RepeatManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide manager, created on first use.
    ///
    /// Tasks register here unless [`crate::Repeat::with_manager`] swaps in an
    /// explicit one. A host test-runner calls `global().abort_all()` between
    /// sessions so no stale poll survives into the next one.
    pub fn global() -> &'static RepeatManager {
        &GLOBAL
    }

    pub(crate) fn insert(&self, id: String, token: CancellationToken) {
        self.tasks.lock().insert(id, token);
    }

    pub(crate) fn remove(&self, id: &str) {
        self.tasks.lock().remove(id);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tasks.lock().contains_key(id)
    }

    /// Number of in-flight tasks.
    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }

    /// Abort every registered task.
    ///
    /// Each task settles with [`crate::RepeatError::Exit`] and deregisters
    /// itself the next time it is polled; await the tasks to observe the
    /// registry drain.
    pub fn abort_all(&self) {
        let tokens: Vec<CancellationToken> = self.tasks.lock().values().cloned().collect();
        debug!(count = tokens.len(), "aborting all repeat tasks");
        for token in tokens {
            token.cancel();
        }
    }
}
