//! Transfer cancellation — single task and cancel-all.

use tokio_util::sync::CancellationToken;

use crate::types::TaskId;

use super::FetchManager;

impl FetchManager {
    /// Cancel one in-flight fetch
    ///
    /// Signals the transfer's cancellation token. Cancellation is advisory:
    /// this method never invokes callbacks itself; the transfer driver
    /// observes the token, removes the task from the registry and fires its
    /// failure callback with
    /// [`FetchError::Canceled`](crate::FetchError::Canceled).
    ///
    /// # Returns
    ///
    /// `true` if a task with the given id was registered, `false` otherwise.
    pub async fn cancel(&self, id: TaskId) -> bool {
        let token = {
            let tasks = self.registry.tasks.lock().await;
            tasks.get(&id).map(|task| task.cancel.clone())
        };

        match token {
            Some(token) => {
                tracing::debug!(task_id = id.0, "Cancelling fetch task");
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every in-flight fetch
    ///
    /// Walks the registry in reverse insertion order and signals each task's
    /// cancellation token. This method does not wait for transfers to wind
    /// down and never invokes callbacks directly: each driver observes its
    /// token and resolves its own task, reporting
    /// [`FetchError::Canceled`](crate::FetchError::Canceled) through the
    /// failure callback. The registry drains to empty once all completion
    /// events have been processed; callers that need to wait for the drain
    /// should use [`shutdown`](FetchManager::shutdown) instead.
    pub async fn cancel_all(&self) {
        let mut handles: Vec<(TaskId, CancellationToken)> = {
            let tasks = self.registry.tasks.lock().await;
            tasks
                .iter()
                .map(|(id, task)| (*id, task.cancel.clone()))
                .collect()
        };

        // Ids are monotonic, so descending id order is reverse insertion
        // order.
        handles.sort_by(|a, b| b.0.cmp(&a.0));

        tracing::debug!(active = handles.len(), "Cancelling all fetch tasks");

        for (id, token) in handles {
            tracing::trace!(task_id = id.0, "Signaling cancellation");
            token.cancel();
        }
    }
}
