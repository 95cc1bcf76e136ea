//! Shutdown coordination.

use std::sync::atomic::Ordering;

use crate::types::Event;

use super::FetchManager;

impl FetchManager {
    /// Gracefully shut down the fetch manager
    ///
    /// The shutdown sequence:
    /// 1. Stop accepting new downloads
    /// 2. Cancel all in-flight transfers
    /// 3. Wait for the registry to drain, bounded by a timeout
    /// 4. Emit [`Event::Shutdown`]
    ///
    /// Cancelled transfers report through their failure callbacks as usual;
    /// shutdown only coordinates and never consumes a task's callbacks
    /// itself.
    pub async fn shutdown(&self) {
        tracing::info!("Initiating fetch manager shutdown");

        // 1. Stop accepting new downloads
        self.registry.accepting_new.store(false, Ordering::SeqCst);

        // 2. Signal cancellation to every in-flight transfer
        self.cancel_all().await;

        // 3. Wait for the drivers to resolve their tasks
        let shutdown_timeout = std::time::Duration::from_secs(5);
        match tokio::time::timeout(shutdown_timeout, self.wait_for_active_tasks()).await {
            Ok(()) => {
                tracing::info!("All fetch tasks resolved");
            }
            Err(_) => {
                tracing::warn!("Timeout waiting for fetch tasks to resolve, proceeding with shutdown");
            }
        }

        // 4. Emit shutdown event
        self.emit_event(Event::Shutdown);

        tracing::info!("Fetch manager shutdown complete");
    }

    /// Wait for the task registry to drain
    async fn wait_for_active_tasks(&self) {
        loop {
            let active_count = {
                let tasks = self.registry.tasks.lock().await;
                tasks.len()
            };

            if active_count == 0 {
                return;
            }

            tracing::debug!(active_count, "Waiting for fetch tasks to resolve");
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        }
    }
}
