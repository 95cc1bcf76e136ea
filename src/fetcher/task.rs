//! Per-transfer state and the transfer driver.

use chrono::{DateTime, Utc};
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::error::FetchError;
use crate::types::{Event, FailureCallback, FetchRequest, FetchTaskInfo, SuccessCallback, TaskId};

use super::FetchManager;

/// State of one in-flight transfer, owned by the manager's registry
///
/// Created when a download is initiated, mutated as transfer events arrive,
/// removed and consumed exactly once when the transfer resolves. Never
/// revived.
pub(crate) struct FetchTask {
    pub(crate) id: TaskId,
    /// Request URL, kept for logging and snapshots
    pub(crate) url: String,
    /// Accumulated response body
    pub(crate) buffer: Vec<u8>,
    /// Content length advertised by the response, if any
    pub(crate) expected_size: Option<u64>,
    pub(crate) created_at: DateTime<Utc>,
    /// Cancellation signal observed by the transfer driver
    pub(crate) cancel: CancellationToken,
    /// Success callback; taken exactly once on terminal resolution
    pub(crate) on_success: Option<SuccessCallback>,
    /// Failure callback; taken exactly once on terminal resolution
    pub(crate) on_failure: Option<FailureCallback>,
}

impl FetchTask {
    pub(crate) fn new(
        id: TaskId,
        request: &FetchRequest,
        cancel: CancellationToken,
        on_success: SuccessCallback,
        on_failure: FailureCallback,
    ) -> Self {
        Self {
            id,
            url: request.url.to_string(),
            buffer: Vec::new(),
            expected_size: None,
            created_at: Utc::now(),
            cancel,
            on_success: Some(on_success),
            on_failure: Some(on_failure),
        }
    }

    /// Read-only snapshot for introspection APIs
    pub(crate) fn info(&self) -> FetchTaskInfo {
        FetchTaskInfo {
            id: self.id,
            url: self.url.clone(),
            received_bytes: self.buffer.len() as u64,
            expected_size: self.expected_size,
            created_at: self.created_at,
        }
    }
}

impl FetchManager {
    /// Spawn the transfer driver for a registered task
    ///
    /// The driver races the transfer against the task's cancellation token,
    /// then performs terminal resolution: the task is removed from the
    /// registry and exactly one of its callbacks fires.
    pub(crate) fn spawn_transfer(&self, id: TaskId, request: FetchRequest, cancel: CancellationToken) {
        let manager = self.clone();

        tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = cancel.cancelled() => Err(FetchError::Canceled),
                result = manager.drive_transfer(id, request) => result,
            };

            manager.resolve(id, outcome).await;
        });
    }

    /// Run one transfer to completion, appending body chunks to the task's
    /// buffer
    ///
    /// Returns Ok once the body has been fully received; any Err is the
    /// task's terminal failure. Transfer events for handles no longer in the
    /// registry are dropped: the transfer raced a cancellation.
    async fn drive_transfer(
        &self,
        id: TaskId,
        request: FetchRequest,
    ) -> std::result::Result<(), FetchError> {
        let response = self
            .client
            .get(request.url.clone())
            .headers(request.headers.clone())
            .send()
            .await
            .map_err(|e| FetchError::Other(e.to_string()))?;

        let status = response.status();
        let expected_size = response.content_length();

        {
            let mut tasks = self.registry.tasks.lock().await;
            let Some(task) = tasks.get_mut(&id) else {
                tracing::debug!(task_id = id.0, "Response received for unregistered task, ignoring");
                return Err(FetchError::Canceled);
            };
            task.expected_size = expected_size;
        }

        tracing::debug!(
            task_id = id.0,
            status = status.as_u16(),
            ?expected_size,
            "Response received"
        );
        self.emit_event(Event::ResponseReceived {
            id,
            status: status.as_u16(),
            expected_size,
        });

        if status.as_u16() != 200 {
            // Dropping the response aborts the transfer before any body
            // bytes are delivered.
            tracing::warn!(
                task_id = id.0,
                status = status.as_u16(),
                "Unexpected response status"
            );
            return Err(FetchError::NotFound);
        }

        let max_size = self.config.max_response_size;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| FetchError::Other(e.to_string()))?;

            let mut tasks = self.registry.tasks.lock().await;
            let Some(task) = tasks.get_mut(&id) else {
                tracing::debug!(task_id = id.0, "Data received for unregistered task, ignoring");
                return Err(FetchError::Canceled);
            };

            task.buffer.extend_from_slice(&chunk);
            tracing::trace!(
                task_id = id.0,
                chunk = chunk.len(),
                received = task.buffer.len(),
                "Data received"
            );

            if let Some(limit) = max_size {
                if task.buffer.len() as u64 > limit {
                    tracing::warn!(
                        task_id = id.0,
                        received = task.buffer.len(),
                        limit,
                        "Response body exceeds configured size cap"
                    );
                    return Err(FetchError::TooLarge);
                }
            }
        }

        Ok(())
    }

    /// Terminal resolution: remove the task from the registry and fire
    /// exactly one of its callbacks
    ///
    /// Callbacks run outside the registry lock. Removal via `HashMap::remove`
    /// plus `Option::take` enforces the exactly-once guarantee.
    pub(crate) async fn resolve(&self, id: TaskId, outcome: std::result::Result<(), FetchError>) {
        let task = {
            let mut tasks = self.registry.tasks.lock().await;
            tasks.remove(&id)
        };

        let Some(mut task) = task else {
            tracing::debug!(task_id = id.0, "Completion for unregistered task, ignoring");
            return;
        };

        match outcome {
            Ok(()) => {
                let bytes = std::mem::take(&mut task.buffer);
                tracing::info!(task_id = id.0, bytes = bytes.len(), "Download complete");
                self.emit_event(Event::Completed {
                    id,
                    bytes: bytes.len() as u64,
                });
                if let Some(on_success) = task.on_success.take() {
                    on_success(bytes);
                }
            }
            Err(error) => {
                tracing::warn!(task_id = id.0, error = %error, "Download failed");
                self.emit_event(Event::Failed {
                    id,
                    error: error.to_string(),
                });
                if let Some(on_failure) = task.on_failure.take() {
                    on_failure(error);
                }
            }
        }
    }
}
