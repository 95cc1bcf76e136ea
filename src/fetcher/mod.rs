//! Core fetch manager split into focused submodules.
//!
//! The [`FetchManager`] struct and its methods are organized by domain:
//! - `task` - per-transfer state and the transfer driver
//! - `control` - cancellation (single task and cancel-all)
//! - `lifecycle` - shutdown coordination

mod control;
mod lifecycle;
mod task;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::connectivity::ConnectivityProbe;
use crate::error::{FetchError, Result};
use crate::types::{Event, FailureCallback, FetchRequest, FetchTaskInfo, SuccessCallback, TaskId};

use task::FetchTask;

/// Registry of live fetch tasks, keyed by transfer identity
#[derive(Clone)]
pub(crate) struct TaskRegistry {
    /// Live tasks; a task is present iff its transfer has not yet completed,
    /// failed, or been cancelled (protected by Mutex since events from
    /// concurrent transfers interleave)
    pub(crate) tasks: Arc<tokio::sync::Mutex<HashMap<TaskId, FetchTask>>>,
    /// Monotonic id source; ids double as registry insertion order
    pub(crate) next_id: Arc<AtomicU64>,
    /// Flag to indicate whether new downloads are accepted (cleared during
    /// shutdown)
    pub(crate) accepting_new: Arc<AtomicBool>,
}

/// Concurrent fetch manager (cloneable - all fields are Arc-wrapped)
///
/// Owns the pool of in-flight fetch tasks: issues requests, routes transfer
/// events to the right task, and exposes cancellation. Each `download`
/// resolves through exactly one terminal callback, success or failure.
///
/// Construction is explicit: create as many isolated instances as needed
/// (tests in particular); there is no process-wide shared manager.
#[derive(Clone)]
pub struct FetchManager {
    /// Shared HTTP client (connection pooling across transfers)
    pub(crate) client: reqwest::Client,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Pre-flight reachability probe (trait object for pluggable
    /// implementations)
    pub(crate) probe: Arc<dyn ConnectivityProbe>,
    /// Live task registry
    pub(crate) registry: TaskRegistry,
}

impl FetchManager {
    /// Create a new FetchManager instance
    ///
    /// Builds the shared HTTP client from the configuration (user agent,
    /// optional per-request timeout) and sets up the event broadcast
    /// channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: Config, probe: Arc<dyn ConnectivityProbe>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let (event_tx, _rx) = tokio::sync::broadcast::channel(config.event_capacity);

        tracing::info!(probe = probe.name(), "Fetch manager initialized");

        Ok(Self {
            client,
            event_tx,
            config: Arc::new(config),
            probe,
            registry: TaskRegistry {
                tasks: Arc::new(tokio::sync::Mutex::new(HashMap::new())),
                next_id: Arc::new(AtomicU64::new(1)),
                accepting_new: Arc::new(AtomicBool::new(true)),
            },
        })
    }

    /// Start a download
    ///
    /// The connectivity probe is consulted first: if it reports the network
    /// as unreachable, `on_failure` is invoked synchronously with
    /// [`FetchError::NotConnected`], no task is created and no network call
    /// is made. Otherwise a task is registered and the transfer driver is
    /// spawned; the task id is returned so the transfer can be cancelled
    /// individually.
    ///
    /// Exactly one of `on_success`/`on_failure` fires, exactly once, for
    /// every call, whether it resolves by completion, transport error,
    /// non-200 status, or cancellation.
    ///
    /// # Returns
    ///
    /// `Some(id)` when a transfer was started; `None` when the download was
    /// refused up front (unreachable network, or shutdown in progress); in
    /// that case `on_failure` has already run.
    pub async fn download(
        &self,
        request: FetchRequest,
        on_success: SuccessCallback,
        on_failure: FailureCallback,
    ) -> Option<TaskId> {
        if !self.registry.accepting_new.load(Ordering::SeqCst) {
            tracing::warn!(url = %request.url, "Download refused: fetch manager is shutting down");
            on_failure(FetchError::Other("fetch manager is shutting down".into()));
            return None;
        }

        if !self.probe.is_reachable() {
            tracing::warn!(
                url = %request.url,
                probe = self.probe.name(),
                "Download refused: network unreachable"
            );
            on_failure(FetchError::NotConnected);
            return None;
        }

        let id = TaskId(self.registry.next_id.fetch_add(1, Ordering::SeqCst));
        let cancel = CancellationToken::new();
        let task = FetchTask::new(id, &request, cancel.clone(), on_success, on_failure);

        let active = {
            let mut tasks = self.registry.tasks.lock().await;
            tasks.insert(id, task);
            tasks.len()
        };
        tracing::debug!(task_id = id.0, active, url = %request.url, "Download task registered");

        self.emit_event(Event::Started {
            id,
            url: request.url.to_string(),
        });

        self.spawn_transfer(id, request, cancel);

        Some(id)
    }

    /// List snapshots of all in-flight fetch tasks, oldest first
    pub async fn active_tasks(&self) -> Vec<FetchTaskInfo> {
        let tasks = self.registry.tasks.lock().await;
        let mut infos: Vec<FetchTaskInfo> = tasks.values().map(FetchTask::info).collect();
        infos.sort_by_key(|info| info.id);
        infos
    }

    /// Number of in-flight fetch tasks
    pub async fn active_count(&self) -> usize {
        self.registry.tasks.lock().await.len()
    }

    /// Subscribe to fetch events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all
    /// events independently. Events are buffered, but a subscriber that
    /// falls behind by more than the configured capacity receives a
    /// `RecvError::Lagged` error.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    ///
    /// The configuration is wrapped in an Arc, so this is a cheap clone
    /// operation.
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Emit an event to all subscribers
    ///
    /// If there are no active subscribers, the event is silently dropped
    /// (send() returns Err when no receivers exist, which is fine; fetches
    /// proceed whether or not anyone is listening).
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }
}
