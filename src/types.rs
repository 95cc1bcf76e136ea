//! Core types for page-merge

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::FetchError;

/// Unique identifier for an in-flight fetch task
///
/// Ids are allocated from a monotonic counter, so they double as the
/// registry's insertion order: walking ids in descending order visits tasks
/// in reverse insertion order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl TaskId {
    /// Create a new TaskId
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner u64 value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for TaskId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<TaskId> for u64 {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Immutable descriptor for one fetch
///
/// Built by the caller and handed to
/// [`FetchManager::download`](crate::FetchManager::download). The request is
/// a plain GET; extra headers can be attached with [`FetchRequest::header`].
#[derive(Clone, Debug)]
pub struct FetchRequest {
    /// Target URL
    pub url: Url,
    /// Additional request headers (empty by default)
    pub headers: HeaderMap,
}

impl FetchRequest {
    /// Create a request for the given URL with no extra headers
    pub fn new(url: Url) -> Self {
        Self {
            url,
            headers: HeaderMap::new(),
        }
    }

    /// Attach a header to the request (builder style)
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Read-only snapshot of an in-flight fetch task
///
/// Returned by [`FetchManager::active_tasks`](crate::FetchManager::active_tasks)
/// for introspection; mutating task state is the manager's exclusive right.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchTaskInfo {
    /// Task identifier
    pub id: TaskId,
    /// Request URL
    pub url: String,
    /// Bytes buffered so far
    pub received_bytes: u64,
    /// Content length advertised by the response, if known
    pub expected_size: Option<u64>,
    /// When the task was registered
    pub created_at: DateTime<Utc>,
}

/// Events broadcast by the fetch manager
///
/// Consumers subscribe via
/// [`FetchManager::subscribe`](crate::FetchManager::subscribe); every
/// subscriber receives all events independently.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A transfer was registered and started
    Started {
        /// Task ID
        id: TaskId,
        /// Request URL
        url: String,
    },

    /// Response headers arrived and were matched to a registered task
    ResponseReceived {
        /// Task ID
        id: TaskId,
        /// HTTP status code
        status: u16,
        /// Content length advertised by the response, if any
        #[serde(skip_serializing_if = "Option::is_none")]
        expected_size: Option<u64>,
    },

    /// Transfer completed; the buffered body was handed to the success
    /// callback
    Completed {
        /// Task ID
        id: TaskId,
        /// Total bytes received
        bytes: u64,
    },

    /// Transfer failed; the failure callback received the error
    Failed {
        /// Task ID
        id: TaskId,
        /// Error message
        error: String,
    },

    /// The fetch manager finished shutting down
    Shutdown,
}

/// Callback invoked with the accumulated response body when a fetch succeeds
pub type SuccessCallback = Box<dyn FnOnce(Vec<u8>) + Send + 'static>;

/// Callback invoked with the failure kind when a fetch fails
pub type FailureCallback = Box<dyn FnOnce(FetchError) + Send + 'static>;
