//! Configuration types for page-merge

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration for the fetch manager
///
/// Works out of the box with zero configuration: by default there is no
/// per-request timeout and no response size cap.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// User-Agent header sent with every request
    /// (default: `page-merge/<crate version>`)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Total per-request timeout (None = rely on transport defaults)
    #[serde(default)]
    pub request_timeout: Option<Duration>,

    /// Maximum buffered response body size in bytes (None = unbounded)
    ///
    /// When unset, response bodies are buffered without limit and the
    /// `TooLarge` failure kind is never produced. Setting a cap makes an
    /// oversized transfer fail with
    /// [`FetchError::TooLarge`](crate::FetchError::TooLarge) and aborts it.
    #[serde(default)]
    pub max_response_size: Option<u64>,

    /// Buffer size of the event broadcast channel (default: 100)
    ///
    /// Subscribers that fall behind by more than this many events receive a
    /// `RecvError::Lagged` error.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout: None,
            max_response_size: None,
            event_capacity: default_event_capacity(),
        }
    }
}

fn default_user_agent() -> String {
    concat!("page-merge/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_event_capacity() -> usize {
    100
}
