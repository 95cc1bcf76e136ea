//! Shared test helpers for creating FetchManager instances in tests.

use std::sync::Arc;

use crate::config::Config;
use crate::connectivity::{AlwaysReachable, ConnectivityProbe};
use crate::error::FetchError;
use crate::fetcher::FetchManager;
use crate::types::{FailureCallback, SuccessCallback};

/// Probe that always reports the network as unreachable
pub(crate) struct NeverReachable;

impl ConnectivityProbe for NeverReachable {
    fn is_reachable(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "never-reachable"
    }
}

/// Helper to create a test FetchManager with default config and an
/// always-online probe.
pub(crate) fn create_test_manager() -> FetchManager {
    create_test_manager_with_config(Config::default())
}

/// Helper to create a test FetchManager with a custom config.
pub(crate) fn create_test_manager_with_config(config: Config) -> FetchManager {
    FetchManager::new(config, Arc::new(AlwaysReachable)).unwrap()
}

/// Helper to create a test FetchManager whose probe reports the network as
/// unreachable.
pub(crate) fn create_offline_manager() -> FetchManager {
    FetchManager::new(Config::default(), Arc::new(NeverReachable)).unwrap()
}

/// Build a callback pair that forwards the terminal outcome into a channel.
///
/// The channel has capacity 1 and the callbacks use `try_send(..).unwrap()`,
/// so a second terminal callback for the same download panics the test,
/// which is exactly the exactly-once property the callbacks must uphold.
pub(crate) fn outcome_callbacks() -> (
    SuccessCallback,
    FailureCallback,
    tokio::sync::mpsc::Receiver<Result<Vec<u8>, FetchError>>,
) {
    let (tx, rx) = tokio::sync::mpsc::channel(1);
    let failure_tx = tx.clone();

    (
        Box::new(move |bytes| {
            tx.try_send(Ok(bytes)).unwrap();
        }),
        Box::new(move |error| {
            failure_tx.try_send(Err(error)).unwrap();
        }),
        rx,
    )
}

/// Minimal HTML document served by mock endpoints
pub(crate) const SAMPLE_PAGE: &str = "<html><head><title>Sample</title></head>\
<body class=\"sample\"><p>hello</p></body></html>";
