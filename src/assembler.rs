//! Fetch-and-merge facade.
//!
//! [`PageAssembler`] composes the fetch manager and the merge engine into a
//! single "fetch a URL and hand back merged HTML" operation. It is the only
//! entry point UI layers use; the pieces remain available individually for
//! embedders with different composition needs.

use std::sync::Arc;

use url::Url;

use crate::config::Config;
use crate::connectivity::ConnectivityProbe;
use crate::error::{Error, FetchError, Result};
use crate::fetcher::FetchManager;
use crate::merge::merge_documents;
use crate::types::{Event, FetchRequest, TaskId};

/// Terminal outcome of one fetch, carried from the manager's callbacks to
/// the merge stage
type FetchOutcome = std::result::Result<Vec<u8>, FetchError>;

/// Facade combining the fetch manager and the HTML merge engine
///
/// Cloneable; clones share the same underlying fetch manager.
#[derive(Clone)]
pub struct PageAssembler {
    fetcher: FetchManager,
}

impl PageAssembler {
    /// Create a facade with its own fetch manager
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: Config, probe: Arc<dyn ConnectivityProbe>) -> Result<Self> {
        Ok(Self {
            fetcher: FetchManager::new(config, probe)?,
        })
    }

    /// Wrap an existing fetch manager
    pub fn with_manager(fetcher: FetchManager) -> Self {
        Self { fetcher }
    }

    /// Access the underlying fetch manager
    pub fn fetcher(&self) -> &FetchManager {
        &self.fetcher
    }

    /// Fetch `url` and splice its head and body into `template`
    ///
    /// An absent or unparseable `url` fails synchronously with
    /// [`FetchError::NotFound`] and starts no transfer. Otherwise the
    /// download is delegated to the fetch manager; on success the body is
    /// decoded as UTF-8 (invalid sequences are replaced rather than
    /// failing) and merged into the template.
    ///
    /// A merge failure is reported as [`Error::Merge`] through `on_failure`
    /// rather than being collapsed into an empty success.
    ///
    /// Exactly one of `on_success`/`on_failure` runs, exactly once, per
    /// call.
    ///
    /// # Returns
    ///
    /// `Some(id)` of the underlying fetch task when a transfer was started
    /// (usable with [`cancel`](FetchManager::cancel)); `None` when the
    /// request was refused up front, in which case `on_failure` has already
    /// run or is about to run with the fetch failure.
    pub async fn fetch_and_merge(
        &self,
        template: &str,
        url: Option<&str>,
        on_success: impl FnOnce(String) + Send + 'static,
        on_failure: impl FnOnce(Error) + Send + 'static,
    ) -> Option<TaskId> {
        let parsed = match url {
            Some(raw) => match Url::parse(raw) {
                Ok(parsed) => parsed,
                Err(error) => {
                    tracing::warn!(url = raw, %error, "Rejecting unparseable URL");
                    on_failure(Error::Fetch(FetchError::NotFound));
                    return None;
                }
            },
            None => {
                tracing::warn!("Rejecting fetch without a URL");
                on_failure(Error::Fetch(FetchError::NotFound));
                return None;
            }
        };

        // Exactly one terminal fetch callback fires, so a single-slot
        // channel carries the outcome to the merge stage.
        let (outcome_tx, mut outcome_rx) = tokio::sync::mpsc::channel::<FetchOutcome>(1);
        let failure_tx = outcome_tx.clone();

        let id = self
            .fetcher
            .download(
                FetchRequest::new(parsed),
                Box::new(move |bytes| {
                    outcome_tx.try_send(Ok(bytes)).ok();
                }),
                Box::new(move |error| {
                    failure_tx.try_send(Err(error)).ok();
                }),
            )
            .await;

        let template = template.to_string();
        tokio::spawn(async move {
            let Some(outcome) = outcome_rx.recv().await else {
                return;
            };

            match outcome {
                Ok(bytes) => {
                    tracing::debug!(bytes = bytes.len(), "Fetched document, merging");
                    let fetched = String::from_utf8_lossy(&bytes);
                    match merge_documents(&template, &fetched) {
                        Ok(merged) => on_success(merged),
                        Err(error) => {
                            tracing::warn!(%error, "Merge failed");
                            on_failure(Error::Merge(error));
                        }
                    }
                }
                Err(error) => on_failure(Error::Fetch(error)),
            }
        });

        id
    }

    /// Cancel every in-flight fetch
    ///
    /// See [`FetchManager::cancel_all`] for the cancellation semantics.
    pub async fn cancel_all(&self) {
        self.fetcher.cancel_all().await;
    }

    /// Number of in-flight fetch tasks
    pub async fn active_count(&self) -> usize {
        self.fetcher.active_count().await
    }

    /// Subscribe to fetch events
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.fetcher.subscribe()
    }

    /// Gracefully shut down the underlying fetch manager
    pub async fn shutdown(&self) {
        self.fetcher.shutdown().await;
    }
}
