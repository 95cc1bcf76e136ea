//! Error types for page-merge
//!
//! This module provides the error taxonomy for the library:
//! - [`FetchError`] - per-request failure kinds reported through fetch
//!   failure callbacks
//! - [`MergeError`] - HTML merge engine failures
//! - [`Error`] - the top-level type combining both, used by the facade
//!
//! All per-request failures are reported via the failure callback associated
//! with the originating request; none are fatal to the fetch manager itself,
//! and one request's failure never affects others.

use thiserror::Error;

/// Result type alias for page-merge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for page-merge
///
/// This is the error surface of the [`PageAssembler`](crate::PageAssembler)
/// facade: fetch failures and merge failures both arrive here, so UI layers
/// handle a single type.
#[derive(Debug, Error)]
pub enum Error {
    /// Fetch failure reported for a single request
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// HTML merge failure
    #[error("merge error: {0}")]
    Merge(#[from] MergeError),

    /// HTTP client error (construction or configuration)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Failure kinds for a single fetch request
///
/// Each fetch resolves through exactly one terminal callback; when that
/// callback is the failure one, it carries one of these kinds.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Transfer was cancelled before completion
    #[error("download canceled")]
    Canceled,

    /// Response body exceeded the configured size cap
    ///
    /// Only produced when
    /// [`Config::max_response_size`](crate::Config::max_response_size) is
    /// set; the default configuration buffers without limit.
    #[error("download request too large")]
    TooLarge,

    /// URL missing or unparseable, or the server answered with a non-200
    /// status
    #[error("URL not found")]
    NotFound,

    /// The connectivity probe reported the network as unreachable before the
    /// transfer started
    #[error("not connected to the internet")]
    NotConnected,

    /// Any transport-level failure, carrying a human-readable description
    #[error("{0}")]
    Other(String),
}

/// HTML merge engine failures
///
/// The merge is a literal text-splicing operation over fixed delimiters; a
/// missing delimiter on either side hard-fails the whole merge; no partial
/// document is ever produced.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum MergeError {
    /// The `<head>` delimiter is missing from the template or the fetched
    /// document
    #[error("<head> not found")]
    HeadNotFound,

    /// The template is missing `<body>`, or the fetched document is missing
    /// a `<body` tag
    #[error("<body> not found")]
    BodyNotFound,
}
