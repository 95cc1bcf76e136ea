//! # page-merge
//!
//! Embeddable library that fetches a remote HTML document and splices its
//! `<head>` and `<body>` fragments into a locally supplied template,
//! producing a single merged document for display.
//!
//! ## Design Philosophy
//!
//! page-merge is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - Transfers are driven by I/O completion, results are
//!   delivered through callbacks, and consumers can subscribe to events
//! - **Explicitly constructed** - No implicit global instance; create as
//!   many isolated managers as needed, and shut them down explicitly
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use page_merge::{AlwaysReachable, Config, PageAssembler};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let assembler = PageAssembler::new(Config::default(), Arc::new(AlwaysReachable))?;
//!
//!     let template = "<!DOCTYPE html><html><head></head><body></body></html>";
//!     let task = assembler
//!         .fetch_and_merge(
//!             template,
//!             Some("https://example.com/"),
//!             |merged| println!("{merged}"),
//!             |error| eprintln!("fetch failed: {error}"),
//!         )
//!         .await;
//!     println!("started fetch task {task:?}");
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Fetch-and-merge facade
pub mod assembler;
/// Configuration types
pub mod config;
/// Network reachability probing
pub mod connectivity;
/// Error types
pub mod error;
/// Core fetch manager (decomposed into focused submodules)
pub mod fetcher;
/// Delimiter-based HTML merging
pub mod merge;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use assembler::PageAssembler;
pub use config::Config;
pub use connectivity::{AlwaysReachable, ConnectivityProbe};
pub use error::{Error, FetchError, MergeError, Result};
pub use fetcher::FetchManager;
pub use merge::merge_documents;
pub use types::{Event, FetchRequest, FetchTaskInfo, TaskId};
