//! Network reachability probing
//!
//! The fetch manager consults a [`ConnectivityProbe`] before starting each
//! transfer: when the probe reports the network as unreachable, the fetch
//! fails synchronously with
//! [`FetchError::NotConnected`](crate::FetchError::NotConnected) and no task
//! is created.
//!
//! The probe is a trait object so hosts can plug in whatever reachability
//! primitive their platform provides. [`AlwaysReachable`] is the stub
//! implementation for environments without one.

/// Trait for pre-flight network reachability checks
///
/// Implementations must be cheap and non-blocking: the probe is called
/// synchronously on every `download`, before any network I/O.
pub trait ConnectivityProbe: Send + Sync {
    /// Report whether the network is currently reachable
    fn is_reachable(&self) -> bool;

    /// Human-readable name of the probe implementation (for logging)
    fn name(&self) -> &str;
}

/// Probe that always reports the network as reachable
///
/// Used when the host platform provides no reachability primitive, or when
/// the pre-flight check is intentionally disabled (tests, servers). With
/// this probe, connectivity problems surface as transport errors instead of
/// `NotConnected`.
pub struct AlwaysReachable;

impl ConnectivityProbe for AlwaysReachable {
    fn is_reachable(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "always-reachable"
    }
}
