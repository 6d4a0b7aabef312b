//! Cooperative shutdown port (interface).

use crate::error::NegotiationFailure;

/// Port for asking a child to shut itself down over its application-level
/// channel.
pub trait ShutdownNotifier: Send + Sync {
    /// Send one bounded shutdown request. `Ok` only on an explicit success
    /// answer; no retries.
    fn notify(&self) -> impl std::future::Future<Output = Result<(), NegotiationFailure>> + Send;
}
