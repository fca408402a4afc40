//! Storage liveness.

use crate::error::Result;

/// Readiness probe for a storage backend.
pub trait StorageHealth: Send + Sync {
    /// Succeed if the backend can currently serve requests.
    fn ping(&self) -> impl std::future::Future<Output = Result<()>> + Send;
}
