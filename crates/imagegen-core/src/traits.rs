//! Content-retrieval abstraction
//!
//! The persistence pipeline only sees these traits. The DIAL bucket client in
//! `imagegen-api-client` implements them; tests use in-memory doubles.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::RetrievalError;

/// Factory for scoped content sessions.
///
/// One session is opened per batch and shared by every fetch in it.
#[async_trait]
pub trait ContentClient: Send + Sync {
    async fn open_session(&self) -> Result<Box<dyn ContentSession>, RetrievalError>;
}

/// An authenticated connection to the content store.
///
/// Sessions are closed exactly once, after the last fetch of the batch has
/// completed. Fetches after `close` fail with [`RetrievalError::SessionClosed`].
#[async_trait]
pub trait ContentSession: Send + Sync {
    /// Fetch the raw bytes behind a retrieval reference. Never retries.
    async fn fetch(&self, reference: &str) -> Result<Bytes, RetrievalError>;

    /// Release the session's transport and auth resources.
    async fn close(&self);
}
