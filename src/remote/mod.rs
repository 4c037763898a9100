//! Remote document store.
//!
//! The remote store is tried first for every facade operation; any
//! [`RemoteError`] is logged by the caller and answered from the local
//! mirror instead.

mod firebase;
pub mod value;

pub use firebase::{FirebaseClient, FirebaseConfig};

use async_trait::async_trait;
use serde_json::Value;

use crate::models::{Collection, Document};

/// Errors that can occur talking to the remote store.
#[derive(Debug)]
pub enum RemoteError {
    /// Request could not be sent or the connection failed.
    HttpError(String),
    /// The remote answered with a non-success status.
    ApiError { status: u16, body: String },
    /// The response could not be decoded.
    DecodeError(String),
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteError::HttpError(e) => write!(f, "HTTP error: {}", e),
            RemoteError::ApiError { status, body } => {
                write!(f, "Remote API error ({}): {}", status, body)
            }
            RemoteError::DecodeError(e) => write!(f, "Failed to decode remote response: {}", e),
        }
    }
}

impl std::error::Error for RemoteError {}

/// A hosted document database plus object storage for images.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Lists a collection ordered by `created_at`, newest first.
    /// Each returned document carries its `id`.
    async fn list(&self, collection: Collection) -> Result<Vec<Document>, RemoteError>;

    /// Creates a document and returns the id the remote assigned.
    async fn create(&self, collection: Collection, fields: &Document) -> Result<String, RemoteError>;

    /// Merges `patch` into an existing document. Fails if it does not exist.
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: &Document,
    ) -> Result<(), RemoteError>;

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), RemoteError>;

    /// Returns the first document whose fields equal every `(field, value)` pair.
    async fn find(
        &self,
        collection: Collection,
        filters: &[(&str, Value)],
    ) -> Result<Option<Document>, RemoteError>;

    /// Uploads an object at `path` and returns its public download URL.
    async fn upload(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, RemoteError>;
}
