//! Storage facade over the remote document store and the local mirror.
//!
//! Every operation tries the remote store first when one is configured.
//! Remote failures are logged and never returned; the local store then
//! answers reads and always mirrors writes. [`Served::backend`] tells the
//! caller which side actually served the request.

use base64::Engine;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::local::{LocalStore, LocalStoreError};
use crate::models::{
    normalize, timestamp, to_document, AdminCredential, Collection, Document, Entity, Record,
    Stored,
};
use crate::remote::{FirebaseClient, FirebaseConfig, RemoteStore};

/// Which backend served a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Remote,
    Local,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Remote => write!(f, "remote"),
            Backend::Local => write!(f, "local"),
        }
    }
}

/// A result plus the backend that produced it.
///
/// For writes, `Remote` means the remote write succeeded (the local mirror
/// was written as well); `Local` means only the local store has it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Served<T> {
    pub value: T,
    pub backend: Backend,
}

impl<T> Served<T> {
    pub fn remote(value: T) -> Self {
        Self {
            value,
            backend: Backend::Remote,
        }
    }

    pub fn local(value: T) -> Self {
        Self {
            value,
            backend: Backend::Local,
        }
    }

    pub fn used_remote(&self) -> bool {
        self.backend == Backend::Remote
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Served<U> {
        Served {
            value: f(self.value),
            backend: self.backend,
        }
    }
}

/// Errors returned by the storage facade. Remote failures never appear here.
#[derive(Debug)]
pub enum StoreError {
    /// The local store failed to read or write.
    LocalError(LocalStoreError),
    /// Data in the local store could not be parsed.
    CorruptData {
        collection: Collection,
        source: serde_json::Error,
    },
    /// A record did not match the shape of its collection.
    InvalidRecord {
        collection: Collection,
        source: serde_json::Error,
    },
    /// An upload was attempted with no content.
    EmptyUpload,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::LocalError(e) => write!(f, "Local storage error: {}", e),
            StoreError::CorruptData { collection, source } => {
                write!(f, "Corrupt local data for {}: {}", collection, source)
            }
            StoreError::InvalidRecord { collection, source } => {
                write!(f, "Invalid {} record: {}", collection, source)
            }
            StoreError::EmptyUpload => write!(f, "No file provided"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::LocalError(e) => Some(e),
            StoreError::CorruptData { source, .. } | StoreError::InvalidRecord { source, .. } => {
                Some(source)
            }
            StoreError::EmptyUpload => None,
        }
    }
}

impl From<LocalStoreError> for StoreError {
    fn from(e: LocalStoreError) -> Self {
        StoreError::LocalError(e)
    }
}

/// Authentication failure. Every cause maps to the same error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    InvalidCredentials,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid username or password"),
        }
    }
}

impl std::error::Error for AuthError {}

fn doc_id(doc: &Document) -> Option<&str> {
    doc.get("id").and_then(Value::as_str)
}

fn doc_created_at(doc: &Document) -> Option<chrono::DateTime<Utc>> {
    doc.get("created_at")
        .and_then(Value::as_str)
        .and_then(timestamp::parse)
}

/// Keeps the last path component and drops characters unsafe in object names.
fn object_file_name(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control() && *c != '#' && *c != '?')
        .collect();
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

/// One lock per collection, held across each read-modify-write of the
/// collection's local list.
#[derive(Default)]
struct CollectionLocks {
    locks: Mutex<HashMap<Collection, Arc<Mutex<()>>>>,
}

impl CollectionLocks {
    async fn acquire(&self, collection: Collection) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .lock()
            .await
            .entry(collection)
            .or_default()
            .clone();
        lock.lock_owned().await
    }
}

/// The storage facade.
///
/// Clones share the same collection locks, so every writer to a local store
/// should go through clones of a single `DataStore`.
#[derive(Clone)]
pub struct DataStore {
    remote: Option<Arc<dyn RemoteStore>>,
    local: Arc<dyn LocalStore>,
    locks: Arc<CollectionLocks>,
}

impl DataStore {
    /// Creates a facade with only the local store.
    pub fn new(local: Arc<dyn LocalStore>) -> Self {
        Self {
            remote: None,
            local,
            locks: Arc::new(CollectionLocks::default()),
        }
    }

    pub fn with_remote(mut self, remote: Arc<dyn RemoteStore>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Creates a facade that uses Firebase when `firebase` is fully configured.
    pub fn from_config(firebase: &FirebaseConfig, local: Arc<dyn LocalStore>) -> Self {
        let store = Self::new(local);
        match FirebaseClient::from_config(firebase) {
            Some(client) => {
                tracing::info!("Firebase configured successfully");
                store.with_remote(Arc::new(client))
            }
            None => {
                tracing::warn!("Firebase settings not found. Using local fallback storage.");
                store
            }
        }
    }

    pub fn is_remote_configured(&self) -> bool {
        self.remote.is_some()
    }

    pub fn local(&self) -> &Arc<dyn LocalStore> {
        &self.local
    }

    /// Reads a collection's records in stored order.
    async fn read_local(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        match self.local.get(collection.storage_key()).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|source| StoreError::CorruptData { collection, source }),
            None => Ok(Vec::new()),
        }
    }

    async fn write_local(&self, collection: Collection, docs: &[Document]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(docs)
            .map_err(|source| StoreError::CorruptData { collection, source })?;
        self.local.set(collection.storage_key(), &raw).await?;
        Ok(())
    }

    /// Reads the local mirror, newest first.
    async fn read_local_sorted(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let mut docs = self.read_local(collection).await?;
        // Stable, so records sharing a timestamp keep their stored order
        docs.sort_by(|a, b| doc_created_at(b).cmp(&doc_created_at(a)));
        Ok(docs)
    }

    async fn fetch_with<R>(
        &self,
        collection: Collection,
        decode: impl Fn(Document) -> Result<R, serde_json::Error>,
    ) -> Result<Served<Vec<R>>, StoreError> {
        if let Some(remote) = &self.remote {
            match remote.list(collection).await {
                Ok(docs) => match docs.into_iter().map(&decode).collect::<Result<Vec<_>, _>>() {
                    Ok(records) => {
                        tracing::info!(
                            "Fetched {} record(s) from remote {}",
                            records.len(),
                            collection
                        );
                        return Ok(Served::remote(records));
                    }
                    Err(e) => tracing::warn!(
                        "Remote {} returned a malformed record, using local store: {}",
                        collection,
                        e
                    ),
                },
                Err(e) => {
                    tracing::warn!("Remote fetch failed for {}, using local store: {}", collection, e)
                }
            }
        }

        let records = self
            .read_local_sorted(collection)
            .await?
            .into_iter()
            .map(decode)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| StoreError::CorruptData { collection, source })?;
        tracing::debug!(
            "Fetched {} record(s) from local store for {}",
            records.len(),
            collection
        );
        Ok(Served::local(records))
    }

    /// Fetches a collection as typed records, newest first.
    pub async fn fetch<T: Entity>(&self) -> Result<Served<Vec<Stored<T>>>, StoreError> {
        self.fetch_with(T::COLLECTION, Stored::from_document).await
    }

    /// Fetches a collection as tagged records, newest first.
    pub async fn fetch_collection(
        &self,
        collection: Collection,
    ) -> Result<Served<Vec<Record>>, StoreError> {
        self.fetch_with(collection, |doc| Record::from_document(collection, doc))
            .await
    }

    /// Fetches a collection by name. Unknown names yield an empty list.
    pub async fn fetch_by_name(&self, name: &str) -> Result<Served<Vec<Record>>, StoreError> {
        match Collection::parse(name) {
            Some(collection) => self.fetch_collection(collection).await,
            None => {
                tracing::warn!("No storage key found for collection: {}", name);
                Ok(Served::local(Vec::new()))
            }
        }
    }

    /// Inserts a field document, returning the stored document with its id.
    async fn insert_document(
        &self,
        collection: Collection,
        mut fields: Document,
    ) -> Result<Served<Document>, StoreError> {
        fields.remove("id");
        fields.insert("created_at".to_string(), Value::String(timestamp::now()));

        let mut remote_id = None;
        if let Some(remote) = &self.remote {
            match remote.create(collection, &fields).await {
                Ok(id) => {
                    tracing::info!("Inserted record into remote {}: {}", collection, id);
                    remote_id = Some(id);
                }
                Err(e) => tracing::warn!(
                    "Remote insert failed for {}, using local store: {}",
                    collection,
                    e
                ),
            }
        }

        let backend = if remote_id.is_some() {
            Backend::Remote
        } else {
            Backend::Local
        };
        let id = remote_id.unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut record = Document::new();
        record.insert("id".to_string(), Value::String(id.clone()));
        record.extend(fields);

        let _guard = self.locks.acquire(collection).await;
        let mut docs = self.read_local(collection).await?;
        docs.insert(0, record.clone());
        if let Err(e) = self.write_local(collection, &docs).await {
            if backend == Backend::Remote {
                tracing::warn!(
                    "Record {} was stored remotely but the local mirror write for {} failed",
                    id,
                    collection
                );
            }
            return Err(e);
        }
        tracing::debug!("Updated local store for {}", collection);

        Ok(Served {
            value: record,
            backend,
        })
    }

    /// Inserts a typed record. `created_at` is set to now.
    pub async fn insert<T: Entity>(&self, data: &T) -> Result<Served<Stored<T>>, StoreError> {
        let collection = T::COLLECTION;
        let fields = to_document(data)
            .map_err(|source| StoreError::InvalidRecord { collection, source })?;
        let served = self.insert_document(collection, fields).await?;
        let backend = served.backend;
        let stored = Stored::from_document(served.value)
            .map_err(|source| StoreError::InvalidRecord { collection, source })?;
        Ok(Served {
            value: stored,
            backend,
        })
    }

    /// Inserts untyped JSON after checking it against the collection's shape.
    pub async fn insert_value(
        &self,
        collection: Collection,
        value: Value,
    ) -> Result<Served<Record>, StoreError> {
        let fields = normalize(collection, value)
            .map_err(|source| StoreError::InvalidRecord { collection, source })?;
        let served = self.insert_document(collection, fields).await?;
        let backend = served.backend;
        let record = Record::from_document(collection, served.value)
            .map_err(|source| StoreError::InvalidRecord { collection, source })?;
        Ok(Served {
            value: record,
            backend,
        })
    }

    /// Merges `patch` into the record with `id`. `updated_at` is set to now.
    ///
    /// The merged record must still match the collection's shape, otherwise
    /// nothing is written. A missing id is a no-op locally.
    pub async fn update(
        &self,
        collection: Collection,
        id: &str,
        mut patch: Document,
    ) -> Result<Served<()>, StoreError> {
        patch.remove("id");
        patch.insert("updated_at".to_string(), Value::String(timestamp::now()));

        let _guard = self.locks.acquire(collection).await;
        let mut docs = self.read_local(collection).await?;
        let position = docs.iter().position(|doc| doc_id(doc) == Some(id));

        if let Some(index) = position {
            let mut merged = docs[index].clone();
            merged.extend(patch.clone());
            Record::from_document(collection, merged.clone())
                .map_err(|source| StoreError::InvalidRecord { collection, source })?;
            docs[index] = merged;
        }

        let mut backend = Backend::Local;
        if let Some(remote) = &self.remote {
            match remote.update(collection, id, &patch).await {
                Ok(()) => {
                    tracing::info!("Updated record in remote {}: {}", collection, id);
                    backend = Backend::Remote;
                }
                Err(e) => tracing::warn!(
                    "Remote update failed for {}, using local store: {}",
                    collection,
                    e
                ),
            }
        }

        if position.is_some() {
            self.write_local(collection, &docs).await?;
            tracing::debug!("Updated local store for {}: {}", collection, id);
        } else {
            tracing::debug!("No local {} record with id {}", collection, id);
        }

        Ok(Served { value: (), backend })
    }

    /// Removes the record with `id`.
    pub async fn delete(&self, collection: Collection, id: &str) -> Result<Served<()>, StoreError> {
        let mut backend = Backend::Local;
        if let Some(remote) = &self.remote {
            match remote.delete(collection, id).await {
                Ok(()) => {
                    tracing::info!("Deleted record from remote {}: {}", collection, id);
                    backend = Backend::Remote;
                }
                Err(e) => tracing::warn!(
                    "Remote delete failed for {}, using local store: {}",
                    collection,
                    e
                ),
            }
        }

        let _guard = self.locks.acquire(collection).await;
        let mut docs = self.read_local(collection).await?;
        docs.retain(|doc| doc_id(doc) != Some(id));
        self.write_local(collection, &docs).await?;
        tracing::debug!("Updated local store for {} (deleted): {}", collection, id);

        Ok(Served { value: (), backend })
    }

    /// Checks an admin username and password, remote first, then local.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Served<Stored<AdminCredential>>, AuthError> {
        if let Some(remote) = &self.remote {
            let filters = [
                ("username", Value::String(username.to_string())),
                ("password", Value::String(password.to_string())),
            ];
            match remote.find(Collection::AdminCredentials, &filters).await {
                Ok(Some(doc)) => match Stored::<AdminCredential>::from_document(doc) {
                    Ok(credential) => {
                        tracing::info!("Remote authentication successful");
                        return Ok(Served::remote(credential));
                    }
                    Err(e) => tracing::warn!("Remote credential record is malformed: {}", e),
                },
                Ok(None) => tracing::debug!("No remote credential match, checking local store"),
                Err(e) => tracing::warn!(
                    "Remote authentication failed, falling back to local store: {}",
                    e
                ),
            }
        }

        let docs = self
            .read_local(Collection::AdminCredentials)
            .await
            .map_err(|e| {
                tracing::warn!("Could not read local credentials: {}", e);
                AuthError::InvalidCredentials
            })?;

        let credential = docs
            .into_iter()
            .filter_map(|doc| Stored::<AdminCredential>::from_document(doc).ok())
            .find(|c| c.data.matches(username, password))
            .ok_or(AuthError::InvalidCredentials)?;

        tracing::info!("Local authentication successful");
        Ok(Served::local(credential))
    }

    /// Stores an image and returns a URL for it.
    ///
    /// With a remote store the image is uploaded under
    /// `images/<unix-millis>_<file_name>`. Otherwise, or if the upload fails,
    /// the image is returned inline as a base64 `data:` URL.
    pub async fn upload_image(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Served<String>, StoreError> {
        if bytes.is_empty() {
            return Err(StoreError::EmptyUpload);
        }

        if let Some(remote) = &self.remote {
            let path = format!(
                "images/{}_{}",
                Utc::now().timestamp_millis(),
                object_file_name(file_name)
            );
            match remote.upload(&path, content_type, bytes.clone()).await {
                Ok(url) => return Ok(Served::remote(url)),
                Err(e) => tracing::warn!("Image upload failed, using inline data URL: {}", e),
            }
        }

        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
        Ok(Served::local(format!(
            "data:{};base64,{}",
            content_type, encoded
        )))
    }
}

impl std::fmt::Debug for DataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataStore")
            .field("remote_configured", &self.remote.is_some())
            .finish()
    }
}
