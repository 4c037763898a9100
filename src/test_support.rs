//! Shared helpers for unit tests: an in-process fake HTTP server and an
//! in-memory remote store.

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::{Json, Router};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::models::{timestamp, Collection, Document};
use crate::remote::{RemoteError, RemoteStore};

/// A request captured by [`FakeServer`].
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: Method,
    pub path: String,
    pub query: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

type Responder = dyn Fn(&CapturedRequest) -> (StatusCode, Value) + Send + Sync;

#[derive(Clone)]
struct FakeState {
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    responder: Arc<Responder>,
}

/// An HTTP server on 127.0.0.1 that records every request and answers
/// with a canned JSON response.
pub struct FakeServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl FakeServer {
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn capture(
    State(state): State<FakeState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let request = CapturedRequest {
        method,
        path: urlencoding::decode(uri.path()).unwrap().into_owned(),
        query: uri.query().unwrap_or_default().to_string(),
        headers,
        body: body.to_vec(),
    };
    let (status, value) = (state.responder)(&request);
    state.requests.lock().unwrap().push(request);
    (status, Json(value))
}

pub async fn spawn_fake<F>(responder: F) -> FakeServer
where
    F: Fn(&CapturedRequest) -> (StatusCode, Value) + Send + Sync + 'static,
{
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = FakeState {
        requests: requests.clone(),
        responder: Arc::new(responder),
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().fallback(capture).with_state(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeServer {
        base_url: format!("http://{}", addr),
        requests,
    }
}

/// A base URL nothing is listening on.
pub async fn closed_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// In-memory [`RemoteStore`] that can be switched into a failing mode.
#[derive(Default)]
pub struct MemoryRemote {
    collections: Mutex<HashMap<Collection, Vec<Document>>>,
    failing: AtomicBool,
    next_id: AtomicUsize,
    pub uploads: Mutex<Vec<String>>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let remote = Self::default();
        remote.set_failing(true);
        remote
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn documents(&self, collection: Collection) -> Vec<Document> {
        self.collections
            .lock()
            .unwrap()
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn put(&self, collection: Collection, doc: Document) {
        self.collections
            .lock()
            .unwrap()
            .entry(collection)
            .or_default()
            .push(doc);
    }

    fn check(&self) -> Result<(), RemoteError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(RemoteError::HttpError("remote unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

fn doc_id(doc: &Document) -> Option<&str> {
    doc.get("id").and_then(Value::as_str)
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn list(&self, collection: Collection) -> Result<Vec<Document>, RemoteError> {
        self.check()?;
        let mut docs = self.documents(collection);
        docs.sort_by_key(|d| {
            std::cmp::Reverse(
                d.get("created_at")
                    .and_then(Value::as_str)
                    .and_then(timestamp::parse),
            )
        });
        Ok(docs)
    }

    async fn create(&self, collection: Collection, fields: &Document) -> Result<String, RemoteError> {
        self.check()?;
        let id = format!("remote-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let mut doc = fields.clone();
        doc.insert("id".to_string(), Value::String(id.clone()));
        self.put(collection, doc);
        Ok(id)
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: &Document,
    ) -> Result<(), RemoteError> {
        self.check()?;
        let mut collections = self.collections.lock().unwrap();
        let doc = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| doc_id(d) == Some(id)))
            .ok_or_else(|| RemoteError::ApiError {
                status: 404,
                body: format!("No document to update: {}", id),
            })?;
        for (k, v) in patch {
            doc.insert(k.clone(), v.clone());
        }
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), RemoteError> {
        self.check()?;
        if let Some(docs) = self.collections.lock().unwrap().get_mut(&collection) {
            docs.retain(|d| doc_id(d) != Some(id));
        }
        Ok(())
    }

    async fn find(
        &self,
        collection: Collection,
        filters: &[(&str, Value)],
    ) -> Result<Option<Document>, RemoteError> {
        self.check()?;
        Ok(self
            .documents(collection)
            .into_iter()
            .find(|d| filters.iter().all(|(k, v)| d.get(*k) == Some(v))))
    }

    async fn upload(
        &self,
        path: &str,
        _content_type: &str,
        _bytes: Vec<u8>,
    ) -> Result<String, RemoteError> {
        self.check()?;
        self.uploads.lock().unwrap().push(path.to_string());
        Ok(format!("https://storage.test/{}", path))
    }
}
