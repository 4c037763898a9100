//! Firebase client: Firestore REST for documents, Firebase Storage REST for images.

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::value::{decode_document, encode_fields, encode_value};
use super::{RemoteError, RemoteStore};
use crate::models::{Collection, Document};

const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";
const DEFAULT_STORAGE_URL: &str = "https://firebasestorage.googleapis.com/v0";

/// Firebase connection settings.
///
/// The remote store is only used when all four of `api_key`, `auth_domain`,
/// `project_id` and `storage_bucket` are set.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FirebaseConfig {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub auth_domain: Option<String>,
    pub project_id: Option<String>,
    pub storage_bucket: Option<String>,
    /// Override for the Firestore REST base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firestore_url: Option<String>,
    /// Override for the Storage REST base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_url: Option<String>,
}

impl FirebaseConfig {
    /// Returns true if all four required settings are present and non-empty.
    pub fn is_configured(&self) -> bool {
        [
            &self.api_key,
            &self.auth_domain,
            &self.project_id,
            &self.storage_bucket,
        ]
        .iter()
        .all(|v| v.as_deref().is_some_and(|s| !s.is_empty()))
    }
}

impl std::fmt::Debug for FirebaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("auth_domain", &self.auth_domain)
            .field("project_id", &self.project_id)
            .field("storage_bucket", &self.storage_bucket)
            .finish()
    }
}

/// REST client for a Firebase project.
#[derive(Clone)]
pub struct FirebaseClient {
    http: reqwest::Client,
    api_key: String,
    project_id: String,
    bucket: String,
    firestore_url: String,
    storage_url: String,
}

impl FirebaseClient {
    /// Builds a client, or `None` if the config is incomplete.
    pub fn from_config(config: &FirebaseConfig) -> Option<Self> {
        if !config.is_configured() {
            return None;
        }
        Some(Self {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone()?,
            project_id: config.project_id.clone()?,
            bucket: config.storage_bucket.clone()?,
            firestore_url: config
                .firestore_url
                .clone()
                .unwrap_or_else(|| DEFAULT_FIRESTORE_URL.to_string()),
            storage_url: config
                .storage_url
                .clone()
                .unwrap_or_else(|| DEFAULT_STORAGE_URL.to_string()),
        })
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents",
            self.firestore_url.trim_end_matches('/'),
            self.project_id
        )
    }

    fn document_url(&self, collection: Collection, id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.documents_url(),
            collection.name(),
            urlencoding::encode(id)
        )
    }

    fn bucket_url(&self) -> String {
        format!(
            "{}/b/{}/o",
            self.storage_url.trim_end_matches('/'),
            self.bucket
        )
    }

    /// Sends a request and decodes the JSON body, mapping non-2xx to `ApiError`.
    async fn send_json(&self, request: RequestBuilder) -> Result<Value, RemoteError> {
        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::HttpError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| RemoteError::DecodeError(e.to_string()))
    }

    /// Runs a structured query and decodes the matching documents.
    async fn run_query(&self, structured_query: Value) -> Result<Vec<Document>, RemoteError> {
        let url = format!("{}:runQuery", self.documents_url());
        let response = self
            .send_json(
                self.http
                    .post(&url)
                    .query(&[("key", &self.api_key)])
                    .json(&json!({ "structuredQuery": structured_query })),
            )
            .await?;

        let rows = response.as_array().ok_or_else(|| {
            RemoteError::DecodeError("runQuery response is not an array".to_string())
        })?;

        // Rows without a document only carry read metadata
        rows.iter()
            .filter_map(|row| row.get("document"))
            .map(decode_document)
            .collect()
    }
}

impl std::fmt::Debug for FirebaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseClient")
            .field("project_id", &self.project_id)
            .field("bucket", &self.bucket)
            .field("firestore_url", &self.firestore_url)
            .finish()
    }
}

/// Field paths that are not plain identifiers must be backquoted.
fn field_path(name: &str) -> String {
    let simple = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        name.to_string()
    } else {
        format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

#[async_trait]
impl RemoteStore for FirebaseClient {
    async fn list(&self, collection: Collection) -> Result<Vec<Document>, RemoteError> {
        self.run_query(json!({
            "from": [{ "collectionId": collection.name() }],
            "orderBy": [{
                "field": { "fieldPath": "created_at" },
                "direction": "DESCENDING"
            }]
        }))
        .await
    }

    async fn create(&self, collection: Collection, fields: &Document) -> Result<String, RemoteError> {
        let url = format!("{}/{}", self.documents_url(), collection.name());
        let document = self
            .send_json(
                self.http
                    .post(&url)
                    .query(&[("key", &self.api_key)])
                    .json(&json!({ "fields": encode_fields(fields) })),
            )
            .await?;

        let record = decode_document(&document)?;
        match record.get("id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => Ok(id.to_string()),
            _ => Err(RemoteError::DecodeError(
                "created document has no id".to_string(),
            )),
        }
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: &Document,
    ) -> Result<(), RemoteError> {
        let mut query: Vec<(&str, String)> = vec![
            ("key", self.api_key.clone()),
            ("currentDocument.exists", "true".to_string()),
        ];
        query.extend(
            patch
                .keys()
                .map(|field| ("updateMask.fieldPaths", field_path(field))),
        );

        self.send_json(
            self.http
                .patch(self.document_url(collection, id))
                .query(&query)
                .json(&json!({ "fields": encode_fields(patch) })),
        )
        .await?;
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), RemoteError> {
        self.send_json(
            self.http
                .delete(self.document_url(collection, id))
                .query(&[("key", &self.api_key)]),
        )
        .await?;
        Ok(())
    }

    async fn find(
        &self,
        collection: Collection,
        filters: &[(&str, Value)],
    ) -> Result<Option<Document>, RemoteError> {
        let field_filters: Vec<Value> = filters
            .iter()
            .map(|(field, value)| {
                json!({
                    "fieldFilter": {
                        "field": { "fieldPath": field_path(field) },
                        "op": "EQUAL",
                        "value": encode_value(value)
                    }
                })
            })
            .collect();

        let documents = self
            .run_query(json!({
                "from": [{ "collectionId": collection.name() }],
                "where": {
                    "compositeFilter": { "op": "AND", "filters": field_filters }
                },
                "limit": 1
            }))
            .await?;

        Ok(documents.into_iter().next())
    }

    async fn upload(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, RemoteError> {
        let object = self
            .send_json(
                self.http
                    .post(self.bucket_url())
                    .query(&[("name", path), ("uploadType", "media")])
                    .header(reqwest::header::CONTENT_TYPE, content_type)
                    .body(bytes),
            )
            .await?;

        let name = object
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(path);
        let mut url = format!(
            "{}/{}?alt=media",
            self.bucket_url(),
            urlencoding::encode(name)
        );
        // Multiple tokens are comma separated; any of them grants access
        if let Some(token) = object
            .get("downloadTokens")
            .and_then(Value::as_str)
            .and_then(|t| t.split(',').next())
            .filter(|t| !t.is_empty())
        {
            url.push_str("&token=");
            url.push_str(token);
        }

        tracing::info!("Uploaded {} to bucket {}", name, self.bucket);
        Ok(url)
    }
}
