use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ApiError, AppState};
use crate::models::{Booking, Collection, Document, Record, Stored, Testimonial};
use crate::store::{AuthError, Backend};

fn admin_forbidden() -> ApiError {
    ApiError::forbidden("Admin credentials are not available through this route")
}

/// Resolves a collection name for the public collection routes.
fn public_collection(name: &str) -> Result<Collection, ApiError> {
    match Collection::parse(name) {
        Some(Collection::AdminCredentials) => Err(admin_forbidden()),
        Some(collection) => Ok(collection),
        None => Err(ApiError::not_found(format!("Unknown collection: {}", name))),
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    remote_configured: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        remote_configured: state.store.is_remote_configured(),
    })
}

#[derive(Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Serialize)]
pub struct AdminSummary {
    id: String,
    username: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    backend: Backend,
    admin: AdminSummary,
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let served = state
        .store
        .authenticate(&request.username, &request.password)
        .await
        .map_err(|e: AuthError| {
            ApiError::new(StatusCode::UNAUTHORIZED, "invalid_credentials", e.to_string())
        })?;

    Ok(Json(LoginResponse {
        backend: served.backend,
        admin: AdminSummary {
            id: served.value.id,
            username: served.value.data.username,
        },
    }))
}

#[derive(Serialize)]
pub struct ListResponse {
    backend: Backend,
    records: Vec<Record>,
}

pub async fn list_records(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ListResponse>, ApiError> {
    let served = match Collection::parse(&name) {
        Some(Collection::AdminCredentials) => return Err(admin_forbidden()),
        Some(collection) => state.store.fetch_collection(collection).await?,
        // Unknown names list as empty
        None => state.store.fetch_by_name(&name).await?,
    };
    Ok(Json(ListResponse {
        backend: served.backend,
        records: served.value,
    }))
}

#[derive(Serialize)]
pub struct RecordResponse<T> {
    backend: Backend,
    record: T,
}

pub async fn create_record(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<RecordResponse<Record>>), ApiError> {
    let collection = public_collection(&name)?;
    let served = state.store.insert_value(collection, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(RecordResponse {
            backend: served.backend,
            record: served.value,
        }),
    ))
}

#[derive(Serialize)]
pub struct WriteResponse {
    backend: Backend,
}

pub async fn update_record(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
    Json(patch): Json<Document>,
) -> Result<Json<WriteResponse>, ApiError> {
    let collection = public_collection(&name)?;
    let served = state.store.update(collection, &id, patch).await?;
    Ok(Json(WriteResponse {
        backend: served.backend,
    }))
}

pub async fn delete_record(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
) -> Result<Json<WriteResponse>, ApiError> {
    let collection = public_collection(&name)?;
    let served = state.store.delete(collection, &id).await?;
    Ok(Json(WriteResponse {
        backend: served.backend,
    }))
}

pub async fn submit_booking(
    State(state): State<AppState>,
    Json(booking): Json<Booking>,
) -> Result<(StatusCode, Json<RecordResponse<Stored<Booking>>>), ApiError> {
    // Notification continues in the background
    let submission = state.submissions.submit_booking(booking).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(RecordResponse {
            backend: submission.record.backend,
            record: submission.record.value,
        }),
    ))
}

pub async fn submit_review(
    State(state): State<AppState>,
    Json(review): Json<Testimonial>,
) -> Result<(StatusCode, Json<RecordResponse<Stored<Testimonial>>>), ApiError> {
    let submission = state.submissions.submit_testimonial(review).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(RecordResponse {
            backend: submission.record.backend,
            record: submission.record.value,
        }),
    ))
}

#[derive(Deserialize)]
pub struct UploadQuery {
    name: Option<String>,
}

#[derive(Serialize)]
pub struct UploadResponse {
    backend: Backend,
    url: String,
}

pub async fn upload_image(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResponse>, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");
    let file_name = query.name.as_deref().unwrap_or("image");

    let served = state
        .store
        .upload_image(file_name, content_type, body.to_vec())
        .await?;
    Ok(Json(UploadResponse {
        backend: served.backend,
        url: served.value,
    }))
}
