//! HTTP API over the storage facade and submission flow.

mod routes;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::store::{DataStore, StoreError};
use crate::submit::SubmissionService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: DataStore,
    pub submissions: SubmissionService,
}

impl AppState {
    pub fn new(submissions: SubmissionService) -> Self {
        Self {
            store: submissions.store().clone(),
            submissions,
        }
    }
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

/// Error returned by handlers
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, error: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error,
                message: message.into(),
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "forbidden", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match &e {
            StoreError::InvalidRecord { .. } => {
                ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "invalid_record", e.to_string())
            }
            StoreError::EmptyUpload => {
                ApiError::new(StatusCode::BAD_REQUEST, "empty_upload", e.to_string())
            }
            StoreError::LocalError(_) | StoreError::CorruptData { .. } => {
                tracing::error!("Storage failure: {}", e);
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "storage_error",
                    "Storage is unavailable",
                )
            }
        }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/auth/login", post(routes::login))
        .route(
            "/collections/{name}",
            get(routes::list_records).post(routes::create_record),
        )
        .route(
            "/collections/{name}/{id}",
            patch(routes::update_record).delete(routes::delete_record),
        )
        .route("/submit/booking", post(routes::submit_booking))
        .route("/submit/review", post(routes::submit_review))
        .route("/images", post(routes::upload_image))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
