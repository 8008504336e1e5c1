use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;

use crate::services::coordinator::TransferError;
use crate::services::range::RangeError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `INVALID_FORMAT`,
    /// `TOO_LARGE`, `NOT_FOUND`, `RANGE_NOT_SATISFIABLE`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Comment content must be 1-1000 characters")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    InvalidFormat(String),
    TooLarge(String),
    NotFound(String),
    /// Requested byte range cannot be served. Carries the object length.
    RangeNotSatisfiable {
        total: u64,
    },
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::InvalidFormat(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "INVALID_FORMAT",
                    message: msg,
                },
            ),
            AppError::TooLarge(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "TOO_LARGE",
                    message: msg,
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::RangeNotSatisfiable { total } => (
                StatusCode::RANGE_NOT_SATISFIABLE,
                ErrorBody {
                    code: "RANGE_NOT_SATISFIABLE",
                    message: format!("Requested range not satisfiable for {total} bytes"),
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let total = if let AppError::RangeNotSatisfiable { total } = &self {
            Some(*total)
        } else {
            None
        };

        let (status, body) = self.status_and_body();

        if let Some(total) = total {
            (
                status,
                [(header::CONTENT_RANGE, format!("bytes */{total}"))],
                Json(body),
            )
                .into_response()
        } else {
            (status, Json(body)).into_response()
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => {
                tracing::warn!(key = %key, "Object missing for existing video record");
                AppError::NotFound("Video file not found".into())
            }
            other => AppError::Internal(format!("Storage error: {other}")),
        }
    }
}

impl From<RangeError> for AppError {
    fn from(err: RangeError) -> Self {
        tracing::debug!(error = %err, "Refusing range request");
        AppError::RangeNotSatisfiable { total: err.total() }
    }
}

impl From<TransferError> for AppError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::InvalidFormat(_) => AppError::InvalidFormat(err.to_string()),
            TransferError::TooLarge { .. } => AppError::TooLarge(err.to_string()),
            TransferError::Validation(msg) => AppError::Validation(msg),
            TransferError::NotFound(_) => AppError::NotFound("Video not found".into()),
            TransferError::StorageWriteFailed(_)
            | TransferError::MetadataCommitFailed { .. }
            | TransferError::Metadata(_) => AppError::Internal(err.to_string()),
        }
    }
}
