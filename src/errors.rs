use crate::services::storage_service::StorageError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// Failure taxonomy of the asset admin core.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("invalid request: `{field}` {reason}")]
    InvalidRequest { field: &'static str, reason: String },
    #[error("object store unavailable during {operation}")]
    StorageUnavailable {
        operation: &'static str,
        #[source]
        source: StorageError,
    },
    #[error("missing or invalid admin credentials")]
    Unauthorized,
    #[error("unknown admin action `{0}`")]
    NotFound(String),
}

impl AdminError {
    pub fn missing(field: &'static str) -> Self {
        Self::invalid(field, "is required")
    }

    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            field,
            reason: reason.into(),
        }
    }

    /// Wrap a store failure. A key the store refuses is the caller's fault, not an outage.
    pub fn storage(operation: &'static str) -> impl FnOnce(StorageError) -> Self {
        move |source| match source {
            StorageError::InvalidObjectKey => Self::invalid("key", "is not a valid object key"),
            source => Self::StorageUnavailable { operation, source },
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AdminError::InvalidRequest { .. } => "InvalidRequest",
            AdminError::StorageUnavailable { .. } => "StorageUnavailable",
            AdminError::Unauthorized => "Unauthorized",
            AdminError::NotFound(_) => "NotFound",
        }
    }
}

/// HTTP-facing error: a status, a stable kind and a message safe to show callers.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status, kind and message.
    pub fn new(status: StatusCode, kind: &'static str, msg: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: msg.into(),
        }
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NotFound", msg)
    }

    /// Shortcut for 503 with a fixed message; callers log the cause first.
    pub fn unavailable() -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "StorageUnavailable",
            "object store unavailable, try again later",
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "kind": self.kind,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<AdminError> for AppError {
    fn from(err: AdminError) -> Self {
        match &err {
            AdminError::StorageUnavailable { source, .. } => {
                tracing::error!(error = %err, cause = ?source, "admin operation failed");
                AppError::unavailable()
            }
            AdminError::InvalidRequest { .. } => {
                tracing::info!(error = %err, "rejected admin request");
                AppError::new(StatusCode::BAD_REQUEST, err.kind(), err.to_string())
            }
            AdminError::Unauthorized => {
                tracing::warn!("rejected admin request without a valid session");
                AppError::new(StatusCode::UNAUTHORIZED, err.kind(), err.to_string())
            }
            AdminError::NotFound(_) => {
                AppError::new(StatusCode::NOT_FOUND, err.kind(), err.to_string())
            }
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ObjectNotFound { .. } => AppError::not_found("asset not found"),
            StorageError::InvalidObjectKey => {
                AppError::new(StatusCode::BAD_REQUEST, "InvalidRequest", "invalid asset key")
            }
            other => {
                tracing::error!(error = ?other, "object store call failed");
                AppError::unavailable()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn storage_failures_hide_internal_detail() {
        let err = AdminError::StorageUnavailable {
            operation: "list",
            source: StorageError::Io(io::Error::new(
                io::ErrorKind::Other,
                "disk /var/lib/objects/ab/cd failed",
            )),
        };
        let app: AppError = err.into();
        assert_eq!(app.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(app.kind, "StorageUnavailable");
        assert!(!app.message.contains("/var/lib"));
    }

    #[test]
    fn invalid_request_names_the_field() {
        let app: AppError = AdminError::missing("folder").into();
        assert_eq!(app.status, StatusCode::BAD_REQUEST);
        assert_eq!(app.kind, "InvalidRequest");
        assert!(app.message.contains("`folder`"));
    }

    #[test]
    fn missing_object_maps_to_not_found() {
        let app: AppError = StorageError::ObjectNotFound {
            bucket: "site-assets".into(),
            key: "configs/x".into(),
        }
        .into();
        assert_eq!(app.status, StatusCode::NOT_FOUND);
        assert!(!app.message.contains("site-assets"));
    }

    #[test]
    fn refused_key_is_a_client_error() {
        let err = AdminError::storage("upload")(StorageError::InvalidObjectKey);
        assert!(matches!(err, AdminError::InvalidRequest { field: "key", .. }));
        let app: AppError = err.into();
        assert_eq!(app.status, StatusCode::BAD_REQUEST);

        let timeout = StorageError::Timeout(std::time::Duration::from_secs(1));
        let err = AdminError::storage("upload")(timeout);
        assert!(matches!(err, AdminError::StorageUnavailable { operation: "upload", .. }));
    }
}
