/**
 * Backend Error Types
 *
 * This module defines error types specific to the backend server.
 * These errors are returned by the course engine and the HTTP handlers and
 * can be converted to HTTP responses.
 *
 * # Error Categories
 *
 * ## Caller Errors
 *
 * Surfaced to the client and never retried:
 * - `NotFound` - a referenced user, course, chapter, unit or enrollment is absent
 * - `Forbidden` - the principal does not own the course
 * - `Conflict` - already enrolled, not enrolled, name or email taken
 * - `Unauthorized` - missing or invalid credentials
 * - `SharedError` - validation failures, raised before any write
 *
 * ## Store Errors
 *
 * A store call failed, possibly partway through a multi-step operation.
 * Nothing is rolled back; the operations are ordered so that repeating the
 * same request converges.
 */

use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use crate::backend::store::StoreError;
use crate::shared::SharedError;

/// User-correctable state conflicts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    AlreadyEnrolled,
    NotEnrolled,
    NameTaken,
    EmailRegistered,
}

impl ConflictKind {
    pub fn message(&self) -> &'static str {
        match self {
            ConflictKind::AlreadyEnrolled => "User already enrolled in this course",
            ConflictKind::NotEnrolled => "User is not enrolled in this course",
            ConflictKind::NameTaken => "Name is already taken",
            ConflictKind::EmailRegistered => "Email is already registered",
        }
    }
}

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use coursetree::backend::error::BackendError;
/// use uuid::Uuid;
///
/// let err = BackendError::not_found("Course", Uuid::nil());
/// assert_eq!(err.status_code().as_u16(), 404);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// A referenced entity does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind, e.g. `"Course"`
        entity: &'static str,
        id: Uuid,
    },

    /// The principal may not perform this operation
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// The request conflicts with the current state
    #[error("Conflict: {}", .0.message())]
    Conflict(ConflictKind),

    /// Missing or invalid credentials
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Handler error (e.g., malformed input, hashing failure)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Shared error (validation or serialization)
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Entity store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl BackendError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `NotFound` - 404
    /// - `Forbidden` - 403
    /// - `Conflict` - 409
    /// - `Unauthorized` - 401
    /// - `HandlerError` - Uses the status code from the error
    /// - `SharedError` - 400 for validation, 500 for serialization
    /// - `Store`, `SerializationError` - 500
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::HandlerError { status, .. } => *status,
            Self::SharedError(err) => match err {
                SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            },
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error message sent to clients
    ///
    /// Store and serialization details stay in the logs.
    pub fn message(&self) -> String {
        match self {
            Self::NotFound { entity, .. } => format!("{} not found", entity),
            Self::Forbidden { message } => message.clone(),
            Self::Conflict(kind) => kind.message().to_string(),
            Self::Unauthorized { message } => message.clone(),
            Self::HandlerError { message, .. } => message.clone(),
            Self::SharedError(err) => err.to_string(),
            Self::Store(_) => "Internal server error".to_string(),
            Self::SerializationError(_) => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::store::StoreOp;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(BackendError::not_found("Course", Uuid::nil()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(BackendError::forbidden("no").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            BackendError::Conflict(ConflictKind::AlreadyEnrolled).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(BackendError::unauthorized("no").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            BackendError::handler(StatusCode::BAD_REQUEST, "bad").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_from_shared_error() {
        let backend_error: BackendError = SharedError::validation("title", "Title is required").into();
        assert_eq!(backend_error.status_code(), StatusCode::BAD_REQUEST);
        assert!(backend_error.message().contains("title"));
    }

    #[test]
    fn test_store_error_hides_details() {
        let backend_error: BackendError = StoreError::Injected(StoreOp::InsertCourse).into();
        assert_eq!(backend_error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(backend_error.message(), "Internal server error");
    }

    #[test]
    fn test_not_found_message() {
        let error = BackendError::not_found("Unit", Uuid::new_v4());
        assert_eq!(error.message(), "Unit not found");
    }
}
