use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

// ── Error codes ─────────────────────────────────────────────────────
//
// Stable, machine-readable identifiers. Clients match on these (and on
// `reason` for user errors), never on the human-readable message.

pub mod error_code {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const INTERNAL: &str = "INTERNAL";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
}

// ── ServiceError ────────────────────────────────────────────────────

/// Unified service error type used across all modules.
///
/// User-correctable rejections (`Validation`, `Conflict`) may carry a
/// `reason`: the module's message key, e.g. `code_unique`. The JSON body
/// always has `code` and `message`, plus `reason` when set:
///
/// ```json
/// {"code": "ALREADY_EXISTS", "reason": "code_unique", "message": "Duplicate code: ..."}
/// ```
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Resource does not exist. HTTP 404.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate value / resource already exists. HTTP 409.
    #[error("{message}")]
    Conflict {
        reason: Option<&'static str>,
        message: String,
    },

    /// Input data is invalid. HTTP 400.
    #[error("{message}")]
    Validation {
        reason: Option<&'static str>,
        message: String,
    },

    /// Storage backend failure. HTTP 500.
    #[error("{0}")]
    Storage(String),

    /// Unexpected internal error. HTTP 500.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation {
            reason: None,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ServiceError::Conflict {
            reason: None,
            message: message.into(),
        }
    }

    /// Message key of a user-correctable rejection, if any.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            ServiceError::Conflict { reason, .. } | ServiceError::Validation { reason, .. } => *reason,
            _ => None,
        }
    }

    /// Stable, machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => error_code::NOT_FOUND,
            ServiceError::Conflict { .. } => error_code::ALREADY_EXISTS,
            ServiceError::Validation { .. } => error_code::VALIDATION_FAILED,
            ServiceError::Storage(_) => error_code::STORAGE_ERROR,
            ServiceError::Internal(_) => error_code::INTERNAL,
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict { .. } => StatusCode::CONFLICT,
            ServiceError::Validation { .. } => StatusCode::BAD_REQUEST,
            ServiceError::Storage(_) | ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> serde_json::Value {
        let mut body = serde_json::json!({
            "code": self.error_code(),
            "message": self.to_string(),
        });
        if let Some(reason) = self.reason() {
            body["reason"] = serde_json::json!(reason);
        }
        body
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        (self.status_code(), axum::Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_mapping() {
        assert_eq!(ServiceError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ServiceError::conflict("x").status_code(), StatusCode::CONFLICT);
        assert_eq!(ServiceError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::Storage("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ServiceError::Internal("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_code_mapping() {
        assert_eq!(ServiceError::NotFound("x".into()).error_code(), "NOT_FOUND");
        assert_eq!(ServiceError::conflict("x").error_code(), "ALREADY_EXISTS");
        assert_eq!(ServiceError::validation("x").error_code(), "VALIDATION_FAILED");
        assert_eq!(ServiceError::Storage("x".into()).error_code(), "STORAGE_ERROR");
        assert_eq!(ServiceError::Internal("x".into()).error_code(), "INTERNAL");
    }

    #[test]
    fn body_carries_reason_for_user_errors() {
        let err = ServiceError::Conflict {
            reason: Some("code_unique"),
            message: "Duplicate code".into(),
        };
        let body = err.body();
        assert_eq!(body["code"], "ALREADY_EXISTS");
        assert_eq!(body["reason"], "code_unique");
        assert_eq!(body["message"], "Duplicate code");

        let body = ServiceError::NotFound("products/abc".into()).body();
        assert!(body.get("reason").is_none());
    }

    #[test]
    fn json_response_status() {
        let resp = ServiceError::validation("bad input").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn error_display_is_just_message() {
        assert_eq!(ServiceError::NotFound("product 123".into()).to_string(), "product 123");
        assert_eq!(ServiceError::conflict("dup key").to_string(), "dup key");
        assert_eq!(ServiceError::validation("bad input").to_string(), "bad input");
    }
}
