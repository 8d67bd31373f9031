//! Request-path error type

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::serializers::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    /// Failure reported by the Dropbox API
    #[error("{message}")]
    Dropbox {
        message: String,
        code: String,
        description: Option<String>,
    },

    /// A third-party service answered with an error
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn dropbox(message: impl Into<String>, code: impl Into<String>) -> Self {
        AppError::Dropbox {
            message: message.into(),
            code: code.into(),
            description: None,
        }
    }

    pub fn dropbox_with(
        message: impl Into<String>,
        code: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        AppError::Dropbox {
            message: message.into(),
            code: code.into(),
            description: Some(description.into()),
        }
    }

    /// Provider error code, if this is a Dropbox error
    pub fn dropbox_code(&self) -> Option<&str> {
        match self {
            AppError::Dropbox { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Dropbox { code, .. } => match code.as_str() {
                "invalid_access_token" | "expired_access_token" => StatusCode::UNAUTHORIZED,
                "path/not_found" => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_GATEWAY,
            },
            AppError::Upstream(_) | AppError::Network(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Dropbox {
                code, description, ..
            } => ApiResponse::error_with(
                self.to_string(),
                serde_json::json!({ "code": code, "description": description }),
            ),
            _ => ApiResponse::error_with(self.to_string(), serde_json::Value::Null),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Internal(format!("Serialization error: {}", e))
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::MessageBody;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::dropbox("expired", "invalid_access_token").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::dropbox("missing", "path/not_found").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::dropbox("nope", "unknown_error").status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_error_response_envelope() {
        let err = AppError::dropbox_with("Failed to refresh token", "invalid_grant", "bad token");
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let bytes = resp.into_body().try_into_bytes().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Failed to refresh token");
        assert_eq!(json["data"]["code"], "invalid_grant");
        assert_eq!(json["data"]["description"], "bad token");
    }
}
