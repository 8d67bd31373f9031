//! Response envelope shared by every JSON endpoint

use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};

/// `{ success, message?, data? }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }

    /// 200 response wrapping `data`
    pub fn ok(data: T) -> HttpResponse {
        HttpResponse::Ok().json(Self::success(data))
    }

    pub fn ok_with(message: impl Into<String>, data: T) -> HttpResponse {
        HttpResponse::Ok().json(Self::success_with(message, data))
    }
}

impl ApiResponse<serde_json::Value> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }

    /// Error envelope carrying extra detail in `data`
    pub fn error_with(message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: if data.is_null() { None } else { Some(data) },
        }
    }
}
