//! Common DTOs used across the API

use serde::Serialize;

/// Response envelope shared by every endpoint
///
/// Errors use the same `success`/`message` keys, see `AppError`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    /// Always true for this type
    pub success: bool,
    /// Human readable outcome
    pub message: String,
    /// Response payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying data
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Successful response without payload
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}
