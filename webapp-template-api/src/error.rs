use serde::{Deserialize, Serialize};

use crate::result::ApiStatus;

/// Public API error response format
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ErrorResponse {
    pub status: ApiStatus,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: ApiStatus::Error,
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }
}
