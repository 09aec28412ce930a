//! Data models
//!
//! Diagram state, schema snapshot input and history records, plus the
//! generic response envelope used by the API.

pub mod diagram;
pub mod history;
pub mod snapshot;

// Re-export commonly used types
pub use diagram::*;
pub use history::*;
pub use snapshot::*;

use serde::Serialize;

/// Generic success response
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}
