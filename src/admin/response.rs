use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;

/// Envelope returned for every admin action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip, default = "AdminResponse::ok_status")]
    status: u16,
}

impl AdminResponse {
    pub fn ok(message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            status: Self::ok_status(),
        }
    }

    pub fn failure(err: &AppError) -> Self {
        Self {
            success: false,
            message: err.to_string(),
            data: None,
            status: err.status_code(),
        }
    }

    /// HTTP-style status code for this response.
    pub fn status(&self) -> u16 {
        self.status
    }

    fn ok_status() -> u16 {
        200
    }
}

impl From<AppError> for AdminResponse {
    fn from(err: AppError) -> Self {
        AdminResponse::failure(&err)
    }
}
