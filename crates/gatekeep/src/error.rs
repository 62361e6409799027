// File: src/error.rs
// Purpose: Errors raised while adapting a request for validation

use thiserror::Error;

use crate::response::{ApiResponse, ResponseStatus};

#[derive(Debug, Error)]
pub enum GatekeepError {
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("request body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("failed to read request body: {0}")]
    BodyRead(String),
}

impl From<GatekeepError> for ApiResponse {
    fn from(err: GatekeepError) -> Self {
        tracing::debug!(target: "gatekeep::http", error = %err, "rejecting request body");
        ApiResponse::new(ResponseStatus::MalformedBody)
    }
}
