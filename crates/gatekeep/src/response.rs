// File: src/response.rs
// Purpose: Invalid-parameter records and the JSON response envelope

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::context::ParamLocation;
use crate::error_code::ErrorCode;

/// One failing field as reported to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidParam {
    pub param_type: ParamLocation,
    pub param_name: String,
    pub error_code: ErrorCode,
    pub error_args: Value,
}

/// Value of the `responseStatus` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseStatus {
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "ERR_INVALID_PARAMS")]
    InvalidParams,
    #[serde(rename = "ERR_MALFORMED_BODY")]
    MalformedBody,
    #[serde(rename = "ERR_METHOD_NOT_ALLOWED")]
    MethodNotAllowed,
    #[serde(rename = "ERR_NOT_FOUND")]
    NotFound,
    #[serde(rename = "ERR_INTERNAL_ERROR")]
    InternalError,
}

impl ResponseStatus {
    pub fn status_code(self) -> StatusCode {
        match self {
            ResponseStatus::Success => StatusCode::OK,
            ResponseStatus::InvalidParams | ResponseStatus::MalformedBody => {
                StatusCode::BAD_REQUEST
            }
            ResponseStatus::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ResponseStatus::NotFound => StatusCode::NOT_FOUND,
            ResponseStatus::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON envelope `{responseStatus, ...}` used for every API reply
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: ResponseStatus,
    data: Map<String, Value>,
}

impl ApiResponse {
    pub fn new(status: ResponseStatus) -> Self {
        Self {
            status,
            data: Map::new(),
        }
    }

    pub fn success() -> Self {
        Self::new(ResponseStatus::Success)
    }

    /// The aggregated rejection: every failing field, in report order
    pub fn invalid_params(params: Vec<InvalidParam>) -> Self {
        Self::new(ResponseStatus::InvalidParams).set("invalidParams", params)
    }

    pub fn status(&self) -> ResponseStatus {
        self.status
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.data.insert(key.into(), value);
        self
    }

    /// Body as it will be sent
    pub fn body(&self) -> Value {
        let mut body = Map::new();
        body.insert(
            "responseStatus".to_string(),
            serde_json::to_value(self.status).unwrap_or(Value::Null),
        );
        body.extend(self.data.clone());
        Value::Object(body)
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status.status_code(), Json(self.body())).into_response()
    }
}

impl From<anyhow::Error> for ApiResponse {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!(target: "gatekeep::http", error = %err, "request failed");
        ApiResponse::new(ResponseStatus::InternalError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_invalid_params_envelope() {
        let response = ApiResponse::invalid_params(vec![InvalidParam {
            param_type: ParamLocation::Body,
            param_name: "userPassword".to_string(),
            error_code: ErrorCode::MinStringLength,
            error_args: json!({"minLength": 10}),
        }]);

        assert_eq!(response.status().status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.body(),
            json!({
                "responseStatus": "ERR_INVALID_PARAMS",
                "invalidParams": [{
                    "paramType": "BODY",
                    "paramName": "userPassword",
                    "errorCode": "MinStringLength",
                    "errorArgs": {"minLength": 10}
                }]
            })
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ResponseStatus::MethodNotAllowed.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(ResponseStatus::MalformedBody.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiResponse::success().body(), json!({"responseStatus": "SUCCESS"}));
    }
}
