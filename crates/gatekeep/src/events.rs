// File: src/events.rs
// Purpose: Event metadata registry, the second consumer of the shape checker

use gatekeep_shape::{check_shape, ShapeCheck, ShapeField, ShapeRegistry, TypeMarker};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::borrow::Cow;

use crate::combinators::ParamEnum;
use crate::error_code::ErrorCode;
use crate::result::{invalid, pass};
use crate::validator::{sync_validator, BatchValidator};

/// Recorded event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    OrgCreate,
    OrgUpdate,
    UserCreate,
    UserUpdate,
    UserDelete,
    SessionStart,
    SessionClose,
    VerificationMailSend,
    ProjectCreate,
    ProjectUpdate,
    ProjectDelete,
    TeamCreate,
    TeamUpdate,
    TeamDelete,
    S3RequestCreate,
    S3ObjectCreate,
    S3ObjectDelete,
    S3RequestCallback,
    AuthLogin,
    AuthVerify,
}

impl ParamEnum for EventType {
    const VARIANTS: &'static [(&'static str, &'static str)] = &[
        ("OrgCreate", "OrgCreate"),
        ("OrgUpdate", "OrgUpdate"),
        ("UserCreate", "UserCreate"),
        ("UserUpdate", "UserUpdate"),
        ("UserDelete", "UserDelete"),
        ("SessionStart", "SessionStart"),
        ("SessionClose", "SessionClose"),
        ("VerificationMailSend", "VerificationMailSend"),
        ("ProjectCreate", "ProjectCreate"),
        ("ProjectUpdate", "ProjectUpdate"),
        ("ProjectDelete", "ProjectDelete"),
        ("TeamCreate", "TeamCreate"),
        ("TeamUpdate", "TeamUpdate"),
        ("TeamDelete", "TeamDelete"),
        ("S3RequestCreate", "S3RequestCreate"),
        ("S3ObjectCreate", "S3ObjectCreate"),
        ("S3ObjectDelete", "S3ObjectDelete"),
        ("S3RequestCallback", "S3RequestCallback"),
        ("AuthLogin", "AuthLogin"),
        ("AuthVerify", "AuthVerify"),
    ];
}

/// Type markers metadata fields are declared with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataType {
    String,
    Number,
    Boolean,
    Object,
}

impl TypeMarker for MetadataType {
    fn type_name(&self) -> Cow<'static, str> {
        match self {
            MetadataType::String => "string".into(),
            MetadataType::Number => "number".into(),
            MetadataType::Boolean => "boolean".into(),
            MetadataType::Object => "object".into(),
        }
    }
}

const AUTH_VERIFY: &[ShapeField<MetadataType>] = &[
    ShapeField::scalar("verificationToken", MetadataType::String),
    ShapeField::scalar("tokenId", MetadataType::String),
];

/// Registry mapping each [`EventType`] to its metadata shape
#[derive(Debug, Clone, Copy, Default)]
pub struct EventMetadataShapes;

impl ShapeRegistry for EventMetadataShapes {
    type Key = EventType;
    type Marker = MetadataType;

    fn shape(&self, key: &EventType) -> &[ShapeField<MetadataType>] {
        match key {
            EventType::AuthVerify => AUTH_VERIFY,
            _ => &[],
        }
    }
}

/// Check event metadata against the shape declared for its type
pub fn validate_metadata(event_type: EventType, metadata: &Value) -> ShapeCheck {
    check_shape(&EventMetadataShapes, &event_type, metadata)
}

/// Batch rule over `eventType` and `eventMetadata`.
///
/// An unknown event type or mismatched metadata fails both fields with Unknown.
pub fn event_metadata_validator() -> BatchValidator {
    BatchValidator::new(
        ["eventType", "eventMetadata"],
        sync_validator(|body, _| {
            let metadata = body.get("eventMetadata").cloned().unwrap_or(Value::Null);
            let event_type = body
                .get("eventType")
                .cloned()
                .and_then(|v| serde_json::from_value::<EventType>(v).ok());

            let Some(event_type) = event_type else {
                return invalid(ErrorCode::Unknown, json!({}));
            };

            let check = validate_metadata(event_type, &metadata);
            if check.is_valid() {
                pass()
            } else {
                tracing::debug!(
                    target: "gatekeep::validate",
                    event = ?event_type,
                    missing = ?check.missing_fields(),
                    type_errors = ?check.type_errors(),
                    "event metadata rejected"
                );
                invalid(ErrorCode::Unknown, json!({}))
            }
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestContext;
    use std::sync::Arc;

    #[test]
    fn test_event_without_metadata_shape_accepts_anything() {
        assert!(validate_metadata(EventType::OrgCreate, &json!(null)).is_valid());
        assert!(validate_metadata(EventType::TeamDelete, &json!({"x": 1})).is_valid());
    }

    #[test]
    fn test_auth_verify_requires_token_fields() {
        let check = validate_metadata(EventType::AuthVerify, &json!({"tokenId": "t1"}));
        assert_eq!(check.missing_fields(), ["verificationToken".to_string()]);

        let check = validate_metadata(
            EventType::AuthVerify,
            &json!({"tokenId": "t1", "verificationToken": 42}),
        );
        assert_eq!(check.type_errors()[0].field, "verificationToken");
    }

    #[test]
    fn test_variants_cover_every_event() {
        for (key, value) in EventType::VARIANTS {
            let parsed: EventType = serde_json::from_value(json!(value)).unwrap();
            assert_eq!(format!("{parsed:?}"), *key);
        }
    }

    #[tokio::test]
    async fn test_batch_rejects_unknown_event_type() {
        let batch = event_metadata_validator();
        let ctx = Arc::new(RequestContext::default());

        let verdict = (batch.validator)(json!({"eventType": "Nope"}), ctx.clone()).await;
        assert_eq!(verdict, invalid(ErrorCode::Unknown, json!({})));

        let verdict = (batch.validator)(json!({"eventType": "AuthLogin"}), ctx).await;
        assert!(verdict.is_pass());
    }
}
