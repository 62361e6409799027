// Gatekeep - declarative request-parameter validation for axum
// Composable validators, structured error codes, aggregated rejection reports

pub mod combinators;
pub mod config;
pub mod context;
pub mod error;
pub mod error_code;
pub mod events;
pub mod middleware;
pub mod orchestrator;
pub mod response;
pub mod result;
pub mod telemetry;
pub mod validator;

// Re-export the declaration surface
pub use combinators::*;
pub use config::{GatekeepConfig, LoggingConfig, ServerConfig, ValidationConfig};
pub use context::{ParamLocation, RequestContext, Session};
pub use error::GatekeepError;
pub use error_code::{check_error_args, ArgType, ErrorArgShapes, ErrorCode};
pub use events::{
    event_metadata_validator, validate_metadata, EventMetadataShapes, EventType, MetadataType,
};
pub use middleware::{
    parse_form, request_context, require_methods, validate, RequireMethodsLayer, ValidationLayer,
};
pub use orchestrator::{
    ParamValidator, ShapeViolation, TracingSink, ValidateParams, ViolationKind, ViolationSink,
};
pub use response::{ApiResponse, InvalidParam, ResponseStatus};
pub use result::{invalid, invalid_bare, is_validation_success, pass, ValidationResult, Verdict};
pub use telemetry::init_tracing;
pub use validator::{
    nullable_batch, sync_validator, try_validator, validator, BatchValidator, Ctx, Validator,
};

// Re-export the shape checker for other registries
pub use gatekeep_shape;
