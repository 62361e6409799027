// File: src/error_code.rs
// Purpose: Closed error-code taxonomy and the argument shape registered for each code

use gatekeep_shape::{check_shape, ShapeCheck, ShapeField, ShapeRegistry, TypeMarker};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;

/// Machine-readable error codes surfaced to API clients.
///
/// Serialized by variant name (`"MinStringLength"`). Every code has exactly
/// one argument shape, see [`ErrorCode::arg_shape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Data type
    InvalidDataType,
    ExtraParameter,
    NullOrUndefined,

    // Value sets
    NotInAllowedSet,
    InDisallowedSet,

    // Strings
    EmptyString,
    ExactStringLength,
    MinStringLength,
    MaxStringLength,
    MinMaxStringLength,

    // Formats
    InvalidEmail,
    InvalidUrl,
    InvalidDate,
    InvalidPhone,
    InvalidRegex,

    // Numbers
    NonZero,
    Positive,
    Negative,
    PositiveOrZero,
    NegativeOrZero,
    Min,
    Max,
    MinMax,

    // Arrays
    EmptyArr,
    MinArrLength,
    MaxArrLength,
    MinMaxArrLength,
    ArrElemInvalid,

    // Application logic
    IdentityInUse,
    IdentityNotFound,
    PasswordMismatch,

    // Entity references
    InvalidSessionId,
    InvalidOrgId,
    InvalidTeamId,
    InvalidUserId,
    InvalidObjectKey,
    ObjectExists,
    ObjectParamsInvalid,
    RequestIdInvalid,
    ProjectIdInvalid,
    WorkflowIdInvalid,
    ProjectAccessMissing,

    // Quotas
    ProjectQuotaExceeded,
    UserQuotaExceeded,
    TeamQuotaExceeded,

    Unknown,
}

/// Type markers error arguments are declared with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    Any,
    String,
    Number,
    Boolean,
    Object,
}

impl TypeMarker for ArgType {
    fn type_name(&self) -> Cow<'static, str> {
        match self {
            ArgType::Any => "any".into(),
            ArgType::String => "string".into(),
            ArgType::Number => "number".into(),
            ArgType::Boolean => "boolean".into(),
            ArgType::Object => "object".into(),
        }
    }

    fn is_any(&self) -> bool {
        matches!(self, ArgType::Any)
    }
}

type ArgShape = &'static [ShapeField<ArgType>];

const NO_ARGS: ArgShape = &[];
const EXPECTED_TYPE: ArgShape = &[ShapeField::scalar("expectedType", ArgType::String)];
const ALLOWED_VALUES: ArgShape = &[ShapeField::array_of("allowedValues", ArgType::Any)];
const DISALLOWED_VALUES: ArgShape = &[ShapeField::array_of("disallowedValues", ArgType::Any)];
const EXPECTED_LENGTH: ArgShape = &[ShapeField::scalar("expectedLength", ArgType::Number)];
const MIN_LENGTH: ArgShape = &[ShapeField::scalar("minLength", ArgType::Number)];
const MAX_LENGTH: ArgShape = &[ShapeField::scalar("maxLength", ArgType::Number)];
const MIN_MAX_LENGTH: ArgShape = &[
    ShapeField::scalar("minLength", ArgType::Number),
    ShapeField::scalar("maxLength", ArgType::Number),
];
const URL_PARTS: ArgShape = &[
    ShapeField::scalar("urlOrigin", ArgType::String),
    ShapeField::scalar("urlProtocol", ArgType::String),
];
const REG_EXP: ArgShape = &[ShapeField::scalar("regExp", ArgType::String)];
const MIN_VALUE: ArgShape = &[ShapeField::scalar("minValue", ArgType::Number)];
const MAX_VALUE: ArgShape = &[ShapeField::scalar("maxValue", ArgType::Number)];
const MIN_MAX_VALUE: ArgShape = &[
    ShapeField::scalar("minValue", ArgType::Number),
    ShapeField::scalar("maxValue", ArgType::Number),
];
const INVALID_INDEXES: ArgShape = &[ShapeField::array_of("invalidIndexes", ArgType::Number)];
const OBJECT_PARAMS: ArgShape = &[
    ShapeField::scalar("maxSize", ArgType::Number),
    ShapeField::array_of("acceptedTypes", ArgType::String),
];

impl ErrorCode {
    /// Every code, in declaration order
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::InvalidDataType,
        ErrorCode::ExtraParameter,
        ErrorCode::NullOrUndefined,
        ErrorCode::NotInAllowedSet,
        ErrorCode::InDisallowedSet,
        ErrorCode::EmptyString,
        ErrorCode::ExactStringLength,
        ErrorCode::MinStringLength,
        ErrorCode::MaxStringLength,
        ErrorCode::MinMaxStringLength,
        ErrorCode::InvalidEmail,
        ErrorCode::InvalidUrl,
        ErrorCode::InvalidDate,
        ErrorCode::InvalidPhone,
        ErrorCode::InvalidRegex,
        ErrorCode::NonZero,
        ErrorCode::Positive,
        ErrorCode::Negative,
        ErrorCode::PositiveOrZero,
        ErrorCode::NegativeOrZero,
        ErrorCode::Min,
        ErrorCode::Max,
        ErrorCode::MinMax,
        ErrorCode::EmptyArr,
        ErrorCode::MinArrLength,
        ErrorCode::MaxArrLength,
        ErrorCode::MinMaxArrLength,
        ErrorCode::ArrElemInvalid,
        ErrorCode::IdentityInUse,
        ErrorCode::IdentityNotFound,
        ErrorCode::PasswordMismatch,
        ErrorCode::InvalidSessionId,
        ErrorCode::InvalidOrgId,
        ErrorCode::InvalidTeamId,
        ErrorCode::InvalidUserId,
        ErrorCode::InvalidObjectKey,
        ErrorCode::ObjectExists,
        ErrorCode::ObjectParamsInvalid,
        ErrorCode::RequestIdInvalid,
        ErrorCode::ProjectIdInvalid,
        ErrorCode::WorkflowIdInvalid,
        ErrorCode::ProjectAccessMissing,
        ErrorCode::ProjectQuotaExceeded,
        ErrorCode::UserQuotaExceeded,
        ErrorCode::TeamQuotaExceeded,
        ErrorCode::Unknown,
    ];

    /// The argument shape clients can rely on for this code
    pub fn arg_shape(self) -> &'static [ShapeField<ArgType>] {
        use ErrorCode::*;

        match self {
            InvalidDataType => EXPECTED_TYPE,
            NotInAllowedSet => ALLOWED_VALUES,
            InDisallowedSet => DISALLOWED_VALUES,
            ExactStringLength => EXPECTED_LENGTH,
            MinStringLength | MinArrLength => MIN_LENGTH,
            MaxStringLength | MaxArrLength => MAX_LENGTH,
            MinMaxStringLength | MinMaxArrLength => MIN_MAX_LENGTH,
            InvalidUrl => URL_PARTS,
            InvalidRegex => REG_EXP,
            Min => MIN_VALUE,
            Max => MAX_VALUE,
            MinMax => MIN_MAX_VALUE,
            ArrElemInvalid => INVALID_INDEXES,
            ObjectParamsInvalid => OBJECT_PARAMS,
            ExtraParameter | NullOrUndefined | EmptyString | InvalidEmail | InvalidDate
            | InvalidPhone | NonZero | Positive | Negative | PositiveOrZero | NegativeOrZero
            | EmptyArr | IdentityInUse | IdentityNotFound | PasswordMismatch
            | InvalidSessionId | InvalidOrgId | InvalidTeamId | InvalidUserId
            | InvalidObjectKey | ObjectExists | RequestIdInvalid | ProjectIdInvalid
            | WorkflowIdInvalid | ProjectAccessMissing | ProjectQuotaExceeded
            | UserQuotaExceeded | TeamQuotaExceeded | Unknown => NO_ARGS,
        }
    }

    /// Variant name, as serialized
    pub fn name(self) -> &'static str {
        use ErrorCode::*;

        match self {
            InvalidDataType => "InvalidDataType",
            ExtraParameter => "ExtraParameter",
            NullOrUndefined => "NullOrUndefined",
            NotInAllowedSet => "NotInAllowedSet",
            InDisallowedSet => "InDisallowedSet",
            EmptyString => "EmptyString",
            ExactStringLength => "ExactStringLength",
            MinStringLength => "MinStringLength",
            MaxStringLength => "MaxStringLength",
            MinMaxStringLength => "MinMaxStringLength",
            InvalidEmail => "InvalidEmail",
            InvalidUrl => "InvalidUrl",
            InvalidDate => "InvalidDate",
            InvalidPhone => "InvalidPhone",
            InvalidRegex => "InvalidRegex",
            NonZero => "NonZero",
            Positive => "Positive",
            Negative => "Negative",
            PositiveOrZero => "PositiveOrZero",
            NegativeOrZero => "NegativeOrZero",
            Min => "Min",
            Max => "Max",
            MinMax => "MinMax",
            EmptyArr => "EmptyArr",
            MinArrLength => "MinArrLength",
            MaxArrLength => "MaxArrLength",
            MinMaxArrLength => "MinMaxArrLength",
            ArrElemInvalid => "ArrElemInvalid",
            IdentityInUse => "IdentityInUse",
            IdentityNotFound => "IdentityNotFound",
            PasswordMismatch => "PasswordMismatch",
            InvalidSessionId => "InvalidSessionId",
            InvalidOrgId => "InvalidOrgId",
            InvalidTeamId => "InvalidTeamId",
            InvalidUserId => "InvalidUserId",
            InvalidObjectKey => "InvalidObjectKey",
            ObjectExists => "ObjectExists",
            ObjectParamsInvalid => "ObjectParamsInvalid",
            RequestIdInvalid => "RequestIdInvalid",
            ProjectIdInvalid => "ProjectIdInvalid",
            WorkflowIdInvalid => "WorkflowIdInvalid",
            ProjectAccessMissing => "ProjectAccessMissing",
            ProjectQuotaExceeded => "ProjectQuotaExceeded",
            UserQuotaExceeded => "UserQuotaExceeded",
            TeamQuotaExceeded => "TeamQuotaExceeded",
            Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Registry mapping each [`ErrorCode`] to its argument shape
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorArgShapes;

impl ShapeRegistry for ErrorArgShapes {
    type Key = ErrorCode;
    type Marker = ArgType;

    fn shape(&self, key: &ErrorCode) -> &[ShapeField<ArgType>] {
        key.arg_shape()
    }
}

/// Check `args` against the shape declared for `code`
pub fn check_error_args(code: ErrorCode, args: &Value) -> ShapeCheck {
    check_shape(&ErrorArgShapes, &code, args)
}
