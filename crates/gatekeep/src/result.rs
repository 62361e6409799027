// File: src/result.rs
// Purpose: Validation outcomes returned by every validator

use serde_json::{Map, Value};

use crate::error_code::ErrorCode;

/// Outcome of one check
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Pass,
    /// `error_args` of `Value::Null` means the validator supplied no arguments
    Fail {
        error_code: ErrorCode,
        error_args: Value,
    },
}

impl ValidationResult {
    pub fn is_pass(&self) -> bool {
        matches!(self, ValidationResult::Pass)
    }

    pub fn is_fail(&self) -> bool {
        !self.is_pass()
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            ValidationResult::Pass => None,
            ValidationResult::Fail { error_code, .. } => Some(*error_code),
        }
    }
}

/// What a validator hands back: one result, or several when a combinator
/// needs to report sub-failures (e.g. per array element)
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Single(ValidationResult),
    Many(Vec<ValidationResult>),
}

impl Verdict {
    pub fn into_results(self) -> Vec<ValidationResult> {
        match self {
            Verdict::Single(result) => vec![result],
            Verdict::Many(results) => results,
        }
    }

    /// Failing results only, in order
    pub fn failures(self) -> Vec<ValidationResult> {
        self.into_results()
            .into_iter()
            .filter(ValidationResult::is_fail)
            .collect()
    }

    pub fn is_pass(&self) -> bool {
        match self {
            Verdict::Single(result) => result.is_pass(),
            Verdict::Many(results) => results.iter().all(ValidationResult::is_pass),
        }
    }
}

impl From<ValidationResult> for Verdict {
    fn from(result: ValidationResult) -> Self {
        Verdict::Single(result)
    }
}

impl From<Vec<ValidationResult>> for Verdict {
    fn from(results: Vec<ValidationResult>) -> Self {
        Verdict::Many(results)
    }
}

pub fn pass() -> Verdict {
    Verdict::Single(ValidationResult::Pass)
}

/// Failure with arguments matching the shape declared for `code`
pub fn invalid(code: ErrorCode, args: Value) -> Verdict {
    Verdict::Single(ValidationResult::Fail {
        error_code: code,
        error_args: args,
    })
}

/// Failure for a code whose argument shape is empty
pub fn invalid_bare(code: ErrorCode) -> Verdict {
    invalid(code, Value::Object(Map::new()))
}

/// True when every result in the verdict passed
pub fn is_validation_success(verdict: &Verdict) -> bool {
    verdict.is_pass()
}
