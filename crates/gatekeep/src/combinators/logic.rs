// File: src/combinators/logic.rs
// Purpose: Logical composition of validators

use futures::future::join_all;
use serde_json::{json, Value};

use crate::error_code::ErrorCode;
use crate::result::{invalid, pass, ValidationResult, Verdict};
use crate::validator::{sync_validator, validator, Ctx, Validator};

async fn run_all(validators: &[Validator], value: Value, ctx: Ctx) -> Vec<Verdict> {
    join_all(validators.iter().map(|v| v(value.clone(), ctx.clone()))).await
}

/// Every validator must pass. All run concurrently; on failure the verdict
/// carries every sub-failure, not just the first.
pub fn all_of(validators: Vec<Validator>) -> Validator {
    validator(move |value, ctx| {
        let validators = validators.clone();
        async move {
            let failures: Vec<ValidationResult> = run_all(&validators, value, ctx)
                .await
                .into_iter()
                .flat_map(Verdict::failures)
                .collect();

            if failures.is_empty() {
                pass()
            } else {
                Verdict::Many(failures)
            }
        }
    })
}

/// At least one result must pass. All validators run concurrently and their
/// results are flattened, so a `Many` with one passing entry is enough; when
/// nothing passes the verdict carries every failure.
pub fn any_of(validators: Vec<Validator>) -> Validator {
    validator(move |value, ctx| {
        let validators = validators.clone();
        async move {
            let results: Vec<ValidationResult> = run_all(&validators, value, ctx)
                .await
                .into_iter()
                .flat_map(Verdict::into_results)
                .collect();

            if results.iter().any(ValidationResult::is_pass) {
                return pass();
            }

            Verdict::Many(results)
        }
    })
}

pub fn no_validate() -> Validator {
    sync_validator(|_, _| pass())
}

/// Always fails with `code` and `args`
pub fn force_fail(code: ErrorCode, args: Value) -> Validator {
    sync_validator(move |_, _| invalid(code, args.clone()))
}

/// Always fails with Unknown
pub fn reject() -> Validator {
    force_fail(ErrorCode::Unknown, json!({}))
}
