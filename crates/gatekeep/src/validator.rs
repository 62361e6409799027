// File: src/validator.rs
// Purpose: The validator function type, its constructors and batch validators

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;

use crate::context::RequestContext;
use crate::error_code::ErrorCode;
use crate::result::{invalid, pass, Verdict};

/// Shared request context handed to every validator of a pass
pub type Ctx = Arc<RequestContext>;

/// A validator: `(value, context) -> Verdict`, asynchronous, cheap to clone.
///
/// Every combinator returns one of these so they nest freely.
pub type Validator = Arc<dyn Fn(Value, Ctx) -> BoxFuture<'static, Verdict> + Send + Sync>;

/// Build a validator from an async closure
pub fn validator<F, Fut>(f: F) -> Validator
where
    F: Fn(Value, Ctx) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Verdict> + Send + 'static,
{
    Arc::new(move |value, ctx| f(value, ctx).boxed())
}

/// Build a validator from a synchronous check
pub fn sync_validator<F>(f: F) -> Validator
where
    F: Fn(&Value, &RequestContext) -> Verdict + Send + Sync + 'static,
{
    let f = Arc::new(f);
    Arc::new(move |value, ctx| {
        let f = f.clone();
        async move { f(&value, &*ctx) }.boxed()
    })
}

/// Build a validator whose body may fail on a collaborator error.
///
/// An `Err` becomes an `Unknown` failure for the field.
pub fn try_validator<F, Fut>(f: F) -> Validator
where
    F: Fn(Value, Ctx) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Verdict>> + Send + 'static,
{
    let f = Arc::new(f);
    Arc::new(move |value, ctx| {
        let f = f.clone();
        async move {
            match f(value, ctx).await {
                Ok(verdict) => verdict,
                Err(err) => {
                    tracing::warn!(target: "gatekeep::validate", error = %err, "validator failed");
                    invalid(ErrorCode::Unknown, json!({}))
                }
            }
        }
        .boxed()
    })
}

/// A cross-field rule.
///
/// The validator receives the whole parameter object of its location. A
/// failure is attributed to every name in `target_fields`.
#[derive(Clone)]
pub struct BatchValidator {
    pub target_fields: Vec<String>,
    pub validator: Validator,
}

impl BatchValidator {
    pub fn new<I, S>(target_fields: I, validator: Validator) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            target_fields: target_fields.into_iter().map(Into::into).collect(),
            validator,
        }
    }
}

impl std::fmt::Debug for BatchValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchValidator")
            .field("target_fields", &self.target_fields)
            .finish_non_exhaustive()
    }
}

/// Skip a batch rule when any of its target fields is null or absent
pub fn nullable_batch(batch: BatchValidator) -> BatchValidator {
    let targets = batch.target_fields.clone();
    let inner = batch.validator;

    let wrapped = validator(move |object: Value, ctx| {
        let any_nullish = targets
            .iter()
            .any(|name| object.get(name).map_or(true, Value::is_null));
        let inner = inner.clone();
        async move {
            if any_nullish {
                pass()
            } else {
                inner(object, ctx).await
            }
        }
    });

    BatchValidator {
        target_fields: batch.target_fields,
        validator: wrapped,
    }
}
