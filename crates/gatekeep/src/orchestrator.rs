//! Validation orchestrator
//!
//! [`ValidateParams`] declares per-field validators for the URL, body and
//! query bags plus batch validators for each. [`ParamValidator`] runs a
//! declaration against a [`RequestContext`]:
//!
//! 1. every field validator and every batch validator starts concurrently
//! 2. each runs behind a guard turning panics (and timeouts, when set) into
//!    an `Unknown` failure
//! 3. every failure's arguments are checked against the shape declared for
//!    its error code; a mismatch is reported to the [`ViolationSink`] and the
//!    failure downgraded to `Unknown` with empty arguments
//! 4. the report lists URL, body and query field failures, then URL, body and
//!    query batch failures, each in declaration order
//!
//! Nothing short-circuits: all validators settle before the report is built.

use futures::future::join_all;
use futures::FutureExt;
use gatekeep_shape::ShapeCheck;
use serde_json::{json, Value};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use crate::context::{ParamLocation, RequestContext};
use crate::error_code::{check_error_args, ErrorCode};
use crate::response::InvalidParam;
use crate::result::{ValidationResult, Verdict};
use crate::validator::{BatchValidator, Ctx, Validator};

/// Declarative validation for one route
#[derive(Clone, Default)]
pub struct ValidateParams {
    url: Vec<(String, Validator)>,
    body: Vec<(String, Validator)>,
    query: Vec<(String, Validator)>,
    batch_url: Vec<BatchValidator>,
    batch_body: Vec<BatchValidator>,
    batch_query: Vec<BatchValidator>,
}

impl ValidateParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validator for one field of `location`
    pub fn field(mut self, location: ParamLocation, name: impl Into<String>, v: Validator) -> Self {
        self.fields_mut(location).push((name.into(), v));
        self
    }

    pub fn url(self, name: impl Into<String>, v: Validator) -> Self {
        self.field(ParamLocation::Url, name, v)
    }

    pub fn body(self, name: impl Into<String>, v: Validator) -> Self {
        self.field(ParamLocation::Body, name, v)
    }

    pub fn query(self, name: impl Into<String>, v: Validator) -> Self {
        self.field(ParamLocation::Query, name, v)
    }

    /// Add a whole field map for `location`, keeping its order
    pub fn fields<I, S>(mut self, location: ParamLocation, map: I) -> Self
    where
        I: IntoIterator<Item = (S, Validator)>,
        S: Into<String>,
    {
        self.fields_mut(location)
            .extend(map.into_iter().map(|(name, v)| (name.into(), v)));
        self
    }

    pub fn batch(mut self, location: ParamLocation, batch: BatchValidator) -> Self {
        self.batches_mut(location).push(batch);
        self
    }

    pub fn batch_url(self, batch: BatchValidator) -> Self {
        self.batch(ParamLocation::Url, batch)
    }

    pub fn batch_body(self, batch: BatchValidator) -> Self {
        self.batch(ParamLocation::Body, batch)
    }

    pub fn batch_query(self, batch: BatchValidator) -> Self {
        self.batch(ParamLocation::Query, batch)
    }

    pub fn is_empty(&self) -> bool {
        ParamLocation::ALL
            .iter()
            .all(|loc| self.fields_of(*loc).is_empty() && self.batches_of(*loc).is_empty())
    }

    fn fields_of(&self, location: ParamLocation) -> &[(String, Validator)] {
        match location {
            ParamLocation::Url => &self.url,
            ParamLocation::Body => &self.body,
            ParamLocation::Query => &self.query,
        }
    }

    fn fields_mut(&mut self, location: ParamLocation) -> &mut Vec<(String, Validator)> {
        match location {
            ParamLocation::Url => &mut self.url,
            ParamLocation::Body => &mut self.body,
            ParamLocation::Query => &mut self.query,
        }
    }

    fn batches_of(&self, location: ParamLocation) -> &[BatchValidator] {
        match location {
            ParamLocation::Url => &self.batch_url,
            ParamLocation::Body => &self.batch_body,
            ParamLocation::Query => &self.batch_query,
        }
    }

    fn batches_mut(&mut self, location: ParamLocation) -> &mut Vec<BatchValidator> {
        match location {
            ParamLocation::Url => &mut self.batch_url,
            ParamLocation::Body => &mut self.batch_body,
            ParamLocation::Query => &mut self.batch_query,
        }
    }
}

/// What was wrong with a failure's arguments
#[derive(Debug, Clone, PartialEq)]
pub enum ViolationKind {
    /// The validator supplied no arguments at all
    MissingArgs,
    /// The arguments did not match the declared shape
    Shape(ShapeCheck),
}

/// A failure whose arguments broke the contract of its error code
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeViolation {
    pub param_type: ParamLocation,
    pub param_name: String,
    pub error_code: ErrorCode,
    pub error_args: Value,
    pub kind: ViolationKind,
}

impl ShapeViolation {
    /// True when the failure was downgraded to Unknown
    pub fn downgraded(&self) -> bool {
        matches!(self.kind, ViolationKind::Shape(_))
    }
}

/// Receives argument violations found at the orchestrator boundary
pub trait ViolationSink: Send + Sync {
    fn report(&self, violation: &ShapeViolation);
}

/// Default sink: logs through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ViolationSink for TracingSink {
    fn report(&self, violation: &ShapeViolation) {
        match &violation.kind {
            ViolationKind::MissingArgs => tracing::debug!(
                target: "gatekeep::validate",
                code = %violation.error_code,
                param = %violation.param_name,
                location = violation.param_type.as_str(),
                "error arguments missing, using {{}}"
            ),
            ViolationKind::Shape(check) => tracing::error!(
                target: "gatekeep::validate",
                code = %violation.error_code,
                param = %violation.param_name,
                location = violation.param_type.as_str(),
                args = %violation.error_args,
                missing = ?check.missing_fields(),
                type_errors = ?check.type_errors(),
                "error arguments do not match their declared shape, reporting Unknown"
            ),
        }
    }
}

/// A compiled validation declaration
#[derive(Clone)]
pub struct ParamValidator {
    params: Arc<ValidateParams>,
    timeout: Option<Duration>,
    sink: Arc<dyn ViolationSink>,
}

impl ParamValidator {
    pub fn new(params: ValidateParams) -> Self {
        Self {
            params: Arc::new(params),
            timeout: None,
            sink: Arc::new(TracingSink),
        }
    }

    /// Bound every validator; one that overruns fails with Unknown
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn ViolationSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Run every declared validator and build the ordered report
    pub async fn run(&self, ctx: Ctx) -> Vec<InvalidParam> {
        let [url, body, query] = ParamLocation::ALL.map(|loc| self.run_fields(loc, ctx.clone()));
        let [batch_url, batch_body, batch_query] =
            ParamLocation::ALL.map(|loc| self.run_batches(loc, ctx.clone()));

        let (url, body, query, batch_url, batch_body, batch_query) =
            futures::join!(url, body, query, batch_url, batch_body, batch_query);

        [url, body, query, batch_url, batch_body, batch_query]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Convenience for callers holding a bare context
    pub async fn check(&self, ctx: RequestContext) -> Vec<InvalidParam> {
        self.run(Arc::new(ctx)).await
    }

    async fn run_fields(&self, location: ParamLocation, ctx: Ctx) -> Vec<InvalidParam> {
        let runs = self.params.fields_of(location).iter().map(|(name, v)| {
            let value = ctx.field(location, name);
            let ctx = ctx.clone();
            async move {
                self.guarded(v, value, ctx)
                    .await
                    .failures()
                    .into_iter()
                    .filter_map(|failure| self.conform(location, name, failure))
                    .map(|(error_code, error_args)| InvalidParam {
                        param_type: location,
                        param_name: name.clone(),
                        error_code,
                        error_args,
                    })
                    .collect::<Vec<_>>()
            }
        });

        join_all(runs).await.into_iter().flatten().collect()
    }

    async fn run_batches(&self, location: ParamLocation, ctx: Ctx) -> Vec<InvalidParam> {
        let runs = self.params.batches_of(location).iter().map(|batch| {
            let group = ctx.group(location).clone();
            let ctx = ctx.clone();
            async move {
                let label = batch.target_fields.join(",");
                let failures = self.guarded(&batch.validator, group, ctx).await.failures();

                let mut records = Vec::new();
                for failure in failures {
                    let Some((error_code, error_args)) = self.conform(location, &label, failure)
                    else {
                        continue;
                    };
                    records.extend(batch.target_fields.iter().map(|name| InvalidParam {
                        param_type: location,
                        param_name: name.clone(),
                        error_code,
                        error_args: error_args.clone(),
                    }));
                }
                records
            }
        });

        join_all(runs).await.into_iter().flatten().collect()
    }

    /// Run one validator, converting panics and timeouts into Unknown
    async fn guarded(&self, v: &Validator, value: Value, ctx: Ctx) -> Verdict {
        let v = v.clone();
        let run = AssertUnwindSafe(async move { v(value, ctx).await }).catch_unwind();

        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, run).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    tracing::warn!(
                        target: "gatekeep::validate",
                        timeout_ms = limit.as_millis() as u64,
                        "validator timed out"
                    );
                    return unknown();
                }
            },
            None => run.await,
        };

        outcome.unwrap_or_else(|_| {
            tracing::error!(target: "gatekeep::validate", "validator panicked");
            unknown()
        })
    }

    /// Enforce the argument contract of a failure.
    ///
    /// Returns `None` for a passing result.
    fn conform(
        &self,
        location: ParamLocation,
        name: &str,
        result: ValidationResult,
    ) -> Option<(ErrorCode, Value)> {
        let ValidationResult::Fail {
            error_code,
            mut error_args,
        } = result
        else {
            return None;
        };

        let violation = |args: &Value, kind| ShapeViolation {
            param_type: location,
            param_name: name.to_string(),
            error_code,
            error_args: args.clone(),
            kind,
        };

        if error_args.is_null() {
            self.sink.report(&violation(&error_args, ViolationKind::MissingArgs));
            error_args = json!({});
        }

        let check = check_error_args(error_code, &error_args);
        if check.is_valid() {
            Some((error_code, error_args))
        } else {
            self.sink.report(&violation(&error_args, ViolationKind::Shape(check)));
            Some((ErrorCode::Unknown, json!({})))
        }
    }
}

fn unknown() -> Verdict {
    Verdict::Single(ValidationResult::Fail {
        error_code: ErrorCode::Unknown,
        error_args: json!({}),
    })
}
