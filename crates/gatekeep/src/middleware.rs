// File: src/middleware.rs
// Purpose: axum layers running a validation pass before the handler
//
// The layer turns the request into a `RequestContext` (path params, parsed
// body, query string, session extension), runs the `ParamValidator`, and
// either answers with the aggregated rejection or forwards the request with
// its body restored.

use axum::body::{to_bytes, Body, Bytes};
use axum::extract::{FromRequestParts, RawPathParams};
use axum::http::request::Parts;
use axum::http::{header, Method, Request};
use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};

use crate::config::GatekeepConfig;
use crate::context::{RequestContext, Session};
use crate::error::GatekeepError;
use crate::orchestrator::{ParamValidator, ValidateParams, ViolationSink};
use crate::response::{ApiResponse, ResponseStatus};

const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Validate requests against `params` before they reach the handler.
///
/// ```ignore
/// Router::new().route("/orgs", post(create_org).route_layer(validate(
///     ValidateParams::new().body("orgName", length_between(3, 40)),
/// )));
/// ```
pub fn validate(params: ValidateParams) -> ValidationLayer {
    ValidationLayer {
        validator: ParamValidator::new(params),
        max_body_bytes: DEFAULT_MAX_BODY_BYTES,
    }
}

#[derive(Clone)]
pub struct ValidationLayer {
    validator: ParamValidator,
    max_body_bytes: usize,
}

impl ValidationLayer {
    /// Apply timeout and body limit from configuration
    pub fn with_config(mut self, config: &GatekeepConfig) -> Self {
        self.validator = self
            .validator
            .with_timeout(config.validation.validator_timeout());
        self.max_body_bytes = config.validation.max_body_bytes;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn ViolationSink>) -> Self {
        self.validator = self.validator.with_sink(sink);
        self
    }
}

impl<S> Layer<S> for ValidationLayer {
    type Service = ValidationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ValidationService {
            inner,
            validator: self.validator.clone(),
            max_body_bytes: self.max_body_bytes,
        }
    }
}

#[derive(Clone)]
pub struct ValidationService<S> {
    inner: S,
    validator: ParamValidator,
    max_body_bytes: usize,
}

impl<S> Service<Request<Body>> for ValidationService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        // The clone may not be ready; keep the one that was polled
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let validator = self.validator.clone();
        let max_body_bytes = self.max_body_bytes;

        Box::pin(async move {
            let started = Instant::now();
            let (mut parts, body) = req.into_parts();

            let declared_len = parts
                .headers
                .get(header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<usize>().ok());
            if declared_len.is_some_and(|len| len > max_body_bytes) {
                let err = GatekeepError::BodyTooLarge {
                    limit: max_body_bytes,
                };
                return Ok(ApiResponse::from(err).into_response());
            }

            let bytes = match to_bytes(body, max_body_bytes).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    let err = GatekeepError::BodyRead(err.to_string());
                    return Ok(ApiResponse::from(err).into_response());
                }
            };

            let ctx = match request_context(&mut parts, &bytes).await {
                Ok(ctx) => ctx,
                Err(err) => return Ok(ApiResponse::from(err).into_response()),
            };

            let report = validator.run(Arc::new(ctx)).await;

            tracing::debug!(
                target: "gatekeep::http",
                method = %parts.method,
                uri = %parts.uri,
                failures = report.len(),
                elapsed_us = started.elapsed().as_micros() as u64,
                "validation pass"
            );

            if !report.is_empty() {
                return Ok(ApiResponse::invalid_params(report).into_response());
            }

            inner
                .call(Request::from_parts(parts, Body::from(bytes)))
                .await
        })
    }
}

/// Build the validator view of a request
pub async fn request_context(parts: &mut Parts, body: &Bytes) -> Result<RequestContext, GatekeepError> {
    let params = match RawPathParams::from_request_parts(parts, &()).await {
        Ok(raw) => raw
            .iter()
            .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
            .collect(),
        Err(err) => {
            tracing::warn!(
                target: "gatekeep::http",
                path = %parts.uri.path(),
                error = %err,
                "path params unavailable, URL fields read as null; mount validate() inside the router"
            );
            Map::new()
        }
    };

    let query = parts.uri.query().map(parse_form).unwrap_or_default();

    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    Ok(RequestContext {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        params: Value::Object(params),
        body: Value::Object(parse_body(content_type, body)?),
        query: Value::Object(query),
        session: parts.extensions.get::<Session>().cloned(),
    })
}

fn parse_body(content_type: &str, body: &[u8]) -> Result<Map<String, Value>, GatekeepError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    if content_type.starts_with("application/x-www-form-urlencoded") {
        let text = std::str::from_utf8(body).map_err(|e| GatekeepError::BodyRead(e.to_string()))?;
        return Ok(parse_form(text));
    }

    match serde_json::from_slice::<Value>(body)? {
        Value::Object(object) => Ok(object),
        _ => Err(GatekeepError::NotAnObject),
    }
}

/// Parse `a=1&b=x+y` pairs. A repeated key collects its values into an array.
pub fn parse_form(input: &str) -> Map<String, Value> {
    let mut map = Map::new();

    for pair in input.split('&').filter(|pair| !pair.is_empty()) {
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(raw_key);
        let value = Value::String(decode_component(raw_value));

        match map.get_mut(&key) {
            None => {
                map.insert(key, value);
            }
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
        }
    }

    map
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(spaced)
}

/// Reject any method not in `methods` with ERR_METHOD_NOT_ALLOWED
pub fn require_methods<I>(methods: I) -> RequireMethodsLayer
where
    I: IntoIterator<Item = Method>,
{
    RequireMethodsLayer {
        methods: methods.into_iter().collect::<Vec<_>>().into(),
    }
}

#[derive(Clone)]
pub struct RequireMethodsLayer {
    methods: Arc<[Method]>,
}

impl<S> Layer<S> for RequireMethodsLayer {
    type Service = RequireMethodsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequireMethodsService {
            inner,
            methods: self.methods.clone(),
        }
    }
}

#[derive(Clone)]
pub struct RequireMethodsService<S> {
    inner: S,
    methods: Arc<[Method]>,
}

impl<S> Service<Request<Body>> for RequireMethodsService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        if !self.methods.contains(req.method()) {
            tracing::debug!(target: "gatekeep::http", method = %req.method(), "method not allowed");
            let response = ApiResponse::new(ResponseStatus::MethodNotAllowed).into_response();
            return Box::pin(async move { Ok(response) });
        }

        Box::pin(self.inner.call(req))
    }
}
