// File: src/routes.rs
// Purpose: HTTP routes, each guarded by its declarative validation map

use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, Method};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{any, delete, get, post};
use axum::{Extension, Json, Router};
use chrono::{Duration, Utc};
use gatekeep::{
    all_of, coerce_number, event_metadata_validator, expect_type, in_array, in_enum, is_email,
    length_between, max_length, no_validate, not_empty, nullable, positive, require_methods,
    string, validate, ApiResponse, EventType, GatekeepConfig, ParamLocation, ResponseStatus,
    Session, ValidateParams, ValueKind,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::directory::{Directory, Plan};
use crate::validators::{object_params, org_exists, paged_query, team_quota, unused_email, user_exists};

/// Largest object a media request may announce
pub const MAX_OBJECT_BYTES: u64 = 10 * 1024 * 1024;

/// Content types accepted for uploads
pub const ACCEPTED_CONTENT_TYPES: &[&str] = &["image/png", "image/jpeg", "application/pdf"];

const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<dyn Directory>,
    pub config: Arc<GatekeepConfig>,
}

impl AppState {
    pub fn new(directory: Arc<dyn Directory>, config: GatekeepConfig) -> Self {
        Self {
            directory,
            config: Arc::new(config),
        }
    }
}

type Reply = Result<ApiResponse, ApiResponse>;

/// Build the application router
pub fn app(state: AppState) -> Router {
    let dir = state.directory.clone();
    let config = state.config.clone();
    let guard = |params: ValidateParams| validate(params).with_config(&config);

    Router::new()
        .route(
            "/api/v1/orgs",
            post(create_org).route_layer(guard(
                ValidateParams::new()
                    .body("orgName", length_between(3, 64))
                    .body("orgPlan", nullable(in_enum::<Plan>()))
                    .body("userMail", all_of(vec![is_email(), unused_email(dir.clone(), false)]))
                    .body("userName", length_between(2, 64)),
            )),
        )
        .route(
            "/api/v1/orgs/:orgId/users",
            get(list_users)
                .route_layer(guard(
                    ValidateParams::new()
                        .url("orgId", org_exists(dir.clone()))
                        .fields(ParamLocation::Query, paged_query()),
                ))
                .merge(post(create_user).route_layer(guard(
                    ValidateParams::new()
                        .url("orgId", org_exists(dir.clone()))
                        .body("userMail", all_of(vec![is_email(), unused_email(dir.clone(), false)]))
                        .body("userName", length_between(2, 64)),
                ))),
        )
        .route(
            "/api/v1/users/:userId",
            delete(delete_user).route_layer(guard(
                ValidateParams::new().url("userId", user_exists(dir.clone(), true, false)),
            )),
        )
        .route(
            "/api/v1/teams",
            post(create_team).route_layer(guard(
                ValidateParams::new()
                    .body("teamName", all_of(vec![length_between(2, 64), team_quota(dir.clone())])),
            )),
        )
        .route(
            "/api/v1/events",
            post(record_event).route_layer(guard(
                ValidateParams::new()
                    .body("eventType", in_enum::<EventType>())
                    .body("eventMetadata", nullable(expect_type(ValueKind::Object, no_validate())))
                    .batch_body(event_metadata_validator()),
            )),
        )
        .route(
            "/api/v1/media",
            post(media_request).route_layer(guard(
                ValidateParams::new()
                    .body("requestMethod", in_array(["GET", "PUT", "DELETE"]))
                    .body("objectKey", all_of(vec![not_empty(), max_length(256)]))
                    .body("objectSizeBytes", nullable(positive()))
                    .body("objectContentType", nullable(string()))
                    .batch_body(object_params(MAX_OBJECT_BYTES, ACCEPTED_CONTENT_TYPES)),
            )),
        )
        .route(
            "/health",
            any(health).layer(require_methods([Method::GET, Method::HEAD])),
        )
        .fallback(not_found)
        .layer(middleware::from_fn(session_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Stand-in for an auth layer: lifts `x-session-id`, `x-user-id` and
/// `x-org-id` headers into a [`Session`] extension
async fn session_headers(mut req: Request, next: Next) -> Response {
    if let Some(session) = session_from(req.headers()) {
        req.extensions_mut().insert(session);
    }
    next.run(req).await
}

fn session_from(headers: &HeaderMap) -> Option<Session> {
    let header = |name: &str| headers.get(name)?.to_str().ok().map(str::to_string);

    Some(Session {
        session_id: header("x-session-id").unwrap_or_else(|| Uuid::new_v4().to_string()),
        user_id: header("x-user-id")?,
        org_id: header("x-org-id")?,
        verified: true,
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrg {
    org_name: String,
    org_plan: Option<Plan>,
    user_mail: String,
    user_name: String,
}

async fn create_org(State(state): State<AppState>, Json(req): Json<CreateOrg>) -> Reply {
    let org = state
        .directory
        .create_org(req.org_name.trim(), req.org_plan.unwrap_or_default())
        .await?;
    let user = state
        .directory
        .create_user(&org.org_id, &req.user_mail, req.user_name.trim())
        .await?;

    tracing::info!(org_id = %org.org_id, "org created");
    Ok(ApiResponse::success().set("org", org).set("user", user))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateUser {
    user_mail: String,
    user_name: String,
}

async fn create_user(
    State(state): State<AppState>,
    Path(org_id): Path<String>,
    Json(req): Json<CreateUser>,
) -> Reply {
    let user = state
        .directory
        .create_user(&org_id, &req.user_mail, req.user_name.trim())
        .await?;
    Ok(ApiResponse::success().set("user", user))
}

async fn list_users(
    State(state): State<AppState>,
    Path(org_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    let read = |name: &str, default: usize| {
        query
            .get(name)
            .and_then(|raw| coerce_number(&Value::from(raw.as_str())))
            .map_or(default, |n| n.max(1.0) as usize)
    };
    let page_size = read("pageSize", DEFAULT_PAGE_SIZE);
    let page = read("searchPage", 1);

    let users = state.directory.list_users(&org_id, page_size, page).await?;
    Ok(ApiResponse::success()
        .set("users", users)
        .set("pageSize", page_size)
        .set("searchPage", page))
}

async fn delete_user(State(state): State<AppState>, Path(user_id): Path<String>) -> Reply {
    state.directory.delete_user(&user_id).await?;
    Ok(ApiResponse::success())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTeam {
    team_name: String,
}

async fn create_team(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<CreateTeam>,
) -> Reply {
    let team = state
        .directory
        .create_team(&session.org_id, req.team_name.trim())
        .await?;
    Ok(ApiResponse::success().set("team", team))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordEvent {
    event_type: EventType,
    #[serde(default)]
    event_metadata: Value,
}

async fn record_event(Json(req): Json<RecordEvent>) -> Reply {
    let event_id = Uuid::new_v4().to_string();
    tracing::info!(
        event_id = %event_id,
        event_type = ?req.event_type,
        metadata = %req.event_metadata,
        "event recorded"
    );
    Ok(ApiResponse::success()
        .set("eventId", event_id)
        .set("recordedAt", Utc::now()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MediaRequest {
    request_method: String,
    object_key: String,
}

async fn media_request(Json(req): Json<MediaRequest>) -> Reply {
    Ok(ApiResponse::success()
        .set("requestId", Uuid::new_v4().to_string())
        .set("requestMethod", req.request_method)
        .set("objectKey", req.object_key)
        .set("expiresAt", Utc::now() + Duration::minutes(15)))
}

async fn health(State(state): State<AppState>) -> ApiResponse {
    ApiResponse::success().set("directory", state.directory.name())
}

async fn not_found() -> ApiResponse {
    ApiResponse::new(ResponseStatus::NotFound)
}
