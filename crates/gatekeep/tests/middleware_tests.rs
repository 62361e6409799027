//! HTTP-level tests for the validation layers

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::routing::{any, get, post};
use axum::{Json, Router};
use gatekeep::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::{Layer, ServiceExt};

async fn echo(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({"received": body}))
}

async fn ok() -> &'static str {
    "ok"
}

fn same_org() -> Validator {
    sync_validator(|value, ctx| match (&ctx.session, value.as_str()) {
        (Some(session), Some(org_id)) if session.org_id == org_id => pass(),
        _ => invalid_bare(ErrorCode::InvalidOrgId),
    })
}

fn app() -> Router {
    Router::new()
        .route(
            "/orgs/:orgId/members",
            post(echo).route_layer(validate(
                ValidateParams::new()
                    .url("orgId", same_org())
                    .body("userMail", is_email())
                    .body("role", in_array(["ADMIN", "MEMBER"])),
            )),
        )
        .route(
            "/users",
            get(ok).route_layer(validate(
                ValidateParams::new()
                    .query("pageSize", nullable(positive()))
                    .query("searchPage", nullable(positive())),
            )),
        )
        .route(
            "/ping",
            any(ok).layer(require_methods([Method::GET, Method::HEAD])),
        )
}

fn session(org_id: &str) -> Session {
    Session {
        session_id: "s-1".to_string(),
        user_id: "u-1".to_string(),
        org_id: org_id.to_string(),
        verified: true,
    }
}

fn json_post(uri: &str, body: Value, org_id: &str) -> Request<Body> {
    let mut req = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    req.extensions_mut().insert(session(org_id));
    req
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_valid_request_reaches_handler_with_body_intact() {
    let body = json!({"userMail": "jo@acme.io", "role": "ADMIN"});
    let response = app()
        .oneshot(json_post("/orgs/org-1/members", body.clone(), "org-1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!({"received": body}));
}

#[tokio::test]
async fn test_invalid_request_is_rejected_with_every_failure() {
    let body = json!({"userMail": "jo", "role": "OWNER"});
    let response = app()
        .oneshot(json_post("/orgs/org-2/members", body, "org-1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(response).await,
        json!({
            "responseStatus": "ERR_INVALID_PARAMS",
            "invalidParams": [
                {"paramType": "URL", "paramName": "orgId", "errorCode": "InvalidOrgId", "errorArgs": {}},
                {"paramType": "BODY", "paramName": "userMail", "errorCode": "InvalidEmail", "errorArgs": {}},
                {
                    "paramType": "BODY",
                    "paramName": "role",
                    "errorCode": "NotInAllowedSet",
                    "errorArgs": {"allowedValues": ["ADMIN", "MEMBER"]}
                }
            ]
        })
    );
}

#[tokio::test]
async fn test_malformed_json_body() {
    let mut req = Request::builder()
        .method(Method::POST)
        .uri("/orgs/org-1/members")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    req.extensions_mut().insert(session("org-1"));

    let response = app().oneshot(req).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await, json!({"responseStatus": "ERR_MALFORMED_BODY"}));
}

#[tokio::test]
async fn test_form_body_is_validated() {
    let mut req = Request::builder()
        .method(Method::POST)
        .uri("/orgs/org-1/members")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("userMail=jo%40acme.io&role=GUEST"))
        .unwrap();
    req.extensions_mut().insert(session("org-1"));

    let response = app().oneshot(req).await.unwrap();
    let body = read_json(response).await;

    assert_eq!(body["invalidParams"].as_array().unwrap().len(), 1);
    assert_eq!(body["invalidParams"][0]["paramName"], "role");
}

#[tokio::test]
async fn test_query_params_are_coerced_for_numeric_rules() {
    let get = |uri: &str| Request::builder().uri(uri).body(Body::empty()).unwrap();

    let response = app().oneshot(get("/users?pageSize=20")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app().oneshot(get("/users")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app()
        .oneshot(get("/users?pageSize=0&searchPage=abc"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(response).await["invalidParams"],
        json!([
            {"paramType": "QUERY", "paramName": "pageSize", "errorCode": "Positive", "errorArgs": {}},
            {
                "paramType": "QUERY",
                "paramName": "searchPage",
                "errorCode": "InvalidDataType",
                "errorArgs": {"expectedType": "number"}
            }
        ])
    );
}

#[tokio::test]
async fn test_require_methods() {
    let request = |method: Method| Request::builder().method(method).uri("/ping").body(Body::empty()).unwrap();

    let response = app().oneshot(request(Method::GET)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app().oneshot(request(Method::DELETE)).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(read_json(response).await, json!({"responseStatus": "ERR_METHOD_NOT_ALLOWED"}));
}

#[tokio::test]
async fn test_body_limit_from_config() {
    let config: GatekeepConfig = toml::from_str("[validation]\nmax_body_bytes = 16").unwrap();
    let app = Router::new().route(
        "/notes",
        post(echo).route_layer(validate(ValidateParams::new().body("text", string())).with_config(&config)),
    );

    let body = json!({"text": "far more than sixteen bytes"}).to_string();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/notes")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await, json!({"responseStatus": "ERR_MALFORMED_BODY"}));
}

#[tokio::test]
async fn test_layer_outside_router_sees_no_path_params() {
    let params = || ValidateParams::new().url("id", not_nullable(no_validate()));
    let routes = || Router::new().route("/items/:id", post(echo));

    // Wrapping the whole router runs before routing, so path params are unknown
    let outside = validate(params()).layer(routes());
    let inside = routes().route_layer(validate(params()));

    let request = || {
        Request::builder()
            .method(Method::POST)
            .uri("/items/42")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap()
    };

    let response = outside.oneshot(request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(response).await["invalidParams"][0]["errorCode"],
        "NullOrUndefined"
    );

    let response = inside.oneshot(request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
