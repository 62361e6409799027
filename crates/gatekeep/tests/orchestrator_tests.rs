//! Integration tests for the validation orchestrator
//!
//! Drives `ParamValidator` directly against hand-built request contexts.

use gatekeep::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct RecordingSink {
    seen: Mutex<Vec<ShapeViolation>>,
}

impl RecordingSink {
    fn violations(&self) -> Vec<ShapeViolation> {
        self.seen.lock().unwrap().clone()
    }
}

impl ViolationSink for RecordingSink {
    fn report(&self, violation: &ShapeViolation) {
        self.seen.lock().unwrap().push(violation.clone());
    }
}

fn sleeping(ms: u64, verdict: Verdict) -> Validator {
    validator(move |_, _| {
        let verdict = verdict.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            verdict
        }
    })
}

fn signup() -> ValidateParams {
    ValidateParams::new()
        .body("userMail", is_email())
        .body("userPassword", min_length(10))
}

#[tokio::test]
async fn test_scenario_two_invalid_body_fields() {
    let ctx = RequestContext::new().with_body(json!({
        "userMail": "not-an-email",
        "userPassword": "short"
    }));

    let report = ParamValidator::new(signup()).check(ctx).await;

    assert_eq!(
        report,
        vec![
            InvalidParam {
                param_type: ParamLocation::Body,
                param_name: "userMail".to_string(),
                error_code: ErrorCode::InvalidEmail,
                error_args: json!({}),
            },
            InvalidParam {
                param_type: ParamLocation::Body,
                param_name: "userPassword".to_string(),
                error_code: ErrorCode::MinStringLength,
                error_args: json!({"minLength": 10}),
            },
        ]
    );
}

#[tokio::test]
async fn test_scenario_valid_body_gives_empty_report() {
    let ctx = RequestContext::new().with_body(json!({
        "userMail": "a@b.com",
        "userPassword": "longenoughpassword"
    }));

    assert!(ParamValidator::new(signup()).check(ctx).await.is_empty());
}

#[tokio::test]
async fn test_scenario_nullable_in_array() {
    let params = ValidateParams::new().query("plan", nullable(in_array(["A", "B"])));
    let validator = ParamValidator::new(params);

    let absent = validator.check(RequestContext::new()).await;
    assert!(absent.is_empty());

    let report = validator
        .check(RequestContext::new().with_query(json!({"plan": "C"})))
        .await;
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].error_code, ErrorCode::NotInAllowedSet);
    assert_eq!(report[0].error_args, json!({"allowedValues": ["A", "B"]}));
}

#[tokio::test(start_paused = true)]
async fn test_aggregation_ignores_settle_order() {
    let params = ValidateParams::new()
        .url("orgId", sleeping(300, invalid_bare(ErrorCode::InvalidOrgId)))
        .body("name", sleeping(10, pass()))
        .query("page", sleeping(100, invalid(ErrorCode::Positive, json!({}))));

    let started = tokio::time::Instant::now();
    let report = ParamValidator::new(params).check(RequestContext::new()).await;

    let located: Vec<_> = report
        .iter()
        .map(|p| (p.param_type, p.param_name.as_str(), p.error_code))
        .collect();
    assert_eq!(
        located,
        vec![
            (ParamLocation::Url, "orgId", ErrorCode::InvalidOrgId),
            (ParamLocation::Query, "page", ErrorCode::Positive),
        ]
    );

    // All three ran concurrently: the pass took as long as the slowest one
    assert!(started.elapsed() < Duration::from_millis(400));
}

#[tokio::test]
async fn test_batch_failure_is_attributed_to_every_target() {
    let batch = BatchValidator::new(
        ["x", "y"],
        sync_validator(|body, _| {
            let x = body["x"].as_f64().unwrap_or_default();
            let y = body["y"].as_f64().unwrap_or_default();
            if x < y {
                pass()
            } else {
                invalid(ErrorCode::MinMax, json!({"minValue": x, "maxValue": y}))
            }
        }),
    );

    let report = ParamValidator::new(ValidateParams::new().batch_body(batch))
        .check(RequestContext::new().with_body(json!({"x": 5, "y": 2})))
        .await;

    assert_eq!(report.len(), 2);
    assert_eq!(report[0].param_name, "x");
    assert_eq!(report[1].param_name, "y");
    assert_eq!(report[0].error_code, report[1].error_code);
    assert_eq!(report[0].error_args, report[1].error_args);
    assert_eq!(report[0].error_args, json!({"minValue": 5.0, "maxValue": 2.0}));
}

#[tokio::test]
async fn test_batches_come_after_field_failures() {
    let params = ValidateParams::new()
        .batch_url(BatchValidator::new(["a"], force_fail(ErrorCode::InvalidTeamId, json!({}))))
        .query("q", not_empty());

    let report = ParamValidator::new(params)
        .check(RequestContext::new().with_query(json!({"q": " "})))
        .await;

    let order: Vec<_> = report.iter().map(|p| p.param_type).collect();
    assert_eq!(order, vec![ParamLocation::Query, ParamLocation::Url]);
}

#[tokio::test]
async fn test_malformed_args_are_downgraded_and_reported() {
    let sink = Arc::new(RecordingSink::default());
    let params = ValidateParams::new().body(
        "password",
        force_fail(ErrorCode::MinStringLength, json!({})),
    );

    let report = ParamValidator::new(params)
        .with_sink(sink.clone())
        .check(RequestContext::new())
        .await;

    assert_eq!(
        report,
        vec![InvalidParam {
            param_type: ParamLocation::Body,
            param_name: "password".to_string(),
            error_code: ErrorCode::Unknown,
            error_args: json!({}),
        }]
    );

    let violations = sink.violations();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].error_code, ErrorCode::MinStringLength);
    assert!(violations[0].downgraded());
    match &violations[0].kind {
        ViolationKind::Shape(check) => {
            assert_eq!(check.missing_fields(), ["minLength".to_string()])
        }
        other => panic!("unexpected violation {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_args_are_normalised_before_checking() {
    let sink = Arc::new(RecordingSink::default());
    let params = ValidateParams::new()
        .body("mail", force_fail(ErrorCode::IdentityInUse, Value::Null))
        .body("size", force_fail(ErrorCode::MaxArrLength, Value::Null));

    let report = ParamValidator::new(params)
        .with_sink(sink.clone())
        .check(RequestContext::new())
        .await;

    assert_eq!(report[0].error_code, ErrorCode::IdentityInUse);
    assert_eq!(report[0].error_args, json!({}));
    assert_eq!(report[1].error_code, ErrorCode::Unknown);

    // One MissingArgs per omitted payload, plus the shape failure of `size`
    let kinds: Vec<_> = sink
        .violations()
        .into_iter()
        .map(|v| (v.param_name, v.kind))
        .collect();
    assert_eq!(kinds.len(), 3);
    assert_eq!(kinds[0], ("mail".to_string(), ViolationKind::MissingArgs));
    assert_eq!(kinds[1], ("size".to_string(), ViolationKind::MissingArgs));
    assert!(matches!(kinds[2], (ref name, ViolationKind::Shape(_)) if name == "size"));
}

#[tokio::test]
async fn test_routine_bare_failures_leave_the_sink_quiet() {
    let sink = Arc::new(RecordingSink::default());
    let params = ValidateParams::new()
        .body("mail", sync_validator(|_, _| invalid_bare(ErrorCode::IdentityInUse)))
        .url("orgId", sync_validator(|_, _| invalid_bare(ErrorCode::InvalidOrgId)))
        .body("teamName", sync_validator(|_, _| invalid_bare(ErrorCode::TeamQuotaExceeded)));

    let report = ParamValidator::new(params)
        .with_sink(sink.clone())
        .check(RequestContext::new())
        .await;

    let codes: Vec<_> = report.iter().map(|p| (p.error_code, p.error_args.clone())).collect();
    assert_eq!(
        codes,
        vec![
            (ErrorCode::InvalidOrgId, json!({})),
            (ErrorCode::IdentityInUse, json!({})),
            (ErrorCode::TeamQuotaExceeded, json!({})),
        ]
    );
    assert!(sink.violations().is_empty());
}

#[tokio::test]
async fn test_panicking_validator_becomes_unknown() {
    let params = ValidateParams::new()
        .body("boom", sync_validator(|_, _| panic!("validator bug")))
        .body("fine", min_length(1));

    let report = ParamValidator::new(params)
        .check(RequestContext::new().with_body(json!({"fine": ""})))
        .await;

    let codes: Vec<_> = report.iter().map(|p| (p.param_name.as_str(), p.error_code)).collect();
    assert_eq!(
        codes,
        vec![("boom", ErrorCode::Unknown), ("fine", ErrorCode::MinStringLength)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_timeout_turns_stalled_validator_into_unknown() {
    let params = ValidateParams::new()
        .body("slow", sleeping(60_000, pass()))
        .body("quick", sleeping(5, invalid(ErrorCode::EmptyString, json!({}))));

    let report = ParamValidator::new(params)
        .with_timeout(Some(Duration::from_millis(200)))
        .check(RequestContext::new())
        .await;

    let codes: Vec<_> = report.iter().map(|p| (p.param_name.as_str(), p.error_code)).collect();
    assert_eq!(
        codes,
        vec![("slow", ErrorCode::Unknown), ("quick", ErrorCode::EmptyString)]
    );
}

#[tokio::test]
async fn test_for_each_failures_are_all_reported_for_the_field() {
    let params = ValidateParams::new().body("tags", for_each(max_length(3)));

    let report = ParamValidator::new(params)
        .check(RequestContext::new().with_body(json!({"tags": ["ok", "toolong", "no"]})))
        .await;

    assert_eq!(report.len(), 2);
    assert_eq!(report[0].error_code, ErrorCode::ArrElemInvalid);
    assert_eq!(report[0].error_args, json!({"invalidIndexes": [1]}));
    assert_eq!(report[1].error_code, ErrorCode::MaxStringLength);
}

#[tokio::test]
async fn test_same_input_gives_identical_report() {
    let validator = ParamValidator::new(
        signup()
            .query("pageSize", nullable(positive()))
            .batch_body(event_metadata_validator()),
    );
    let ctx = || {
        RequestContext::new()
            .with_body(json!({"userMail": "x", "userPassword": "y", "eventType": "AuthVerify"}))
            .with_query(json!({"pageSize": "-1"}))
    };

    let first = serde_json::to_vec(&validator.check(ctx()).await).unwrap();
    let second = serde_json::to_vec(&validator.check(ctx()).await).unwrap();
    assert_eq!(first, second);
    assert!(!first.is_empty());
}
