// File: src/validators.rs
// Purpose: Application validators that consult the directory

use anyhow::{bail, Context as _, Result};
use gatekeep::{
    expect_type, invalid, invalid_bare, nullable, nullable_batch, pass, positive, sync_validator,
    try_validator, BatchValidator, Ctx, ErrorCode, Validator, ValueKind, Verdict,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::directory::Directory;

/// Fails with IdentityInUse when the address is already registered.
///
/// With `same_org` the lookup is limited to the caller's org.
pub fn unused_email(directory: Arc<dyn Directory>, same_org: bool) -> Validator {
    expect_type(
        ValueKind::String,
        try_validator(move |value, ctx| check_unused_email(directory.clone(), value, ctx, same_org)),
    )
}

async fn check_unused_email(
    directory: Arc<dyn Directory>,
    value: Value,
    ctx: Ctx,
    same_org: bool,
) -> Result<Verdict> {
    let mail = value.as_str().unwrap_or_default();
    let org_id = match (same_org, ctx.session.as_ref()) {
        (false, _) => None,
        (true, Some(session)) => Some(session.org_id.as_str()),
        (true, None) => bail!("no session on request"),
    };

    let taken = directory.find_user_by_mail(mail, org_id).await?.is_some();
    Ok(if taken {
        invalid_bare(ErrorCode::IdentityInUse)
    } else {
        pass()
    })
}

/// Fails with InvalidOrgId unless the org exists
pub fn org_exists(directory: Arc<dyn Directory>) -> Validator {
    expect_type(
        ValueKind::String,
        try_validator(move |value, _| check_org_exists(directory.clone(), value)),
    )
}

async fn check_org_exists(directory: Arc<dyn Directory>, value: Value) -> Result<Verdict> {
    let org_id = value.as_str().unwrap_or_default();
    Ok(match directory.find_org(org_id).await? {
        Some(_) => pass(),
        None => invalid_bare(ErrorCode::InvalidOrgId),
    })
}

/// Fails with InvalidUserId unless the user exists.
///
/// `same_org` restricts the match to the caller's org; `allow_self = false`
/// also rejects the caller's own id.
pub fn user_exists(directory: Arc<dyn Directory>, same_org: bool, allow_self: bool) -> Validator {
    expect_type(
        ValueKind::String,
        try_validator(move |value, ctx| {
            check_user_exists(directory.clone(), value, ctx, same_org, allow_self)
        }),
    )
}

async fn check_user_exists(
    directory: Arc<dyn Directory>,
    value: Value,
    ctx: Ctx,
    same_org: bool,
    allow_self: bool,
) -> Result<Verdict> {
    let user_id = value.as_str().unwrap_or_default();
    let session = ctx.session.as_ref();
    if (same_org || !allow_self) && session.is_none() {
        bail!("no session on request");
    }

    if !allow_self && session.is_some_and(|s| s.user_id == user_id) {
        return Ok(invalid_bare(ErrorCode::InvalidUserId));
    }

    let org_id = session.filter(|_| same_org).map(|s| s.org_id.as_str());
    Ok(match directory.find_user(user_id, org_id).await? {
        Some(_) => pass(),
        None => invalid_bare(ErrorCode::InvalidUserId),
    })
}

/// Fails with TeamQuotaExceeded once the caller's org owns as many teams
/// as its plan allows. The field value itself is ignored.
pub fn team_quota(directory: Arc<dyn Directory>) -> Validator {
    try_validator(move |_, ctx| check_team_quota(directory.clone(), ctx))
}

async fn check_team_quota(directory: Arc<dyn Directory>, ctx: Ctx) -> Result<Verdict> {
    let session = ctx.session.as_ref().context("no session on request")?;
    let org = directory
        .find_org(&session.org_id)
        .await?
        .with_context(|| format!("org {} not found", session.org_id))?;
    let teams = directory.count_teams(&org.org_id).await?;
    let limit = org.org_plan.team_limit();

    tracing::debug!(org_id = %org.org_id, teams, limit, "team quota checked");

    Ok(if teams >= limit {
        invalid_bare(ErrorCode::TeamQuotaExceeded)
    } else {
        pass()
    })
}

/// Query rules shared by paginated listings
pub fn paged_query() -> Vec<(&'static str, Validator)> {
    vec![
        ("pageSize", nullable(positive())),
        ("searchPage", nullable(positive())),
    ]
}

/// Size and content type limits for an object upload.
///
/// Skipped when either field is absent, as on reads and deletes.
pub fn object_params(max_size: u64, accepted_types: &[&str]) -> BatchValidator {
    let accepted: Vec<String> = accepted_types.iter().map(|t| t.to_string()).collect();

    nullable_batch(BatchValidator::new(
        ["objectSizeBytes", "objectContentType"],
        sync_validator(move |body, _| {
            let size_ok = body["objectSizeBytes"]
                .as_u64()
                .is_some_and(|size| size <= max_size);
            let type_ok = body["objectContentType"]
                .as_str()
                .is_some_and(|t| accepted.iter().any(|a| a == t));

            if size_ok && type_ok {
                pass()
            } else {
                invalid(
                    ErrorCode::ObjectParamsInvalid,
                    json!({ "maxSize": max_size, "acceptedTypes": accepted }),
                )
            }
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{MemoryDirectory, Plan};
    use gatekeep::{RequestContext, Session};
    use pretty_assertions::assert_eq;

    fn session(user_id: &str, org_id: &str) -> Session {
        Session {
            session_id: "s-1".to_string(),
            user_id: user_id.to_string(),
            org_id: org_id.to_string(),
            verified: true,
        }
    }

    async fn run(v: &Validator, value: Value, ctx: RequestContext) -> Verdict {
        v(value, Arc::new(ctx)).await
    }

    #[tokio::test]
    async fn test_unused_email() {
        let dir = MemoryDirectory::new();
        let org = dir.create_org("acme", Plan::Free).await.unwrap();
        dir.create_user(&org.org_id, "jo@acme.io", "Jo").await.unwrap();
        let dir: Arc<dyn Directory> = Arc::new(dir);

        let v = unused_email(dir.clone(), false);
        assert_eq!(
            run(&v, json!("jo@acme.io"), RequestContext::new()).await,
            invalid_bare(ErrorCode::IdentityInUse)
        );
        assert!(run(&v, json!("new@acme.io"), RequestContext::new()).await.is_pass());

        let scoped = unused_email(dir, true);
        let elsewhere = RequestContext::new().with_session(session("u-9", "other-org"));
        assert!(run(&scoped, json!("jo@acme.io"), elsewhere).await.is_pass());

        // Without a session the scoped lookup cannot run
        assert_eq!(
            run(&scoped, json!("jo@acme.io"), RequestContext::new()).await,
            invalid(ErrorCode::Unknown, json!({}))
        );
    }

    #[tokio::test]
    async fn test_user_exists_rejects_self_when_asked() {
        let dir = MemoryDirectory::new();
        let org = dir.create_org("acme", Plan::Free).await.unwrap();
        let jo = dir.create_user(&org.org_id, "jo@acme.io", "Jo").await.unwrap();
        let dir: Arc<dyn Directory> = Arc::new(dir);

        let v = user_exists(dir, true, false);
        let as_jo = || RequestContext::new().with_session(session(&jo.user_id, &org.org_id));
        let as_admin = || RequestContext::new().with_session(session("admin", &org.org_id));

        assert_eq!(
            run(&v, json!(jo.user_id), as_jo()).await,
            invalid_bare(ErrorCode::InvalidUserId)
        );
        assert!(run(&v, json!(jo.user_id), as_admin()).await.is_pass());
        assert_eq!(
            run(&v, json!("ghost"), as_admin()).await,
            invalid_bare(ErrorCode::InvalidUserId)
        );
    }

    #[tokio::test]
    async fn test_team_quota_follows_plan() {
        let dir = MemoryDirectory::new();
        let org = dir.create_org("acme", Plan::Free).await.unwrap();
        let ctx = || RequestContext::new().with_session(session("u-1", &org.org_id));
        let shared: Arc<dyn Directory> = Arc::new(dir.clone());
        let v = team_quota(shared);

        assert!(run(&v, json!("core"), ctx()).await.is_pass());
        dir.create_team(&org.org_id, "core").await.unwrap();
        assert_eq!(
            run(&v, json!("second"), ctx()).await,
            invalid_bare(ErrorCode::TeamQuotaExceeded)
        );
    }

    #[tokio::test]
    async fn test_object_params_skip_and_fail() {
        let batch = object_params(1024, &["image/png"]);
        let ctx = Arc::new(RequestContext::new());

        let skipped = (batch.validator)(json!({"objectSizeBytes": 4096}), ctx.clone()).await;
        assert!(skipped.is_pass());

        let verdict = (batch.validator)(
            json!({"objectSizeBytes": 4096, "objectContentType": "image/png"}),
            ctx,
        )
        .await;
        assert_eq!(
            verdict,
            invalid(
                ErrorCode::ObjectParamsInvalid,
                json!({"maxSize": 1024, "acceptedTypes": ["image/png"]})
            )
        );
    }
}
