//! Directory of orgs, users and teams
//!
//! Validators only read from it; handlers write.

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatekeep::ParamEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Subscription plan of an org
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Plan {
    #[default]
    Free,
    Standard,
    Enterprise,
}

impl Plan {
    /// Most teams an org on this plan may own
    pub fn team_limit(self) -> usize {
        match self {
            Plan::Free => 1,
            Plan::Standard => 10,
            Plan::Enterprise => 100,
        }
    }
}

impl ParamEnum for Plan {
    const VARIANTS: &'static [(&'static str, &'static str)] = &[
        ("Free", "FREE"),
        ("Standard", "STANDARD"),
        ("Enterprise", "ENTERPRISE"),
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Org {
    pub org_id: String,
    pub org_name: String,
    pub org_plan: Plan,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub user_mail: String,
    pub user_name: String,
    pub user_org_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub team_id: String,
    pub team_name: String,
    pub team_org_id: String,
}

/// Storage the application validators consult
#[async_trait]
pub trait Directory: Send + Sync {
    async fn find_org(&self, org_id: &str) -> Result<Option<Org>>;

    /// User by id, optionally restricted to one org
    async fn find_user(&self, user_id: &str, org_id: Option<&str>) -> Result<Option<User>>;

    /// User by mail address, optionally restricted to one org
    async fn find_user_by_mail(&self, mail: &str, org_id: Option<&str>) -> Result<Option<User>>;

    async fn count_teams(&self, org_id: &str) -> Result<usize>;

    async fn create_org(&self, name: &str, plan: Plan) -> Result<Org>;

    async fn create_user(&self, org_id: &str, mail: &str, name: &str) -> Result<User>;

    async fn create_team(&self, org_id: &str, name: &str) -> Result<Team>;

    /// One page of an org's users, ordered by mail; pages start at 1
    async fn list_users(&self, org_id: &str, page_size: usize, page: usize) -> Result<Vec<User>>;

    async fn delete_user(&self, user_id: &str) -> Result<()>;

    /// Backend name
    fn name(&self) -> &'static str;
}

#[derive(Default)]
struct Tables {
    orgs: HashMap<String, Org>,
    users: HashMap<String, User>,
    teams: HashMap<String, Team>,
}

/// In-memory directory
///
/// Non-persistent; contents are lost on restart.
#[derive(Clone, Default)]
pub struct MemoryDirectory {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

fn in_org(user: &User, org_id: Option<&str>) -> bool {
    org_id.map_or(true, |org_id| user.user_org_id == org_id)
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn find_org(&self, org_id: &str) -> Result<Option<Org>> {
        Ok(self.tables.read().await.orgs.get(org_id).cloned())
    }

    async fn find_user(&self, user_id: &str, org_id: Option<&str>) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .get(user_id)
            .filter(|user| in_org(user, org_id))
            .cloned())
    }

    async fn find_user_by_mail(&self, mail: &str, org_id: Option<&str>) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|user| user.user_mail.eq_ignore_ascii_case(mail) && in_org(user, org_id))
            .cloned())
    }

    async fn count_teams(&self, org_id: &str) -> Result<usize> {
        let tables = self.tables.read().await;
        Ok(tables
            .teams
            .values()
            .filter(|team| team.team_org_id == org_id)
            .count())
    }

    async fn create_org(&self, name: &str, plan: Plan) -> Result<Org> {
        let org = Org {
            org_id: Uuid::new_v4().to_string(),
            org_name: name.to_string(),
            org_plan: plan,
            created_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .orgs
            .insert(org.org_id.clone(), org.clone());
        Ok(org)
    }

    async fn create_user(&self, org_id: &str, mail: &str, name: &str) -> Result<User> {
        let mut tables = self.tables.write().await;
        if !tables.orgs.contains_key(org_id) {
            bail!("org {org_id} does not exist");
        }

        let user = User {
            user_id: Uuid::new_v4().to_string(),
            user_mail: mail.to_string(),
            user_name: name.to_string(),
            user_org_id: org_id.to_string(),
        };
        tables.users.insert(user.user_id.clone(), user.clone());
        Ok(user)
    }

    async fn create_team(&self, org_id: &str, name: &str) -> Result<Team> {
        let mut tables = self.tables.write().await;
        if !tables.orgs.contains_key(org_id) {
            bail!("org {org_id} does not exist");
        }

        let team = Team {
            team_id: Uuid::new_v4().to_string(),
            team_name: name.to_string(),
            team_org_id: org_id.to_string(),
        };
        tables.teams.insert(team.team_id.clone(), team.clone());
        Ok(team)
    }

    async fn list_users(&self, org_id: &str, page_size: usize, page: usize) -> Result<Vec<User>> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|user| user.user_org_id == org_id)
            .cloned()
            .collect();
        users.sort_by(|a, b| a.user_mail.cmp(&b.user_mail));

        let skip = page.saturating_sub(1).saturating_mul(page_size);
        Ok(users.into_iter().skip(skip).take(page_size).collect())
    }

    async fn delete_user(&self, user_id: &str) -> Result<()> {
        self.tables.write().await.users.remove(user_id);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
