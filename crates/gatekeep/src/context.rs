// File: src/context.rs
// Purpose: Normalised view of an inbound request handed to validators

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which parameter bag a field was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParamLocation {
    Url,
    Body,
    Query,
}

impl ParamLocation {
    pub const ALL: [ParamLocation; 3] = [ParamLocation::Url, ParamLocation::Body, ParamLocation::Query];

    pub fn as_str(self) -> &'static str {
        match self {
            ParamLocation::Url => "URL",
            ParamLocation::Body => "BODY",
            ParamLocation::Query => "QUERY",
        }
    }
}

/// Authenticated caller, inserted into request extensions by an upstream auth layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: String,
    pub user_id: String,
    pub org_id: String,
    #[serde(default)]
    pub verified: bool,
}

/// Request data visible to validators.
///
/// `params`, `body` and `query` are always JSON objects.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: String,
    pub path: String,
    pub params: Value,
    pub body: Value,
    pub query: Value,
    pub session: Option<Session>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            method: "GET".to_string(),
            path: "/".to_string(),
            params: Value::Object(Map::new()),
            body: Value::Object(Map::new()),
            query: Value::Object(Map::new()),
            session: None,
        }
    }
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    pub fn with_query(mut self, query: Value) -> Self {
        self.query = query;
        self
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Whole parameter bag for a location
    pub fn group(&self, location: ParamLocation) -> &Value {
        match location {
            ParamLocation::Url => &self.params,
            ParamLocation::Body => &self.body,
            ParamLocation::Query => &self.query,
        }
    }

    /// One field of a bag; absent fields read as `null`
    pub fn field(&self, location: ParamLocation, name: &str) -> Value {
        self.group(location).get(name).cloned().unwrap_or(Value::Null)
    }
}
