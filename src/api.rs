//! HTTP gateway to the roster service.

use crate::record::{NewRecord, Record, UserId};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;

/// Which gateway call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Create,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Create => "create",
            Self::Delete => "delete",
        }
    }
}

/// The single failure kind of the service boundary: non-2xx status,
/// transport failure, or an undecodable response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkError {
    pub operation: Operation,
    pub status: Option<u16>,
    pub reason: String,
}

impl NetworkError {
    pub fn new(operation: Operation, status: Option<u16>, reason: impl Into<String>) -> Self {
        Self {
            operation,
            status,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "{} failed with status {}: {}", self.operation.as_str(), code, self.reason),
            None => write!(f, "{} failed: {}", self.operation.as_str(), self.reason),
        }
    }
}

impl std::error::Error for NetworkError {}

/// The three service calls the client consumes. A trait so the
/// application controller can run against an in-memory double.
pub trait RosterApi {
    fn list_all(&self) -> Result<Vec<Record>, NetworkError>;
    fn create(&self, payload: &NewRecord) -> Result<Record, NetworkError>;
    fn delete_by_id(&self, id: &UserId) -> Result<(), NetworkError>;
}

pub struct HttpApi {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: builder.build(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn record_url(&self, id: &UserId) -> String {
        format!("{}/{}", self.base_url, urlencoding::encode(id.as_str()))
    }
}

impl RosterApi for HttpApi {
    fn list_all(&self) -> Result<Vec<Record>, NetworkError> {
        let resp = self.agent.get(&self.base_url).call();
        decode(Operation::List, check(Operation::List, resp)?)
    }

    fn create(&self, payload: &NewRecord) -> Result<Record, NetworkError> {
        let body = serde_json::to_value(payload)
            .map_err(|e| NetworkError::new(Operation::Create, None, e.to_string()))?;
        let resp = self
            .agent
            .post(&self.base_url)
            .set("Content-Type", "application/json")
            .send_json(body);
        decode(Operation::Create, check(Operation::Create, resp)?)
    }

    fn delete_by_id(&self, id: &UserId) -> Result<(), NetworkError> {
        let resp = self.agent.delete(&self.record_url(id)).call();
        check(Operation::Delete, resp)?;
        Ok(())
    }
}

/// Map ureq's result so every non-2xx status and transport error becomes a
/// `NetworkError`, without status-specific branching.
fn check(
    op: Operation,
    resp: Result<ureq::Response, ureq::Error>,
) -> Result<ureq::Response, NetworkError> {
    match resp {
        Ok(r) if (200..300).contains(&r.status()) => Ok(r),
        Ok(r) => Err(NetworkError::new(op, Some(r.status()), r.status_text().to_string())),
        Err(ureq::Error::Status(code, r)) => {
            let body = r.into_string().unwrap_or_default();
            Err(NetworkError::new(op, Some(code), body))
        }
        Err(e) => Err(NetworkError::new(op, None, e.to_string())),
    }
}

fn decode<T: DeserializeOwned>(op: Operation, resp: ureq::Response) -> Result<T, NetworkError> {
    resp.into_json::<T>()
        .map_err(|e| NetworkError::new(op, None, format!("invalid response body: {}", e)))
}
