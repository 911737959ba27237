//! JSONL session log of every flow outcome, for diagnostics.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct Transcript {
    pub path: PathBuf,
    session_id: String,
    sink: Option<File>,
}

#[derive(Serialize)]
struct Event<'a> {
    ts: DateTime<Utc>,
    session_id: &'a str,
    #[serde(rename = "type")]
    event_type: &'a str,
    #[serde(flatten)]
    data: serde_json::Value,
}

impl Transcript {
    pub fn new(path: &Path, session_id: &str) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            session_id: session_id.to_string(),
            sink: Some(file),
        })
    }

    /// A transcript that records nothing
    pub fn disabled() -> Self {
        Self {
            path: PathBuf::new(),
            session_id: String::new(),
            sink: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn log(&mut self, event_type: &str, data: serde_json::Value) -> Result<()> {
        let Some(file) = self.sink.as_mut() else {
            return Ok(());
        };
        let event = Event {
            ts: Utc::now(),
            session_id: &self.session_id,
            event_type,
            data,
        };
        let line = serde_json::to_string(&event)?;
        writeln!(file, "{}", line)?;
        file.flush()?;
        Ok(())
    }

    pub fn session_start(&mut self, base_url: &str) -> Result<()> {
        self.log("session_start", serde_json::json!({ "base_url": base_url }))
    }

    pub fn navigate(&mut self, section: &str) -> Result<()> {
        self.log("navigate", serde_json::json!({ "section": section }))
    }

    pub fn load_ok(&mut self, count: usize) -> Result<()> {
        self.log("load_ok", serde_json::json!({ "count": count }))
    }

    pub fn record_added(&mut self, user_id: &str, roll_number: &str) -> Result<()> {
        self.log(
            "record_added",
            serde_json::json!({ "user_id": user_id, "roll_number": roll_number }),
        )
    }

    pub fn record_deleted(&mut self, user_id: &str) -> Result<()> {
        self.log("record_deleted", serde_json::json!({ "user_id": user_id }))
    }

    pub fn validation_failed(&mut self, fields: &[&str]) -> Result<()> {
        self.log("validation_failed", serde_json::json!({ "fields": fields }))
    }

    pub fn search(&mut self, term: &str, hits: usize) -> Result<()> {
        self.log("search", serde_json::json!({ "term": term, "hits": hits }))
    }

    pub fn toast(&mut self, kind: &str, message: &str) -> Result<()> {
        self.log("toast", serde_json::json!({ "kind": kind, "message": message }))
    }

    /// Log a failed service call
    pub fn network_error(&mut self, operation: &str, status: Option<u16>, reason: &str) -> Result<()> {
        self.log(
            "network_error",
            serde_json::json!({
                "operation": operation,
                "status": status,
                "reason": reason,
            }),
        )
    }

    /// Log an error caught by the REPL's fallback handler
    pub fn unexpected_error(&mut self, error: &str) -> Result<()> {
        self.log("unexpected_error", serde_json::json!({ "error": error }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_jsonl_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.jsonl");
        let mut transcript = Transcript::new(&path, "s-1").unwrap();
        transcript.load_ok(3).unwrap();
        transcript.network_error("create", Some(500), "boom").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "load_ok");
        assert_eq!(lines[0]["count"], 3);
        assert_eq!(lines[0]["session_id"], "s-1");
        assert_eq!(lines[1]["status"], 500);
        assert!(lines[1]["ts"].is_string());
    }

    #[test]
    fn test_disabled_is_silent() {
        let mut transcript = Transcript::disabled();
        assert!(!transcript.is_enabled());
        transcript.load_ok(1).unwrap();
    }
}
