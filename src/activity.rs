//! Bounded in-memory feed of recent user actions.

use chrono::{DateTime, Local, Utc};

pub const DEFAULT_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Add,
    Remove,
    Update,
    View,
}

impl ActivityKind {
    /// Icon tag shown next to the entry
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Add => "user-plus",
            Self::Remove => "user-minus",
            Self::Update => "edit",
            Self::View => "eye",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Update => "update",
            Self::View => "view",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    pub kind: ActivityKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: Vec<ActivityEntry>,
    capacity: usize,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl ActivityLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&mut self, kind: ActivityKind, message: impl Into<String>) {
        self.record_at(kind, message, Utc::now());
    }

    pub fn record_at(&mut self, kind: ActivityKind, message: impl Into<String>, timestamp: DateTime<Utc>) {
        self.entries.push(ActivityEntry {
            kind,
            message: message.into(),
            timestamp,
        });
        if self.entries.len() > self.capacity {
            let excess = self.entries.len() - self.capacity;
            self.entries.drain(..excess);
        }
    }

    /// Entries in insertion order
    pub fn entries(&self) -> &[ActivityEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `limit` most recent entries, newest first. Ties on timestamp
    /// keep the later insertion first.
    pub fn recent(&self, limit: usize) -> Vec<&ActivityEntry> {
        let mut newest: Vec<&ActivityEntry> = self.entries.iter().rev().collect();
        newest.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        newest.truncate(limit);
        newest
    }
}

/// Human label for how long ago `then` was, relative to `now`
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{} minute{} ago", minutes, plural(minutes))
    } else if hours < 24 {
        format!("{} hour{} ago", hours, plural(hours))
    } else if days < 7 {
        format!("{} day{} ago", days, plural(days))
    } else {
        then.with_timezone(&Local).format("%Y-%m-%d").to_string()
    }
}

fn plural(n: i64) -> &'static str {
    if n > 1 {
        "s"
    } else {
        ""
    }
}
