//! Single-slot transient notifications.

use std::fmt;
use std::time::{Duration, Instant};

pub const DEFAULT_DURATION: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Error,
}

impl ToastKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    shown_at: Instant,
}

impl fmt::Display for Toast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.kind {
            ToastKind::Info => "i",
            ToastKind::Success => "+",
            ToastKind::Error => "!",
        };
        write!(f, "[{}] {}", marker, self.message)
    }
}

#[derive(Debug)]
pub struct Toaster {
    slot: Option<Toast>,
    duration: Duration,
}

impl Default for Toaster {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION)
    }
}

impl Toaster {
    pub fn new(duration: Duration) -> Self {
        Self { slot: None, duration }
    }

    /// Show a toast, replacing whatever is visible
    pub fn notify(&mut self, message: impl Into<String>, kind: ToastKind) -> &Toast {
        self.notify_at(message, kind, Instant::now())
    }

    pub fn notify_at(&mut self, message: impl Into<String>, kind: ToastKind, now: Instant) -> &Toast {
        self.slot.insert(Toast {
            message: message.into(),
            kind,
            shown_at: now,
        })
    }

    /// The visible toast, if its window has not elapsed
    pub fn current(&self) -> Option<&Toast> {
        self.current_at(Instant::now())
    }

    pub fn current_at(&self, now: Instant) -> Option<&Toast> {
        self.slot
            .as_ref()
            .filter(|t| now.saturating_duration_since(t.shown_at) < self.duration)
    }

    /// Most recent toast regardless of expiry
    #[cfg(test)]
    pub fn last(&self) -> Option<&Toast> {
        self.slot.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_toast_replaces_previous() {
        let mut toaster = Toaster::default();
        let now = Instant::now();
        toaster.notify_at("first", ToastKind::Info, now);
        toaster.notify_at("second", ToastKind::Error, now);
        let current = toaster.current_at(now).unwrap();
        assert_eq!(current.message, "second");
        assert_eq!(current.kind, ToastKind::Error);
    }

    #[test]
    fn test_auto_clears_after_window() {
        let mut toaster = Toaster::default();
        let now = Instant::now();
        toaster.notify_at("saved", ToastKind::Success, now);
        assert!(toaster.current_at(now + Duration::from_millis(2999)).is_some());
        assert!(toaster.current_at(now + Duration::from_millis(3000)).is_none());
        assert_eq!(toaster.last().map(|t| t.message.as_str()), Some("saved"));
    }

    #[test]
    fn test_display_marker() {
        let mut toaster = Toaster::default();
        let toast = toaster.notify("Oops", ToastKind::Error);
        assert_eq!(toast.to_string(), "[!] Oops");
    }
}
