//! Dashboard summary derived from the record store and activity log.

use crate::activity::{relative_time, ActivityLog};
use crate::config::DashboardConfig;
use crate::store::RecordStore;
use crate::table::escape_text;
use chrono::{DateTime, Utc};

pub const NO_ACTIVITY: &str = "No recent activity";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityView {
    pub icon: &'static str,
    pub message: String,
    pub time_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    pub total: usize,
    pub registered: usize,
    pub success_rate: String,
    pub recent: Vec<ActivityView>,
}

pub fn summarize(
    store: &RecordStore,
    log: &ActivityLog,
    config: &DashboardConfig,
    now: DateTime<Utc>,
) -> DashboardSummary {
    let total = store.len();
    // Placeholder metrics: registered mirrors total, success rate is a
    // configured label whenever anything is loaded.
    let success_rate = if total > 0 {
        config.success_rate.clone()
    } else {
        "0%".to_string()
    };

    let recent = log
        .recent(config.recent)
        .into_iter()
        .map(|entry| ActivityView {
            icon: entry.kind.icon(),
            message: entry.message.clone(),
            time_label: relative_time(entry.timestamp, now),
        })
        .collect();

    DashboardSummary {
        total,
        registered: total,
        success_rate,
        recent,
    }
}

pub fn render_text(summary: &DashboardSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("Total students:   {}\n", summary.total));
    out.push_str(&format!("Registered:       {}\n", summary.registered));
    out.push_str(&format!("Success rate:     {}\n", summary.success_rate));
    out.push_str("\nRecent activity:\n");
    if summary.recent.is_empty() {
        out.push_str(&format!("  {}\n", NO_ACTIVITY));
    }
    for item in &summary.recent {
        out.push_str(&format!(
            "  ({}) {}  - {}\n",
            item.icon,
            escape_text(&item.message),
            item.time_label
        ));
    }
    out
}
