//! Table projection of records and its terminal/HTML renderers.
//!
//! `project` is pure: it turns records into a `TableView` that carries
//! already-resolved labels and per-row actions. The renderers only format.

use crate::record::{Record, UserId};

pub const EMPTY_MESSAGE: &str = "No students enrolled yet";
const MISSING: &str = "-";
const HEADERS: [&str; 7] = ["Roll No", "Name", "Email", "Phone", "Status", "Company", "Actions"];

/// Action trigger attached to a row, keyed by record identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    View(UserId),
    Delete { id: UserId, name: String },
}

impl RowAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::View(_) => "View",
            Self::Delete { .. } => "Delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    /// 1-based position in the rendered table
    pub position: usize,
    pub user_id: UserId,
    pub roll_number: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub status_label: String,
    pub status_class: String,
    pub company: String,
    pub actions: Vec<RowAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableView {
    pub rows: Vec<RowView>,
    pub caption: String,
}

impl TableView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row at a 1-based position
    pub fn row(&self, position: usize) -> Option<&RowView> {
        position.checked_sub(1).and_then(|i| self.rows.get(i))
    }
}

pub fn caption(count: usize) -> String {
    format!("Showing {} student{}", count, if count == 1 { "" } else { "s" })
}

pub fn project(records: &[Record]) -> TableView {
    let rows = records
        .iter()
        .enumerate()
        .map(|(i, r)| RowView {
            position: i + 1,
            user_id: r.user_id.clone(),
            roll_number: r.roll_number.clone(),
            name: r.name.clone(),
            email: r.email_or(MISSING),
            phone: r.phone_or(MISSING),
            status_label: r.status_label().to_string(),
            status_class: r.status_class(),
            company: r.company_or(MISSING),
            actions: vec![
                RowAction::View(r.user_id.clone()),
                RowAction::Delete {
                    id: r.user_id.clone(),
                    name: r.name.clone(),
                },
            ],
        })
        .collect();

    TableView {
        rows,
        caption: caption(records.len()),
    }
}

/// Escape text for embedding in HTML
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text for a terminal cell: control characters (including escape
/// sequences and newlines) are shown as `\u{..}` instead of being emitted.
pub fn escape_text(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_control() {
                c.escape_unicode().to_string()
            } else {
                c.to_string()
            }
        })
        .collect()
}

pub fn render_text(view: &TableView) -> String {
    if view.is_empty() {
        return format!("  ({})\n{}\n", EMPTY_MESSAGE, view.caption);
    }

    let cells: Vec<[String; 7]> = view
        .rows
        .iter()
        .map(|row| {
            [
                escape_text(&row.roll_number),
                escape_text(&row.name),
                escape_text(&row.email),
                escape_text(&row.phone),
                format!("[{}]", escape_text(&row.status_label)),
                escape_text(&row.company),
                format!("#{}: view | delete", row.position),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &HEADERS.map(String::from), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');
    for row in &cells {
        push_line(&mut out, row, &widths);
    }
    out.push_str(&view.caption);
    out.push('\n');
    out
}

fn push_line(out: &mut String, cells: &[String; 7], widths: &[usize; 7]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths.iter())
        .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
        .collect();
    out.push_str(padded.join("  ").trim_end());
    out.push('\n');
}

/// Standalone HTML document for the table view
pub fn render_html(view: &TableView) -> String {
    let mut body = String::new();
    if view.is_empty() {
        body.push_str(&format!(
            "      <tr class=\"empty-row\"><td colspan=\"7\" class=\"empty-state\"><p>{}</p></td></tr>\n",
            EMPTY_MESSAGE
        ));
    }
    for row in &view.rows {
        let actions: Vec<String> = row
            .actions
            .iter()
            .map(|a| {
                format!(
                    "<button data-action=\"{}\" data-user-id=\"{}\">{}</button>",
                    a.label().to_lowercase(),
                    escape_html(row.user_id.as_str()),
                    a.label()
                )
            })
            .collect();
        body.push_str(&format!(
            "      <tr><td><strong>{}</strong></td><td>{}</td><td>{}</td><td>{}</td><td><span class=\"status-badge {}\">{}</span></td><td>{}</td><td>{}</td></tr>\n",
            escape_html(&row.roll_number),
            escape_html(&row.name),
            escape_html(&row.email),
            escape_html(&row.phone),
            escape_html(&row.status_class),
            escape_html(&row.status_label),
            escape_html(&row.company),
            actions.join(" "),
        ));
    }

    let header: String = HEADERS.iter().map(|h| format!("<th>{}</th>", h)).collect();
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Students</title></head>\n<body>\n  <table>\n    <thead><tr>{}</tr></thead>\n    <tbody>\n{}    </tbody>\n  </table>\n  <p id=\"studentCount\">{}</p>\n</body>\n</html>\n",
        header,
        body,
        escape_html(&view.caption)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str, roll: &str) -> Record {
        Record {
            user_id: UserId::new(id),
            name: name.to_string(),
            roll_number: roll.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_projection() {
        let view = project(&[]);
        assert!(view.is_empty());
        assert_eq!(view.caption, "Showing 0 students");
        let text = render_text(&view);
        assert!(text.contains(EMPTY_MESSAGE));
        assert!(text.contains("Showing 0 students"));
        assert!(render_html(&view).contains("empty-state"));
    }

    #[test]
    fn test_caption_pluralization() {
        assert_eq!(caption(1), "Showing 1 student");
        assert_eq!(caption(2), "Showing 2 students");
        let view = project(&[record("1", "Ann Lee", "R1")]);
        assert_eq!(view.caption, "Showing 1 student");
    }

    #[test]
    fn test_rows_follow_input_order_with_fallbacks() {
        let mut placed = record("2", "Bob Stone", "R2");
        placed.placement_status = Some("Placed".to_string());
        placed.company = Some("Acme".to_string());
        let view = project(&[placed, record("1", "Ann Lee", "R1")]);

        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.rows[0].roll_number, "R2");
        assert_eq!(view.rows[0].status_class, "status-placed");
        assert_eq!(view.rows[0].company, "Acme");
        assert_eq!(view.rows[1].email, "-");
        assert_eq!(view.rows[1].status_label, "Pending");
        assert_eq!(view.row(2).map(|r| r.user_id.as_str()), Some("1"));
        assert!(view.row(0).is_none());
        assert_eq!(
            view.rows[1].actions[1],
            RowAction::Delete {
                id: UserId::new("1"),
                name: "Ann Lee".to_string()
            }
        );
    }

    #[test]
    fn test_html_escapes_fields() {
        let view = project(&[record("x\"1", "<b>Ann</b>", "R&1")]);
        let html = render_html(&view);
        assert!(html.contains("&lt;b&gt;Ann&lt;/b&gt;"));
        assert!(html.contains("R&amp;1"));
        assert!(html.contains("data-user-id=\"x&quot;1\""));
        assert!(!html.contains("<b>Ann"));
    }

    #[test]
    fn test_escape_empty() {
        assert_eq!(escape_html(""), "");
        assert_eq!(escape_text(""), "");
    }

    #[test]
    fn test_text_escapes_control_chars() {
        let view = project(&[record("1", "Ann\x1b[31m", "R1")]);
        let text = render_text(&view);
        assert!(!text.contains('\x1b'));
        assert!(text.contains("\\u{1b}"));
        assert!(text.contains("Showing 1 student"));
    }
}
