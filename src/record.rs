//! Student records as exchanged with the roster service.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Label shown for records without a placement status
pub const DEFAULT_STATUS: &str = "Pending";

/// Server-assigned record identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A student/user entry mirrored from the service
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_id: UserId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub roll_number: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub placement_date: Option<String>,
    #[serde(default)]
    pub placement_status: Option<String>,
}

/// The service stores nullable names and roll numbers; read `null` as empty
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Record {
    /// Display label for the placement status
    pub fn status_label(&self) -> &str {
        non_blank(&self.placement_status).unwrap_or(DEFAULT_STATUS)
    }

    /// Styling tag derived from the lowercased status, e.g. `status-placed`
    pub fn status_class(&self) -> String {
        format!("status-{}", self.status_label().to_lowercase())
    }

    pub fn email_or(&self, fallback: &'static str) -> String {
        or_fallback(&self.email, fallback)
    }

    pub fn phone_or(&self, fallback: &'static str) -> String {
        or_fallback(&self.phone, fallback)
    }

    pub fn company_or(&self, fallback: &'static str) -> String {
        or_fallback(&self.company, fallback)
    }

    pub fn placement_date_or(&self, fallback: &'static str) -> String {
        or_fallback(&self.placement_date, fallback)
    }

    /// Multi-line details block shown by the view action
    pub fn details(&self) -> String {
        format!(
            "Name: {}\nRoll Number: {}\nEmail: {}\nPhone: {}\nPlacement Status: {}\nCompany: {}\nPlacement Date: {}\nUser ID: {}",
            self.name,
            self.roll_number,
            self.email_or("N/A"),
            self.phone_or("N/A"),
            self.status_label(),
            self.company_or("N/A"),
            self.placement_date_or("N/A"),
            self.user_id,
        )
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn or_fallback(value: &Option<String>, fallback: &'static str) -> String {
    non_blank(value).unwrap_or(fallback).to_string()
}

/// Raw "add student" form input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordForm {
    pub name: String,
    pub roll_number: String,
    pub email: String,
    pub phone: String,
    pub placement_status: String,
    pub company: String,
    pub placement_date: String,
}

impl RecordForm {
    /// Set a field by its form key. Returns false for unknown keys.
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        let slot = match key {
            "name" | "studentName" => &mut self.name,
            "roll" | "rollNumber" => &mut self.roll_number,
            "email" | "studentEmail" => &mut self.email,
            "phone" | "studentPhone" => &mut self.phone,
            "status" | "placementStatus" => &mut self.placement_status,
            "company" => &mut self.company,
            "date" | "placementDate" => &mut self.placement_date,
            _ => return false,
        };
        *slot = value.to_string();
        true
    }

    /// Copy of the form with every field trimmed
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            roll_number: self.roll_number.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            placement_status: self.placement_status.trim().to_string(),
            company: self.company.trim().to_string(),
            placement_date: self.placement_date.trim().to_string(),
        }
    }

    /// Build the create payload; blank optional fields become null
    pub fn to_payload(&self) -> NewRecord {
        let form = self.trimmed();
        NewRecord {
            name: form.name,
            roll_number: form.roll_number,
            email: blank_to_none(form.email),
            phone: blank_to_none(form.phone),
            placement_status: blank_to_none(form.placement_status),
            company: blank_to_none(form.company),
            placement_date: blank_to_none(form.placement_date),
        }
    }
}

fn blank_to_none(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Body of `POST {base}`. Absent optional fields serialize as explicit null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    pub name: String,
    pub roll_number: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub placement_status: Option<String>,
    pub company: Option<String>,
    pub placement_date: Option<String>,
}
