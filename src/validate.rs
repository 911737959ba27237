//! Field validation for the "add student" form.

use crate::store::RecordStore;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z\s]+$").unwrap());

const NAME_MIN_CHARS: usize = 3;
const ROLL_MIN_CHARS: usize = 2;

/// Form fields that carry inline errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Name,
    RollNumber,
}

impl Field {
    /// Identifier of the form input
    pub fn id(&self) -> &'static str {
        match self {
            Self::Name => "studentName",
            Self::RollNumber => "rollNumber",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Outcome of a validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    pub field_errors: BTreeMap<Field, String>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty()
    }

    #[cfg(test)]
    pub fn error(&self, field: Field) -> Option<&str> {
        self.field_errors.get(&field).map(String::as_str)
    }
}

/// Validate name and roll number. Each field reports its first failing rule.
pub fn validate(name: &str, roll_number: &str, store: &RecordStore) -> Validation {
    let mut validation = Validation::default();

    if let Some(msg) = check_name(name) {
        validation.field_errors.insert(Field::Name, msg.to_string());
    }
    if let Some(msg) = check_roll_number(roll_number, store) {
        validation.field_errors.insert(Field::RollNumber, msg.to_string());
    }

    validation
}

fn check_name(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        Some("Name is required")
    } else if name.chars().count() < NAME_MIN_CHARS {
        Some("Name must be at least 3 characters")
    } else if !NAME_PATTERN.is_match(name) {
        Some("Name can only contain letters and spaces")
    } else {
        None
    }
}

fn check_roll_number(roll_number: &str, store: &RecordStore) -> Option<&'static str> {
    if roll_number.is_empty() {
        Some("Roll Number is required")
    } else if roll_number.chars().count() < ROLL_MIN_CHARS {
        Some("Roll Number must be at least 2 characters")
    } else if store.contains_roll_number(roll_number) {
        Some("This Roll Number already exists")
    } else {
        None
    }
}
