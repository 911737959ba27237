//! Client-side mirror of the last-fetched service state.

use crate::record::{Record, UserId};

#[derive(Debug, Default, Clone)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Replace the whole snapshot after a successful list
    pub fn replace(&mut self, records: Vec<Record>) {
        self.records = records;
    }

    pub fn append(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Drop every record with the given identity
    pub fn remove(&mut self, id: &UserId) {
        self.records.retain(|r| &r.user_id != id);
    }

    pub fn get(&self, id: &UserId) -> Option<&Record> {
        self.records.iter().find(|r| &r.user_id == id)
    }

    /// Case-sensitive exact match against loaded roll numbers
    pub fn contains_roll_number(&self, roll_number: &str) -> bool {
        self.records.iter().any(|r| r.roll_number == roll_number)
    }

    /// Records whose name or roll number contains `term`, ignoring case.
    /// A blank term yields the full snapshot in order.
    pub fn filter(&self, term: &str) -> Vec<Record> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return self.records.clone();
        }
        self.records
            .iter()
            .filter(|r| {
                r.name.to_lowercase().contains(&term) || r.roll_number.to_lowercase().contains(&term)
            })
            .cloned()
            .collect()
    }
}
