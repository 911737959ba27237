//! Application controller: owns all client state and runs the load, add,
//! remove, search, view and navigation flows.

use crate::activity::{ActivityKind, ActivityLog};
use crate::api::{NetworkError, RosterApi};
use crate::config::{Config, LoadFailure};
use crate::dashboard::{self, DashboardSummary};
use crate::nav::{NavEffect, Navigator, Section};
use crate::record::{Record, RecordForm, UserId};
use crate::store::RecordStore;
use crate::table::{self, RowAction, TableView};
use crate::toast::{Toast, ToastKind, Toaster};
use crate::transcript::Transcript;
use crate::validate::{self, Validation};
use chrono::Utc;
use std::fmt;
use std::time::Duration;

pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred";
pub const LOAD_ERROR: &str = "Error loading students. Please refresh the page.";

/// Blocking yes/no prompt used before destructive actions
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

/// A view update waiting to be shown. Updates of the same kind coalesce,
/// so the last render wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Table(TableView),
    Dashboard(DashboardSummary),
    FormErrors(Validation),
    Details(String),
    Toast(Toast),
}

impl Screen {
    fn same_kind(&self, other: &Screen) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Invalid(Validation),
    Added(UserId),
    Failed(NetworkError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Cancelled,
    Removed,
    Failed(NetworkError),
}

pub struct App<A: RosterApi> {
    api: A,
    config: Config,
    store: RecordStore,
    activity: ActivityLog,
    toaster: Toaster,
    nav: Navigator,
    form: RecordForm,
    form_errors: Validation,
    table: TableView,
    dashboard: DashboardSummary,
    screens: Vec<Screen>,
    transcript: Transcript,
    verbose: bool,
}

impl<A: RosterApi> App<A> {
    pub fn new(api: A, config: Config, transcript: Transcript) -> Self {
        let activity = ActivityLog::with_capacity(config.activity.capacity);
        let toaster = Toaster::new(Duration::from_millis(config.toast.duration_ms));
        let store = RecordStore::new();
        let dashboard = dashboard::summarize(&store, &activity, &config.dashboard, Utc::now());
        Self {
            api,
            config,
            store,
            activity,
            toaster,
            nav: Navigator::default(),
            form: RecordForm::default(),
            form_errors: Validation::default(),
            table: table::project(&[]),
            dashboard,
            screens: Vec::new(),
            transcript,
            verbose: false,
        }
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    #[cfg(test)]
    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn toaster(&self) -> &Toaster {
        &self.toaster
    }

    pub fn section(&self) -> Section {
        self.nav.active()
    }

    pub fn form(&self) -> &RecordForm {
        &self.form
    }

    pub fn form_errors(&self) -> &Validation {
        &self.form_errors
    }

    /// The most recently rendered table, visible or not
    pub fn table(&self) -> &TableView {
        &self.table
    }

    #[cfg(test)]
    pub fn dashboard(&self) -> &DashboardSummary {
        &self.dashboard
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Drain pending view updates in the order they were produced
    pub fn take_screens(&mut self) -> Vec<Screen> {
        std::mem::take(&mut self.screens)
    }

    fn show(&mut self, screen: Screen) {
        if matches!(screen, Screen::Table(_) | Screen::Dashboard(_) | Screen::FormErrors(_)) {
            self.screens.retain(|s| !s.same_kind(&screen));
        }
        self.screens.push(screen);
    }

    fn diag(&self, message: &str) {
        if self.verbose {
            eprintln!("[VERBOSE] {}", message);
        }
    }

    pub fn notify(&mut self, message: impl Into<String>, kind: ToastKind) {
        let toast = self.toaster.notify(message, kind).clone();
        let _ = self.transcript.toast(toast.kind.as_str(), &toast.message);
        self.show(Screen::Toast(toast));
    }

    fn report_network(&mut self, context: &str, err: &NetworkError) {
        self.diag(&format!("{}: {}", context, err));
        let _ = self
            .transcript
            .network_error(err.operation.as_str(), err.status, &err.reason);
    }

    /// Last-resort handler for errors nothing else caught
    pub fn unexpected(&mut self, err: &dyn fmt::Display) {
        eprintln!("Error: {}", err);
        let _ = self.transcript.unexpected_error(&err.to_string());
        self.notify(UNEXPECTED_ERROR, ToastKind::Error);
    }

    fn render_table(&mut self, records: &[Record]) {
        self.table = table::project(records);
        if self.nav.active() == Section::Students {
            self.show(Screen::Table(self.table.clone()));
        }
    }

    /// Recompute dashboard counters and feed; shown when the dashboard is active
    pub fn update_dashboard(&mut self) {
        self.dashboard = dashboard::summarize(
            &self.store,
            &self.activity,
            &self.config.dashboard,
            Utc::now(),
        );
        if self.nav.active() == Section::Dashboard {
            self.show(Screen::Dashboard(self.dashboard.clone()));
        }
    }

    /// Initial load: fetch records, then draw the dashboard
    pub fn start(&mut self) {
        self.load_all();
        self.update_dashboard();
    }

    /// Switch sections and run the section's side effect.
    /// Returns `None` for an unknown section id.
    pub fn activate(&mut self, section_id: &str) -> Option<NavEffect> {
        let effect = self.nav.activate(section_id)?;
        let _ = self.transcript.navigate(section_id);
        match effect {
            NavEffect::Reload => {
                self.load_all();
            }
            NavEffect::RefreshDashboard => self.update_dashboard(),
            NavEffect::None => {}
        }
        Some(effect)
    }

    /// Replace the store from the service. Returns whether the load succeeded.
    pub fn load_all(&mut self) -> bool {
        match self.api.list_all() {
            Ok(records) => {
                let _ = self.transcript.load_ok(records.len());
                self.diag(&format!("Loaded {} records", records.len()));
                self.store.replace(records);
                let snapshot = self.store.records().to_vec();
                self.render_table(&snapshot);
                self.update_dashboard();
                true
            }
            Err(e) => {
                self.report_network("Error loading students", &e);
                self.notify(LOAD_ERROR, ToastKind::Error);
                match self.config.load.on_failure {
                    LoadFailure::Empty => self.render_table(&[]),
                    LoadFailure::Keep => {
                        let snapshot = self.store.records().to_vec();
                        self.render_table(&snapshot);
                    }
                }
                false
            }
        }
    }

    /// Validate and submit the form. No request is made for invalid input.
    pub fn add_record(&mut self, form: RecordForm) -> AddOutcome {
        let form = form.trimmed();
        self.form = form.clone();

        self.form_errors = Validation::default();
        let validation = validate::validate(&form.name, &form.roll_number, &self.store);
        if !validation.is_valid() {
            let fields: Vec<&str> = validation.field_errors.keys().map(|f| f.id()).collect();
            let _ = self.transcript.validation_failed(&fields);
            self.form_errors = validation.clone();
            self.show(Screen::FormErrors(validation.clone()));
            return AddOutcome::Invalid(validation);
        }

        match self.api.create(&form.to_payload()) {
            Ok(record) => {
                let id = record.user_id.clone();
                let _ = self.transcript.record_added(id.as_str(), &record.roll_number);
                self.store.append(record);
                self.activity.record(
                    ActivityKind::Add,
                    format!("Added student: {} ({})", form.name, form.roll_number),
                );
                self.notify(
                    format!("Student {} added successfully!", form.name),
                    ToastKind::Success,
                );
                self.reset_form();
                // The service is authoritative; resync after the local append.
                self.load_all();
                self.update_dashboard();
                AddOutcome::Added(id)
            }
            Err(e) => {
                self.report_network("Error adding student", &e);
                self.notify("Error adding student: Failed to add student", ToastKind::Error);
                AddOutcome::Failed(e)
            }
        }
    }

    /// Clear the pending form and its inline errors
    pub fn reset_form(&mut self) {
        self.form = RecordForm::default();
        self.form_errors = Validation::default();
    }

    /// Delete a record after confirmation
    pub fn remove_record(&mut self, id: &UserId, name: &str, confirm: &dyn Confirm) -> RemoveOutcome {
        if !confirm.confirm(&format!("Are you sure you want to delete {}?", name)) {
            return RemoveOutcome::Cancelled;
        }

        match self.api.delete_by_id(id) {
            Ok(()) => {
                let _ = self.transcript.record_deleted(id.as_str());
                self.store.remove(id);
                let snapshot = self.store.records().to_vec();
                self.render_table(&snapshot);
                self.activity
                    .record(ActivityKind::Remove, format!("Deleted student: {}", name));
                self.notify(format!("Student {} deleted successfully!", name), ToastKind::Success);
                self.update_dashboard();
                RemoveOutcome::Removed
            }
            Err(e) => {
                self.report_network("Error deleting student", &e);
                self.notify("Error deleting student: Failed to delete student", ToastKind::Error);
                self.load_all();
                RemoveOutcome::Failed(e)
            }
        }
    }

    /// Render the records matching `term` without touching the store
    pub fn filter(&mut self, term: &str) -> usize {
        let term = term.trim().to_lowercase();
        let hits = self.store.filter(&term);
        if !term.is_empty() {
            self.activity
                .record(ActivityKind::View, format!("Searched for: \"{}\"", term));
            let _ = self.transcript.search(&term, hits.len());
        }
        self.render_table(&hits);
        hits.len()
    }

    /// Show a record's details. Unknown ids do nothing.
    pub fn view_details(&mut self, id: &UserId) -> Option<String> {
        let record = self.store.get(id)?;
        let details = record.details();
        let message = format!("Viewed student: {}", record.name);
        self.activity.record(ActivityKind::View, message);
        self.show(Screen::Details(details.clone()));
        Some(details)
    }

    /// Run a row action from the table
    pub fn dispatch(&mut self, action: &RowAction, confirm: &dyn Confirm) -> Option<RemoveOutcome> {
        match action {
            RowAction::View(id) => {
                self.view_details(id);
                None
            }
            RowAction::Delete { id, name } => Some(self.remove_record(id, name, confirm)),
        }
    }

    /// Resolve a row reference: `#N` is the N-th row of the last rendered
    /// table, anything else is taken as a user id.
    pub fn resolve(&self, reference: &str) -> Option<(UserId, String)> {
        if let Some(pos) = reference.strip_prefix('#') {
            let row = self.table.row(pos.parse().ok()?)?;
            return Some((row.user_id.clone(), row.name.clone()));
        }
        let id = UserId::new(reference);
        if id.is_empty() {
            return None;
        }
        let name = self
            .store
            .get(&id)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| reference.to_string());
        Some((id, name))
    }
}
