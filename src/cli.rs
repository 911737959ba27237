use crate::{
    activity,
    api::RosterApi,
    app::{AddOutcome, App, Confirm, RemoveOutcome, Screen},
    dashboard,
    nav::Section,
    record::RecordForm,
    table::{self, RowAction},
    toast::Toast,
};
use anyhow::{Context as _, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// Interactive yes/no prompt on stdin
pub struct StdinConfirm {
    /// One-shot mode: never block on stdin
    pub print_mode: bool,
    pub auto_yes: bool,
}

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        if self.auto_yes {
            return true;
        }
        if self.print_mode {
            eprintln!("{} - denied, use --yes in -c mode", prompt);
            return false;
        }

        print!("{} [y/N]: ", prompt);
        io::stdout().flush().ok();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_ok() {
            let input = input.trim().to_lowercase();
            input == "y" || input == "yes"
        } else {
            false
        }
    }
}

pub struct Session<A: RosterApi> {
    pub app: App<A>,
    pub confirm: Box<dyn Confirm>,
    pub tracing: bool,
}

impl<A: RosterApi> Session<A> {
    pub fn new(app: App<A>, confirm: Box<dyn Confirm>) -> Self {
        Self {
            app,
            confirm,
            tracing: false,
        }
    }

    fn trace(&self, label: &str, content: &str) {
        if self.tracing {
            eprintln!("[TRACE:{}] {}", label, content);
        }
    }
}

pub fn run_once<A: RosterApi>(session: &mut Session<A>, command: &str) -> Result<()> {
    for toast in start_for_command(session) {
        println!("{}", toast);
    }
    let line = command.trim();
    let line = if line.starts_with('/') {
        line.to_string()
    } else {
        format!("/{}", line)
    };
    if let Err(e) = handle_command(session, &line) {
        session.app.unexpected(&e);
    }
    print_screens(session);
    Ok(())
}

/// Start the app for a one-shot command. The command draws its own view,
/// so only the startup notifications are kept.
fn start_for_command<A: RosterApi>(session: &mut Session<A>) -> Vec<Toast> {
    session.app.start();
    session
        .app
        .take_screens()
        .into_iter()
        .filter_map(|screen| match screen {
            Screen::Toast(toast) => Some(toast),
            _ => None,
        })
        .collect()
}

/// Set while a REPL command runs under `catch_unwind`; the panic hook stays
/// quiet then because the loop reports the panic itself.
pub static IN_COMMAND: AtomicBool = AtomicBool::new(false);

/// Run one REPL command, turning errors and panics into the fallback toast.
/// Returns true when the session should end.
fn run_guarded<A: RosterApi>(session: &mut Session<A>, input: &str) -> bool {
    IN_COMMAND.store(true, Ordering::SeqCst);
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| handle_command(session, input)));
    IN_COMMAND.store(false, Ordering::SeqCst);
    match outcome {
        Ok(Ok(exit)) => exit,
        Ok(Err(e)) => {
            session.app.unexpected(&e);
            false
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "command panicked".to_string());
            session.app.unexpected(&message);
            false
        }
    }
}

pub fn run_repl<A: RosterApi>(mut session: Session<A>) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    println!("roster - type /help for commands, /exit to quit");
    session.app.start();
    print_screens(&mut session);

    loop {
        let prompt = format!("{}> ", session.app.section());
        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line)?;

                let input = if line.starts_with('/') {
                    line.to_string()
                } else {
                    // Bare text behaves like typing into the search box
                    format!("/search {}", line)
                };

                let exit = run_guarded(&mut session, &input);
                print_screens(&mut session);
                if exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Print every pending view update
pub fn print_screens<A: RosterApi>(session: &mut Session<A>) {
    for screen in session.app.take_screens() {
        match screen {
            Screen::Table(view) => print!("{}", table::render_text(&view)),
            Screen::Dashboard(summary) => print!("{}", dashboard::render_text(&summary)),
            Screen::FormErrors(validation) => {
                for (field, message) in &validation.field_errors {
                    println!("  {}: {}", field, message);
                }
            }
            Screen::Details(details) => {
                for line in details.lines() {
                    println!("  {}", table::escape_text(line));
                }
            }
            Screen::Toast(toast) => println!("{}", toast),
        }
    }
}

/// Handle one slash command. Returns true when the session should end.
pub fn handle_command<A: RosterApi>(session: &mut Session<A>, cmd: &str) -> Result<bool> {
    let parts: Vec<&str> = cmd.splitn(2, ' ').collect();
    let rest = parts.get(1).map(|s| s.trim()).unwrap_or("");
    session.trace("COMMAND", cmd);

    match parts[0] {
        "/exit" | "/quit" => return Ok(true),
        "/help" => print_help(),
        "/nav" => {
            if rest.is_empty() {
                println!("Current section: {}", session.app.section());
            } else if session.app.activate(rest).is_none() {
                let known: Vec<&str> = Section::ALL.iter().map(|s| s.id()).collect();
                println!("Unknown section: {}. Available: {}", rest, known.join(", "));
            }
        }
        "/dashboard" => {
            session.app.activate(Section::Dashboard.id());
        }
        "/list" => {
            session.app.activate(Section::Students.id());
        }
        "/search" => {
            if session.app.section() != Section::Students {
                session.app.activate(Section::Students.id());
            }
            let hits = session.app.filter(rest);
            session.trace("SEARCH", &format!("{:?} -> {} hits", rest, hits));
        }
        "/add" => handle_add(session, rest),
        "/reset" => {
            session.app.reset_form();
            println!("Form cleared");
        }
        "/form" => {
            let form = session.app.form();
            println!("Pending form: {:?}", form);
            for (field, message) in &session.app.form_errors().field_errors {
                println!("  {}: {}", field, message);
            }
        }
        "/view" | "/delete" => {
            let Some((id, name)) = session.app.resolve(rest) else {
                println!("Usage: {} <user-id | #row>", parts[0]);
                return Ok(false);
            };
            if session.app.store().get(&id).is_none() && parts[0] == "/view" {
                println!("No student with id {}", id);
                return Ok(false);
            }
            let action = if parts[0] == "/view" {
                RowAction::View(id)
            } else {
                RowAction::Delete { id, name }
            };
            if session.app.dispatch(&action, session.confirm.as_ref()) == Some(RemoveOutcome::Cancelled) {
                println!("Cancelled");
            }
        }
        "/export" => {
            if rest.is_empty() {
                println!("Usage: /export <path.html>");
            } else {
                export_html(&session.app, Path::new(rest))?;
                println!("Wrote {}", rest);
            }
        }
        "/activity" => {
            let log = session.app.activity();
            if log.is_empty() {
                println!("{}", dashboard::NO_ACTIVITY);
            } else {
                println!("Activity ({} entries, newest first):", log.len());
            }
            let now = chrono::Utc::now();
            for entry in log.entries().iter().rev() {
                println!(
                    "  [{}] {} ({})",
                    entry.kind.as_str(),
                    table::escape_text(&entry.message),
                    activity::relative_time(entry.timestamp, now)
                );
            }
        }
        "/session" => {
            let transcript = session.app.transcript();
            println!("Session: {}", transcript.session_id());
            if transcript.is_enabled() {
                println!("Transcript: {:?}", transcript.path);
            } else {
                println!("Transcript: disabled");
            }
            if let Some(toast) = session.app.toaster().current() {
                println!("Visible toast: {}", toast);
            }
            println!("Service: {}", session.app.config().service.base_url);
            let store = session.app.store();
            if store.is_empty() {
                println!("Records loaded: none");
            } else {
                println!("Records loaded: {}", store.len());
            }
        }
        "/config" => {
            print!("{}", session.app.config().to_toml()?);
        }
        "/trace" => {
            session.tracing = !session.tracing;
            println!("Tracing: {}", if session.tracing { "on" } else { "off" });
        }
        _ => println!("Unknown command: {}", parts[0]),
    }
    Ok(false)
}

fn handle_add<A: RosterApi>(session: &mut Session<A>, args: &str) {
    let Some(form) = parse_form(args) else {
        println!("Usage: /add name=\"Full Name\" roll=R1 [email=.. phone=.. status=.. company=.. date=..]");
        return;
    };
    session.app.activate(Section::Add.id());
    match session.app.add_record(form) {
        AddOutcome::Added(id) => session.trace("ADD", &format!("created {}", id)),
        AddOutcome::Invalid(_) => println!("Form has errors:"),
        AddOutcome::Failed(_) => {}
    }
}

/// Parse `key=value` pairs (shell quoting rules) into a form
pub fn parse_form(args: &str) -> Option<RecordForm> {
    let words = shell_words::split(args).ok()?;
    let mut form = RecordForm::default();
    for word in words {
        let (key, value) = word.split_once('=')?;
        if !form.set(key, value) {
            return None;
        }
    }
    Some(form)
}

fn export_html<A: RosterApi>(app: &App<A>, path: &Path) -> Result<()> {
    let html = table::render_html(app.table());
    std::fs::write(path, html).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  /exit                 - quit");
    println!("  /help                 - show commands");
    println!("  /nav [section]        - show or switch section (dashboard|students|add)");
    println!("  /dashboard            - show the dashboard");
    println!("  /list                 - reload and show all students");
    println!("  /search [term]        - filter by name or roll number");
    println!("  /add key=value ...    - add a student (name, roll, email, phone, status, company, date)");
    println!("  /form                 - show the pending form and its errors");
    println!("  /reset                - clear the form");
    println!("  /view <id|#row>       - show student details");
    println!("  /delete <id|#row>     - delete a student");
    println!("  /export <path>        - write the current table as HTML");
    println!("  /activity             - show the full activity log");
    println!("Session:");
    println!("  /session              - show session info");
    println!("  /config               - show effective configuration");
    println!("  /trace                - toggle tracing");
    println!("Any other input is treated as a search term.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;
    use crate::api::Operation;
    use crate::config::Config;
    use crate::record::{Record, UserId};
    use crate::toast::ToastKind;
    use crate::transcript::Transcript;

    fn session() -> Session<FakeApi> {
        let api = FakeApi::with_records(vec![
            Record {
                user_id: UserId::new("a"),
                name: "Ann Lee".to_string(),
                roll_number: "R1".to_string(),
                ..Default::default()
            },
            Record {
                user_id: UserId::new("b"),
                name: "Bob Stone".to_string(),
                roll_number: "R2".to_string(),
                ..Default::default()
            },
        ]);
        let mut app = App::new(api, Config::default(), Transcript::disabled());
        app.start();
        Session::new(
            app,
            Box::new(StdinConfirm {
                print_mode: true,
                auto_yes: true,
            }),
        )
    }

    #[test]
    fn test_parse_form_quoted() {
        let form = parse_form(r#"name="Ann Marie Lee" roll=R7 company='Acme Corp'"#).unwrap();
        assert_eq!(form.name, "Ann Marie Lee");
        assert_eq!(form.roll_number, "R7");
        assert_eq!(form.company, "Acme Corp");
    }

    #[test]
    fn test_parse_form_rejects_bad_input() {
        assert!(parse_form("name").is_none());
        assert!(parse_form("age=3").is_none());
        assert!(parse_form("name=\"unterminated").is_none());
    }

    #[test]
    fn test_exit_command() {
        let mut s = session();
        assert!(handle_command(&mut s, "/exit").unwrap());
        assert!(!handle_command(&mut s, "/help").unwrap());
    }

    #[test]
    fn test_add_and_delete_by_row() {
        let mut s = session();
        handle_command(&mut s, "/add name=\"Cara Rae\" roll=R3").unwrap();
        assert_eq!(s.app.store().len(), 3);
        assert_eq!(s.app.section(), Section::Add);

        handle_command(&mut s, "/list").unwrap();
        handle_command(&mut s, "/delete #1").unwrap();
        assert!(s.app.store().get(&UserId::new("a")).is_none());
        assert_eq!(s.app.api().call_count(Operation::Delete), 1);
    }

    #[test]
    fn test_search_switches_to_students() {
        let mut s = session();
        handle_command(&mut s, "/search bob").unwrap();
        assert_eq!(s.app.section(), Section::Students);
        assert_eq!(s.app.table().rows.len(), 1);
    }

    #[test]
    fn test_unknown_section_keeps_current() {
        let mut s = session();
        handle_command(&mut s, "/nav reports").unwrap();
        assert_eq!(s.app.section(), Section::Dashboard);
    }

    #[test]
    fn test_export_writes_html() {
        let mut s = session();
        handle_command(&mut s, "/list").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.html");
        handle_command(&mut s, &format!("/export {}", path.display())).unwrap();
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("Showing 2 students"));
        assert!(html.contains("Bob Stone"));
    }

    #[test]
    fn test_one_shot_keeps_startup_load_error() {
        let mut s = session();
        s.app.api().fail_list.set(true);
        let toasts = start_for_command(&mut s);
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, ToastKind::Error);
        assert_eq!(toasts[0].message, crate::app::LOAD_ERROR);
        assert!(s.app.take_screens().is_empty());
    }

    #[test]
    fn test_panicking_command_becomes_fallback_toast() {
        let mut s = session();
        s.app.take_screens();
        s.app.api().panic_list.set(true);
        assert!(!run_guarded(&mut s, "/list"));
        let screens = s.app.take_screens();
        let toast = screens
            .iter()
            .find_map(|screen| match screen {
                Screen::Toast(t) => Some(t.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.message, crate::app::UNEXPECTED_ERROR);

        // The session keeps working after the panic
        s.app.api().panic_list.set(false);
        assert!(!run_guarded(&mut s, "/list"));
        assert_eq!(s.app.store().len(), 2);
    }

    #[test]
    fn test_guarded_exit() {
        let mut s = session();
        assert!(run_guarded(&mut s, "/exit"));
    }

    #[test]
    fn test_confirm_denied_in_print_mode() {
        let confirm = StdinConfirm {
            print_mode: true,
            auto_yes: false,
        };
        assert!(!confirm.confirm("Are you sure you want to delete Ann Lee?"));
    }
}
