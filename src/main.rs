mod activity;
mod api;
mod app;
mod cli;
mod config;
mod dashboard;
mod nav;
mod record;
mod store;
mod table;
mod toast;
mod transcript;
mod validate;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "roster", about = "Terminal client for a student roster service")]
pub struct Args {
    #[arg(short, long, help = "Run a single command (e.g. \"/list\") and exit")]
    pub command: Option<String>,

    #[arg(long, env = "ROSTER_BASE_URL", help = "Service base URL (overrides config)")]
    pub base_url: Option<String>,

    #[arg(long, value_name = "MS", help = "Request timeout in milliseconds")]
    pub timeout_ms: Option<u64>,

    #[arg(
        long,
        value_name = "MODE",
        help = "Table contents after a failed reload: empty, keep"
    )]
    pub on_failure: Option<String>,

    #[arg(long, help = "Config file path")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Print the effective configuration and exit")]
    pub print_config: bool,

    #[arg(long, help = "Auto-confirm deletions")]
    pub yes: bool,

    #[arg(long, help = "Session transcripts directory")]
    pub transcripts_dir: Option<PathBuf>,

    #[arg(long, help = "Do not write a session transcript")]
    pub no_transcript: bool,

    #[arg(long, help = "Enable tracing of commands")]
    pub trace: bool,

    #[arg(long, help = "Verbose output (print service errors)")]
    pub verbose: bool,

    #[arg(long, help = "Debug output (print settings)")]
    pub debug: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let root = std::env::current_dir()?;

    let mut cfg = if let Some(config_path) = &args.config {
        config::Config::load_from(config_path)?
    } else {
        config::Config::load(&root)?
    };

    // CLI overrides
    if let Some(base_url) = &args.base_url {
        cfg.service.base_url = base_url.clone();
    }
    if let Some(timeout_ms) = args.timeout_ms {
        cfg.service.timeout_ms = Some(timeout_ms);
    }
    if let Some(mode_str) = &args.on_failure {
        if let Some(mode) = config::LoadFailure::from_str(mode_str) {
            cfg.load.on_failure = mode;
        } else {
            return Err(anyhow::anyhow!(
                "Invalid load failure mode: {}. Use: empty, keep",
                mode_str
            ));
        }
    }

    if let Err(errors) = cfg.validate() {
        for err in &errors {
            eprintln!("Config error {}", err);
        }
        return Err(anyhow::anyhow!("Invalid configuration ({} errors)", errors.len()));
    }

    if args.print_config {
        print!("{}", cfg.to_toml()?);
        return Ok(());
    }

    if args.debug {
        eprintln!("[DEBUG] Service: {}", cfg.service.base_url);
        eprintln!("[DEBUG] Timeout: {:?}", cfg.service.timeout_ms);
        eprintln!("[DEBUG] Load failure mode: {}", cfg.load.on_failure.as_str());
        eprintln!("[DEBUG] Activity capacity: {}", cfg.activity.capacity);
    }

    let session_id = uuid::Uuid::new_v4().to_string();
    let mut transcript = if args.no_transcript {
        transcript::Transcript::disabled()
    } else {
        let transcripts_dir = args
            .transcripts_dir
            .clone()
            .unwrap_or_else(|| root.join(".roster").join("sessions"));
        std::fs::create_dir_all(&transcripts_dir)?;
        let path = transcripts_dir.join(format!("{}.jsonl", session_id));
        transcript::Transcript::new(&path, &session_id)?
    };

    // Last-resort net: any panic still ends with the generic toast
    std::panic::set_hook(Box::new(|info| {
        if cli::IN_COMMAND.load(std::sync::atomic::Ordering::SeqCst) {
            return;
        }
        eprintln!("Global error: {}", info);
        eprintln!("[!] {}", app::UNEXPECTED_ERROR);
    }));

    let api = api::HttpApi::new(&cfg.service.base_url, cfg.service.timeout());
    let _ = transcript.session_start(api.base_url());
    let mut app = app::App::new(api, cfg, transcript);
    app.set_verbose(args.verbose || args.debug);

    let confirm = cli::StdinConfirm {
        print_mode: args.command.is_some(),
        auto_yes: args.yes,
    };
    let mut session = cli::Session::new(app, Box::new(confirm));
    session.tracing = args.trace;

    if let Some(command) = &args.command {
        cli::run_once(&mut session, command)
    } else {
        cli::run_repl(session)
    }
}
