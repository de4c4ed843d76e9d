//! pws - command-line client for the practice web server.
//!
//! Signs in and out of the server and keeps the session between runs.

mod command;
mod terminal;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use pws_core::{
    AuthOrchestrator, Config, HttpTransport, LoginForm, LoginOutcome, SessionStore,
};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use command::{Command, USAGE};
use terminal::TerminalNotifier;

/// Log file name in the cache directory
const LOG_FILE: &str = "pws.log";

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr; with `PWS_LOG_FILE` set they are also appended to
/// `pws.log` in `log_dir`. The returned guard must live until exit.
fn init_tracing(log_dir: Option<PathBuf>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let log_dir = if std::env::var_os("PWS_LOG_FILE").is_some() {
        Config::default().cache_dir().ok()
    } else {
        None
    };
    let _log_guard = init_tracing(log_dir);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = Command::parse(&args)?;
    if command == Command::Help {
        println!("{}", USAGE);
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };
    if let Ok(base_url) = std::env::var("PWS_BASE_URL") {
        config.base_url = base_url;
    }
    debug!(base_url = %config.base_url, storage = ?config.storage, "Config loaded");

    let store = config.open_store()?;
    let session = Arc::new(SessionStore::new(store));
    let transport = Arc::new(HttpTransport::new(&config.base_url, config.request_timeout())?);
    let auth = AuthOrchestrator::new(session, transport, Arc::new(TerminalNotifier));

    match command {
        Command::Login { username } => login(&auth, &mut config, username).await,
        Command::Logout => {
            auth.logout();
            Ok(ExitCode::SUCCESS)
        }
        Command::Status => Ok(status(&auth)),
        Command::Submissions => {
            let loaded = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&loaded);
            auth.load_submissions(move || {
                flag.store(true, Ordering::SeqCst);
                println!("Submissions loaded");
            })
            .await;
            Ok(exit_code(loaded.load(Ordering::SeqCst)))
        }
        Command::Help => Ok(ExitCode::SUCCESS),
    }
}

async fn login(auth: &AuthOrchestrator, config: &mut Config, username: Option<String>) -> Result<ExitCode> {
    let username = match username.or_else(|| std::env::var("PWS_USERNAME").ok()) {
        Some(username) => username,
        None => prompt_username(config.last_username.as_deref())?,
    };
    let password = match std::env::var("PWS_PASSWORD") {
        Ok(password) => password,
        Err(_) => rpassword::prompt_password("Password: ").context("Failed to read password")?,
    };
    if username.is_empty() || password.is_empty() {
        anyhow::bail!("Username and password required");
    }

    let mut form = LoginForm::new(username.clone(), password);
    let outcome = auth.login(&mut form).await;
    info!(?outcome, "Login finished");

    if outcome == LoginOutcome::Established {
        config.last_username = Some(username);
        if let Err(e) = config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }
    Ok(exit_code(outcome == LoginOutcome::Established))
}

fn prompt_username(default: Option<&str>) -> Result<String> {
    match default {
        Some(last_user) => print!("Username [{}]: ", last_user),
        None => print!("Username: "),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    match (input.is_empty(), default) {
        (true, Some(last_user)) => Ok(last_user.to_string()),
        _ => Ok(input.to_string()),
    }
}

fn status(auth: &AuthOrchestrator) -> ExitCode {
    let session = auth.session();
    match session.current_username() {
        Some(username) if session.is_authenticated() => {
            println!("Signed in as {}", username);
            ExitCode::SUCCESS
        }
        _ => {
            println!("Not signed in");
            ExitCode::FAILURE
        }
    }
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
