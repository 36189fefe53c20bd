//! Pharmacy CLI - log in to the pharmacy backend and call its API from a
//! terminal.
//!
//! Usage:
//!   pharmacy login [username]
//!   pharmacy session
//!   pharmacy request <METHOD> <endpoint> [json-body]
//!   pharmacy whoami
//!   pharmacy logout

mod terminal;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use pharmacy_core::api::Method;
use pharmacy_core::auth::{FileSessionStore, SessionStore};
use pharmacy_core::login::{LoginOutcome, Navigator, Notifier, SubmitControl};
use pharmacy_core::{
    Config, LoginFlow, LoginForm, PageResolver, RequestClient, RequestOptions, SessionContext,
};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use terminal::{TerminalNavigator, TerminalNotifier, TerminalSubmit};

/// Directory for an additional rolling log file
const ENV_LOG_DIR: &str = "PHARMACY_LOG_DIR";

const LOG_FILE_PREFIX: &str = "pharmacy.log";

const USAGE: &str = "\
Usage:
  pharmacy login [username]                      Log in and show the landing page
  pharmacy session                               Ask the backend for the session status
  pharmacy request <METHOD> <endpoint> [json]    Call an API endpoint
  pharmacy whoami                                Show the stored user
  pharmacy logout                                Forget the stored session";

/// Initialize the tracing subscriber for logging.
/// The returned guard flushes the log file on drop.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var(ENV_LOG_DIR) {
        Ok(dir) if !dir.is_empty() => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    let _guard = init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        println!("{}", USAGE);
        return Ok(());
    };

    let config = Config::load()?.apply_env();
    let session = load_session(&config)?;
    let api = RequestClient::from_config(&config, session.clone())?;

    match command.as_str() {
        "login" => login(&config, api, args.get(1).cloned()).await,
        "session" => {
            let status = api.check_session().await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(())
        }
        "request" => request(&api, &args[1..]).await,
        "whoami" => whoami(&session).await,
        "logout" => {
            session.clear().await?;
            info!("Session cleared");
            println!("Logged out.");
            Ok(())
        }
        "help" | "--help" | "-h" => {
            println!("{}", USAGE);
            Ok(())
        }
        other => Err(anyhow::anyhow!("Unknown command: {}\n\n{}", other, USAGE)),
    }
}

/// Restore the persisted session, starting empty if it cannot be read
fn load_session(config: &Config) -> Result<SessionContext> {
    let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(&config.cache_dir()?));
    match SessionContext::load(Arc::clone(&store)) {
        Ok(session) => Ok(session),
        Err(e) => {
            warn!(error = %e, "Ignoring unreadable session");
            Ok(SessionContext::new(store))
        }
    }
}

async fn login(config: &Config, api: RequestClient, username: Option<String>) -> Result<()> {
    let username = match username {
        Some(username) => username,
        None => prompt_username()?,
    };
    let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;

    let resolver = PageResolver::new(&config.page_url, &config.app_base_path, &config.pages)?;
    let navigator = Arc::new(TerminalNavigator::default());
    let flow = Arc::new(LoginFlow::new(
        api,
        resolver,
        Arc::new(TerminalNotifier) as Arc<dyn Notifier>,
        Arc::clone(&navigator) as Arc<dyn Navigator>,
        Arc::new(TerminalSubmit) as Arc<dyn SubmitControl>,
    ));

    let form = LoginForm::new();
    form.bind(flow);

    let fields = [("username", username), ("password", password)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

    match form.submit(fields).await {
        Some(LoginOutcome::Redirected(_)) => {
            if let Some(target) = navigator.target() {
                println!("Relative: {}", target.relative);
            }
            Ok(())
        }
        Some(LoginOutcome::Rejected(message)) => Err(anyhow::anyhow!("Login failed: {}", message)),
        Some(LoginOutcome::Ignored) | None => Err(anyhow::anyhow!("Login was not submitted")),
    }
}

fn prompt_username() -> Result<String> {
    print!("Username: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

async fn request(api: &RequestClient, args: &[String]) -> Result<()> {
    let (Some(method), Some(endpoint)) = (args.first(), args.get(1)) else {
        return Err(anyhow::anyhow!("request needs <METHOD> <endpoint>\n\n{}", USAGE));
    };

    let method = Method::from_bytes(method.to_uppercase().as_bytes())
        .with_context(|| format!("Invalid method: {}", method))?;
    let mut options = RequestOptions::default().with_method(method);

    if let Some(body) = args.get(2) {
        let body: serde_json::Value =
            serde_json::from_str(body).context("Request body must be JSON")?;
        options = options.with_json(&body)?;
    }

    let value = api.request(endpoint, options).await?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

async fn whoami(session: &SessionContext) -> Result<()> {
    let Some(data) = session.snapshot().await else {
        println!("Not logged in.");
        return Ok(());
    };

    let name = data
        .user
        .as_ref()
        .and_then(|u| u.display_name())
        .unwrap_or("(unknown)");
    let age = (Utc::now() - data.stored_at).num_minutes().max(0);

    println!("User:    {}", name);
    println!("Role:    {}", data.role().unwrap_or("(none)"));
    println!("Token:   {}", if data.csrf_token.is_some() { "present" } else { "absent" });
    println!("Stored:  {}m ago", age);
    Ok(())
}
