use anyhow::{Context, Result};
use clap::Parser;
use secrecy::SecretString;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use curak::api::{ApiClient, DEFAULT_API_URL};
use curak::app::{App, AppEvent};
use curak::config::{self, SettingsStore, StartScreen, TOKEN_ENV};
use curak::content::{ContentClient, DEFAULT_READER_URL};
use curak::theme::ThemeName;
use curak::{net, ui};

const API_URL_ENV: &str = "CURAK_API_URL";
const READER_URL_ENV: &str = "CURAK_READER_URL";
const READER_KEY_ENV: &str = "JINA_API_KEY";

#[derive(Parser, Debug)]
#[command(
    name = "curak",
    version,
    about = "Terminal dashboard for your curated reading list"
)]
struct Args {
    /// Save the API token to the settings file and exit
    #[arg(long, value_name = "TOKEN", conflicts_with = "clear_token")]
    set_token: Option<String>,

    /// Remove the saved API token and exit
    #[arg(long)]
    clear_token: bool,

    /// Persist which list the dashboard opens on (unread or read)
    #[arg(long, value_name = "SCREEN")]
    start_screen: Option<StartScreen>,

    /// Persist the color theme
    #[arg(long, value_name = "NAME")]
    theme: Option<ThemeName>,

    /// Print the available themes and exit
    #[arg(long)]
    list_themes: bool,
}

impl Args {
    fn is_maintenance(&self) -> bool {
        self.set_token.is_some()
            || self.clear_token
            || self.start_screen.is_some()
            || self.theme.is_some()
            || self.list_themes
    }
}

/// Logs go to a file: the terminal belongs to the TUI.
fn init_logging(settings_path: &Path) {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let log_file = settings_path.parent().and_then(|dir| {
        config::ensure_private_dir(dir).ok()?;
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("curak.log"))
            .ok()
    });

    match log_file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::sink)
            .init(),
    }
}

/// Applies the one-shot CLI flags to the settings file.
fn run_maintenance(args: &Args, settings: &mut SettingsStore) -> Result<()> {
    if args.list_themes {
        let current = settings.theme();
        for name in ThemeName::ALL {
            let marker = if name == current { " (current)" } else { "" };
            println!("{name}{marker}");
        }
    }

    if let Some(token) = &args.set_token {
        settings
            .set_token(Some(token.clone()))
            .context("Failed to save API token")?;
        println!("API token saved to {}", settings.path().display());
    }

    if args.clear_token {
        settings
            .set_token(None)
            .context("Failed to clear API token")?;
        println!("API token removed.");
    }

    if let Some(start_screen) = args.start_screen {
        settings
            .set_start_screen(start_screen)
            .context("Failed to save start screen")?;
        println!("Start screen set to {start_screen}.");
    }

    if let Some(theme) = args.theme {
        settings
            .set_theme(theme)
            .context("Failed to save theme")?;
        println!("Theme set to {theme}.");
    }

    Ok(())
}

fn build_services(settings: &SettingsStore) -> Result<ui::Services> {
    let http = net::build_client().context("Failed to build HTTP client")?;

    let api_url = std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let api = match settings.token() {
        Some(token) => Some(Arc::new(
            ApiClient::new(http.clone(), &api_url, token)
                .with_context(|| format!("Invalid {API_URL_ENV}: {api_url}"))?,
        )),
        None => {
            tracing::warn!(env = TOKEN_ENV, "No API token configured");
            None
        }
    };

    let reader_url =
        std::env::var(READER_URL_ENV).unwrap_or_else(|_| DEFAULT_READER_URL.to_string());
    let reader_key = std::env::var(READER_KEY_ENV)
        .ok()
        .filter(|k| !k.trim().is_empty())
        .map(SecretString::from);
    let reader = ContentClient::new(http, &reader_url, reader_key)
        .with_context(|| format!("Invalid {READER_URL_ENV}: {reader_url}"))?;

    Ok(ui::Services {
        api,
        reader: Arc::new(reader),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let settings_path = SettingsStore::default_path().context("Cannot locate settings file")?;
    init_logging(&settings_path);

    let mut settings = SettingsStore::open(settings_path);

    if args.is_maintenance() {
        return run_maintenance(&args, &mut settings);
    }

    let services = build_services(&settings)?;
    tracing::info!(
        theme = %settings.theme(),
        start_screen = %settings.start_screen(),
        has_token = services.api.is_some(),
        "Starting dashboard"
    );

    let mut app = App::new(settings.theme(), settings.start_screen());
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    ui::run(&mut app, services, &mut settings, event_tx, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
