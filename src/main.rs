mod api;
mod app;
mod config;
mod editor;
mod format;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{HttpLeadApi, LeadApi};
use app::{App, Popup};
use config::AppConfig;
use theme::Theme;

#[derive(Parser, Debug)]
#[command(name = "leadbook")]
#[command(version)]
#[command(about = "A terminal-friendly lead manager for a REST leads API")]
struct Args {
    /// Base URL of the leads API (overrides the config file)
    #[arg(long, env = "LEADBOOK_API_URL")]
    api_url: Option<String>,

    /// Bearer token for the API (overrides the config file)
    #[arg(long, env = "LEADBOOK_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Print all leads as JSON and exit
    #[arg(short, long)]
    list: bool,

    /// Log in with this email and store the token in the config file
    #[arg(long, value_name = "EMAIL")]
    login: Option<String>,

    /// Password for --login
    #[arg(long, env = "LEADBOOK_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

impl Args {
    fn runs_tui(&self) -> bool {
        self.login.is_none() && !self.list
    }
}

/// Effective connection settings: CLI/env first, then the config file
struct Settings {
    api_url: String,
    token: String,
}

impl Settings {
    fn resolve(args: &Args, config: &AppConfig) -> Self {
        let api_url = args.api_url.clone().unwrap_or_else(|| config.api_url.clone());
        let token = args
            .token
            .clone()
            .or_else(|| config.token.clone())
            .unwrap_or_default();

        if token.is_empty() {
            tracing::warn!("No API token configured; requests will likely be rejected");
        }

        Self { api_url, token }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.runs_tui());

    let mut config = AppConfig::load().unwrap_or_default();
    let settings = Settings::resolve(&args, &config);
    let api = HttpLeadApi::new(&settings.api_url);

    // Handle CLI-only commands
    if let Some(email) = args.login.as_deref() {
        let password = args
            .password
            .as_deref()
            .context("--login needs --password or LEADBOOK_PASSWORD")?;
        return login(&api, &mut config, email, password).await;
    }

    if args.list {
        return print_leads(&api, &settings.token).await;
    }

    ui::init_theme(Theme::from_config(&config.theme));

    // Run TUI
    run_tui(api, settings.token).await
}

/// CLI modes log to stderr. The TUI owns the terminal, so it logs to a file
/// instead, or nowhere if the file can't be opened.
fn init_logging(tui: bool) {
    let registry = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env());

    if !tui {
        registry.with(tracing_subscriber::fmt::layer().with_writer(io::stderr)).init();
        return;
    }

    match log_file_path().and_then(|path| open_log_file(&path)) {
        Some(file) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init(),
        None => registry.init(),
    }
}

fn log_file_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("leadbook").join("leadbook.log"))
}

fn open_log_file(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

async fn print_leads(api: &HttpLeadApi, token: &str) -> Result<()> {
    let leads = api
        .list_leads(token)
        .await
        .context(app::LOAD_FAILED)?;
    println!("{}", serde_json::to_string_pretty(&leads)?);
    Ok(())
}

async fn login(api: &HttpLeadApi, config: &mut AppConfig, email: &str, password: &str) -> Result<()> {
    let token = api
        .login(email, password)
        .await
        .context("Login failed")?;
    config.token = Some(token);
    config.save()?;
    println!("Logged in as {}; token saved", email);
    Ok(())
}

async fn run_tui(api: HttpLeadApi, token: String) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(api, token);

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app<A: LeadApi>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<A>,
) -> Result<()> {
    // Show the placeholder while the first load is in flight
    terminal.draw(|f| ui::draw(f, app))?;
    app.load_leads().await;

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') if app.popup == Popup::None => return Ok(()),
                    KeyCode::Char('c') if key.modifiers.contains(event::KeyModifiers::CONTROL) => {
                        return Ok(())
                    }
                    _ => app.handle_key(key).await,
                },
                Event::Mouse(mouse) => {
                    let size = terminal.size()?;
                    let area = ratatui::layout::Rect::new(0, 0, size.width, size.height);
                    app.handle_mouse(mouse, ui::editor_area(area)).await;
                }
                _ => {}
            }
        }
    }
}
