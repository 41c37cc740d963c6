mod action;
mod app;
mod appwrite;
mod auth;
mod catalog;
mod config;
mod debounce;
mod error;
mod event;
mod feed;
mod scroll;
#[cfg(test)]
mod test_server;
mod tmdb;
mod trailer;
mod trending;
mod tui;
mod types;
mod ui;

use std::fs::File;
use std::panic;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::Action;
use crate::app::{App, AppOptions};
use crate::appwrite::Appwrite;
use crate::catalog::Catalog;
use crate::config::{Config, TrendingBackend};
use crate::error::MarqueeError;
use crate::event::Event;
use crate::feed::StalePolicy;
use crate::tmdb::Tmdb;
use crate::trending::{LocalTrending, TrendingStore};
use crate::tui::EventHandler;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.config/marquee/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start with this search instead of the popular feed
    #[arg(short, long)]
    query: Option<String>,

    /// How to treat responses overtaken by a newer request
    #[arg(long, value_enum)]
    stale_policy: Option<StalePolicy>,

    /// Keep the trending board in a local file instead of Appwrite
    #[arg(long)]
    local_trending: bool,
}

/// ~/.cache/marquee/marquee.log; the TUI owns stdout and stderr.
fn log_file() -> Option<File> {
    let dir = dirs::cache_dir()?.join("marquee");
    std::fs::create_dir_all(&dir).ok()?;
    File::create(dir.join("marquee.log")).ok()
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    match log_file() {
        Some(file) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init(),
        None => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn build_store(config: &Config, force_local: bool) -> Result<Arc<dyn TrendingStore>, MarqueeError> {
    let settings = &config.trending;
    let use_appwrite =
        !force_local && settings.backend == TrendingBackend::Appwrite && settings.appwrite_ready();

    if use_appwrite {
        let key = auth::load_appwrite_key(settings.api_key_env.as_deref());
        return Ok(Arc::new(Appwrite::new(settings, key)));
    }

    if settings.backend == TrendingBackend::Appwrite && !force_local {
        tracing::warn!("Appwrite project, database or collection not configured; using local trending store");
    }
    let path = trending::default_local_path()
        .ok_or_else(|| MarqueeError::Config("no data directory for local trending store".to_string()))?;
    Ok(Arc::new(LocalTrending::new(path)))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_path(path)?,
        None => Config::load(),
    };

    // Fail before touching the terminal if there is no token.
    let token = auth::load_tmdb_token(&config.tmdb)?;
    let catalog: Arc<dyn Catalog> = Arc::new(Tmdb::new(&config.tmdb, token)?);
    let store = build_store(&config, cli.local_trending)?;

    tracing::info!(
        catalog = catalog.name(),
        trending = store.name(),
        "starting marquee"
    );

    let options = AppOptions {
        debounce: config.search.debounce(),
        stale_policy: cli.stale_policy.unwrap_or(config.search.stale_policy),
        trending_limit: config.trending.limit,
    };

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let result = run(catalog, store, options, cli.query).await;

    // Restore terminal
    tui::restore()?;

    result
}

async fn run(
    catalog: Arc<dyn Catalog>,
    store: Arc<dyn TrendingStore>,
    options: AppOptions,
    query: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize terminal
    let mut terminal = tui::init()?;

    // Create action channel
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    // Create app state
    let mut app = App::new(catalog, store, options, action_tx.clone());
    if let Some(query) = query {
        app.search_input = query;
    }
    let size = terminal.size()?;
    app.update(Action::Resize(size.width, size.height));

    // Create event handler
    let tick_rate = Duration::from_millis(250);
    let render_rate = Duration::from_millis(16); // ~60fps
    let mut events = EventHandler::new(tick_rate, render_rate);

    // Main loop
    loop {
        tokio::select! {
            Some(event) = events.next() => {
                if event.is_quit() {
                    app.update(Action::Quit);
                    break;
                }

                match event {
                    Event::Render => {
                        terminal.draw(|frame| ui::render(frame, &app))?;
                    }
                    _ => {
                        let action = app.handle_event(event);
                        if !matches!(action, Action::None) {
                            action_tx.send(action)?;
                        }
                    }
                }
            }
            Some(action) = action_rx.recv() => {
                app.update(action);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
