mod action;
mod app;
mod client;
mod config;
mod error;
mod feed;
mod store;
mod tui;
mod types;
mod ui;

use std::panic;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::Action;
use crate::app::App;
use crate::client::HnClient;
use crate::config::Config;
use crate::error::Result;
use crate::store::Store;
use crate::tui::{Event, EventHandler};

#[derive(Parser, Debug)]
#[command(name = "hnbest", version, about = "Read Hacker News best stories in the terminal")]
struct Cli {
    /// Max stories to load (0 loads everything the API lists)
    #[arg(long)]
    limit: Option<usize>,

    /// Wipe the story cache and exit
    #[arg(long)]
    clear_cache: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Log to stderr; the alternate screen owns stdout.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load();

    let store = Store::open_default()?;
    if cli.clear_cache {
        store.clear()?;
        println!("story cache cleared");
        return Ok(());
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let client = HnClient::new(config.api.base_url.clone(), config.api.web_url.clone())?;
    let limit = cli.limit.unwrap_or(config.general.limit);

    let result = run(client, store, limit, config.general.concurrency).await;

    tui::restore()?;

    result
}

async fn run(client: HnClient, store: Store, limit: usize, concurrency: usize) -> Result<()> {
    let mut terminal = tui::init()?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    let mut app = App::new(client, store, limit, concurrency, action_tx.clone());

    let tick_rate = Duration::from_millis(250);
    let render_rate = Duration::from_millis(16); // ~60fps
    let mut events = EventHandler::new(tick_rate, render_rate);

    loop {
        tokio::select! {
            Some(event) = events.next() => {
                if event.is_quit() {
                    break;
                }

                match event {
                    Event::Render => {
                        terminal.draw(|frame| ui::render(frame, &app))?;
                    }
                    _ => {
                        let action = app.handle_event(event);
                        if !matches!(action, Action::None) {
                            action_tx.send(action).ok();
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
