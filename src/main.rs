mod api;
mod app;
mod config;
mod error;
mod filters;
mod form;
mod logging;
mod models;
mod ui;

#[cfg(test)]
mod test_support;

use crate::api::ApiClient;
use crate::app::App;
use crate::config::Config;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dotenv::dotenv;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::load()?;
    logging::init(&config.log_file)?;

    let api = ApiClient::new(&config.api_url);
    info!(api_url = %api.base_url(), "starting tasklist-tui");

    let (tx, rx) = mpsc::unbounded_channel();
    let mut app = App::new(api, tx);
    app.refresh_tasks();

    // Setup terminal UI
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let res = ui::run_app(&mut terminal, app, rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(%err, "terminal error");
        eprintln!("Error: {:?}", err);
    }
    info!("exiting");

    Ok(())
}
