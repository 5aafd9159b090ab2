use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use crossterm::event::EventStream;
use futures::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tokio::time;

use ftpdeck::{
    App, AppEvent, ConfigManager, ControlEvent, GatewayClient, Result, SessionController,
    default_download_dir, init_panic_hook, init_tracing, restore_tui,
};

#[derive(Parser, Debug)]
#[command(name = "ftpdeck", about = "Manage files on a remote FTP host through a transfer gateway")]
struct Cli {
    /// Base URL of the transfer gateway (overrides the config file)
    #[arg(long)]
    gateway_url: Option<String>,

    /// Config file path (defaults to ~/.config/ftpdeck/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_panic_hook();
    let _log_guard = init_tracing(&cli.log_level)?;

    let config = match &cli.config {
        Some(path) => ConfigManager::with_path(path)?,
        None => ConfigManager::new()?,
    };

    let gateway_url = cli
        .gateway_url
        .unwrap_or_else(|| config.settings().gateway_url.clone());
    let backend = Arc::new(GatewayClient::new(&gateway_url)?);

    let download_dir = config
        .settings()
        .download_dir
        .clone()
        .unwrap_or_else(default_download_dir);

    // App events: terminal input, ticks, and gateway task outcomes
    let (app_tx, mut app_rx) = mpsc::channel::<AppEvent>(100);
    let (control_tx, mut control_rx) = mpsc::channel::<ControlEvent>(100);

    let tx_control = app_tx.clone();
    tokio::spawn(async move {
        while let Some(event) = control_rx.recv().await {
            if tx_control.send(AppEvent::Control(event)).await.is_err() {
                break;
            }
        }
    });

    let tx_input = app_tx.clone();
    let tx_tick = app_tx;
    let mut ticker = time::interval(time::Duration::from_millis(250));
    let mut event_stream = EventStream::new();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                event_result = event_stream.next() => {
                    let event = match event_result {
                        None => break,
                        Some(Err(_)) => break, // IO error on stdin
                        Some(Ok(event)) => event,
                    };
                    if tx_input.send(AppEvent::Input(event)).await.is_err() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if tx_tick.send(AppEvent::Tick).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    let controller = SessionController::new(backend, control_tx, download_dir);
    let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    let mut app = App::new(terminal, controller, config);
    app.init_terminal()?;

    let res = app.run(&mut app_rx).await;

    drop(app);
    restore_tui().ok();

    res
}
