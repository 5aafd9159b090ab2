use crossterm::cursor::Show;
use crossterm::execute;
use crossterm::terminal::{LeaveAlternateScreen, disable_raw_mode};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{AppError, Result};

const LOG_FILE: &str = "ftpdeck.log";

pub fn init_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // intentionally ignore errors here since we're already in a panic
        let _ = restore_tui();
        original_hook(panic_info);
    }));
}

pub fn restore_tui() -> std::io::Result<()> {
    disable_raw_mode()?;
    execute!(std::io::stdout(), LeaveAlternateScreen, Show)?;
    Ok(())
}

/// Set up file logging. RUST_LOG takes precedence over `log_level`.
///
/// The returned guard flushes the non-blocking writer; hold it for the
/// lifetime of the program.
pub fn init_tracing(log_level: &str) -> Result<WorkerGuard> {
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(".", LOG_FILE));

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_line_number(true)
                .with_ansi(false),
        )
        .try_init()
        .map_err(|e| AppError::ConfigError(format!("Failed to initialize tracing: {}", e)))?;

    Ok(guard)
}
