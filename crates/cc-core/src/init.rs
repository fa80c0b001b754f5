//! Process bootstrap for the two binaries (`keeper`, `room`): dual
//! terminal/file logging and a cooperative shutdown signal, mirroring
//! the teacher's `log`/`kys` pair but cancelling a token instead of
//! killing the process outright.

use std::time::{SystemTime, UNIX_EPOCH};

use tokio_util::sync::CancellationToken;

/// Initializes combined terminal (info) + file (debug) logging under
/// `logs/<unix-seconds>.log`.
pub fn init_logging() {
    if let Err(err) = std::fs::create_dir_all("logs") {
        eprintln!("failed to create logs directory: {err}");
        return;
    }
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let file = std::fs::File::create(format!("logs/{secs}.log"));
    let loggers: Vec<Box<dyn simplelog::SharedLogger>> = match file {
        Ok(file) => vec![
            simplelog::TermLogger::new(
                log::LevelFilter::Info,
                config.clone(),
                simplelog::TerminalMode::Mixed,
                simplelog::ColorChoice::Auto,
            ),
            simplelog::WriteLogger::new(log::LevelFilter::Debug, config, file),
        ],
        Err(err) => {
            eprintln!("failed to create log file: {err}");
            vec![simplelog::TermLogger::new(
                log::LevelFilter::Info,
                config,
                simplelog::TerminalMode::Mixed,
                simplelog::ColorChoice::Auto,
            )]
        }
    };
    if let Err(err) = simplelog::CombinedLogger::init(loggers) {
        eprintln!("failed to initialize logger: {err}");
    }
}

/// Spawns a task that cancels `token` on Ctrl+C, letting every loop
/// parked on the token unwind in its own time (spec.md §5's
/// cancellation-token object).
pub fn install_shutdown_signal(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("interrupt received, shutting down");
            token.cancel();
        }
    });
}
