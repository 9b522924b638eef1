use chrono::Local;
use fern::Dispatch;
use log::LevelFilter;
use std::fs;
use std::sync::Once;

// Define where to store logs
const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "scheduler.log";

static INIT: Once = Once::new();

/// Initializes the global logger.
///
/// Safe to call more than once: only the first call installs the dispatcher, so library entry points and
/// tests can all call it.
///
/// Log level is controlled by the `RUST_LOG` environment variable and defaults to `info`.
/// Logs are written to `logs/scheduler.log` and to stderr.
pub fn init() {
    INIT.call_once(install);
}

fn install() {
    if let Err(e) = fs::create_dir_all(LOG_DIR) {
        eprintln!("Failed to create log directory at '{}': {}", LOG_DIR, e);
    }

    let log_file_path = format!("{}/{}", LOG_DIR, LOG_FILE);

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let log_level_filter = log_level.parse::<LevelFilter>().unwrap_or(LevelFilter::Info);

    let base_config = Dispatch::new().level(log_level_filter).level_for("serde", LevelFilter::Warn);

    let console_config = Dispatch::new()
        .format(|out, message, record| {
            let colors = fern::colors::ColoredLevelConfig::new()
                .error(fern::colors::Color::Red)
                .warn(fern::colors::Color::Yellow)
                .info(fern::colors::Color::Green)
                .debug(fern::colors::Color::Blue)
                .trace(fern::colors::Color::BrightBlack);

            out.finish(format_args!(
                "[{} {} {}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .chain(std::io::stderr());

    let mut dispatch = base_config.chain(console_config);

    // Without a log file the console output is still useful.
    match fern::log_file(&log_file_path) {
        Ok(file) => {
            let file_config = Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!("[{} {} {}] {}", Local::now().format("%Y-%m-%d %H:%M:%S"), record.level(), record.target(), message))
                })
                .chain(file);
            dispatch = dispatch.chain(file_config);
        }
        Err(e) => eprintln!("Failed to open log file '{}': {}", log_file_path, e),
    }

    match dispatch.apply() {
        Ok(()) => log::info!("Logger initialized. Logging to console and '{}'.", log_file_path),
        Err(e) => eprintln!("Failed to apply logger configuration: {}", e),
    }
}
