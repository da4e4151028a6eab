//! Logging bootstrap for hosts that do not configure their own logger.

use std::io::Write;

use chrono::Local;
use env_logger::Builder;
use log::LevelFilter;

/// Install an `env_logger` with a timestamped format. The `LOG_LEVEL`
/// environment variable overrides the default `info` filter.
pub fn initialize_logging() {
    let mut log_level = LevelFilter::Info;
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        log_level = level.parse().unwrap_or(LevelFilter::Info);
    }

    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%+"),
                record.level(),
                record.args()
            )
        })
        .filter(None, log_level)
        .init();
    log::info!("Log level: {}", log_level);
}
