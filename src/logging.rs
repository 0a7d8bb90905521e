use std::fs;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "kmpdc_seeder.log";
const DEFAULT_FILTER: &str = "kmpdc_seeder=info,warn";

/// Install the global subscriber: JSON lines to `logs/kmpdc_seeder.log.<date>` and
/// plain text to stdout. `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    if let Err(e) = fs::create_dir_all(LOG_DIR) {
        eprintln!("Could not create {} directory: {}", LOG_DIR, e);
    }

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(LOG_DIR, LOG_FILE));

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_writer(file_writer))
        .with(fmt::layer().with_target(true).with_writer(std::io::stdout))
        .init();

    // Dropping the guard stops the file writer
    std::mem::forget(guard);
}
