use std::env;
use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber. Stdout is reserved for plugin output, so
/// events go to stderr, and to `LOG_FILE_PATH` as well when that is set.
/// `TRACING_LEVEL` takes any `EnvFilter` directive and overrides `level`.
///
/// Keep the returned guard alive until the process exits.
pub fn init_logger(level: LevelFilter) -> impl Drop {
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| level.to_string().to_lowercase());
    let filter_layer = EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let mut guards: Vec<WorkerGuard> = Vec::new();

    let (stderr, guard) = tracing_appender::non_blocking(std::io::stderr());
    guards.push(guard);

    let file_layer = match env::var("LOG_FILE_PATH") {
        Ok(log_file_path) => {
            let file_appender = tracing_appender::rolling::never(".", log_file_path);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            guards.push(guard);
            Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
        }
        Err(_) => None,
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(stderr)
                .with_file(false)
                .with_target(false)
                .without_time()
                .with_ansi(true),
        )
        .with(file_layer)
        .with(filter_layer)
        .init();

    debug!(filter = %filter, "tracing configured");

    guards
}
