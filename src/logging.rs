use tracing_appender::non_blocking::WorkerGuard;

/// Environment variable holding the log level (`error`, `warn`, `info`, `debug`, `trace`).
pub const LOG_LEVEL_ENV: &str = "MAZERUN_LOG";

/// Log level from [`LOG_LEVEL_ENV`], `info` when unset or unparsable.
pub fn log_level() -> tracing::Level {
    std::env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|s| s.trim().parse::<tracing::Level>().ok())
        .unwrap_or(tracing::Level::INFO)
}

/// Send logs to `file_name` in the working directory.
///
/// The terminal is in raw mode while the app runs, so nothing is logged to it.
/// Keep the returned guard alive until exit, or buffered lines are lost.
pub fn init_tracing(file_name: &str) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::never(".", file_name);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    // Fails only if a global subscriber is already installed, which is fine
    let _ = tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_max_level(log_level())
        .try_init();
    guard
}
