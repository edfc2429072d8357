//! Logging and observability helpers.

use std::fs;

use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use crate::config::EngineConfig;

const LOG_FILE_PREFIX: &str = "qoreorm.log";
const DEFAULT_FILTER: &str = "qoreorm=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env("QOREORM_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs a global subscriber. Writes to a daily rolling file when
/// `config.log_dir` is set, to stderr otherwise. Does nothing if a
/// subscriber is already installed.
pub fn init_tracing(config: &EngineConfig) {
    match &config.log_dir {
        Some(log_dir) => {
            let _ = fs::create_dir_all(log_dir);
            let file_appender: RollingFileAppender =
                tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);

            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(file_appender)
                .with_ansi(false)
                .with_span_events(FmtSpan::CLOSE)
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(std::io::stderr)
                .with_span_events(FmtSpan::CLOSE)
                .try_init();
        }
    }
}
