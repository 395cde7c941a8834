use std::io;
use tracing_appender::rolling;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Default filter for stdout when `RUST_LOG` is not set.
const STDOUT_FILTER: &str = "info,web_request=info,article-embeddings=info,reqwest=warn,hyper=warn";

/// Installs the global subscriber: stdout plus a daily rolling file under `logs/`.
pub fn configure_logging() {
    let stdout_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(STDOUT_FILTER));

    let stdout_log = fmt::layer()
        .with_writer(io::stdout)
        .with_filter(stdout_filter);

    // Keep the file log verbose enough to reconstruct a run
    let file_appender = rolling::daily("logs", "newsroom.log");
    let file_log = fmt::layer()
        .with_ansi(false)
        .with_writer(file_appender)
        .with_filter(EnvFilter::new(
            "debug,article-embeddings=debug,html5ever=off,reqwest=info,hyper=info,tokenizers=warn",
        ));

    tracing_subscriber::Registry::default()
        .with(stdout_log)
        .with(file_log)
        .init();
}
