use std::io;
use std::path::Path;
use tracing_appender::rolling;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Sets up stderr and daily-rolling file logging.
///
/// Stdout is left for generated text. `RUST_LOG` overrides the stderr filter.
pub fn configure_logging(log_dir: &Path, verbose: bool) {
    let default_filter = if verbose {
        "info,llm_request=debug,app=debug"
    } else {
        "warn,llm_request=info,app=info"
    };
    let stderr_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // Stderr log configuration
    let stderr_log = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(stderr_filter);

    // File log configuration
    let file_appender = rolling::daily(log_dir, "locality-brief.log");
    let file_log = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_filter(EnvFilter::new("info,llm_request=debug,app=debug,reqwest=info,hyper=warn"));

    tracing_subscriber::Registry::default()
        .with(stderr_log)
        .with(file_log)
        .init();
}
