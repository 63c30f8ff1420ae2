//! Structured logging setup for rtrkeys tools
//!
//! Both tools log through `tracing`. The table emits its key changes at
//! `debug` and the optional observer at `info`, so `RUST_LOG=rtrkeys_spki=debug`
//! shows every mutation without turning on noise from the other crates.

use rtrkeys_config::LogFormat;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// JSON lines on stderr, one object per event with the fields flattened
/// next to the message. Thread names are kept because table writers run on
/// plain OS threads, one per cache connection.
pub fn init_logging(tool: &str, default_level: &str) {
    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(
            fmt::layer()
                .json()
                .flatten_event(true)
                .with_writer(std::io::stderr)
                .with_thread_names(true)
                .with_target(true)
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    tracing::info!(tool = tool, format = "json", "Logging initialized");
}

/// Human-readable output on stderr. Stdout stays free for the JSON a tool
/// prints as its result.
pub fn init_console_logging(tool: &str, default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_writer(std::io::stderr)
        .with_thread_names(true)
        .with_target(false)
        .init();

    tracing::info!(tool = tool, format = "console", "Logging initialized");
}

pub fn init_logging_with_format(tool: &str, default_level: &str, format: LogFormat) {
    match format {
        LogFormat::Json => init_logging(tool, default_level),
        LogFormat::Console => init_console_logging(tool, default_level),
    }
}

/// `RUST_LOG` wins over the configured default
fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}
