//! Logging initialization.
//!
//! Logs always go to stderr; stdout carries markup and manifest output.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global subscriber.
///
/// `RUST_LOG`, when set, wins over `level`.
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from `[logging]`, with CLI overrides.
pub fn init_from_config(
    config: &facet_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
) {
    let level = effective_level(&config.logging.level, verbose_override);
    let json_format = json_logs_override || config.logging.format == "json";
    init(level, json_format);
}

/// `--verbose` raises the level to debug but never lowers trace.
fn effective_level(configured: &str, verbose: bool) -> &str {
    if verbose && configured != "trace" {
        "debug"
    } else {
        configured
    }
}
